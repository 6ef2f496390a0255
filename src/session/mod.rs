// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Module
//!
//! Owns the authenticated user, their wallet and the onboarding lifecycle.
//!
//! ## Phases
//!
//! ```text
//! Uninitialized ──initialize()──▶ Loading ──▶ Anonymous
//!                                        └──▶ Authenticated { role, kyc }
//! ```
//!
//! Views read [`SessionStore`] snapshots and gate protected pages with a
//! [`NavigationGuard`]. Route changes go through the [`Navigator`] the
//! application supplies.

mod guard;
mod navigation;
mod state;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use guard::{GuardDecision, NavigationGuard};
pub use navigation::{NavigationCooldown, Navigator, Route};
pub use state::{PendingReconciliation, ReconciliationField, SessionPhase, SessionSnapshot};
pub use store::SessionStore;
