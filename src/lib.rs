// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! TradeHub Session - Identity & Wallet Session Layer
//!
//! This crate owns the client-side session of the TradeHub commodities
//! marketplace: delegated login through NFID or Internet Identity, the
//! buyer/seller onboarding flow, and the cached profile and wallet.
//!
//! ## Modules
//!
//! - `config` - Environment-driven session settings
//! - `error` - Errors surfaced to views
//! - `identity` - Identity bridge and remote service contracts
//! - `logging` - Tracing subscriber setup
//! - `models` - Flat profile, wallet and KYC records
//! - `session` - Session store, navigation and role guards
//! - `wire` - Decoding of the services' wire records

pub mod config;
pub mod error;
pub mod identity;
pub mod logging;
pub mod models;
pub mod session;
pub mod wire;

pub use config::SessionConfig;
pub use error::SessionError;
pub use session::{NavigationGuard, Route, SessionPhase, SessionStore};
