// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Module
//!
//! Contracts with the outside world: the delegated-identity bridge and the
//! two remote services it exposes.
//!
//! ## Connect Flow
//!
//! 1. The view asks the session to connect with NFID or Internet Identity
//! 2. The [`IdentityBridge`] runs the delegated login
//! 3. Once its agent is ready, the bridge hands out:
//!    - a [`UserService`] handle (profile, role, KYC)
//!    - a [`LedgerService`] handle (wallet, funds, transfers)
//! 4. [`ActorGateway`] is a ready-made implementation of both services
//!    over an HTTPS JSON gateway

pub mod actor;
pub mod bridge;
pub mod gateway;
pub mod roles;

pub use actor::{ActorError, ActorResult, LedgerService, UserService, WireResult};
pub use bridge::{BridgeError, IdentityBridge};
pub use gateway::{ActorGateway, GatewayError};
pub use roles::Role;
