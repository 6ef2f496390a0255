// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delegated identity bridge.
//!
//! The bridge performs the NFID / Internet Identity handshake and hands out
//! service handles bound to the delegated identity. Handles are `None` until
//! the bridge has finished setting up its agent; callers wait and poll.

use std::sync::Arc;

use async_trait::async_trait;

use super::actor::{LedgerService, UserService};
use crate::models::AuthMethod;

/// Identity provider unreachable or handshake rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct BridgeError {
    message: String,
}

impl BridgeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[async_trait]
pub trait IdentityBridge: Send + Sync {
    /// Whether a delegated identity already exists (e.g. restored from storage).
    async fn is_authenticated(&self) -> bool;

    /// Run the login flow for `method`. `Ok(false)` means the user backed out.
    async fn authenticate_with(&self, method: AuthMethod) -> Result<bool, BridgeError>;

    /// Drop the delegated identity.
    async fn logout(&self) -> Result<(), BridgeError>;

    fn user_service(&self) -> Option<Arc<dyn UserService>>;

    fn ledger_service(&self) -> Option<Arc<dyn LedgerService>>;
}
