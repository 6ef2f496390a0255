// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session errors surfaced to the view layer.

use crate::identity::{ActorError, BridgeError};
use crate::models::KycStatus;

/// Errors returned by [`SessionStore`](crate::session::SessionStore) operations.
///
/// Best-effort profile mutations never produce [`SessionError::Backend`];
/// their remote failures are absorbed into a local patch instead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Identity provider unreachable, or the handshake was rejected.
    #[error("Identity connection failed: {0}")]
    Connection(String),

    /// The bridge never produced an actor handle within the retry budget.
    #[error("Remote service is not available yet")]
    ActorUnavailable,

    /// Business-rule failure reported by the backend, message verbatim.
    #[error("{0}")]
    Backend(String),

    /// The call did not reach the backend or its reply could not be decoded.
    #[error("Remote call failed: {0}")]
    Transport(String),

    /// The operation needs a loaded user.
    #[error("No user is connected")]
    NotConnected,

    /// KYC status cannot move backwards.
    #[error("KYC status cannot change from {from} to {to}")]
    InvalidKycTransition { from: KycStatus, to: KycStatus },
}

impl SessionError {
    /// Stable error code for notification routing.
    pub fn error_code(&self) -> &'static str {
        match self {
            SessionError::Connection(_) => "connection_failed",
            SessionError::ActorUnavailable => "actor_unavailable",
            SessionError::Backend(_) => "backend_rejected",
            SessionError::Transport(_) => "transport_failed",
            SessionError::NotConnected => "not_connected",
            SessionError::InvalidKycTransition { .. } => "invalid_kyc_transition",
        }
    }

    /// Whether retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::ActorUnavailable | SessionError::Transport(_)
        )
    }
}

impl From<ActorError> for SessionError {
    fn from(err: ActorError) -> Self {
        match err {
            ActorError::Rejected(message) => SessionError::Backend(message),
            ActorError::Transport(message) => SessionError::Transport(message),
        }
    }
}

impl From<BridgeError> for SessionError {
    fn from(err: BridgeError) -> Self {
        SessionError::Connection(err.to_string())
    }
}
