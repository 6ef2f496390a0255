// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session state and its derived phase.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::identity::Role;
use crate::models::{AuthMethod, KycStatus, User, Wallet};

/// Lifecycle phase of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// `initialize()` has not run yet.
    Uninitialized,
    /// The initial bridge probe is in flight.
    Loading,
    /// Settled with no user.
    Anonymous,
    /// Settled with a loaded user; `role` is `None` during onboarding.
    Authenticated { role: Option<Role>, kyc: KycStatus },
}

impl SessionPhase {
    /// Whether guards may act on this phase.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            SessionPhase::Anonymous | SessionPhase::Authenticated { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum InitProgress {
    #[default]
    NotStarted,
    Running,
    Done,
}

/// Profile area whose remote write failed and was applied locally only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ReconciliationField {
    KycStatus,
    Profile,
    ProfilePicture,
}

/// Marker left by a best-effort mutation whose remote write failed.
///
/// Cleared by the next successful `refresh_user()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingReconciliation {
    pub field: ReconciliationField,
    pub error: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub user: Option<User>,
    pub wallet: Option<Wallet>,
    pub auth_method: Option<AuthMethod>,
    pub session_id: Option<Uuid>,
    /// Bumped on connect and disconnect; results tagged with an older
    /// epoch are discarded.
    pub epoch: u64,
    pub init: InitProgress,
    pub reconciliation: Vec<PendingReconciliation>,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match &self.user {
            Some(user) => SessionPhase::Authenticated {
                role: user.role,
                kyc: user.kyc_status,
            },
            None => match self.init {
                InitProgress::NotStarted => SessionPhase::Uninitialized,
                InitProgress::Running => SessionPhase::Loading,
                InitProgress::Done => SessionPhase::Anonymous,
            },
        }
    }

    /// Drop everything tied to the current identity and start a new epoch.
    ///
    /// A cleared session counts as settled even if `initialize()` never ran.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.init = InitProgress::Done;
        self.user = None;
        self.wallet = None;
        self.auth_method = None;
        self.session_id = None;
        self.reconciliation.clear();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            user: self.user.clone(),
            wallet: self.wallet.clone(),
            phase: self.phase(),
            session_id: self.session_id,
            epoch: self.epoch,
            pending_reconciliation: self.reconciliation.clone(),
        }
    }
}

/// Point-in-time copy of the session for views.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub wallet: Option<Wallet>,
    pub phase: SessionPhase,
    pub session_id: Option<Uuid>,
    pub epoch: u64,
    pub pending_reconciliation: Vec<PendingReconciliation>,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::sample_user;

    #[test]
    fn phase_follows_init_progress_without_user() {
        let mut state = SessionState::default();
        assert_eq!(state.phase(), SessionPhase::Uninitialized);

        state.init = InitProgress::Running;
        assert_eq!(state.phase(), SessionPhase::Loading);
        assert!(!state.phase().is_settled());

        state.init = InitProgress::Done;
        assert_eq!(state.phase(), SessionPhase::Anonymous);
        assert!(state.phase().is_settled());
    }

    #[test]
    fn loaded_user_means_authenticated() {
        let state = SessionState {
            user: Some(sample_user(Some(Role::Seller))),
            init: InitProgress::Running,
            ..Default::default()
        };
        assert_eq!(
            state.phase(),
            SessionPhase::Authenticated {
                role: Some(Role::Seller),
                kyc: KycStatus::Pending
            }
        );
        assert!(state.snapshot().is_connected());
    }

    #[test]
    fn clear_starts_new_epoch() {
        let mut state = SessionState {
            user: Some(sample_user(None)),
            auth_method: Some(AuthMethod::Nfid),
            session_id: Some(Uuid::new_v4()),
            epoch: 3,
            ..Default::default()
        };
        state.clear();
        assert_eq!(state.epoch, 4);
        assert!(state.user.is_none());
        assert!(state.session_id.is_none());
        assert!(state.auth_method.is_none());
        assert_eq!(state.phase(), SessionPhase::Anonymous);
    }
}
