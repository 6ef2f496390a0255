// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-gated access to protected views.
//!
//! ```rust,ignore
//! let guard = NavigationGuard::new([Role::Seller]);
//! match guard.resolve(&store).await {
//!     GuardDecision::Render => render_listings(),
//!     _ => render_spinner(),
//! }
//! ```

use super::navigation::Route;
use super::state::SessionPhase;
use super::store::SessionStore;
use crate::identity::Role;

/// What a protected view should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the protected content.
    Render,
    /// Show a placeholder and send the user elsewhere.
    Redirect(Route),
    /// Show a placeholder; the session has not settled.
    Placeholder,
}

impl GuardDecision {
    pub fn shows_protected_content(&self) -> bool {
        matches!(self, GuardDecision::Render)
    }
}

/// Gate for views restricted to a set of roles.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    permitted: Vec<Role>,
}

impl NavigationGuard {
    /// Guard permitting `roles`. An empty set permits any chosen role.
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            permitted: roles.into_iter().collect(),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.permitted.is_empty() || self.permitted.contains(&role)
    }

    /// Decide for a phase without waiting.
    pub fn evaluate(&self, phase: SessionPhase) -> GuardDecision {
        match phase {
            SessionPhase::Uninitialized | SessionPhase::Loading => GuardDecision::Placeholder,
            SessionPhase::Anonymous => GuardDecision::Redirect(Route::Connect),
            SessionPhase::Authenticated {
                role: Some(role), ..
            } if self.permits(role) => GuardDecision::Render,
            SessionPhase::Authenticated { role, .. } => {
                GuardDecision::Redirect(Route::dashboard_for(role))
            }
        }
    }

    /// Wait for the session to settle, decide, and issue any redirect.
    pub async fn resolve(&self, store: &SessionStore) -> GuardDecision {
        store.initialize().await;
        let phase = store.wait_until_settled().await;

        let decision = self.evaluate(phase);
        if let GuardDecision::Redirect(route) = decision {
            tracing::debug!(route = %route, ?phase, "Guard redirecting");
            store.navigate(route);
        }
        decision
    }
}
