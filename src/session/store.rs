// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Store
//!
//! The one owner of the in-memory session. Views hold an
//! `Arc<SessionStore>` and go through its methods for every change; nothing
//! else mutates the user or wallet.
//!
//! ## Mutation policies
//!
//! - **Strict** (registration, role, KYC documents and submission, funds,
//!   transfers): remote failure is returned verbatim and local state is
//!   left alone.
//! - **Best effort** (KYC status, profile fields, profile picture): remote
//!   failure is logged, the change is applied locally anyway, and a
//!   [`PendingReconciliation`] marker is kept until the next successful
//!   [`SessionStore::refresh_user`].
//!
//! ## Stale responses
//!
//! `connect` and `disconnect` start a new epoch. Every call remembers the
//! epoch it started in and drops its result if the epoch moved on while it
//! was waiting on the network.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, OnceCell, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::navigation::{NavigationCooldown, Navigator, Route};
use super::state::{
    InitProgress, PendingReconciliation, ReconciliationField, SessionPhase, SessionSnapshot,
    SessionState,
};
use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::identity::{IdentityBridge, LedgerService, Role, UserService};
use crate::models::{
    AuthMethod, Currency, KycDocument, KycDocumentUpload, KycStatus, PrincipalId, ProfileUpdate,
    RegistrationProfile, RoleProfileExtras, Transaction, User, Wallet,
};
use crate::wire;

/// Session context object. Create one per application instance.
pub struct SessionStore {
    bridge: Arc<dyn IdentityBridge>,
    navigator: Arc<dyn Navigator>,
    config: SessionConfig,
    state: RwLock<SessionState>,
    phase: watch::Sender<SessionPhase>,
    init: OnceCell<()>,
    role_navigation: NavigationCooldown,
}

impl SessionStore {
    pub fn new(
        bridge: Arc<dyn IdentityBridge>,
        navigator: Arc<dyn Navigator>,
        config: SessionConfig,
    ) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Uninitialized);
        let role_navigation = NavigationCooldown::new(config.navigation_cooldown);
        Self {
            bridge,
            navigator,
            config,
            state: RwLock::new(SessionState::default()),
            phase,
            init: OnceCell::new(),
            role_navigation,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Current phase, without waiting.
    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Wait until the session leaves `Uninitialized`/`Loading`.
    pub async fn wait_until_settled(&self) -> SessionPhase {
        let mut receiver = self.phase.subscribe();
        let settled = receiver
            .wait_for(SessionPhase::is_settled)
            .await
            .map(|phase| *phase);
        settled.unwrap_or_else(|_| self.phase())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn wallet(&self) -> Option<Wallet> {
        self.state.read().await.wallet.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.user.is_some()
    }

    pub async fn needs_reconciliation(&self) -> bool {
        !self.state.read().await.reconciliation.is_empty()
    }

    pub async fn pending_reconciliation(&self) -> Vec<PendingReconciliation> {
        self.state.read().await.reconciliation.clone()
    }

    /// Forward a route to the view layer's router.
    pub fn navigate(&self, route: Route) {
        debug!(route = %route, "Navigating");
        self.navigator.navigate(route);
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Probe the bridge for an existing delegated identity and load it.
    ///
    /// Runs once per store; concurrent and later callers wait on the same
    /// run instead of probing again.
    pub async fn initialize(&self) {
        self.init.get_or_init(|| self.run_initialize()).await;
    }

    async fn run_initialize(&self) {
        self.update_state(|state| state.init = InitProgress::Running).await;
        let epoch = self.current_epoch().await;

        if self.bridge.is_authenticated().await {
            info!("Restoring delegated identity");
            if let Err(e) = self.refresh_user_in(epoch).await {
                warn!(error = %e, "Could not load profile for restored identity");
            }
        } else {
            debug!("No delegated identity, session is anonymous");
        }

        self.update_state(|state| state.init = InitProgress::Done).await;
    }

    /// Log in through the bridge and route by profile state.
    ///
    /// Returns the route the user was sent to.
    pub async fn connect(&self, method: AuthMethod) -> Result<Route, SessionError> {
        info!(method = %method, "Connecting identity");

        let connected = self.bridge.authenticate_with(method).await.map_err(|e| {
            warn!(method = %method, error = %e, "Identity handshake failed");
            SessionError::from(e)
        })?;

        if !connected {
            warn!(method = %method, "Identity handshake was not completed");
            return Err(SessionError::Connection(format!(
                "{method} login was not completed"
            )));
        }

        let session_id = Uuid::new_v4();
        let epoch = {
            let mut state = self.state.write().await;
            state.clear();
            state.auth_method = Some(method);
            state.session_id = Some(session_id);
            self.publish(&state);
            state.epoch
        };

        let service = self.user_service().await?;
        let route = if service.user_exists().await? {
            self.refresh_user_in(epoch).await?;
            let role = self
                .state
                .read()
                .await
                .user
                .as_ref()
                .and_then(|user| user.role);
            Route::dashboard_for(role)
        } else {
            info!(session = %session_id, "No profile for this identity, starting registration");
            Route::RoleSelection
        };

        if !self.is_current(epoch).await {
            debug!(session = %session_id, "Session ended while connecting, not navigating");
            return Ok(Route::Landing);
        }

        info!(session = %session_id, route = %route, "Identity connected");
        self.navigate(route);
        Ok(route)
    }

    /// Clear the session and return to the landing page. Never fails.
    pub async fn disconnect(&self) {
        {
            let mut state = self.state.write().await;
            state.clear();
            self.publish(&state);
        }

        if let Err(e) = self.bridge.logout().await {
            warn!(error = %e, "Identity logout failed, local session cleared anyway");
        }

        self.role_navigation.cancel();
        info!("Session disconnected");
        self.navigate(Route::Landing);
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Re-fetch the profile, then the wallet.
    pub async fn refresh_user(&self) -> Result<(), SessionError> {
        let epoch = self.current_epoch().await;
        self.refresh_user_in(epoch).await
    }

    /// Re-fetch the profile on behalf of a call that started in `epoch`.
    async fn refresh_user_in(&self, epoch: u64) -> Result<(), SessionError> {
        let service = self.user_service().await?;
        let user = wire::to_user(service.get_current_user().await?);

        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                debug!(principal = %user.principal, "Discarding stale profile");
                return Ok(());
            }
            if !state.reconciliation.is_empty() {
                info!(
                    pending = state.reconciliation.len(),
                    "Profile reloaded, local patches reconciled"
                );
            }
            state.user = Some(user);
            state.reconciliation.clear();
            self.publish(&state);
        }

        if let Err(e) = self.refresh_wallet_in(epoch).await {
            warn!(error = %e, "Profile loaded but wallet refresh failed");
        }
        Ok(())
    }

    /// Re-fetch the wallet of the loaded user.
    pub async fn refresh_wallet(&self) -> Result<(), SessionError> {
        let epoch = self.require_user().await?;
        self.refresh_wallet_in(epoch).await
    }

    async fn refresh_wallet_in(&self, epoch: u64) -> Result<(), SessionError> {
        let ledger = self.ledger_service().await?;
        let wallet = wire::to_wallet(ledger.get_wallet().await?);

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!(owner = %wallet.owner, "Discarding stale wallet");
            return Ok(());
        }
        state.wallet = Some(wallet);
        Ok(())
    }

    // =========================================================================
    // Onboarding (strict)
    // =========================================================================

    /// Create the remote profile for a freshly connected identity.
    pub async fn register(&self, profile: RegistrationProfile) -> Result<(), SessionError> {
        let (epoch, auth_method) = {
            let state = self.state.read().await;
            (state.epoch, state.auth_method.unwrap_or_default())
        };
        let service = self.user_service().await?;

        service
            .register_user(auth_method, &profile)
            .await
            .map_err(|e| {
                warn!(error = %e, "Registration rejected");
                SessionError::from(e)
            })?;

        info!(method = %auth_method, "Profile registered");
        self.refresh_user_in(epoch).await
    }

    /// Choose the trading role and go to its dashboard.
    ///
    /// A repeated call while an earlier one is still within the navigation
    /// cool-down does nothing.
    pub async fn set_role(&self, role: Role, extras: RoleProfileExtras) -> Result<(), SessionError> {
        if !self.role_navigation.try_begin() {
            debug!(role = %role, "Role selection already navigating, ignoring");
            return Ok(());
        }

        let epoch = self.current_epoch().await;
        let outcome = async {
            let service = self.user_service().await?;
            service.set_user_role(role, &extras).await?;
            self.refresh_user_in(epoch).await
        }
        .await;

        if let Err(e) = outcome {
            warn!(role = %role, error = %e, "Role selection failed");
            self.role_navigation.cancel();
            return Err(e);
        }

        if !self.is_current(epoch).await {
            debug!(role = %role, "Session ended during role selection, not navigating");
            return Ok(());
        }

        let landed = self
            .state
            .read()
            .await
            .user
            .as_ref()
            .and_then(|user| user.role)
            .unwrap_or(role);
        info!(role = %landed, "Role selected");
        self.navigate(Route::dashboard_for(Some(landed)));
        Ok(())
    }

    // =========================================================================
    // Profile (best effort)
    // =========================================================================

    pub async fn update_kyc_status(&self, status: KycStatus) -> Result<(), SessionError> {
        let current = self
            .user()
            .await
            .ok_or(SessionError::NotConnected)?
            .kyc_status;
        if !current.can_advance_to(status) {
            return Err(SessionError::InvalidKycTransition {
                from: current,
                to: status,
            });
        }

        self.best_effort(
            ReconciliationField::KycStatus,
            |service| async move { service.update_kyc_status(status).await },
            move |user| {
                user.kyc_status = status;
                if status == KycStatus::InReview && user.kyc_submitted_at.is_none() {
                    user.kyc_submitted_at = Some(Utc::now());
                }
            },
        )
        .await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<(), SessionError> {
        let remote = update.clone();
        self.best_effort(
            ReconciliationField::Profile,
            |service| async move { service.update_profile(&remote).await },
            move |user| user.apply(&update),
        )
        .await
    }

    pub async fn update_profile_picture(&self, picture: Vec<u8>) -> Result<(), SessionError> {
        let remote = picture.clone();
        self.best_effort(
            ReconciliationField::ProfilePicture,
            |service| async move { service.update_profile_picture(&remote).await },
            move |user| user.profile_picture = Some(picture),
        )
        .await
    }

    /// Attempt the remote write; on success patch and reload, on failure
    /// patch and record a reconciliation marker.
    async fn best_effort<C, Fut, P>(
        &self,
        field: ReconciliationField,
        call: C,
        patch: P,
    ) -> Result<(), SessionError>
    where
        C: FnOnce(Arc<dyn UserService>) -> Fut,
        Fut: Future<Output = crate::identity::ActorResult<()>>,
        P: FnOnce(&mut User),
    {
        let epoch = self.require_user().await?;

        let outcome = match self.user_service().await {
            Ok(service) => call(service).await.map_err(SessionError::from),
            Err(e) => Err(e),
        };

        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                debug!(field = ?field, "Session ended during update, dropping local patch");
                return Ok(());
            }
            if let Some(user) = state.user.as_mut() {
                patch(user);
            }
            if let Err(e) = &outcome {
                warn!(field = ?field, error = %e, "Remote update failed, applied locally");
                state.reconciliation.push(PendingReconciliation {
                    field,
                    error: e.to_string(),
                    recorded_at: Utc::now(),
                });
            }
            self.publish(&state);
        }

        if outcome.is_ok() {
            self.refresh_user_quietly(epoch).await;
        }
        Ok(())
    }

    // =========================================================================
    // KYC documents (strict)
    // =========================================================================

    /// Upload a KYC document; returns the stored document id.
    pub async fn upload_kyc_document(
        &self,
        document: KycDocumentUpload,
    ) -> Result<String, SessionError> {
        let epoch = self.require_user().await?;
        let service = self.user_service().await?;
        let document_id = service.upload_kyc_document(&document).await?;

        info!(
            document_id = %document_id,
            kind = ?document.kind,
            bytes = document.content.len(),
            "KYC document uploaded"
        );
        self.refresh_user_quietly(epoch).await;
        Ok(document_id)
    }

    pub async fn submit_kyc_for_review(&self) -> Result<(), SessionError> {
        let epoch = self.require_user().await?;
        let service = self.user_service().await?;
        service.submit_kyc_for_review().await?;

        info!("KYC submitted for review");
        self.refresh_user_quietly(epoch).await;
        Ok(())
    }

    pub async fn list_kyc_documents(&self) -> Result<Vec<KycDocument>, SessionError> {
        self.require_user().await?;
        let service = self.user_service().await?;
        let documents = service.get_user_documents().await?;
        Ok(documents.into_iter().map(wire::to_document).collect())
    }

    // =========================================================================
    // Wallet (strict)
    // =========================================================================

    pub async fn add_funds(&self, amount: u64, currency: Currency) -> Result<(), SessionError> {
        let epoch = self.require_user().await?;
        let ledger = self.ledger_service().await?;
        ledger.add_funds(amount, currency).await?;

        info!(amount, currency = %currency, "Funds added");
        self.refresh_wallet_quietly(epoch).await;
        Ok(())
    }

    /// Transfer funds; returns the ledger transaction id.
    pub async fn transfer(
        &self,
        to: PrincipalId,
        amount: u64,
        currency: Currency,
        memo: Option<String>,
    ) -> Result<String, SessionError> {
        let epoch = self.require_user().await?;
        let ledger = self.ledger_service().await?;
        let tx_id = ledger
            .transfer(&to, amount, currency, memo.as_deref())
            .await
            .map_err(|e| {
                warn!(to = %to, amount, currency = %currency, error = %e, "Transfer rejected");
                SessionError::from(e)
            })?;

        info!(tx_id = %tx_id, to = %to, amount, currency = %currency, "Transfer submitted");
        self.refresh_wallet_quietly(epoch).await;
        Ok(tx_id)
    }

    pub async fn list_transactions(&self) -> Result<Vec<Transaction>, SessionError> {
        self.require_user().await?;
        let ledger = self.ledger_service().await?;
        let history = ledger.get_transaction_history().await?;
        Ok(history.into_iter().map(wire::to_transaction).collect())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn refresh_user_quietly(&self, epoch: u64) {
        if let Err(e) = self.refresh_user_in(epoch).await {
            warn!(error = %e, "Profile refresh after update failed");
        }
    }

    async fn refresh_wallet_quietly(&self, epoch: u64) {
        if let Err(e) = self.refresh_wallet_in(epoch).await {
            warn!(error = %e, "Wallet refresh after update failed");
        }
    }

    async fn current_epoch(&self) -> u64 {
        self.state.read().await.epoch
    }

    async fn is_current(&self, epoch: u64) -> bool {
        self.current_epoch().await == epoch
    }

    /// Epoch of the loaded user, or `NotConnected`.
    async fn require_user(&self) -> Result<u64, SessionError> {
        let state = self.state.read().await;
        match state.user {
            Some(_) => Ok(state.epoch),
            None => Err(SessionError::NotConnected),
        }
    }

    async fn update_state<F>(&self, change: F)
    where
        F: FnOnce(&mut SessionState),
    {
        let mut state = self.state.write().await;
        change(&mut state);
        self.publish(&state);
    }

    fn publish(&self, state: &SessionState) {
        self.phase.send_replace(state.phase());
    }

    async fn user_service(&self) -> Result<Arc<dyn UserService>, SessionError> {
        self.wait_for_actor("user", || self.bridge.user_service()).await
    }

    async fn ledger_service(&self) -> Result<Arc<dyn LedgerService>, SessionError> {
        self.wait_for_actor("ledger", || self.bridge.ledger_service()).await
    }

    /// Poll the bridge until it hands out a handle, within the retry budget.
    async fn wait_for_actor<T, F>(&self, service: &'static str, fetch: F) -> Result<T, SessionError>
    where
        F: Fn() -> Option<T>,
    {
        let limit = self.config.actor_retry_limit;
        for attempt in 0..=limit {
            if let Some(handle) = fetch() {
                return Ok(handle);
            }
            if attempt < limit {
                debug!(service, attempt, "Actor not ready, retrying");
                tokio::time::sleep(self.config.actor_retry_delay).await;
            }
        }

        warn!(service, attempts = limit.saturating_add(1), "Actor never became available");
        Err(SessionError::ActorUnavailable)
    }
}
