// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory bridge, services and navigator for session tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Notify;

use super::navigation::{Navigator, Route};
use super::store::SessionStore;
use crate::config::SessionConfig;
use crate::identity::{
    ActorError, ActorResult, BridgeError, IdentityBridge, LedgerService, Role, UserService,
};
use crate::models::{
    AuthMethod, Currency, KycDocumentUpload, KycStatus, PrincipalId, ProfileUpdate,
    RegistrationProfile, RoleProfileExtras, User,
};
use crate::wire::{variant, RawDocument, RawTransaction, RawUser, RawWallet, WireNat, WireOpt};

pub(crate) const PRINCIPAL: &str = "w7x7r-cok77-xa5lx-aaaaa-cai";

const NOW_NANOS: i64 = 1_700_000_000_000_000_000;

pub(crate) fn sample_user(role: Option<Role>) -> User {
    let at = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
    User {
        principal: PrincipalId::from(PRINCIPAL),
        first_name: "Ama".into(),
        last_name: "Mensah".into(),
        email: "ama@example.com".into(),
        phone: None,
        profile_picture: None,
        role,
        verified: false,
        wallet_address: "0xabc".into(),
        auth_method: AuthMethod::InternetIdentity,
        joined_at: at,
        kyc_status: KycStatus::Pending,
        kyc_submitted_at: None,
        last_active: at,
        bio: None,
        location: None,
        company: None,
        website: None,
    }
}

pub(crate) fn raw_user(role: Option<&str>) -> RawUser {
    RawUser {
        id: PRINCIPAL.into(),
        first_name: "Ama".into(),
        last_name: "Mensah".into(),
        email: "ama@example.com".into(),
        role: role.map(variant).unwrap_or(Value::Null),
        wallet_address: "0xabc".into(),
        auth_method: variant("InternetIdentity"),
        created_at: NOW_NANOS.into(),
        kyc_status: variant("Pending"),
        last_active: NOW_NANOS.into(),
        ..Default::default()
    }
}

pub(crate) fn raw_wallet() -> RawWallet {
    RawWallet {
        owner: PRINCIPAL.into(),
        icp_balance: 500u64.into(),
        usd_balance: 1_000u64.into(),
        eur_balance: 0u64.into(),
        gbp_balance: 0u64.into(),
        created_at: NOW_NANOS.into(),
        last_transaction_at: NOW_NANOS.into(),
        is_locked: false,
        total_transactions: 0u64.into(),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

/// Per-method gates, failure injection and call log shared by the fakes.
#[derive(Default)]
struct Script {
    failures: Mutex<HashMap<&'static str, String>>,
    gates: Mutex<HashMap<&'static str, Arc<Notify>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl Script {
    async fn enter(&self, method: &'static str) -> ActorResult<()> {
        lock(&self.calls).push(method);
        let gate = lock(&self.gates).get(method).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match lock(&self.failures).get(method) {
            Some(message) => Err(ActorError::Rejected(message.clone())),
            None => Ok(()),
        }
    }

    fn count(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|m| **m == method).count()
    }

    fn hold(&self, method: &'static str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        lock(&self.gates).insert(method, gate.clone());
        gate
    }
}

// =============================================================================
// User service
// =============================================================================

#[derive(Default)]
pub(crate) struct FakeUserService {
    record: Mutex<Option<RawUser>>,
    documents: Mutex<Vec<RawDocument>>,
    script: Script,
}

impl FakeUserService {
    pub fn set_record(&self, record: Option<RawUser>) {
        *lock(&self.record) = record;
    }

    pub fn record(&self) -> Option<RawUser> {
        lock(&self.record).clone()
    }

    pub fn fail(&self, method: &'static str, message: &str) {
        lock(&self.script.failures).insert(method, message.to_string());
    }

    pub fn calls(&self, method: &str) -> usize {
        self.script.count(method)
    }

    /// Make calls to `method` wait until the returned handle is notified.
    pub fn hold(&self, method: &'static str) -> Arc<Notify> {
        self.script.hold(method)
    }

    fn with_record<T>(&self, change: impl FnOnce(&mut RawUser) -> T) -> ActorResult<T> {
        match lock(&self.record).as_mut() {
            Some(record) => Ok(change(record)),
            None => Err(ActorError::Rejected("User not found".into())),
        }
    }
}

#[async_trait]
impl UserService for FakeUserService {
    async fn user_exists(&self) -> ActorResult<bool> {
        self.script.enter("userExists").await?;
        Ok(lock(&self.record).is_some())
    }

    async fn get_current_user(&self) -> ActorResult<RawUser> {
        self.script.enter("getCurrentUser").await?;
        self.with_record(|record| record.clone())
    }

    async fn register_user(
        &self,
        auth_method: AuthMethod,
        profile: &RegistrationProfile,
    ) -> ActorResult<()> {
        self.script.enter("registerUser").await?;
        let mut record = lock(&self.record);
        if record.is_some() {
            return Err(ActorError::Rejected("User already registered".into()));
        }
        *record = Some(RawUser {
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            email: profile.email.clone(),
            phone_number: WireOpt::from(profile.phone.clone()),
            profile_picture: WireOpt::from(profile.profile_picture.clone()),
            role: Value::Null,
            auth_method: variant(auth_method.wire_tag()),
            ..raw_user(None)
        });
        Ok(())
    }

    async fn set_user_role(&self, role: Role, extras: &RoleProfileExtras) -> ActorResult<()> {
        self.script.enter("setUserRole").await?;
        self.with_record(|record| {
            record.role = variant(role.wire_tag());
            record.bio = WireOpt::from(extras.bio.clone());
            record.location = WireOpt::from(extras.location.clone());
            record.company = WireOpt::from(extras.company.clone());
            record.website = WireOpt::from(extras.website.clone());
        })
    }

    async fn update_kyc_status(&self, status: KycStatus) -> ActorResult<()> {
        self.script.enter("updateKYCStatus").await?;
        self.with_record(|record| record.kyc_status = variant(status.wire_tag()))
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ActorResult<()> {
        self.script.enter("updateProfile").await?;
        self.with_record(|record| {
            if let Some(bio) = &update.bio {
                record.bio = WireOpt::some(bio.clone());
            }
            if let Some(location) = &update.location {
                record.location = WireOpt::some(location.clone());
            }
            if let Some(email) = &update.email {
                record.email = email.clone();
            }
        })
    }

    async fn update_profile_picture(&self, picture: &[u8]) -> ActorResult<()> {
        self.script.enter("updateProfilePicture").await?;
        self.with_record(|record| record.profile_picture = WireOpt::some(picture.to_vec()))
    }

    async fn upload_kyc_document(&self, document: &KycDocumentUpload) -> ActorResult<String> {
        self.script.enter("uploadKYCDocument").await?;
        let mut documents = lock(&self.documents);
        let id = format!("doc-{}", documents.len() + 1);
        documents.push(RawDocument {
            id: id.clone(),
            document_type: variant(document.kind.wire_tag()),
            file_name: document.file_name.clone(),
            mime_type: document.mime_type.clone(),
            uploaded_at: NOW_NANOS.into(),
            status: variant("Uploaded"),
        });
        Ok(id)
    }

    async fn submit_kyc_for_review(&self) -> ActorResult<()> {
        self.script.enter("submitKYCForReview").await?;
        self.with_record(|record| {
            record.kyc_status = variant("InReview");
            record.kyc_submitted_at = WireOpt::some(NOW_NANOS.into());
        })
    }

    async fn get_user_documents(&self) -> ActorResult<Vec<RawDocument>> {
        self.script.enter("getUserDocuments").await?;
        Ok(lock(&self.documents).clone())
    }
}

// =============================================================================
// Ledger service
// =============================================================================

pub(crate) struct FakeLedger {
    wallet: Mutex<RawWallet>,
    history: Mutex<Vec<RawTransaction>>,
    script: Script,
}

impl Default for FakeLedger {
    fn default() -> Self {
        Self {
            wallet: Mutex::new(raw_wallet()),
            history: Mutex::new(Vec::new()),
            script: Script::default(),
        }
    }
}

impl FakeLedger {
    pub fn fail(&self, method: &'static str, message: &str) {
        lock(&self.script.failures).insert(method, message.to_string());
    }

    pub fn calls(&self, method: &str) -> usize {
        self.script.count(method)
    }
}

fn balance_mut(wallet: &mut RawWallet, currency: Currency) -> &mut WireNat {
    match currency {
        Currency::Icp => &mut wallet.icp_balance,
        Currency::Usd => &mut wallet.usd_balance,
        Currency::Eur => &mut wallet.eur_balance,
        Currency::Gbp => &mut wallet.gbp_balance,
    }
}

#[async_trait]
impl LedgerService for FakeLedger {
    async fn get_wallet(&self) -> ActorResult<RawWallet> {
        self.script.enter("getWallet").await?;
        Ok(lock(&self.wallet).clone())
    }

    async fn add_funds(&self, amount: u64, currency: Currency) -> ActorResult<()> {
        self.script.enter("addFunds").await?;
        let mut wallet = lock(&self.wallet);
        let balance = balance_mut(&mut wallet, currency);
        *balance = WireNat::Number(balance.value() + amount);
        wallet.total_transactions = WireNat::Number(wallet.total_transactions.value() + 1);
        Ok(())
    }

    async fn transfer(
        &self,
        to: &PrincipalId,
        amount: u64,
        currency: Currency,
        memo: Option<&str>,
    ) -> ActorResult<String> {
        self.script.enter("transfer").await?;
        let mut wallet = lock(&self.wallet);
        let balance = balance_mut(&mut wallet, currency);
        if balance.value() < amount {
            return Err(ActorError::Rejected("Insufficient balance".into()));
        }
        *balance = WireNat::Number(balance.value() - amount);
        wallet.total_transactions = WireNat::Number(wallet.total_transactions.value() + 1);

        let mut history = lock(&self.history);
        let id = format!("tx-{}", history.len() + 1);
        history.push(RawTransaction {
            id: id.clone(),
            from: PRINCIPAL.into(),
            to: to.to_string(),
            amount: amount.into(),
            currency: variant(currency.wire_tag()),
            transaction_type: variant("Transfer"),
            status: variant("Completed"),
            timestamp: NOW_NANOS.into(),
            memo: WireOpt::from(memo.map(str::to_string)),
        });
        Ok(id)
    }

    async fn get_transaction_history(&self) -> ActorResult<Vec<RawTransaction>> {
        self.script.enter("getTransactionHistory").await?;
        Ok(lock(&self.history).clone())
    }
}

// =============================================================================
// Bridge and navigator
// =============================================================================

pub(crate) struct FakeBridge {
    authenticated: AtomicBool,
    login: Mutex<Result<bool, BridgeError>>,
    services_ready: AtomicBool,
    probes: AtomicUsize,
    logouts: AtomicUsize,
    users: Arc<FakeUserService>,
    ledger: Arc<FakeLedger>,
}

impl FakeBridge {
    fn new(users: Arc<FakeUserService>, ledger: Arc<FakeLedger>) -> Self {
        Self {
            authenticated: AtomicBool::new(false),
            login: Mutex::new(Ok(true)),
            services_ready: AtomicBool::new(true),
            probes: AtomicUsize::new(0),
            logouts: AtomicUsize::new(0),
            users,
            ledger,
        }
    }

    pub fn set_authenticated(&self, value: bool) {
        self.authenticated.store(value, Ordering::SeqCst);
    }

    pub fn set_login(&self, result: Result<bool, BridgeError>) {
        *lock(&self.login) = result;
    }

    pub fn set_services_ready(&self, ready: bool) {
        self.services_ready.store(ready, Ordering::SeqCst);
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn logouts(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityBridge for FakeBridge {
    async fn is_authenticated(&self) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.authenticated.load(Ordering::SeqCst)
    }

    async fn authenticate_with(&self, _method: AuthMethod) -> Result<bool, BridgeError> {
        let result = lock(&self.login).clone();
        if let Ok(true) = result {
            self.set_authenticated(true);
        }
        result
    }

    async fn logout(&self) -> Result<(), BridgeError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        self.set_authenticated(false);
        Ok(())
    }

    fn user_service(&self) -> Option<Arc<dyn UserService>> {
        if !self.services_ready.load(Ordering::SeqCst) {
            return None;
        }
        Some(self.users.clone() as Arc<dyn UserService>)
    }

    fn ledger_service(&self) -> Option<Arc<dyn LedgerService>> {
        if !self.services_ready.load(Ordering::SeqCst) {
            return None;
        }
        Some(self.ledger.clone() as Arc<dyn LedgerService>)
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        lock(&self.routes).push(route);
    }
}

/// A store wired to fresh fakes.
pub(crate) struct Harness {
    pub bridge: Arc<FakeBridge>,
    pub users: Arc<FakeUserService>,
    pub ledger: Arc<FakeLedger>,
    pub navigator: Arc<RecordingNavigator>,
    pub store: SessionStore,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SessionConfig {
            actor_retry_delay: Duration::from_millis(1),
            actor_retry_limit: 3,
            ..SessionConfig::default()
        })
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let users = Arc::new(FakeUserService::default());
        let ledger = Arc::new(FakeLedger::default());
        let bridge = Arc::new(FakeBridge::new(users.clone(), ledger.clone()));
        let navigator = Arc::new(RecordingNavigator::default());
        let store = SessionStore::new(bridge.clone(), navigator.clone(), config);
        Self {
            bridge,
            users,
            ledger,
            navigator,
            store,
        }
    }
}
