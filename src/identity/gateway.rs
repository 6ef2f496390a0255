// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTPS actor gateway client.
//!
//! Implements [`UserService`] and [`LedgerService`] by posting JSON
//! arguments to `{base}/{service}/{method}` and decoding the
//! `{ok: T} | {err: string}` envelope from the response body.
//!
//! ## Usage
//!
//! Build one gateway per delegated identity and hand it out from the
//! [`IdentityBridge`](super::IdentityBridge) for both services.
//!
//! ```rust,ignore
//! let gateway = Arc::new(ActorGateway::new(url)?.with_delegation(token));
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use url::Url;

use super::actor::{ActorError, ActorResult, LedgerService, UserService, WireResult};
use super::roles::Role;
use crate::config::SessionConfig;
use crate::models::{
    AuthMethod, Currency, KycDocumentUpload, KycStatus, PrincipalId, ProfileUpdate,
    RegistrationProfile, RoleProfileExtras,
};
use crate::wire::{variant, RawDocument, RawTransaction, RawUser, RawWallet, WireOpt};

/// Request timeout for gateway calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Path segment of the user/account service.
const USER_SERVICE: &str = "user";

/// Path segment of the ledger/wallet service.
const LEDGER_SERVICE: &str = "ledger";

/// Gateway construction errors.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway URL must use https: {0}")]
    InsecureUrl(String),
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}

/// JSON-over-HTTPS client for the user and ledger services.
#[derive(Clone)]
pub struct ActorGateway {
    /// Base URL, always ending in `/`
    base: Url,
    /// Delegated identity token sent as a bearer credential
    delegation: Option<String>,
    /// HTTP client
    client: reqwest::Client,
}

impl ActorGateway {
    /// Create a gateway client.
    ///
    /// # Arguments
    /// - `base`: gateway root, e.g. `https://gateway.tradehub.example/api/`
    pub fn new(mut base: Url) -> Result<Self, GatewayError> {
        if base.scheme() != "https" && !is_loopback(&base) {
            return Err(GatewayError::InsecureUrl(base.to_string()));
        }

        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Client(e.to_string()))?;

        Ok(Self {
            base,
            delegation: None,
            client,
        })
    }

    /// Gateway for `ACTOR_GATEWAY_URL`, or `None` when it is not configured.
    pub fn from_config(config: &SessionConfig) -> Result<Option<Self>, GatewayError> {
        config.gateway_url.clone().map(Self::new).transpose()
    }

    /// Attach the delegated identity token.
    pub fn with_delegation(mut self, token: impl Into<String>) -> Self {
        self.delegation = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, service: &str, method: &str) -> ActorResult<Url> {
        self.base
            .join(&format!("{service}/{method}"))
            .map_err(|e| ActorError::Transport(format!("Invalid endpoint {service}/{method}: {e}")))
    }

    async fn post<A, T>(&self, service: &str, method: &str, args: &A) -> ActorResult<T>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(service, method)?;

        let mut request = self.client.post(url).json(args);
        if let Some(token) = &self.delegation {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ActorError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ActorError::Transport(format!(
                "HTTP {} from {service}/{method}",
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ActorError::Transport(e.to_string()))
    }

    /// Call a method answering with the `{ok}|{err}` envelope.
    async fn update<A, T>(&self, service: &str, method: &str, args: &A) -> ActorResult<T>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post::<A, WireResult<T>>(service, method, args)
            .await?
            .into_result()
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"))
}

#[async_trait]
impl UserService for ActorGateway {
    async fn user_exists(&self) -> ActorResult<bool> {
        self.post(USER_SERVICE, "userExists", &json!({})).await
    }

    async fn get_current_user(&self) -> ActorResult<RawUser> {
        self.update(USER_SERVICE, "getCurrentUser", &json!({})).await
    }

    async fn register_user(
        &self,
        auth_method: AuthMethod,
        profile: &RegistrationProfile,
    ) -> ActorResult<()> {
        let args = json!({
            "authMethod": variant(auth_method.wire_tag()),
            "firstName": profile.first_name,
            "lastName": profile.last_name,
            "email": profile.email,
            "phoneNumber": WireOpt::from(profile.phone.clone()),
            "profilePicture": WireOpt::from(profile.profile_picture.clone()),
        });
        self.update(USER_SERVICE, "registerUser", &args).await
    }

    async fn set_user_role(&self, role: Role, extras: &RoleProfileExtras) -> ActorResult<()> {
        let args = json!({
            "role": variant(role.wire_tag()),
            "bio": WireOpt::from(extras.bio.clone()),
            "location": WireOpt::from(extras.location.clone()),
            "company": WireOpt::from(extras.company.clone()),
            "website": WireOpt::from(extras.website.clone()),
        });
        self.update(USER_SERVICE, "setUserRole", &args).await
    }

    async fn update_kyc_status(&self, status: KycStatus) -> ActorResult<()> {
        let args = json!({ "status": variant(status.wire_tag()) });
        self.update(USER_SERVICE, "updateKYCStatus", &args).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ActorResult<()> {
        let args = json!({
            "firstName": WireOpt::from(update.first_name.clone()),
            "lastName": WireOpt::from(update.last_name.clone()),
            "email": WireOpt::from(update.email.clone()),
            "phoneNumber": WireOpt::from(update.phone.clone()),
            "bio": WireOpt::from(update.bio.clone()),
            "location": WireOpt::from(update.location.clone()),
            "company": WireOpt::from(update.company.clone()),
            "website": WireOpt::from(update.website.clone()),
        });
        self.update(USER_SERVICE, "updateProfile", &args).await
    }

    async fn update_profile_picture(&self, picture: &[u8]) -> ActorResult<()> {
        let args = json!({ "picture": picture });
        self.update(USER_SERVICE, "updateProfilePicture", &args).await
    }

    async fn upload_kyc_document(&self, document: &KycDocumentUpload) -> ActorResult<String> {
        let args = json!({
            "documentType": variant(document.kind.wire_tag()),
            "fileName": document.file_name,
            "content": document.content,
            "mimeType": document.mime_type,
        });
        self.update(USER_SERVICE, "uploadKYCDocument", &args).await
    }

    async fn submit_kyc_for_review(&self) -> ActorResult<()> {
        self.update(USER_SERVICE, "submitKYCForReview", &json!({})).await
    }

    async fn get_user_documents(&self) -> ActorResult<Vec<RawDocument>> {
        self.post(USER_SERVICE, "getUserDocuments", &json!({})).await
    }
}

#[async_trait]
impl LedgerService for ActorGateway {
    async fn get_wallet(&self) -> ActorResult<RawWallet> {
        self.update(LEDGER_SERVICE, "getWallet", &json!({})).await
    }

    async fn add_funds(&self, amount: u64, currency: Currency) -> ActorResult<()> {
        let args = json!({
            "amount": amount,
            "currency": variant(currency.wire_tag()),
        });
        self.update(LEDGER_SERVICE, "addFunds", &args).await
    }

    async fn transfer(
        &self,
        to: &PrincipalId,
        amount: u64,
        currency: Currency,
        memo: Option<&str>,
    ) -> ActorResult<String> {
        let args = json!({
            "to": to.as_str(),
            "amount": amount,
            "currency": variant(currency.wire_tag()),
            "memo": WireOpt::from(memo),
        });
        self.update(LEDGER_SERVICE, "transfer", &args).await
    }

    async fn get_transaction_history(&self) -> ActorResult<Vec<RawTransaction>> {
        self.post(LEDGER_SERVICE, "getTransactionHistory", &json!({})).await
    }
}
