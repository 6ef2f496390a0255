// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Remote service interfaces consumed by the session store.
//!
//! Two services sit behind the identity bridge: the user service (profiles,
//! roles, KYC) and the ledger service (wallet, funds, transfers). Both
//! answer with the `{ok: T} | {err: string}` envelope, decoded into
//! [`ActorResult`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::roles::Role;
use crate::models::{
    AuthMethod, Currency, KycDocumentUpload, KycStatus, PrincipalId, ProfileUpdate,
    RegistrationProfile, RoleProfileExtras,
};
use crate::wire::{RawDocument, RawTransaction, RawUser, RawWallet};

/// Failure of a remote call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorError {
    /// The `{err: ...}` arm: a business rule said no.
    #[error("{0}")]
    Rejected(String),
    /// The call never produced a decodable envelope.
    #[error("transport failure: {0}")]
    Transport(String),
}

pub type ActorResult<T> = Result<T, ActorError>;

/// The `{ok: T} | {err: string}` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireResult<T> {
    Ok(T),
    Err(String),
}

impl<T> WireResult<T> {
    pub fn into_result(self) -> ActorResult<T> {
        match self {
            WireResult::Ok(value) => Ok(value),
            WireResult::Err(message) => Err(ActorError::Rejected(message)),
        }
    }
}

/// User/account service.
#[async_trait]
pub trait UserService: Send + Sync {
    async fn user_exists(&self) -> ActorResult<bool>;

    async fn get_current_user(&self) -> ActorResult<RawUser>;

    async fn register_user(
        &self,
        auth_method: AuthMethod,
        profile: &RegistrationProfile,
    ) -> ActorResult<()>;

    async fn set_user_role(&self, role: Role, extras: &RoleProfileExtras) -> ActorResult<()>;

    async fn update_kyc_status(&self, status: KycStatus) -> ActorResult<()>;

    async fn update_profile(&self, update: &ProfileUpdate) -> ActorResult<()>;

    async fn update_profile_picture(&self, picture: &[u8]) -> ActorResult<()>;

    /// Returns the stored document id.
    async fn upload_kyc_document(&self, document: &KycDocumentUpload) -> ActorResult<String>;

    async fn submit_kyc_for_review(&self) -> ActorResult<()>;

    async fn get_user_documents(&self) -> ActorResult<Vec<RawDocument>>;
}

/// Ledger/wallet service.
#[async_trait]
pub trait LedgerService: Send + Sync {
    async fn get_wallet(&self) -> ActorResult<RawWallet>;

    async fn add_funds(&self, amount: u64, currency: Currency) -> ActorResult<()>;

    /// Returns the ledger transaction id.
    async fn transfer(
        &self,
        to: &PrincipalId,
        amount: u64,
        currency: Currency,
        memo: Option<&str>,
    ) -> ActorResult<String>;

    async fn get_transaction_history(&self) -> ActorResult<Vec<RawTransaction>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_ok_arm_decodes() {
        let envelope: WireResult<String> = serde_json::from_value(json!({"ok": "doc-7"})).unwrap();
        assert_eq!(envelope.into_result(), Ok("doc-7".to_string()));

        let unit: WireResult<()> = serde_json::from_value(json!({"ok": null})).unwrap();
        assert_eq!(unit.into_result(), Ok(()));
    }

    #[test]
    fn envelope_err_arm_is_rejection() {
        let envelope: WireResult<()> =
            serde_json::from_value(json!({"err": "Insufficient balance"})).unwrap();
        assert_eq!(
            envelope.into_result(),
            Err(ActorError::Rejected("Insufficient balance".into()))
        );
    }
}
