// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Session Data Models
//!
//! Flat, frontend-facing records produced by the [wire adapter](crate::wire)
//! and held by the [session store](crate::session). All types derive
//! `Serialize` and `Deserialize` so views can hand them to templates as-is.
//!
//! ## Model Categories
//!
//! - **Identity**: [`PrincipalId`], [`AuthMethod`]
//! - **Profile**: [`User`], [`KycStatus`]
//! - **Ledger**: [`Wallet`], [`Currency`], [`Transaction`]
//! - **Compliance**: [`KycDocument`]
//! - **Requests**: inputs to session mutations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Role;

// =============================================================================
// Principal Type
// =============================================================================

/// Stable identifier of an authenticated identity, in canonical text form.
///
/// # Example
///
/// ```rust,ignore
/// let owner = PrincipalId::from("rrkah-fqaaa-aaaaa-aaaaq-cai");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrincipalId(pub String);

impl PrincipalId {
    /// Canonical text form (trimmed, lowercase).
    pub fn canonical(raw: &str) -> Self {
        PrincipalId(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        PrincipalId(value)
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        PrincipalId(value.to_string())
    }
}

impl From<PrincipalId> for String {
    fn from(value: PrincipalId) -> Self {
        value.0
    }
}

// =============================================================================
// Tagged Unions
// =============================================================================

/// Lowercase a wire tag and drop separators, so `InReview`, `in_review`
/// and `in-review` all compare equal.
pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Delegated identity provider used to sign in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    #[default]
    Nfid,
    InternetIdentity,
}

impl AuthMethod {
    pub fn from_tag(tag: &str) -> Option<AuthMethod> {
        match normalize_tag(tag).as_str() {
            "nfid" => Some(AuthMethod::Nfid),
            "internetidentity" | "ii" => Some(AuthMethod::InternetIdentity),
            _ => None,
        }
    }

    /// Variant name as the backend spells it.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            AuthMethod::Nfid => "NFID",
            AuthMethod::InternetIdentity => "InternetIdentity",
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMethod::Nfid => write!(f, "nfid"),
            AuthMethod::InternetIdentity => write!(f, "internet-identity"),
        }
    }
}

/// Know-Your-Customer verification state.
///
/// ## Transitions
///
/// `Pending → InReview → (Completed | Rejected)`, and `Rejected → InReview`
/// for a resubmission. Staying in the same state is always allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum KycStatus {
    #[default]
    Pending,
    InReview,
    Completed,
    Rejected,
}

impl KycStatus {
    pub fn from_tag(tag: &str) -> Option<KycStatus> {
        match normalize_tag(tag).as_str() {
            "pending" => Some(KycStatus::Pending),
            "inreview" => Some(KycStatus::InReview),
            "completed" | "approved" | "verified" => Some(KycStatus::Completed),
            "rejected" => Some(KycStatus::Rejected),
            _ => None,
        }
    }

    pub fn wire_tag(&self) -> &'static str {
        match self {
            KycStatus::Pending => "Pending",
            KycStatus::InReview => "InReview",
            KycStatus::Completed => "Completed",
            KycStatus::Rejected => "Rejected",
        }
    }

    /// Whether `next` is reachable from `self` under normal operation.
    pub fn can_advance_to(&self, next: KycStatus) -> bool {
        use KycStatus::*;
        matches!(
            (self, next),
            (Pending, Pending | InReview)
                | (InReview, InReview | Completed | Rejected)
                | (Completed, Completed)
                | (Rejected, Rejected | InReview)
        )
    }

    /// Whether trading is unlocked.
    pub fn is_verified(&self) -> bool {
        *self == KycStatus::Completed
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KycStatus::Pending => write!(f, "pending"),
            KycStatus::InReview => write!(f, "inReview"),
            KycStatus::Completed => write!(f, "completed"),
            KycStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Wallet currencies: the primary ledger token plus fiat shadow balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Icp,
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub fn from_tag(tag: &str) -> Option<Currency> {
        match normalize_tag(tag).as_str() {
            "icp" => Some(Currency::Icp),
            "usd" => Some(Currency::Usd),
            "eur" => Some(Currency::Eur),
            "gbp" => Some(Currency::Gbp),
            _ => None,
        }
    }

    pub fn wire_tag(&self) -> &'static str {
        match self {
            Currency::Icp => "ICP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_tag())
    }
}

/// Kind of an uploaded KYC document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    Identity,
    ProofOfAddress,
    BusinessRegistration,
    Other,
}

impl DocumentKind {
    pub fn from_tag(tag: &str) -> Option<DocumentKind> {
        match normalize_tag(tag).as_str() {
            "identity" | "nationalid" | "passport" | "driverslicense" => {
                Some(DocumentKind::Identity)
            }
            "proofofaddress" | "utilitybill" => Some(DocumentKind::ProofOfAddress),
            "businessregistration" => Some(DocumentKind::BusinessRegistration),
            "other" => Some(DocumentKind::Other),
            _ => None,
        }
    }

    pub fn wire_tag(&self) -> &'static str {
        match self {
            DocumentKind::Identity => "Identity",
            DocumentKind::ProofOfAddress => "ProofOfAddress",
            DocumentKind::BusinessRegistration => "BusinessRegistration",
            DocumentKind::Other => "Other",
        }
    }
}

/// Review state of a single KYC document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Uploaded,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn from_tag(tag: &str) -> Option<DocumentStatus> {
        match normalize_tag(tag).as_str() {
            "uploaded" | "pending" => Some(DocumentStatus::Uploaded),
            "approved" | "verified" => Some(DocumentStatus::Approved),
            "rejected" => Some(DocumentStatus::Rejected),
            _ => None,
        }
    }
}

/// Ledger transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
    Payment,
}

impl TransactionKind {
    pub fn from_tag(tag: &str) -> Option<TransactionKind> {
        match normalize_tag(tag).as_str() {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" => Some(TransactionKind::Withdrawal),
            "transfer" => Some(TransactionKind::Transfer),
            "payment" => Some(TransactionKind::Payment),
            _ => None,
        }
    }
}

/// Ledger transaction settlement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn from_tag(tag: &str) -> Option<TransactionStatus> {
        match normalize_tag(tag).as_str() {
            "pending" => Some(TransactionStatus::Pending),
            "completed" | "success" => Some(TransactionStatus::Completed),
            "failed" => Some(TransactionStatus::Failed),
            _ => None,
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// The authenticated principal's profile and trading eligibility.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub principal: PrincipalId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<Vec<u8>>,
    /// `None` until role selection completes.
    pub role: Option<Role>,
    pub verified: bool,
    pub wallet_address: String,
    pub auth_method: AuthMethod,
    pub joined_at: DateTime<Utc>,
    pub kyc_status: KycStatus,
    pub kyc_submitted_at: Option<DateTime<Utc>>,
    pub last_active: DateTime<Utc>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Apply a partial profile update in place.
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(first_name) = &update.first_name {
            self.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = last_name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(bio) = &update.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(location) = &update.location {
            self.location = Some(location.clone());
        }
        if let Some(company) = &update.company {
            self.company = Some(company.clone());
        }
        if let Some(website) = &update.website {
            self.website = Some(website.clone());
        }
    }
}

// =============================================================================
// Ledger
// =============================================================================

/// The principal's custodial balance record. A cache of the ledger service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub owner: PrincipalId,
    pub icp_balance: u64,
    pub usd_balance: u64,
    pub eur_balance: u64,
    pub gbp_balance: u64,
    pub created_at: DateTime<Utc>,
    pub last_transaction_at: DateTime<Utc>,
    pub is_locked: bool,
    pub transaction_count: u64,
}

impl Wallet {
    pub fn balance(&self, currency: Currency) -> u64 {
        match currency {
            Currency::Icp => self.icp_balance,
            Currency::Usd => self.usd_balance,
            Currency::Eur => self.eur_balance,
            Currency::Gbp => self.gbp_balance,
        }
    }
}

/// One entry of the ledger transaction history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub from: PrincipalId,
    pub to: PrincipalId,
    pub amount: u64,
    /// `None` when the ledger reported a currency this build does not know.
    pub currency: Option<Currency>,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub timestamp: DateTime<Utc>,
    pub memo: Option<String>,
}

// =============================================================================
// Compliance
// =============================================================================

/// Metadata of an uploaded KYC document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct KycDocument {
    pub id: String,
    pub kind: DocumentKind,
    pub file_name: String,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub status: DocumentStatus,
}

// =============================================================================
// Requests
// =============================================================================

/// First-time profile data submitted at registration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub profile_picture: Option<Vec<u8>>,
}

/// Optional profile fields submitted along with role selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoleProfileExtras {
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
}

/// Partial profile update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
}

/// A KYC document to upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycDocumentUpload {
    pub kind: DocumentKind,
    pub file_name: String,
    pub content: Vec<u8>,
    pub mime_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_from_and_into_string() {
        let from_str: PrincipalId = "abc".into();
        assert_eq!(from_str.0, "abc");

        let to_string: String = PrincipalId("ghi".into()).into();
        assert_eq!(to_string, "ghi");

        assert_eq!(PrincipalId::canonical("  AbC-Def ").as_str(), "abc-def");
    }

    #[test]
    fn tags_parse_regardless_of_case_and_separators() {
        assert_eq!(AuthMethod::from_tag("NFID"), Some(AuthMethod::Nfid));
        assert_eq!(
            AuthMethod::from_tag("InternetIdentity"),
            Some(AuthMethod::InternetIdentity)
        );
        assert_eq!(
            AuthMethod::from_tag("internet-identity"),
            Some(AuthMethod::InternetIdentity)
        );
        assert_eq!(KycStatus::from_tag("in_review"), Some(KycStatus::InReview));
        assert_eq!(KycStatus::from_tag("InReview"), Some(KycStatus::InReview));
        assert_eq!(Currency::from_tag("usd"), Some(Currency::Usd));
        assert_eq!(Currency::from_tag("doge"), None);
    }

    #[test]
    fn kyc_moves_forward_only() {
        assert!(KycStatus::Pending.can_advance_to(KycStatus::InReview));
        assert!(KycStatus::InReview.can_advance_to(KycStatus::Completed));
        assert!(KycStatus::InReview.can_advance_to(KycStatus::Rejected));
        assert!(KycStatus::Rejected.can_advance_to(KycStatus::InReview));
        assert!(!KycStatus::Pending.can_advance_to(KycStatus::Completed));
        assert!(!KycStatus::Completed.can_advance_to(KycStatus::Pending));
        assert!(!KycStatus::Completed.can_advance_to(KycStatus::InReview));
    }

    #[test]
    fn serde_names_match_frontend_shapes() {
        assert_eq!(
            serde_json::to_string(&KycStatus::InReview).unwrap(),
            r#""inReview""#
        );
        assert_eq!(
            serde_json::to_string(&AuthMethod::InternetIdentity).unwrap(),
            r#""internet-identity""#
        );
        assert_eq!(serde_json::to_string(&Currency::Gbp).unwrap(), r#""GBP""#);
    }

    #[test]
    fn profile_update_only_touches_set_fields() {
        let mut user = crate::session::testing::sample_user(Some(Role::Buyer));
        let original_email = user.email.clone();

        user.apply(&ProfileUpdate {
            bio: Some("Cocoa trader".into()),
            company: Some("Ashanti Beans".into()),
            ..Default::default()
        });

        assert_eq!(user.bio.as_deref(), Some("Cocoa trader"));
        assert_eq!(user.company.as_deref(), Some("Ashanti Beans"));
        assert_eq!(user.email, original_email);
        assert!(user.location.is_none());
    }
}
