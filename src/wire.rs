// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wire Adapter
//!
//! Records as the user and ledger services send them, and total
//! conversions into the flat [`models`](crate::models) the session holds.
//!
//! ## Wire conventions
//!
//! - Optional values arrive wrapped as `[]` (absent) or `[value]` (present).
//! - Variants arrive either as a bare tag (`"seller"`) or as a single-key
//!   object (`{"seller": null}`), possibly inside the optional wrapper.
//! - Timestamps are integer nanoseconds since the Unix epoch.
//! - Natural numbers may arrive as JSON numbers or as decimal strings.
//!
//! Nothing in this module fails: unknown variants fall back to a default
//! and are logged, malformed numbers read as zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::identity::Role;
use crate::models::{
    AuthMethod, Currency, DocumentKind, DocumentStatus, KycDocument, KycStatus, PrincipalId,
    Transaction, TransactionKind, TransactionStatus, User, Wallet,
};

/// Nanoseconds per millisecond.
const NANOS_PER_MILLI: i64 = 1_000_000;

// =============================================================================
// Wire Primitives
// =============================================================================

/// Present/absent wrapper: `[]` or `[value]` on the wire.
///
/// `null` and a missing field are accepted as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireOpt<T>(pub Option<T>);

impl<T> WireOpt<T> {
    pub fn some(value: T) -> Self {
        WireOpt(Some(value))
    }

    pub fn none() -> Self {
        WireOpt(None)
    }

    pub fn into_option(self) -> Option<T> {
        self.0
    }
}

impl<T> Default for WireOpt<T> {
    fn default() -> Self {
        WireOpt(None)
    }
}

impl<T> From<Option<T>> for WireOpt<T> {
    fn from(value: Option<T>) -> Self {
        WireOpt(value)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for WireOpt<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(WireOpt(items.into_iter().next()))
    }
}

impl<T: Serialize> Serialize for WireOpt<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let items: Vec<&T> = self.0.iter().collect();
        items.serialize(serializer)
    }
}

/// Unsigned integer sent as a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireNat {
    Number(u64),
    Text(String),
}

impl WireNat {
    /// Numeric value; values that do not fit saturate, garbage reads as zero.
    pub fn value(&self) -> u64 {
        match self {
            WireNat::Number(n) => *n,
            WireNat::Text(text) => {
                let text = text.trim().replace('_', "");
                match text.parse::<u128>() {
                    Ok(n) => u64::try_from(n).unwrap_or(u64::MAX),
                    Err(_) => {
                        warn!(value = %text, "Unreadable natural number on the wire");
                        0
                    }
                }
            }
        }
    }
}

impl Default for WireNat {
    fn default() -> Self {
        WireNat::Number(0)
    }
}

impl From<u64> for WireNat {
    fn from(value: u64) -> Self {
        WireNat::Number(value)
    }
}

/// Signed integer sent as a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireInt {
    Number(i64),
    Text(String),
}

impl WireInt {
    pub fn value(&self) -> i64 {
        match self {
            WireInt::Number(n) => *n,
            WireInt::Text(text) => {
                let text = text.trim().replace('_', "");
                match text.parse::<i128>() {
                    Ok(n) => i64::try_from(n).unwrap_or(if n < 0 { i64::MIN } else { i64::MAX }),
                    Err(_) => {
                        warn!(value = %text, "Unreadable integer on the wire");
                        0
                    }
                }
            }
        }
    }
}

impl Default for WireInt {
    fn default() -> Self {
        WireInt::Number(0)
    }
}

impl From<i64> for WireInt {
    fn from(value: i64) -> Self {
        WireInt::Number(value)
    }
}

/// Build a variant in the single-key object form, `{"tag": null}`.
pub fn variant(tag: &str) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(tag.to_string(), Value::Null);
    Value::Object(map)
}

/// Tag of a variant in any accepted wire form.
///
/// Returns `None` for absent values, empty strings, empty optional
/// wrappers and objects that do not have exactly one key.
pub fn variant_tag(raw: &Value) -> Option<&str> {
    match raw {
        Value::String(tag) if !tag.trim().is_empty() => Some(tag.as_str()),
        Value::Array(items) => items.first().and_then(variant_tag),
        Value::Object(map) if map.len() == 1 => map.keys().next().map(String::as_str),
        _ => None,
    }
}

/// Convert integer nanoseconds since the epoch to a UTC date.
pub fn nanos_to_datetime(nanos: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(nanos / NANOS_PER_MILLI).unwrap_or(DateTime::UNIX_EPOCH)
}

// =============================================================================
// Raw Records
// =============================================================================

/// User profile as returned by `getCurrentUser`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: WireOpt<String>,
    #[serde(default)]
    pub profile_picture: WireOpt<Vec<u8>>,
    #[serde(default)]
    pub role: Value,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub auth_method: Value,
    #[serde(default)]
    pub created_at: WireInt,
    #[serde(default)]
    pub kyc_status: Value,
    #[serde(default)]
    pub kyc_submitted_at: WireOpt<WireInt>,
    #[serde(default)]
    pub last_active: WireInt,
    #[serde(default)]
    pub bio: WireOpt<String>,
    #[serde(default)]
    pub location: WireOpt<String>,
    #[serde(default)]
    pub company: WireOpt<String>,
    #[serde(default)]
    pub website: WireOpt<String>,
}

/// Wallet record as returned by `getWallet`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawWallet {
    pub owner: String,
    #[serde(default)]
    pub icp_balance: WireNat,
    #[serde(default)]
    pub usd_balance: WireNat,
    #[serde(default)]
    pub eur_balance: WireNat,
    #[serde(default)]
    pub gbp_balance: WireNat,
    #[serde(default)]
    pub created_at: WireInt,
    #[serde(default)]
    pub last_transaction_at: WireInt,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default)]
    pub total_transactions: WireNat,
}

/// KYC document metadata as returned by `getUserDocuments`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    pub id: String,
    #[serde(default)]
    pub document_type: Value,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub uploaded_at: WireInt,
    #[serde(default)]
    pub status: Value,
}

/// Ledger entry as returned by `getTransactionHistory`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub amount: WireNat,
    #[serde(default)]
    pub currency: Value,
    #[serde(default)]
    pub transaction_type: Value,
    #[serde(default)]
    pub status: Value,
    #[serde(default)]
    pub timestamp: WireInt,
    #[serde(default)]
    pub memo: WireOpt<String>,
}

// =============================================================================
// Adapters
// =============================================================================

/// Extract the trading role from its wire form.
///
/// `None` means no role has been chosen yet; unrecognized shapes are
/// treated the same way.
pub fn extract_role(raw: &Value) -> Option<Role> {
    variant_tag(raw).and_then(Role::from_str)
}

fn tag_or<T: Copy>(
    raw: &Value,
    field: &'static str,
    parse: fn(&str) -> Option<T>,
    fallback: T,
) -> T {
    match variant_tag(raw) {
        Some(tag) => parse(tag).unwrap_or_else(|| {
            warn!(field, tag, "Unknown variant on the wire, using default");
            fallback
        }),
        None => fallback,
    }
}

/// Flatten a wire user record.
pub fn to_user(raw: RawUser) -> User {
    let role = extract_role(&raw.role);
    let auth_method = tag_or(
        &raw.auth_method,
        "authMethod",
        AuthMethod::from_tag,
        AuthMethod::default(),
    );
    let kyc_status = tag_or(
        &raw.kyc_status,
        "kycStatus",
        KycStatus::from_tag,
        KycStatus::default(),
    );

    User {
        principal: PrincipalId::canonical(&raw.id),
        first_name: raw.first_name,
        last_name: raw.last_name,
        email: raw.email,
        phone: raw.phone_number.into_option(),
        profile_picture: raw.profile_picture.into_option(),
        role,
        verified: raw.is_verified,
        wallet_address: raw.wallet_address,
        auth_method,
        joined_at: nanos_to_datetime(raw.created_at.value()),
        kyc_status,
        kyc_submitted_at: raw
            .kyc_submitted_at
            .into_option()
            .map(|at| nanos_to_datetime(at.value())),
        last_active: nanos_to_datetime(raw.last_active.value()),
        bio: raw.bio.into_option(),
        location: raw.location.into_option(),
        company: raw.company.into_option(),
        website: raw.website.into_option(),
    }
}

/// Flatten a wire wallet record.
pub fn to_wallet(raw: RawWallet) -> Wallet {
    Wallet {
        owner: PrincipalId::canonical(&raw.owner),
        icp_balance: raw.icp_balance.value(),
        usd_balance: raw.usd_balance.value(),
        eur_balance: raw.eur_balance.value(),
        gbp_balance: raw.gbp_balance.value(),
        created_at: nanos_to_datetime(raw.created_at.value()),
        last_transaction_at: nanos_to_datetime(raw.last_transaction_at.value()),
        is_locked: raw.is_locked,
        transaction_count: raw.total_transactions.value(),
    }
}

/// Flatten a wire document record.
pub fn to_document(raw: RawDocument) -> KycDocument {
    KycDocument {
        id: raw.id,
        kind: tag_or(
            &raw.document_type,
            "documentType",
            DocumentKind::from_tag,
            DocumentKind::Other,
        ),
        file_name: raw.file_name,
        mime_type: raw.mime_type,
        uploaded_at: nanos_to_datetime(raw.uploaded_at.value()),
        status: tag_or(
            &raw.status,
            "status",
            DocumentStatus::from_tag,
            DocumentStatus::default(),
        ),
    }
}

/// Flatten a wire ledger entry.
pub fn to_transaction(raw: RawTransaction) -> Transaction {
    let currency = variant_tag(&raw.currency).and_then(|tag| {
        let parsed = Currency::from_tag(tag);
        if parsed.is_none() {
            warn!(tag, "Unknown currency on the wire");
        }
        parsed
    });

    Transaction {
        id: raw.id,
        from: PrincipalId::canonical(&raw.from),
        to: PrincipalId::canonical(&raw.to),
        amount: raw.amount.value(),
        currency,
        kind: tag_or(
            &raw.transaction_type,
            "transactionType",
            TransactionKind::from_tag,
            TransactionKind::Transfer,
        ),
        status: tag_or(
            &raw.status,
            "status",
            TransactionStatus::from_tag,
            TransactionStatus::default(),
        ),
        timestamp: nanos_to_datetime(raw.timestamp.value()),
        memo: raw.memo.into_option(),
    }
}
