// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Marketplace trading roles.

use serde::{Deserialize, Serialize};

use crate::models::normalize_tag;

/// Trading role chosen once, after registration.
///
/// ## Roles
///
/// - `Buyer` - Browses listings, places orders, funds purchases
/// - `Seller` - Lists commodities, fulfils orders, receives payouts
///
/// There is no role-switch operation; a user without a role is still in
/// onboarding and is represented as `Option<Role>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Purchases commodities
    Buyer,
    /// Lists and sells commodities
    Seller,
}

impl Role {
    /// Parse role from a wire tag (case-insensitive).
    pub fn from_str(s: &str) -> Option<Role> {
        match normalize_tag(s).as_str() {
            "buyer" => Some(Role::Buyer),
            "seller" => Some(Role::Seller),
            _ => None,
        }
    }

    /// Variant name as the backend spells it.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Buyer => write!(f, "buyer"),
            Role::Seller => write!(f, "seller"),
        }
    }
}
