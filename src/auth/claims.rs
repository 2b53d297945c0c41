// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credentials and unverified claim decoding.
//!
//! The portal never verifies signatures: the claims read here only decide
//! what to render. Every resource call is authorized again by the API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AuthError, Role};

/// Single-valued role claim.
pub const ROLE_CLAIM: &str = "role";

/// Ordered role list claim; the first element is authoritative.
pub const ROLES_CLAIM: &str = "roles";

/// Role claim type emitted by ASP.NET Core identity.
pub const DOTNET_ROLE_CLAIM: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/role";

/// Subject claims in order of precedence.
const SUBJECT_CLAIMS: [&str; 4] = ["sub", "unique_name", "name", "username"];

/// Opaque bearer credential issued by the authentication service.
///
/// Never mutated: replaced wholesale on sign-in and dropped on sign-out.
/// `Debug` is redacted so the token cannot end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a token string, rejecting empty or blank input.
    pub fn new(token: impl Into<String>) -> Result<Self, AuthError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(AuthError::MalformedCredential);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }

    /// Decode the payload claims (no signature check).
    pub fn claims(&self) -> Result<ClaimSet, AuthError> {
        ClaimSet::decode(&self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(<redacted, {} bytes>)", self.0.len())
    }
}

/// Claims read from a credential payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClaimSet {
    claims: Map<String, Value>,
}

impl ClaimSet {
    /// Decode a JWT payload without verifying its signature.
    pub fn decode(token: &str) -> Result<Self, AuthError> {
        let data = jsonwebtoken::dangerous::insecure_decode::<Map<String, Value>>(token)
            .map_err(|_e| AuthError::MalformedCredential)?;
        Ok(Self {
            claims: data.claims,
        })
    }

    pub fn from_map(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    /// Raw claim value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Normalized role, see [`normalize_role`].
    pub fn role(&self) -> Option<Role> {
        normalize_role(&self.claims)
    }

    /// Identity of the holder (`sub`, then `unique_name`, `name`, `username`).
    pub fn subject(&self) -> Option<&str> {
        SUBJECT_CLAIMS
            .iter()
            .filter_map(|name| self.claims.get(*name))
            .filter_map(Value::as_str)
            .find(|s| !s.trim().is_empty())
    }

    /// Expiry from `exp`, for display only.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let exp = self.claims.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }
}

/// Extract the role from a claim mapping.
///
/// Precedence is fixed: `role` (a string, or the first element if the issuer
/// emitted an array), then the first element of `roles`, then the ASP.NET
/// role claim type. Blank values are skipped.
pub fn normalize_role(claims: &Map<String, Value>) -> Option<Role> {
    [ROLE_CLAIM, ROLES_CLAIM, DOTNET_ROLE_CLAIM]
        .iter()
        .filter_map(|name| claims.get(*name))
        .find_map(first_role_value)
        .map(Role::parse)
}

fn first_role_value(value: &Value) -> Option<&str> {
    let name = match value {
        Value::String(s) => s.as_str(),
        Value::Array(items) => items.first()?.as_str()?,
        _ => return None,
    };
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}
