//! Session token claims and the payload they carry.

use serde::{Deserialize, Serialize};

/// The identity projection handed to the browser.
///
/// Carries no secret. This is everything the gateway learns about a user
/// from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Numeric principal identifier
    pub id: i64,
    /// Display name
    pub name: String,
    /// Paying-user entitlement
    pub is_paid: bool,
}

impl TokenPayload {
    /// Create a payload.
    pub fn new(id: i64, name: impl Into<String>, is_paid: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_paid,
        }
    }
}

/// Wire claims of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Issuer
    pub iss: String,
    /// Principal id, decimal
    pub sub: String,
    /// Display name
    pub name: String,
    /// Paying-user entitlement
    pub paid: bool,
    /// Issued at, unix seconds
    pub iat: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

impl SessionClaims {
    pub(crate) fn issue(payload: &TokenPayload, issuer: &str, now: i64, ttl_seconds: i64) -> Self {
        Self {
            iss: issuer.to_string(),
            sub: payload.id.to_string(),
            name: payload.name.clone(),
            paid: payload.is_paid,
            iat: now,
            exp: now.saturating_add(ttl_seconds),
        }
    }

    /// Project the claims back onto a payload. `None` when `sub` is not numeric.
    pub fn payload(&self) -> Option<TokenPayload> {
        let id = self.sub.parse().ok()?;
        Some(TokenPayload {
            id,
            name: self.name.clone(),
            is_paid: self.paid,
        })
    }

    /// Seconds of validity left at `now`, never negative.
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        (self.exp - now).max(0)
    }
}
