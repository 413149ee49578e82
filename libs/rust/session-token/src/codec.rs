//! HS256 encode/decode of session tokens.

use crate::claims::{SessionClaims, TokenPayload};
use crate::error::TokenError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Issuer claim stamped on every session token.
pub const ISSUER: &str = "cinema-auth";

/// Minimum signing key length in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Default validity window of a session token.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Signs and verifies session tokens with one process-wide key.
///
/// Construct once at startup and share behind an `Arc`; the codec holds no
/// mutable state.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec from the shared signing key.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::WeakKey`] when the key is shorter than
    /// [`MIN_KEY_LEN`] and [`TokenError::InvalidTtl`] for a zero lifetime.
    pub fn new(key: &SecretString, ttl: Duration) -> Result<Self, TokenError> {
        let secret = key.expose_secret().as_bytes();
        if secret.len() < MIN_KEY_LEN {
            return Err(TokenError::WeakKey {
                min: MIN_KEY_LEN,
                actual: secret.len(),
            });
        }
        if ttl.as_secs() == 0 {
            return Err(TokenError::InvalidTtl);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        })
    }

    /// Lifetime given to newly encoded tokens.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Encode a payload into a signed token valid from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn encode(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        self.encode_at(payload, chrono::Utc::now().timestamp())
    }

    /// Encode a payload as if issued at unix time `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] if signing fails.
    pub fn encode_at(&self, payload: &TokenPayload, issued_at: i64) -> Result<String, TokenError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = SessionClaims::issue(payload, ISSUER, issued_at, ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify a token and return its payload.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] for any token that does not
    /// verify, cannot be parsed, or has expired.
    pub fn decode(&self, token: &str) -> Result<TokenPayload, TokenError> {
        self.decode_claims(token)?
            .payload()
            .ok_or(TokenError::InvalidToken)
    }

    /// Verify a token and return its full claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] on any verification failure.
    pub fn decode_claims(&self, token: &str) -> Result<SessionClaims, TokenError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(reason = ?e.kind(), "Session token rejected");
                TokenError::InvalidToken
            })
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &"HS256")
            .field("issuer", &ISSUER)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
