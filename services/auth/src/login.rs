//! Credential verification and token issuance.

use crate::directory::{burn_digest, CredentialDirectory};
use session_token::{TokenCodec, TokenError, TokenPayload};
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Message shown for a refused login when the reason is not disclosed.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Message shown for an unknown identifier when the reason is disclosed.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// Message shown when a token could not be issued.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal service error";

/// Why a login was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFailure {
    /// No record for the identifier
    UserNotFound,
    /// Record found, secret mismatch
    BadCredentials,
    /// Token could not be encoded
    InternalError,
}

impl LoginFailure {
    /// Caller-facing message.
    ///
    /// Unless `disclose` is set, an unknown identifier and a wrong secret
    /// read the same, so the message cannot be used to enumerate accounts.
    #[must_use]
    pub const fn user_message(&self, disclose: bool) -> &'static str {
        match self {
            Self::UserNotFound if disclose => USER_NOT_FOUND_MESSAGE,
            Self::UserNotFound | Self::BadCredentials => INVALID_CREDENTIALS_MESSAGE,
            Self::InternalError => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Log field value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::BadCredentials => "bad_credentials",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for LoginFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one login attempt.
#[derive(Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials verified; carries the signed token
    Success {
        /// Signed session token
        token: String,
    },
    /// Login refused
    Failure(LoginFailure),
}

impl fmt::Debug for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { .. } => f.write_str("Success { token: <redacted> }"),
            Self::Failure(reason) => f.debug_tuple("Failure").field(reason).finish(),
        }
    }
}

/// Signs payloads into session tokens.
pub trait TokenIssuer: Send + Sync {
    /// Issue a token for `payload`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be signed.
    fn issue(&self, payload: &TokenPayload) -> Result<String, TokenError>;
}

impl TokenIssuer for TokenCodec {
    fn issue(&self, payload: &TokenPayload) -> Result<String, TokenError> {
        self.encode(payload)
    }
}

/// Verifies credentials against the directory and issues tokens.
#[derive(Clone)]
pub struct Authenticator {
    directory: Arc<CredentialDirectory>,
    issuer: Arc<dyn TokenIssuer>,
}

impl Authenticator {
    /// Create an authenticator over an injected directory and issuer.
    pub fn new(directory: Arc<CredentialDirectory>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self { directory, issuer }
    }

    /// Verify `identifier`/`secret` and issue a token on success.
    pub fn login(&self, identifier: &str, secret: &str) -> LoginOutcome {
        let Some(record) = self.directory.find_by_login_identifier(identifier) else {
            burn_digest(secret);
            return self.refuse(identifier, LoginFailure::UserNotFound);
        };

        if !record.verify_secret(secret) {
            return self.refuse(identifier, LoginFailure::BadCredentials);
        }

        match self.issuer.issue(&record.payload()) {
            Ok(token) => {
                info!(identifier, user_id = record.id, "Login succeeded");
                LoginOutcome::Success { token }
            }
            Err(e) => {
                error!(identifier, user_id = record.id, error = %e, "Token encoding failed");
                LoginOutcome::Failure(LoginFailure::InternalError)
            }
        }
    }

    fn refuse(&self, identifier: &str, reason: LoginFailure) -> LoginOutcome {
        warn!(identifier, reason = reason.as_str(), "Login refused");
        LoginOutcome::Failure(reason)
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authenticator")
            .field("directory_len", &self.directory.len())
            .finish_non_exhaustive()
    }
}
