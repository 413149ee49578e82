use thiserror::Error;

/// Token codec errors.
///
/// Decode failures are deliberately a single opaque variant: callers cannot
/// tell a bad signature from an expired or garbled token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The token did not verify, did not parse, or has expired
    #[error("Invalid session token")]
    InvalidToken,

    /// The signing key is shorter than the required minimum
    #[error("Signing key must be at least {min} bytes, got {actual}")]
    WeakKey {
        /// Required minimum length
        min: usize,
        /// Supplied length
        actual: usize,
    },

    /// The token lifetime is not positive
    #[error("Token lifetime must be positive")]
    InvalidTtl,

    /// Signing failed
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}
