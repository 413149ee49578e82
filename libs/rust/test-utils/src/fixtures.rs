//! Test fixtures with sample data.

use secrecy::SecretString;
use session_token::{TokenCodec, TokenPayload, DEFAULT_TTL};

/// Signing key shared by tests that need the auth service and gateway to agree.
pub const TEST_SIGNING_KEY: &str = "test-signing-key-for-session-tokens-0123456789";

/// A different key, for foreign-token tests.
pub const FOREIGN_SIGNING_KEY: &str = "some-other-deployment-signing-key-9876543210";

/// The test signing key as a secret.
#[must_use]
pub fn signing_key() -> SecretString {
    SecretString::from(TEST_SIGNING_KEY.to_string())
}

/// A codec over [`TEST_SIGNING_KEY`] with the default lifetime.
///
/// # Panics
///
/// Never in practice: the fixture key satisfies the minimum length.
#[must_use]
pub fn test_codec() -> TokenCodec {
    TokenCodec::new(&signing_key(), DEFAULT_TTL).expect("fixture key is long enough")
}

/// A codec over [`FOREIGN_SIGNING_KEY`].
///
/// # Panics
///
/// Never in practice: the fixture key satisfies the minimum length.
#[must_use]
pub fn foreign_codec() -> TokenCodec {
    let key = SecretString::from(FOREIGN_SIGNING_KEY.to_string());
    TokenCodec::new(&key, DEFAULT_TTL).expect("fixture key is long enough")
}

/// Bob: id 1, paying user, secret `god`.
#[must_use]
pub fn bob() -> TokenPayload {
    TokenPayload::new(1, "Bob", true)
}

/// Alice: id 2, free user, secret `secret`.
#[must_use]
pub fn alice() -> TokenPayload {
    TokenPayload::new(2, "Alice", false)
}
