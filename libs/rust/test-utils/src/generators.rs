//! Shared proptest generators.

use proptest::prelude::*;
use session_token::TokenPayload;

/// Display names, including non-ASCII ones.
pub fn display_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Z][a-z]{1,15}",
        "[А-Я][а-я]{1,15}",
        "\\PC{0,40}",
    ]
}

/// Arbitrary token payloads.
pub fn token_payload_strategy() -> impl Strategy<Value = TokenPayload> {
    (any::<i64>(), display_name_strategy(), any::<bool>())
        .prop_map(|(id, name, is_paid)| TokenPayload { id, name, is_paid })
}

/// Email-shaped login identifiers.
pub fn login_identifier_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9._]{0,15}@[a-z]{2,10}\\.[a-z]{2,4}"
}

/// Plaintext secrets.
pub fn secret_strategy() -> impl Strategy<Value = String> {
    "[ -~]{1,32}"
}

/// Printable ASCII strings that are never valid tokens on their own.
pub fn cookie_noise_strategy() -> impl Strategy<Value = String> {
    "[!#-+\\--:<-\\[\\]-~]{0,64}"
}
