//! Property-based tests for the session token codec.
//!
//! - Round trip: decode(encode(p)) == p
//! - Tamper detection: any single-character change is rejected
//! - Foreign keys and arbitrary strings never decode

use proptest::prelude::*;
use session_token::{TokenError, ISSUER};
use test_utils::{
    cookie_noise_strategy, foreign_codec, test_codec, token_payload_strategy,
};

const BASE64URL: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_round_trip(payload in token_payload_strategy()) {
        let codec = test_codec();
        let token = codec.encode(&payload).unwrap();
        prop_assert_eq!(codec.decode(&token).unwrap(), payload);
    }

    #[test]
    fn prop_claims_carry_issuer_and_window(payload in token_payload_strategy()) {
        let codec = test_codec();
        let token = codec.encode(&payload).unwrap();
        let claims = codec.decode_claims(&token).unwrap();

        prop_assert_eq!(claims.iss.as_str(), ISSUER);
        prop_assert_eq!(claims.exp - claims.iat, codec.ttl().as_secs() as i64);
    }

    #[test]
    fn prop_single_character_tamper_rejected(
        payload in token_payload_strategy(),
        position in any::<prop::sample::Index>(),
        replacement in any::<prop::sample::Index>(),
    ) {
        let codec = test_codec();
        let token = codec.encode(&payload).unwrap();
        let mut bytes = token.clone().into_bytes();

        let at = position.index(bytes.len());
        let original = bytes[at];
        let mut candidate = BASE64URL[replacement.index(BASE64URL.len())];
        if candidate == original {
            candidate = if original == b'A' { b'B' } else { b'A' };
        }
        bytes[at] = candidate;
        let tampered = String::from_utf8(bytes).unwrap();

        prop_assert_ne!(&tampered, &token);
        prop_assert_eq!(codec.decode(&tampered), Err(TokenError::InvalidToken));
    }

    #[test]
    fn prop_foreign_key_rejected(payload in token_payload_strategy()) {
        let token = foreign_codec().encode(&payload).unwrap();
        prop_assert_eq!(test_codec().decode(&token), Err(TokenError::InvalidToken));
    }

    #[test]
    fn prop_noise_never_decodes(noise in cookie_noise_strategy()) {
        prop_assert_eq!(test_codec().decode(&noise), Err(TokenError::InvalidToken));
    }
}

#[test]
fn unsigned_token_rejected() {
    // {"alg":"none","typ":"JWT"} . {"iss":"cinema-auth","sub":"1","name":"Bob","paid":true,"iat":0,"exp":9999999999}
    let unsigned = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
        eyJpc3MiOiJjaW5lbWEtYXV0aCIsInN1YiI6IjEiLCJuYW1lIjoiQm9iIiwicGFpZCI6dHJ1ZSwiaWF0IjowLCJleHAiOjk5OTk5OTk5OTl9.";
    assert_eq!(test_codec().decode(unsigned), Err(TokenError::InvalidToken));
}

#[test]
fn truncated_token_rejected() {
    let token = test_codec().encode(&test_utils::bob()).unwrap();
    let truncated = &token[..token.len() - 1];
    assert_eq!(test_codec().decode(truncated), Err(TokenError::InvalidToken));
}
