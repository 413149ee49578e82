//! Session token codec.
//!
//! Turns a [`TokenPayload`] into a signed, opaque string and back. The
//! authentication service encodes; the gateway decodes on every request.
//! Neither side keeps any session state: the token is the session.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod claims;
pub mod codec;
pub mod error;

pub use claims::{SessionClaims, TokenPayload};
pub use codec::{TokenCodec, DEFAULT_TTL, ISSUER, MIN_KEY_LEN};
pub use error::TokenError;
