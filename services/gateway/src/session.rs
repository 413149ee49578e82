//! Per-request session resolution and the session cookie.
//!
//! A session is never stored: it is recomputed from the `jwt` cookie on
//! every request. A missing, corrupt, foreign or expired token resolves to
//! [`Session::Anonymous`] rather than an error.

use axum::http::header::COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use session_token::{TokenCodec, TokenError, TokenPayload};
use std::sync::Arc;
use tracing::debug;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "jwt";

/// Identity view derived from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// No usable session token
    Anonymous,
    /// Token present and verified
    Authenticated(TokenPayload),
}

impl Session {
    /// The verified payload, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&TokenPayload> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(payload) => Some(payload),
        }
    }

    /// Whether the user may see paid-only content.
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.user().is_some_and(|user| user.is_paid)
    }
}

/// Resolves sessions from request cookies.
#[derive(Debug, Clone)]
pub struct SessionResolver {
    codec: Arc<TokenCodec>,
}

/// A verified token ready to be written into the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    /// Who the token identifies
    pub payload: TokenPayload,
    /// Seconds until the token expires
    pub max_age: i64,
}

impl SessionResolver {
    /// Create a resolver over the shared codec.
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Resolve the session carried by `headers`.
    pub fn resolve(&self, headers: &HeaderMap) -> Session {
        let Some(token) = parse_cookie(headers, SESSION_COOKIE) else {
            return Session::Anonymous;
        };
        match self.codec.decode(&token) {
            Ok(payload) => Session::Authenticated(payload),
            Err(_) => {
                debug!("Session cookie did not verify, treating request as anonymous");
                Session::Anonymous
            }
        }
    }

    /// Verify a freshly issued token before handing it to the browser.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidToken`] if the token does not verify with
    /// the gateway's key.
    pub fn verify_issued(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        let claims = self.codec.decode_claims(token)?;
        let payload = claims.payload().ok_or(TokenError::InvalidToken)?;
        let max_age = claims.remaining_seconds(chrono::Utc::now().timestamp());
        Ok(VerifiedToken { payload, max_age })
    }
}

/// Value of cookie `name`, if the request carries it.
///
/// Looks through every `Cookie` header; the first match wins.
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

/// `Set-Cookie` value storing `token` for `max_age` seconds.
///
/// Returns `None` if the token contains bytes not allowed in a header.
pub fn session_cookie(token: &str, max_age: i64, secure: bool) -> Option<HeaderValue> {
    let secure = if secure { "; Secure" } else { "" };
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
        max_age.max(0)
    ))
    .ok()
}

/// `Set-Cookie` value that expires the session cookie immediately.
pub fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_static("jwt=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT")
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use session_token::DEFAULT_TTL;

    fn resolver() -> SessionResolver {
        let key = SecretString::from("session-unit-test-key-0123456789abcdef".to_string());
        SessionResolver::new(Arc::new(TokenCodec::new(&key, DEFAULT_TTL).unwrap()))
    }

    fn with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_cookie() {
        let headers = with_cookie("theme=dark; jwt=abc.def.ghi; lang=ru");
        assert_eq!(parse_cookie(&headers, "jwt").as_deref(), Some("abc.def.ghi"));
        assert_eq!(parse_cookie(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(parse_cookie(&headers, "missing"), None);
        assert_eq!(parse_cookie(&HeaderMap::new(), "jwt"), None);
    }

    #[test]
    fn test_parse_cookie_across_headers() {
        let mut headers = with_cookie("theme=dark");
        headers.append(COOKIE, HeaderValue::from_static("jwt=token"));
        assert_eq!(parse_cookie(&headers, "jwt").as_deref(), Some("token"));
    }

    #[test]
    fn test_cookie_name_must_match_exactly() {
        let headers = with_cookie("xjwt=nope; jwtx=nope");
        assert_eq!(parse_cookie(&headers, "jwt"), None);
    }

    #[test]
    fn test_resolve_authenticated() {
        let resolver = resolver();
        let payload = TokenPayload::new(1, "Bob", true);
        let token = resolver.codec.encode(&payload).unwrap();

        let session = resolver.resolve(&with_cookie(&format!("jwt={token}")));
        assert_eq!(session, Session::Authenticated(payload));
        assert!(session.is_paid());
    }

    #[test]
    fn test_resolve_anonymous() {
        let resolver = resolver();
        assert_eq!(resolver.resolve(&HeaderMap::new()), Session::Anonymous);
        assert_eq!(resolver.resolve(&with_cookie("jwt=")), Session::Anonymous);
        assert_eq!(resolver.resolve(&with_cookie("jwt=garbage")), Session::Anonymous);
        assert!(!Session::Anonymous.is_paid());
    }

    #[test]
    fn test_verify_issued_reports_remaining_lifetime() {
        let resolver = resolver();
        let token = resolver.codec.encode(&TokenPayload::new(2, "Alice", false)).unwrap();
        let verified = resolver.verify_issued(&token).unwrap();
        assert_eq!(verified.payload.name, "Alice");
        let ttl = DEFAULT_TTL.as_secs() as i64;
        assert!(verified.max_age <= ttl && verified.max_age >= ttl - 5);

        assert_eq!(resolver.verify_issued("nope"), Err(TokenError::InvalidToken));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("a.b.c", 60, false).unwrap();
        assert_eq!(
            cookie.to_str().unwrap(),
            "jwt=a.b.c; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let secure = session_cookie("a.b.c", 60, true).unwrap();
        assert!(secure.to_str().unwrap().ends_with("; Secure"));

        assert!(session_cookie("bad\nvalue", 60, false).is_none());
    }

    #[test]
    fn test_clear_cookie_expires_immediately() {
        let cleared = clear_session_cookie();
        let value = cleared.to_str().unwrap();
        assert!(value.starts_with("jwt=;"));
        assert!(value.contains("Max-Age=0"));
        assert!(value.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"));
    }
}
