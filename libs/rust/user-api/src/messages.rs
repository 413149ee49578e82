//! Prost messages for `user.v1`.

/// Credentials submitted for verification.
#[derive(Clone, PartialEq, ::prost::Message)]
#[prost(skip_debug)]
pub struct LoginRequest {
    /// Login identifier (email)
    #[prost(string, tag = "1")]
    pub identifier: ::prost::alloc::string::String,
    /// Plaintext secret
    #[prost(string, tag = "2")]
    pub secret: ::prost::alloc::string::String,
}

/// Login verdict. Exactly one of the fields is non-empty.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoginResponse {
    /// Signed session token on success
    #[prost(string, tag = "1")]
    pub token: ::prost::alloc::string::String,
    /// User-facing refusal message on failure
    #[prost(string, tag = "2")]
    pub error_message: ::prost::alloc::string::String,
}

impl LoginResponse {
    /// A successful verdict carrying `token`.
    pub fn granted(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            error_message: String::new(),
        }
    }

    /// A refusal carrying a user-facing message.
    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            token: String::new(),
            error_message: message.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_request_debug_redacts_secret() {
        let request = LoginRequest {
            identifier: "bob@mail.ru".to_string(),
            secret: "god".to_string(),
        };
        let rendered = format!("{request:?}");
        assert!(rendered.contains("bob@mail.ru"));
        assert!(!rendered.contains("god"));
    }

    #[test]
    fn test_verdict_constructors() {
        let ok = LoginResponse::granted("t");
        assert_eq!(ok.token, "t");
        assert!(ok.error_message.is_empty());

        let refused = LoginResponse::refused("Invalid email or password");
        assert!(refused.token.is_empty());
        assert_eq!(refused.error_message, "Invalid email or password");
    }

    #[test]
    fn test_wire_tags() {
        let request = LoginRequest {
            identifier: "a".to_string(),
            secret: "b".to_string(),
        };
        // field 1 (len-delimited) "a", field 2 (len-delimited) "b"
        assert_eq!(request.encode_to_vec(), vec![0x0a, 0x01, b'a', 0x12, 0x01, b'b']);
    }
}
