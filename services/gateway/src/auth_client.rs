//! Client side of the Login RPC.
//!
//! A credential verdict ([`LoginVerdict`]) and a transport fault
//! ([`AuthClientError`]) are different types, so a call site cannot mistake
//! an unreachable authentication service for a wrong password.

use async_trait::async_trait;
use rust_common::{CircuitBreaker, CircuitBreakerConfig};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tonic::Code;
use tracing::{debug, warn};
use user_api::user_service_client::UserServiceClient;
use user_api::{LoginRequest, LoginResponse};

/// Breaker name for the authentication service.
const AUTH_SERVICE: &str = "auth-service";

/// Verdict returned by the authentication service.
#[derive(Clone, PartialEq, Eq)]
pub enum LoginVerdict {
    /// Credentials accepted
    Granted {
        /// Signed session token
        token: String,
    },
    /// Credentials refused; `message` is safe to show to the user
    Refused {
        /// User-facing refusal message
        message: String,
    },
}

impl fmt::Debug for LoginVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Granted { .. } => f.write_str("Granted { token: <redacted> }"),
            Self::Refused { message } => f.debug_struct("Refused").field("message", message).finish(),
        }
    }
}

impl LoginVerdict {
    /// Interpret a wire response.
    ///
    /// A populated `error_message` always means refusal. A response with
    /// neither field set is a protocol fault, not a verdict.
    ///
    /// # Errors
    ///
    /// Returns [`AuthClientError::Unavailable`] for an empty response.
    pub fn from_response(response: LoginResponse) -> Result<Self, AuthClientError> {
        if !response.error_message.is_empty() {
            return Ok(Self::Refused {
                message: response.error_message,
            });
        }
        if response.token.is_empty() {
            return Err(AuthClientError::Unavailable(
                "login response carried neither token nor error".to_string(),
            ));
        }
        Ok(Self::Granted {
            token: response.token,
        })
    }
}

/// Transport faults reaching the authentication service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthClientError {
    /// Service unreachable, refusing connections, or circuit open
    #[error("Authentication service unavailable: {0}")]
    Unavailable(String),

    /// No answer within the configured bound
    #[error("Authentication service timed out after {0:?}")]
    Timeout(Duration),
}

/// Credential verification capability used by the login handler.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Submit credentials and return the service's verdict.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport faults; refusals are verdicts.
    async fn login(&self, identifier: &str, secret: &str) -> Result<LoginVerdict, AuthClientError>;
}

/// [`Authenticator`] backed by the `user.v1.UserService` gRPC client.
pub struct GrpcAuthenticator {
    client: UserServiceClient<Channel>,
    timeout: Duration,
    breaker: CircuitBreaker,
}

impl GrpcAuthenticator {
    /// Create a client for `addr`. The connection is established lazily on
    /// the first call, so startup does not depend on the service being up.
    ///
    /// # Errors
    ///
    /// Returns an error if `addr` is not a valid endpoint URI.
    pub fn new(addr: &str, timeout: Duration) -> Result<Self, tonic::transport::Error> {
        Self::with_breaker(addr, timeout, CircuitBreakerConfig::default())
    }

    /// Create a client with a custom circuit breaker configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `addr` is not a valid endpoint URI.
    pub fn with_breaker(
        addr: &str,
        timeout: Duration,
        breaker: CircuitBreakerConfig,
    ) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(addr.to_string())?
            .connect_timeout(timeout)
            .timeout(timeout)
            .connect_lazy();
        Ok(Self {
            client: UserServiceClient::new(channel),
            timeout,
            breaker: CircuitBreaker::new(AUTH_SERVICE, breaker),
        })
    }

    async fn call(&self, request: LoginRequest) -> Result<LoginResponse, AuthClientError> {
        let mut client = self.client.clone();
        match tokio::time::timeout(self.timeout, client.login(request)).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) if status.code() == Code::DeadlineExceeded => {
                Err(AuthClientError::Timeout(self.timeout))
            }
            Ok(Err(status)) => Err(AuthClientError::Unavailable(format!(
                "{:?}: {}",
                status.code(),
                status.message()
            ))),
            Err(_) => Err(AuthClientError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl Authenticator for GrpcAuthenticator {
    async fn login(&self, identifier: &str, secret: &str) -> Result<LoginVerdict, AuthClientError> {
        if !self.breaker.allow_request().await {
            debug!(service = AUTH_SERVICE, "Circuit open, skipping Login RPC");
            return Err(AuthClientError::Unavailable("circuit open".to_string()));
        }

        let request = LoginRequest {
            identifier: identifier.to_string(),
            secret: secret.to_string(),
        };

        let result = self.call(request).await.and_then(LoginVerdict::from_response);
        match &result {
            Ok(_) => self.breaker.record_success().await,
            Err(e) => {
                warn!(service = AUTH_SERVICE, error = %e, "Login RPC failed");
                self.breaker.record_failure().await;
            }
        }
        result
    }
}

impl fmt::Debug for GrpcAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrpcAuthenticator")
            .field("service", &self.breaker.service())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_common::CircuitState;

    #[test]
    fn test_verdict_from_response() {
        assert_eq!(
            LoginVerdict::from_response(LoginResponse::granted("t")).unwrap(),
            LoginVerdict::Granted { token: "t".to_string() }
        );
        assert_eq!(
            LoginVerdict::from_response(LoginResponse::refused("Invalid email or password")).unwrap(),
            LoginVerdict::Refused {
                message: "Invalid email or password".to_string()
            }
        );
        assert!(matches!(
            LoginVerdict::from_response(LoginResponse::default()),
            Err(AuthClientError::Unavailable(_))
        ));
    }

    #[test]
    fn test_refusal_wins_over_token() {
        let response = LoginResponse {
            token: "t".to_string(),
            error_message: "nope".to_string(),
        };
        assert!(matches!(
            LoginVerdict::from_response(response),
            Ok(LoginVerdict::Refused { .. })
        ));
    }

    #[test]
    fn test_debug_hides_token() {
        let verdict = LoginVerdict::Granted {
            token: "eyJhbGciOiJIUzI1NiJ9.e30.sig".to_string(),
        };
        assert!(!format!("{verdict:?}").contains("eyJ"));
    }

    #[test]
    fn test_rejects_malformed_endpoint() {
        assert!(GrpcAuthenticator::new("not a uri", Duration::from_millis(100)).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_service_is_unavailable_not_refusal() {
        // Port 9 (discard) is not expected to run a gRPC server.
        let client = GrpcAuthenticator::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = client.login("bob@mail.ru", "god").await;
        assert!(
            matches!(result, Err(AuthClientError::Unavailable(_) | AuthClientError::Timeout(_))),
            "got {result:?}"
        );
    }

    #[tokio::test]
    async fn test_open_circuit_fails_fast() {
        let client = GrpcAuthenticator::with_breaker(
            "http://127.0.0.1:9",
            Duration::from_millis(200),
            CircuitBreakerConfig::default()
                .with_failure_threshold(1)
                .with_open_duration(Duration::from_secs(60)),
        )
        .unwrap();

        assert!(client.login("bob@mail.ru", "god").await.is_err());
        assert_eq!(client.breaker.state().await, CircuitState::Open);
        assert_eq!(
            client.login("bob@mail.ru", "god").await,
            Err(AuthClientError::Unavailable("circuit open".to_string()))
        );
    }
}
