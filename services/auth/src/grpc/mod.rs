//! gRPC surface: `user.v1.UserService/Login`.

use crate::login::{Authenticator, LoginOutcome};
use tonic::{Request, Response, Status};
use tracing::instrument;
use user_api::user_service_server::{UserService, UserServiceServer};
use user_api::{LoginRequest, LoginResponse};
use uuid::Uuid;

/// Login RPC handler.
#[derive(Debug, Clone)]
pub struct UserServiceImpl {
    authenticator: Authenticator,
    disclose_failure_reason: bool,
}

impl UserServiceImpl {
    /// Create the handler.
    pub fn new(authenticator: Authenticator, disclose_failure_reason: bool) -> Self {
        Self {
            authenticator,
            disclose_failure_reason,
        }
    }

    /// Wrap the handler in a tonic service.
    pub fn into_server(self) -> UserServiceServer<Self> {
        UserServiceServer::new(self)
    }

    fn respond(&self, outcome: LoginOutcome) -> LoginResponse {
        match outcome {
            LoginOutcome::Success { token } => LoginResponse::granted(token),
            LoginOutcome::Failure(reason) => {
                LoginResponse::refused(reason.user_message(self.disclose_failure_reason))
            }
        }
    }
}

#[tonic::async_trait]
impl UserService for UserServiceImpl {
    #[instrument(skip_all, fields(rpc = "Login", correlation_id = %Uuid::new_v4()))]
    async fn login(
        &self,
        request: Request<LoginRequest>,
    ) -> Result<Response<LoginResponse>, Status> {
        let req = request.into_inner();
        // Verdicts, including internal ones, are carried in the response body.
        let outcome = self.authenticator.login(&req.identifier, &req.secret);
        Ok(Response::new(self.respond(outcome)))
    }
}
