//! Wire contract of the authentication RPC.
//!
//! ```text
//! package user.v1;
//!
//! service UserService {
//!   rpc Login(LoginRequest) returns (LoginResponse);
//! }
//!
//! message LoginRequest  { string identifier = 1; string secret = 2; }
//! message LoginResponse { string token = 1; string error_message = 2; }
//! ```
//!
//! A refused login is a normal response with `error_message` set; only
//! transport-level faults surface as `tonic::Status`.

#![forbid(unsafe_code)]
#![allow(missing_docs)]

pub mod messages;

mod generated {
    include!(concat!(env!("OUT_DIR"), "/user.v1.UserService.rs"));
}

pub use generated::{user_service_client, user_service_server};
pub use messages::{LoginRequest, LoginResponse};

/// Fully qualified gRPC service name.
pub const SERVICE_NAME: &str = "user.v1.UserService";
