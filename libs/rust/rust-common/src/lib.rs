//! Shared library for cross-cutting concerns in the cinema platform services.
//!
//! This crate provides centralized implementations for:
//! - A shared error type for collaborator and configuration failures
//! - HTTP client configuration and building
//! - Circuit breaker pattern for resilience
//! - Pluggable configuration sources (flags, JSON file, Consul KV, environment)
//! - Tracing subscriber initialization
//! - Graceful shutdown signal handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod circuit_breaker;
pub mod config_source;
pub mod tracing_config;
pub mod shutdown;

pub use error::PlatformError;
pub use http::{HttpConfig, build_http_client};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use config_source::{
    ConfigSource, ConsulKvSource, EnvSource, JsonFileSource, LayeredSource, StaticSource,
};
pub use tracing_config::{TracingConfig, init_tracing};
pub use shutdown::shutdown_signal;
