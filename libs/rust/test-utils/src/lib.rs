//! Shared test utilities for the cinema platform crates.
//!
//! This crate provides:
//! - Proptest generators for session and credential types
//! - Fixtures with the built-in principals and a test signing key

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;
