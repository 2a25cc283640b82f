//! Auth module: domain types, errors, password hashing and the service.
//!
//! Signup and login business logic live here, independent of axum.

pub mod domain;
pub mod errors;
pub mod password;
pub mod service;

pub use service::{AuthConfig, AuthService};
