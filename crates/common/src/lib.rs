//! Shared helpers for the ticketdesk crates: response types, runtime
//! environment checks and tracing setup.

pub mod types;
pub mod utils;
pub mod env;
