//! Service layer for ticketdesk.
//! - `storage`: the JSON-file user store, the only owner of persisted data.
//! - `auth`: signup/login and session tokens, independent of the web framework.
//! - `tickets`: per-user ticket list operations built on whole-list replacement.

pub mod errors;
pub mod auth;
pub mod runtime;
pub mod storage;
pub mod tickets;
#[cfg(test)]
pub mod test_support;
