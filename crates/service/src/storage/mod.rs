//! Storage for the service layer
//!
//! The whole user collection lives in one JSON document that is re-read for
//! every request and rewritten in full on every mutation.

pub mod user_store;

pub use user_store::{JsonUserStore, StoreWriteGuard, UserStoreHandle};
