//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server crate can call
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::Path;

/// Ensure the users file directory exists; warn on a missing frontend dir.
pub async fn ensure_env(frontend_dir: &str, users_file: &Path) -> anyhow::Result<()> {
    common::env::ensure_env(frontend_dir, users_file).await
}
