//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the listener is bound.

use std::path::Path;

use tracing::{info, warn};

/// Make sure the directory holding the users file exists and warn when the
/// static frontend directory is missing.
pub async fn ensure_env(frontend_dir: &str, users_file: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(frontend_dir).await.is_err() {
        warn!(%frontend_dir, "frontend assets directory not found; landing page will 404");
    }
    if let Some(data_dir) = users_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
        info!(data_dir = %data_dir.display(), "data directory ready");
    }
    Ok(())
}
