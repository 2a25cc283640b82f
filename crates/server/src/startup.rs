use std::{net::SocketAddr, path::Path};

use axum::Router;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use service::runtime;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Router for a validated config; used by `run` and by integration tests.
pub fn build_app(cfg: &AppConfig) -> Router {
    let state = ServerState::from_config(cfg);
    routes::build_router(state, build_cors(), &cfg.server.frontend_dir)
}

/// Public entry: load config, prepare the data dir and serve until Ctrl+C.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    run_with(cfg, shutdown_signal()).await
}

/// Serve `cfg` until `shutdown` resolves.
pub async fn run_with<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let users_file = Path::new(&cfg.storage.users_file);
    runtime::ensure_env(&cfg.server.frontend_dir, users_file)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    let app = build_app(&cfg);
    let addr = bind_addr(&cfg)?;
    info!(%addr, users_file = %users_file.display(), "starting ticketdesk server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("received Ctrl+C, shutting down");
    }
}
