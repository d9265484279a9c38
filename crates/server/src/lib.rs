//! # Edumate Server
//!
//! HTTP surface over the `edumate` course pipeline: outline generation,
//! per-lesson artifact generation, listings, quiz scores, progress, and
//! the tutor chat.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod router;
pub mod state;
pub mod types;

use crate::{
    config::{get_config, AppConfig},
    router::create_router,
    state::build_app_state,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Builds the application state from `config` and serves the router on `listener`.
pub async fn run(listener: TcpListener, config: AppConfig) -> anyhow::Result<()> {
    debug!(?config, "Server configuration loaded");

    let app_state = build_app_state(config).await?;
    let mut routed: Vec<String> = app_state
        .tasks
        .iter()
        .map(|(task, resolved)| format!("{task}->{}", resolved.provider))
        .collect();
    routed.sort();
    info!(
        artifact_policy = ?app_state.config.artifact_policy,
        tasks = %routed.join(", "),
        "Course pipeline ready"
    );

    let app = create_router(app_state);
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Loads `.env`, installs the tracing subscriber, reads the configuration,
/// and serves on `0.0.0.0:{port}`.
pub async fn start() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    let config = get_config(None)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);

    run(listener, config).await
}
