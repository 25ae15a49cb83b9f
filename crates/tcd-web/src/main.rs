//! TCD Web Server
//!
//! Serves the transitivity analysis form and JSON API.
//!
//! Author: hephaex@gmail.com

use std::sync::Arc;

use anyhow::Context;
use tcd_core::config::{AppConfig, LoggingConfig};
use tcd_web::{create_router, state::AppState};
use tracing_subscriber::EnvFilter;

fn load_config() -> anyhow::Result<AppConfig> {
    match std::env::var("TCD_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)
            .and_then(AppConfig::with_env_override)
            .with_context(|| format!("loading configuration from {path}")),
        Err(_) => AppConfig::from_env().context("loading configuration from environment"),
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tcd_web={level},tcd_annotator={level},tcd_analyzer={level},tower_http={level}",
            level = logging.level
        ))
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config));

    // Model provisioning happens once, before the first request
    match tcd_annotator::provision(&state.config.annotator).await {
        Ok(annotator) => state.install_annotator(annotator).await,
        Err(e) => tracing::warn!(
            error = %e,
            backend = %state.config.annotator.backend,
            "Annotator provisioning failed; analysis disabled until restart"
        ),
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Transitivity Clause Detector listening on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
