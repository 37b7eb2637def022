//! Web server runner

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api::{self, AppState};
use crate::config::ParadecastConfig;
use crate::sources::SourceSet;

pub async fn run(config: ParadecastConfig) -> Result<()> {
    let sources = SourceSet::new(&config.sources)?;
    let bind = config.server.bind.clone();
    let port = config.server.port;

    let state = Arc::new(AppState {
        config: Arc::new(config),
        sources,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new().nest("/api", api::router(state)).layer(cors);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Paradecast listening on http://{addr}");
    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;
    Ok(())
}
