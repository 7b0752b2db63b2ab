use std::sync::Arc;

use anyhow::{Context, Result};
use takeoff_api::{init_tracing, router, AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::load().context("failed to load server configuration")?;
    init_tracing(config.log_json);

    let app_state = Arc::new(AppState::from_config(&config));
    match &config.store_path {
        Some(path) => info!(path = %path.display(), "using JSON file report store"),
        None => info!("using in-memory report store"),
    }

    let listener = TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
}
