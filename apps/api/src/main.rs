//! # Adega API Server
//!
//! ```bash
//! ADEGA_JWT_SECRET=... ADEGA_DATABASE_PATH=./data/adega.db cargo run -p adega-api
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info,adega=debug,sqlx=warn`).

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use adega_api::{create_router, ApiConfig, AppState};
use adega_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,adega=debug,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting Adega API server...");

    let config = ApiConfig::load().context("loading configuration")?;
    let addr = config.socket_addr()?;
    info!(
        %addr,
        database = %config.database_path,
        utc_offset_minutes = config.utc_offset_minutes,
        "Configuration loaded"
    );
    if config.uses_dev_secret() {
        warn!("Using the development JWT secret, set ADEGA_JWT_SECRET in production");
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("creating {}", config.upload_dir.display()))?;

    let db = Database::new(config.db_config()?)
        .await
        .context("opening database")?;

    let state = AppState::new(db.clone(), config);
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
