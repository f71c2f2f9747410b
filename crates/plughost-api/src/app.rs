//! Application builder: wires router, middleware and state into an Axum app,
//! and runs the server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::sync::watch;
use tracing::{error, info, warn};

use plughost_cache::CacheManager;
use plughost_core::config::AppConfig;
use plughost_core::{AppError, AppResult};
use plughost_plugin::{PluginExport, PluginManager};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state).layer(cors)
}

/// Connects the cache and boots the plugin system with the given modules.
pub async fn boot_plugins(
    config: &AppConfig,
    exports: Vec<PluginExport>,
) -> AppResult<(CacheManager, Arc<PluginManager>)> {
    info!(provider = %config.cache.provider, "Initializing cache");
    let cache = CacheManager::new(&config.cache).await?;

    info!(directory = %config.plugins.directory, "Booting plugin system");
    let manager = PluginManager::new(config.plugins.clone(), cache.clone(), exports)?;
    manager.boot().await?;

    Ok((cache, Arc::new(manager)))
}

/// Runs the PlugHost server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig, exports: Vec<PluginExport>) -> AppResult<()> {
    info!("Starting PlugHost v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Cache and plugins ────────────────────────────────
    let (cache, plugins) = boot_plugins(&config, exports).await?;

    // ── Step 2: Router ───────────────────────────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = build_app(AppState::new(config, cache, plugins));

    // ── Step 3: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(address = %addr, "PlugHost server listening");

    let (signal_tx, mut signal_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                let _ = signal_tx.send(true);
            })
            .await
    });

    tokio::select! {
        biased;
        joined = &mut server => return server_result(joined),
        _ = signal_rx.changed() => {}
    }

    info!(grace_seconds = grace.as_secs(), "Shutting down, draining connections");
    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            warn!("Graceful shutdown timed out, aborting open connections");
            server.abort();
            Ok(())
        }
    }
}

fn server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> AppResult<()> {
    joined
        .map_err(|e| AppError::internal(format!("Server task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Server error: {e}")))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
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
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
