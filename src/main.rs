//! PlugHost Server
//!
//! Main entry point: loads configuration, initializes logging, boots the
//! compiled-in plugin modules against the plugins root and serves HTTP.

use tracing_subscriber::{EnvFilter, fmt};

use plughost_core::config::AppConfig;
use plughost_core::error::AppError;
use plughost_plugin::PluginExport;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = plughost_api::app::run_server(config, plugin_exports()).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment.
///
/// `PLUGHOST_CONFIG` names an explicit file; otherwise `config/default.toml`
/// is merged with the `PLUGHOST_ENV` overlay (default `development`).
fn load_configuration() -> Result<AppConfig, AppError> {
    match std::env::var("PLUGHOST_CONFIG") {
        Ok(path) => AppConfig::load_file(&path),
        Err(_) => {
            let env = std::env::var("PLUGHOST_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Plugin modules compiled into this server.
fn plugin_exports() -> Vec<PluginExport> {
    vec![plugin_shop::export()]
}
