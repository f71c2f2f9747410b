//! CLI command definitions and dispatch.

pub mod call;
pub mod hooks;
pub mod plugins;
pub mod routes;
pub mod serve;
pub mod services;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use plughost_core::config::AppConfig;
use plughost_core::error::AppError;
use plughost_plugin::{PluginExport, PluginManager};

use crate::output::OutputFormat;

/// PlugHost: plugin loading and request dispatch
#[derive(Debug, Parser)]
#[command(name = "plughost", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file. Defaults to `config/default.toml` plus the
    /// `PLUGHOST_ENV` overlay.
    #[arg(short, long, env = "PLUGHOST_CONFIG")]
    pub config: Option<String>,

    /// Override the plugins root
    #[arg(long)]
    pub plugins_dir: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List installed plugins
    Plugins,
    /// Show the hook table
    Hooks,
    /// Show merged service bindings
    Services,
    /// Show the plugin route and custom routes
    Routes,
    /// Dispatch a single plugin action and print its output
    Call(call::CallArgs),
    /// Start the PlugHost server
    Serve(serve::ServeArgs),
}

impl Cli {
    /// Loads configuration and applies global overrides.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_file(path)?,
            None => {
                let env =
                    std::env::var("PLUGHOST_ENV").unwrap_or_else(|_| "development".to_string());
                AppConfig::load(&env)?
            }
        };
        if let Some(dir) = &self.plugins_dir {
            config.plugins.directory = dir.clone();
        }
        Ok(config)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Plugins => plugins::execute(&*boot(&config).await?, self.format).await,
            Commands::Hooks => hooks::execute(&*boot(&config).await?, self.format).await,
            Commands::Services => services::execute(&*boot(&config).await?, self.format).await,
            Commands::Routes => routes::execute(&*boot(&config).await?, self.format),
            Commands::Call(args) => call::execute(args, &*boot(&config).await?).await,
            Commands::Serve(args) => serve::execute(args, config).await,
        }
    }
}

/// Compiled-in plugin modules.
pub fn exports() -> Vec<PluginExport> {
    vec![plugin_shop::export()]
}

async fn boot(config: &AppConfig) -> Result<Arc<PluginManager>, AppError> {
    let (_, manager) = plughost_api::app::boot_plugins(config, exports()).await?;
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_boots_plugins_for_inspection_commands() {
        let root = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "plughost",
            "--plugins-dir",
            root.path().to_str().unwrap(),
            "--format",
            "json",
            "routes",
        ]);
        let mut config = AppConfig::default();
        config.plugins.directory = root.path().display().to_string();

        cli.execute(config.clone()).await.unwrap();

        let cli = Cli::parse_from(["plughost", "call", "shop", "order", "list"]);
        let err = cli.execute(config).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.message, "plugin shop not found");
    }
}
