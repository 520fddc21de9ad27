use anyhow::{Context, Result};
use genx_app::config::{Config, API_KEY_ENV};
use genx_app::repl::Repl;
use genx_app::App;
use genx_interfaces::{Interface, TerminalInterface};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(Config::default_path);

    let config = if Config::exists(&config_path) {
        let config = Config::load(&config_path)?;
        if let Err(e) = config.validate() {
            eprintln!("❌ Invalid configuration: {}", e);
            eprintln!("💡 Tip: Fix or delete {} to reset", config_path.display());
            return Err(e);
        }
        config
    } else {
        let config = Config::default();
        config
            .save(&config_path)
            .context("Failed to write default configuration")?;
        println!("ℹ️  Created default configuration at {}", config_path.display());
        config
    };

    tracing::info!(
        "Using model {} (commands time out after {:?})",
        config.model,
        config.command_timeout()
    );

    let interface: Arc<dyn Interface> = Arc::new(TerminalInterface::new());
    let env_key = std::env::var(API_KEY_ENV).ok();
    let app = App::build(config, interface.clone(), env_key).await?;

    let repl = Repl::new(app, interface);
    let result = repl.run().await;

    repl.app().shutdown().await;
    result
}
