#![cfg(not(tarpaulin_include))]

use clap::Parser;
use potluck::app;
use potluck::config::Config;

/// Main entry point for the web front-end
///
/// Reads the sheet endpoints from flags or the environment, starts the
/// background sync and serves the page on the configured address.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    config.validate()?;

    app::run(config).await
}
