use clap::Parser;
use tracing_subscriber::EnvFilter;

use crm_api::cli::{self, Cli};
use crm_api::config::config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crm_api=info,tower_http=info")),
        )
        .init();

    let config = config().clone();
    config.check().map_err(anyhow::Error::msg)?;
    tracing::info!("Starting CRM API in {:?} mode", config.environment);

    cli::run(Cli::parse(), config).await
}
