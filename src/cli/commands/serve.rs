use clap::Args;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgStore};
use crate::state::AppState;

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Port to listen on (overrides API_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep all data in process memory instead of PostgreSQL")]
    pub memory: bool,
}

pub async fn handle(args: ServeArgs, config: AppConfig) -> anyhow::Result<()> {
    let mut manager = None;
    let state = if args.memory {
        warn!("Using in-memory store; data is lost on exit");
        AppState::in_memory(&config.security)?
    } else {
        let db = DatabaseManager::connect(&config.database).await?;
        db.migrate().await?;
        let store = Arc::new(PgStore::new(db.pool(), config.database.enable_query_logging));
        manager = Some(db);
        AppState::new(store.clone(), store, &config.security)?
    };

    let port = args.port.unwrap_or(config.api.port);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("CRM API listening on http://{}", bind_addr);

    axum::serve(listener, crate::app(state, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = manager {
        db.close().await;
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}
