pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "crm-api")]
#[command(about = "CRM API - clients, interactions, opportunities and tasks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve(commands::serve::ServeArgs),

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::handle(args, config).await,
        Some(Commands::Migrate) => commands::migrate::handle(config).await,
        None => commands::serve::handle(commands::serve::ServeArgs::default(), config).await,
    }
}
