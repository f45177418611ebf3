mod chat;
mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use kharcha_core::{AppCore, paths};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let db_path = match &cli.db_path {
        Some(path) => path.clone(),
        None => paths::ensure_database_path_string()?,
    };
    let core = AppCore::new(&db_path)?;

    match cli.command {
        Commands::Chat { user } => chat::run(core, &user).await,
        Commands::Expenses { user, limit } => commands::list_expenses(&core, &user, limit),
        Commands::Summary { user, period } => {
            commands::summary(&core, &user, period.to_summary_period())
        }
        Commands::Cleanup => commands::cleanup(&core),
    }
}
