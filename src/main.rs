// unitrack - university application tracker
//
// Command-line client for the universities backend:
// - Session: token login, persisted between runs
// - List: filter, paginate and browse the catalog; apply and withdraw
// - Form: create and edit university records (admin)
// - Dashboard: application counters and admin review

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use unitrack::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Config commands run without logging or network
    if cli::handle_config_command(&cli.command)? {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let config = Config::from_env().context("Failed to load configuration")?;

    // The guard must live until exit so file logs flush
    let _log_guard = unitrack::logging::init(&config.logging);
    tracing::debug!("Using API at {}", config.api_url);

    cli::run(cli.command, &config).await
}
