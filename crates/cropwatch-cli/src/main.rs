//! Cropwatch CLI - Structured crop analysis from generative model output.

use clap::Parser;
use cropwatch_cli::commands;
use cropwatch_cli::{Cli, Command, Config, Formatter};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> cropwatch_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (log to stderr); RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Load config
    let config_path = match &cli.config {
        Some(path) => PathBuf::from(path),
        None => Config::default_path()?,
    };
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        // `config init --force` must still be able to replace a broken file
        Err(e) if matches!(cli.command, Command::Config(_)) => {
            warn!("Ignoring unreadable {}: {}", config_path.display(), e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    // Determine output format and color
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => commands::execute_extract(args, &config, &formatter)?,
        Command::Schema(args) => commands::execute_schema(args, &formatter)?,
        Command::Analyze(args) => commands::execute_analyze(args, &config, &formatter).await?,
        Command::Config(args) => commands::execute_config(args, &config, &config_path, &formatter)?,
    }

    Ok(())
}
