//! sedump CLI - Main entry point

use clap::Parser;
use sedump_cli::{commands, Cli, Commands};
use sedump_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let defaults = LogConfig::builder()
        .level(if cli.verbose { LogLevel::Debug } else { LogLevel::Info })
        .output(LogOutput::Console)
        .log_file_prefix("sedump")
        .filter_directives("sqlx=warn")
        .build();

    // Environment variables take precedence over the defaults above
    let log_config = defaults.clone().merge_env().unwrap_or(defaults);
    let _guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Warning: failed to initialize logging: {e:#}");
            None
        }
    };

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> sedump_cli::Result<()> {
    match &cli.command {
        Commands::Import(args) => {
            commands::import::run(args, cli.progress).await?;
        }
        Commands::Queries(args) => {
            commands::queries::run(args).await?;
        }
        Commands::All(args) => {
            let summary = commands::import::run(args, cli.progress).await?;
            tracing::info!(records = summary.records(), "Import finished, running queries");
            commands::queries::run(args).await?;
        }
    }
    Ok(())
}
