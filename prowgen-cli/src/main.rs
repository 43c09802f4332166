//! Prowgen CLI
//!
//! Command-line interface for generating Prow job configuration from
//! declarative job definitions.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::{Config, Settings};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "prowgen")]
#[command(about = "Prow job configuration generator", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout is for command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "prowgen=info,prowgen_render=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_settings(cli.settings)?;
    config.validate()?;

    tracing::debug!(
        "Loaded configuration: definitions={}, jobs={}",
        config.definitions_root.display(),
        config.jobs_root.display()
    );

    handle_command(cli.command, &config)
}
