//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod check;
mod generate;
mod list;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Regenerate every Prow job from its definition
    Generate,
    /// Verify generated jobs are up to date without writing anything
    Check,
    /// List job definitions
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Generate => generate::handle_generate(config),
        Commands::Check => check::handle_check(config),
        Commands::List { json } => list::handle_list(config, json),
    }
}
