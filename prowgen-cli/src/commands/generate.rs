//! Generate command handler

use anyhow::{Context, Result};
use colored::*;

use crate::config::Config;

/// Regenerate all jobs and print a summary
pub fn handle_generate(config: &Config) -> Result<()> {
    let report = config
        .generator()
        .generate()
        .context("Failed to generate Prow jobs")?;

    println!("{}", "✓ Prow jobs generated!".green().bold());
    for (kind, count) in &report.per_kind {
        println!("  {:<12} {}", format!("{}:", kind).cyan(), count);
    }
    println!(
        "  {:<12} {}",
        "Output:",
        config.jobs_root.display().to_string().dimmed()
    );

    Ok(())
}
