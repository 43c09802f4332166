//! List command handler

use anyhow::{Context, Result};
use colored::*;
use prowgen_core::JobKind;
use serde::Serialize;

use crate::config::Config;

/// One job in the listing
#[derive(Debug, Serialize)]
struct JobListing<'a> {
    kind: JobKind,
    repo: &'a str,
    file: &'a str,
    name: &'a str,
}

pub fn handle_list(config: &Config, json: bool) -> Result<()> {
    let jobs = config
        .generator()
        .jobs()
        .context("Failed to load job definitions")?;

    let listings: Vec<JobListing> = jobs
        .iter()
        .flat_map(|(kind, repos)| {
            repos.iter().flat_map(move |(repo, files)| {
                files.iter().map(move |(file, job)| JobListing {
                    kind: *kind,
                    repo,
                    file,
                    name: &job.job_name,
                })
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if listings.is_empty() {
        println!("{}", "No job definitions found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} job(s):", listings.len()).bold());
    println!();
    for (kind, repos) in &jobs {
        for (repo, files) in repos {
            println!("  {} {} {}", "▸".cyan(), repo.bold(), format!("({})", kind).dimmed());
            for (file, job) in files {
                println!("    {:<50} {}", job.job_name, file.dimmed());
            }
        }
    }

    Ok(())
}
