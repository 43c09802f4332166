//! Check command handler
//!
//! Fails when the committed jobs differ from what `generate` would write.

use anyhow::{Context, Result};
use colored::*;
use prowgen_render::CheckReport;
use std::path::PathBuf;

use crate::config::Config;

pub fn handle_check(config: &Config) -> Result<()> {
    let report = config
        .generator()
        .check()
        .context("Failed to check Prow jobs")?;

    if report.is_clean() {
        println!("{}", "✓ Prow jobs are up to date".green().bold());
        return Ok(());
    }

    print!("{}", drift_summary(&report));

    let total = report.missing.len() + report.outdated.len() + report.stale.len();
    anyhow::bail!(
        "{} generated file(s) differ from their definitions; run `prowgen generate`",
        total
    )
}

/// One section per kind of drift, each listing its files
fn drift_summary(report: &CheckReport) -> String {
    let mut out = String::new();
    for (title, paths) in [
        ("Missing", &report.missing),
        ("Out of date", &report.outdated),
        ("Stale", &report.stale),
    ] {
        if paths.is_empty() {
            continue;
        }

        out.push_str(&format!("{}\n", format!("{} ({}):", title, paths.len()).yellow().bold()));
        for path in paths {
            out.push_str(&format!("  {} {}\n", "▸".red(), path.display()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DEFINITION: &str = "jobName: foo-presubmit\ncommands:\n- make build\n";

    fn config(root: &TempDir) -> Config {
        let definitions = root.path().join("templater/jobs/presubmit/rcrozean/foo");
        fs::create_dir_all(&definitions).unwrap();
        fs::write(definitions.join("bar.yaml"), DEFINITION).unwrap();
        Config::new(root.path().to_path_buf())
    }

    #[test]
    fn test_check_passes_after_generate() {
        let root = TempDir::new().unwrap();
        let config = config(&root);
        config.generator().generate().unwrap();

        assert!(handle_check(&config).is_ok());
    }

    #[test]
    fn test_check_fails_on_outdated_file() {
        let root = TempDir::new().unwrap();
        let config = config(&root);
        config.generator().generate().unwrap();

        let generated = config.jobs_root.join("rcrozean/foo/bar-presubmits.yaml");
        assert!(generated.exists());
        fs::write(&generated, "edited by hand\n").unwrap();

        let err = handle_check(&config).unwrap_err();
        assert!(err.to_string().contains("1 generated file(s) differ"));
    }

    #[test]
    fn test_check_fails_on_missing_file() {
        let root = TempDir::new().unwrap();
        let config = config(&root);

        assert!(handle_check(&config).is_err());
    }

    #[test]
    fn test_drift_summary_lists_each_file() {
        let report = CheckReport {
            missing: vec![PathBuf::from("rcrozean/foo/a-presubmits.yaml")],
            outdated: vec![PathBuf::from("rcrozean/foo/b-presubmits.yaml")],
            stale: vec![PathBuf::from("rcrozean/old/c-periodics.yaml")],
        };

        let summary = drift_summary(&report);
        assert!(summary.contains("rcrozean/foo/a-presubmits.yaml"));
        assert!(summary.contains("rcrozean/foo/b-presubmits.yaml"));
        assert!(summary.contains("rcrozean/old/c-periodics.yaml"));
        assert!(summary.contains("Out of date (1):"));
        assert!(drift_summary(&CheckReport::default()).is_empty());
    }
}
