//! Configuration module
//!
//! Resolves CLI flags and environment variables into the explicit settings
//! a generation run needs: where definitions are read from, where jobs are
//! written, which organizations and job kinds to generate.

use anyhow::{Context, Result};
use clap::Args;
use prowgen_core::{ClusterSettings, JobKind};
use prowgen_render::templates::{self, BUILDKIT_IMAGE_TAG};
use prowgen_render::{DirectoryJobSource, Generator, GeneratorConfig, jobs_root, locate_repo_root};
use std::path::PathBuf;

/// Directory under the repository root holding the job definitions
const DEFINITIONS_FOLDER: &str = "templater/jobs";

/// Settings accepted on the command line
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Repository root (defaults to the enclosing git repository)
    #[arg(long, global = true, env = "PROWGEN_REPO_ROOT")]
    pub repo_root: Option<PathBuf>,

    /// Job definitions directory (defaults to <repo-root>/templater/jobs)
    #[arg(long, global = true, env = "PROWGEN_DEFINITIONS")]
    pub definitions: Option<PathBuf>,

    /// Organizations whose output is regenerated (comma-separated)
    #[arg(
        long = "org",
        global = true,
        env = "PROWGEN_ORGS",
        value_delimiter = ',',
        default_value = "rcrozean"
    )]
    pub organizations: Vec<String>,

    /// Job kinds to generate (comma-separated)
    #[arg(
        long,
        global = true,
        value_delimiter = ',',
        default_values = ["periodic", "postsubmit", "presubmit"]
    )]
    pub kinds: Vec<String>,

    /// Builder base image tag (defaults to the tag shipped with this build)
    #[arg(long, global = true, env = "PROWGEN_BUILDER_BASE_TAG")]
    pub builder_base_tag: Option<String>,

    /// Buildkit image tag used by buildx jobs
    #[arg(long, global = true, env = "PROWGEN_BUILDKIT_IMAGE_TAG", default_value = BUILDKIT_IMAGE_TAG)]
    pub buildkit_image_tag: String,
}

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the repository generated jobs are committed to
    pub repo_root: PathBuf,

    /// Directory generated jobs are written under
    pub jobs_root: PathBuf,

    /// Directory job definitions are read from
    pub definitions_root: PathBuf,

    /// Top-level output namespaces cleaned before each run
    pub organizations: Vec<String>,

    /// Job kinds to generate, by name
    pub job_kinds: Vec<String>,

    pub builder_base_tag: String,
    pub buildkit_image_tag: String,
    pub clusters: ClusterSettings,
}

impl Config {
    /// Creates a configuration with defaults for the given repository root
    pub fn new(repo_root: PathBuf) -> Self {
        Self {
            jobs_root: jobs_root(&repo_root),
            definitions_root: repo_root.join(DEFINITIONS_FOLDER),
            repo_root,
            organizations: vec!["rcrozean".to_string()],
            job_kinds: JobKind::ALL.iter().map(|k| k.to_string()).collect(),
            builder_base_tag: templates::builder_base_tag().to_string(),
            buildkit_image_tag: BUILDKIT_IMAGE_TAG.to_string(),
            clusters: ClusterSettings::default(),
        }
    }

    /// Creates configuration from parsed command-line settings
    ///
    /// Without `--repo-root` the enclosing git repository of the current
    /// directory is used.
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let repo_root = match settings.repo_root {
            Some(root) => root,
            None => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                locate_repo_root(&cwd).context("Error getting jobs folder path")?
            }
        };

        let mut config = Self::new(repo_root);
        if let Some(definitions) = settings.definitions {
            config.definitions_root = definitions;
        }
        if let Some(tag) = settings.builder_base_tag {
            config.builder_base_tag = tag;
        }
        config.organizations = settings.organizations;
        config.job_kinds = settings.kinds;
        config.buildkit_image_tag = settings.buildkit_image_tag;

        Ok(config)
    }

    /// Validates the configuration
    ///
    /// Job kind names are checked when jobs are loaded, not here.
    pub fn validate(&self) -> Result<()> {
        if self.organizations.is_empty() {
            anyhow::bail!("at least one organization is required");
        }

        for org in &self.organizations {
            if org.is_empty() || org.contains('/') || org == "." || org == ".." {
                anyhow::bail!("invalid organization name: {:?}", org);
            }
        }

        if self.job_kinds.is_empty() {
            anyhow::bail!("at least one job kind is required");
        }

        if self.builder_base_tag.trim().is_empty() {
            anyhow::bail!("builder_base_tag cannot be empty");
        }

        if self.buildkit_image_tag.trim().is_empty() {
            anyhow::bail!("buildkit_image_tag cannot be empty");
        }

        Ok(())
    }

    /// Generator settings for this configuration
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            jobs_root: self.jobs_root.clone(),
            organizations: self.organizations.clone(),
            job_kinds: self.job_kinds.clone(),
            clusters: self.clusters.clone(),
            builder_base_tag: self.builder_base_tag.clone(),
            buildkit_image_tag: self.buildkit_image_tag.clone(),
        }
    }

    /// Generator reading definitions from the configured directory
    pub fn generator(&self) -> Generator<DirectoryJobSource> {
        Generator::new(
            self.generator_config(),
            DirectoryJobSource::new(&self.definitions_root),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        settings: Settings,
    }

    fn settings(args: &[&str]) -> Settings {
        let mut argv = vec!["prowgen"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().settings
    }

    #[test]
    fn test_default_config() {
        let config = Config::new(PathBuf::from("/src/prow-jobs"));
        assert_eq!(config.jobs_root, PathBuf::from("/src/prow-jobs/jobs"));
        assert_eq!(
            config.definitions_root,
            PathBuf::from("/src/prow-jobs/templater/jobs")
        );
        assert_eq!(config.organizations, vec!["rcrozean"]);
        assert_eq!(config.job_kinds, vec!["periodic", "postsubmit", "presubmit"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::new(PathBuf::from("/src/prow-jobs"));

        config.organizations = Vec::new();
        assert!(config.validate().is_err());

        config.organizations = vec!["rcrozean/eks-distro".to_string()];
        assert!(config.validate().is_err());

        config.organizations = vec!["..".to_string()];
        assert!(config.validate().is_err());

        config.organizations = vec!["rcrozean".to_string()];
        config.job_kinds = Vec::new();
        assert!(config.validate().is_err());

        config.job_kinds = vec!["presubmit".to_string()];
        config.builder_base_tag = " ".to_string();
        assert!(config.validate().is_err());

        config.builder_base_tag = "standard-abc.1".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_settings_defaults() {
        let config =
            Config::from_settings(settings(&["--repo-root", "/src/prow-jobs"])).unwrap();
        assert_eq!(config.repo_root, PathBuf::from("/src/prow-jobs"));
        assert_eq!(config.job_kinds.len(), 3);
        assert_eq!(config.buildkit_image_tag, BUILDKIT_IMAGE_TAG);
        assert_eq!(config.builder_base_tag, templates::builder_base_tag());
    }

    #[test]
    fn test_from_settings_overrides() {
        let config = Config::from_settings(settings(&[
            "--repo-root",
            "/src/prow-jobs",
            "--definitions",
            "/defs",
            "--org",
            "rcrozean,aws",
            "--kinds",
            "presubmit",
            "--builder-base-tag",
            "standard-abc.1",
        ]))
        .unwrap();

        assert_eq!(config.definitions_root, PathBuf::from("/defs"));
        assert_eq!(config.organizations, vec!["rcrozean", "aws"]);
        assert_eq!(config.job_kinds, vec!["presubmit"]);
        assert_eq!(config.builder_base_tag, "standard-abc.1");

        let generator_config = config.generator_config();
        assert_eq!(generator_config.jobs_root, PathBuf::from("/src/prow-jobs/jobs"));
        assert_eq!(generator_config.organizations, config.organizations);
    }
}
