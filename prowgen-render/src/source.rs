//! Job definition sources
//!
//! A job source yields every job of one kind, grouped by repository and
//! output file name. Two implementations are provided:
//! - `DirectoryJobSource`: YAML files laid out as `<kind>/<org>/<repo>/<name>.yaml`
//! - `StaticJobSource`: in-memory definitions

use prowgen_core::{JobDefinition, JobKind, JobSet};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::LoadError;

/// Trait for loading job definitions
///
/// Implementations must not have side effects.
pub trait JobSource {
    /// Load every job of the given kind
    ///
    /// # Returns
    /// Jobs keyed by repository name (`<org>/<repo>`), then output file name
    fn jobs(&self, kind: JobKind) -> Result<JobSet, LoadError>;

    /// Load every job of a kind given by name
    ///
    /// Fails with `LoadError::UnknownKind` for anything other than
    /// `periodic`, `postsubmit` or `presubmit`.
    fn load(&self, kind: &str) -> Result<JobSet, LoadError> {
        let kind: JobKind = kind.parse()?;
        self.jobs(kind)
    }
}

/// Job source backed by a directory of YAML definition files
#[derive(Debug, Clone)]
pub struct DirectoryJobSource {
    root: PathBuf,
}

impl DirectoryJobSource {
    /// Creates a source reading from `root/<kind>/<org>/<repo>/*.yaml`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn load_file(path: &Path) -> Result<JobDefinition, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl JobSource for DirectoryJobSource {
    fn jobs(&self, kind: JobKind) -> Result<JobSet, LoadError> {
        let kind_dir = self.root.join(kind.as_str());
        let mut jobs = JobSet::new();

        if !kind_dir.is_dir() {
            debug!("No {} definitions under {}", kind, kind_dir.display());
            return Ok(jobs);
        }

        for org_dir in subdirectories(&kind_dir)? {
            for repo_dir in subdirectories(&org_dir)? {
                let repo = format!("{}/{}", file_name(&org_dir), file_name(&repo_dir));

                for path in sorted_entries(&repo_dir)? {
                    if !path.is_file() || !is_yaml(&path) {
                        debug!("Skipping {}", path.display());
                        continue;
                    }

                    let file = output_file_name(&path, kind);
                    let job = Self::load_file(&path)?;
                    let repo_jobs = jobs.entry(repo.clone()).or_default();

                    if repo_jobs.contains_key(&file) {
                        return Err(LoadError::Duplicate {
                            path,
                            repo,
                            file,
                        });
                    }

                    debug!("Loaded {} job {} from {}", kind, job.job_name, path.display());
                    repo_jobs.insert(file, job);
                }
            }
        }

        Ok(jobs)
    }
}

/// Output file name for a definition file
///
/// `unit-test.yaml` becomes `unit-test-presubmits.yaml`; names that already
/// carry the kind suffix are kept.
pub fn output_file_name(path: &Path, kind: JobKind) -> String {
    let suffix = format!("-{}.yaml", kind.plural());
    let name = file_name(path);
    if name.ends_with(&suffix) {
        return name;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{}{}", stem, suffix)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort();
    Ok(entries)
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut dirs = Vec::new();
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            dirs.push(path);
        } else {
            warn!("Ignoring {}: expected a directory", path.display());
        }
    }
    Ok(dirs)
}

/// In-memory job source
#[derive(Debug, Clone, Default)]
pub struct StaticJobSource {
    jobs: BTreeMap<JobKind, JobSet>,
}

impl StaticJobSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a job under the given repository and output file name
    pub fn with_job(
        mut self,
        kind: JobKind,
        repo: impl Into<String>,
        file: impl Into<String>,
        job: JobDefinition,
    ) -> Self {
        self.insert(kind, repo, file, job);
        self
    }

    pub fn insert(
        &mut self,
        kind: JobKind,
        repo: impl Into<String>,
        file: impl Into<String>,
        job: JobDefinition,
    ) {
        self.jobs
            .entry(kind)
            .or_default()
            .entry(repo.into())
            .or_default()
            .insert(file.into(), job);
    }

    /// Removes a job, returning it if it was present
    pub fn remove(&mut self, kind: JobKind, repo: &str, file: &str) -> Option<JobDefinition> {
        let repo_jobs = self.jobs.get_mut(&kind)?.get_mut(repo)?;
        let job = repo_jobs.remove(file);
        if repo_jobs.is_empty() {
            if let Some(kind_jobs) = self.jobs.get_mut(&kind) {
                kind_jobs.remove(repo);
            }
        }
        job
    }
}

impl JobSource for StaticJobSource {
    fn jobs(&self, kind: JobKind) -> Result<JobSet, LoadError> {
        Ok(self.jobs.get(&kind).cloned().unwrap_or_default())
    }
}
