//! Output writer
//!
//! Generated jobs live at `<jobs-root>/<org>/<repo>/<file>`. A run first
//! removes every configured organization directory, so definitions deleted
//! since the last run leave nothing behind.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::WriteError;

/// Writes rendered jobs under the jobs root
#[derive(Debug, Clone)]
pub struct JobWriter {
    jobs_root: PathBuf,
}

impl JobWriter {
    pub fn new(jobs_root: impl Into<PathBuf>) -> Self {
        Self {
            jobs_root: jobs_root.into(),
        }
    }

    pub fn jobs_root(&self) -> &Path {
        &self.jobs_root
    }

    /// Output path for a job file
    pub fn path_for(&self, repo: &str, file: &str) -> PathBuf {
        self.jobs_root.join(repo).join(file)
    }

    /// Remove all previous output for the given organizations
    ///
    /// Organizations with no output yet are skipped.
    pub fn clean(&self, organizations: &[String]) -> Result<(), WriteError> {
        for org in organizations {
            let path = self.jobs_root.join(org);
            match fs::remove_dir_all(&path) {
                Ok(()) => info!("Removed previous output in {}", path.display()),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!("No previous output in {}", path.display())
                }
                Err(source) => return Err(WriteError::Remove { path, source }),
            }
        }
        Ok(())
    }

    /// Write a rendered job, creating parent directories as needed
    ///
    /// # Returns
    /// The path that was written
    pub fn write(&self, repo: &str, file: &str, contents: &[u8]) -> Result<PathBuf, WriteError> {
        let path = self.path_for(repo, file);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, contents).map_err(|source| WriteError::Write {
            path: path.clone(),
            source,
        })?;

        Ok(path)
    }

    /// Read a previously generated job, if it exists
    pub fn read_existing(&self, repo: &str, file: &str) -> Result<Option<Vec<u8>>, WriteError> {
        let path = self.path_for(repo, file);
        match fs::read(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(WriteError::Read { path, source }),
        }
    }

    /// Every file currently under the given organizations
    ///
    /// Paths are relative to the jobs root.
    pub fn existing_files(&self, organizations: &[String]) -> Result<BTreeSet<PathBuf>, WriteError> {
        let mut files = BTreeSet::new();
        for org in organizations {
            let dir = self.jobs_root.join(org);
            if dir.is_dir() {
                self.collect_files(&dir, &mut files)?;
            }
        }
        Ok(files)
    }

    fn collect_files(&self, dir: &Path, files: &mut BTreeSet<PathBuf>) -> Result<(), WriteError> {
        let read_err = |source| WriteError::Read {
            path: dir.to_path_buf(),
            source,
        };

        for entry in fs::read_dir(dir).map_err(read_err)? {
            let path = entry.map_err(read_err)?.path();
            if path.is_dir() {
                self.collect_files(&path, files)?;
            } else if let Ok(relative) = path.strip_prefix(&self.jobs_root) {
                files.insert(relative.to_path_buf());
            }
        }
        Ok(())
    }
}
