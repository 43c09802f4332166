//! Error types for job generation

use prowgen_core::{JobKind, UnknownJobKind};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generator operations
pub type Result<T> = std::result::Result<T, GenerateError>;

/// Errors raised while loading job definitions
#[derive(Debug, Error)]
pub enum LoadError {
    /// Job kind is not one of periodic, postsubmit or presubmit
    #[error(transparent)]
    UnknownKind(#[from] UnknownJobKind),

    /// Definition directory or file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Definition file is not valid YAML or does not match the schema
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Two definition files map to the same output file
    #[error("{path} produces {file} which is already defined for {repo}")]
    Duplicate {
        path: PathBuf,
        repo: String,
        file: String,
    },

    /// Jobs of two kinds map to the same output file
    #[error("{repo}/{file} is produced by both {first} and {second} jobs")]
    Conflict {
        repo: String,
        file: String,
        first: JobKind,
        second: JobKind,
    },
}

/// Template rendering failed (syntax error or undefined field)
#[derive(Debug, Error)]
#[error("template error: {0}")]
pub struct RenderError(#[from] minijinja::Error);

/// Filesystem errors raised while writing or cleaning output
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The repository root, and so the output root, could not be determined
#[derive(Debug, Error)]
pub enum PathResolutionError {
    #[error("failed to run git: {0}")]
    Git(#[source] std::io::Error),

    #[error("git rev-parse --show-toplevel failed: {0}")]
    GitFailed(String),

    #[error("git rev-parse --show-toplevel returned no path")]
    Empty,
}

/// Errors that abort a generation run
///
/// Each variant names the job kind, repository and file being processed.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("error getting {kind} job list: {source}")]
    Load {
        kind: String,
        #[source]
        source: LoadError,
    },

    #[error("error rendering {kind} job {repo}/{file}: {source}")]
    Render {
        kind: JobKind,
        repo: String,
        file: String,
        #[source]
        source: RenderError,
    },

    #[error("error writing {kind} job {repo}/{file}: {source}")]
    Write {
        kind: JobKind,
        repo: String,
        file: String,
        #[source]
        source: WriteError,
    },

    #[error("error removing previous output: {0}")]
    Clean(#[source] WriteError),

    #[error("error reading previous output: {0}")]
    Read(#[source] WriteError),

    #[error(transparent)]
    PathResolution(#[from] PathResolutionError),
}

impl GenerateError {
    /// Check if this error came from loading job definitions
    pub fn is_load_error(&self) -> bool {
        matches!(self, Self::Load { .. })
    }

    /// Check if this error came from the template engine
    pub fn is_render_error(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}
