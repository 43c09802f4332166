//! Output root resolution

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::PathResolutionError;

/// Directory under the repository root that holds generated jobs
pub const JOBS_FOLDER: &str = "jobs";

/// Locate the root of the git repository containing `start`
pub fn locate_repo_root(start: &Path) -> Result<PathBuf, PathResolutionError> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .current_dir(start)
        .output()
        .map_err(PathResolutionError::Git)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(PathResolutionError::GitFailed(stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let root = stdout.trim();
    if root.is_empty() {
        return Err(PathResolutionError::Empty);
    }
    Ok(PathBuf::from(root))
}

/// Jobs root for a repository root
pub fn jobs_root(repo_root: &Path) -> PathBuf {
    repo_root.join(JOBS_FOLDER)
}
