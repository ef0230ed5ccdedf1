//! Change sources: git commits and JSON change lists.
//!
//! Both produce repository-relative [`Change`]s. Renames surface as a single
//! change on the new path.

use crate::affected::{Change, ChangeKind};
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while collecting changes.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("invalid commit '{0}'")]
    InvalidCommit(String),
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git diff-tree failed: {0}")]
    GitFailed(String),
    #[error("unexpected git output near '{0}'")]
    Malformed(String),
    #[error("cannot read change list {}: {source}", path.display())]
    ReadChangeList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid change list {}: {source}", path.display())]
    ChangeListJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// List the files changed by `commit` in the repository at `repo_root`.
///
/// # Errors
/// Fails if git cannot be run, exits non-zero, or prints unexpected output.
pub fn changed_files(repo_root: &Path, commit: &str) -> Result<Vec<Change>, VcsError> {
    if commit.is_empty() || commit.starts_with('-') {
        return Err(VcsError::InvalidCommit(commit.to_string()));
    }

    let output = Command::new("git")
        .args(["diff-tree", "--no-commit-id", "--name-status", "-r", "-z", "-M", "--root"])
        .arg(commit)
        .current_dir(repo_root)
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VcsError::GitFailed(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let changes = parse_name_status(&stdout)?;
    debug!(commit, count = changes.len(), "collected changed files");
    Ok(changes)
}

/// Parse `git diff-tree --name-status -z` output.
///
/// Records are NUL separated: a status token followed by one path, or two
/// paths for renames and copies.
fn parse_name_status(output: &str) -> Result<Vec<Change>, VcsError> {
    let mut changes = Vec::new();
    let mut tokens = output.split('\0').filter(|t| !t.is_empty());

    while let Some(status) = tokens.next() {
        let status = status.trim();
        let mut next_path = || {
            tokens
                .next()
                .ok_or_else(|| VcsError::Malformed(status.to_string()))
        };

        let change = match status.chars().next() {
            Some('A') => Change::new(next_path()?, ChangeKind::Added),
            Some('D') => Change::new(next_path()?, ChangeKind::Deleted),
            Some('R') => {
                let _old = next_path()?;
                Change::new(next_path()?, ChangeKind::Modified)
            }
            Some('C') => {
                let _source = next_path()?;
                Change::new(next_path()?, ChangeKind::Added)
            }
            Some(c) if c.is_ascii_uppercase() => Change::new(next_path()?, ChangeKind::Modified),
            _ => return Err(VcsError::Malformed(status.to_string())),
        };
        changes.push(change);
    }

    Ok(changes)
}

/// Read a JSON change list: `[{"path": "...", "kind": "added"}]`.
///
/// # Errors
/// Fails if the file cannot be read or is not a valid change list.
pub fn read_change_list(path: &Path) -> Result<Vec<Change>, VcsError> {
    let content = std::fs::read_to_string(path).map_err(|source| VcsError::ReadChangeList {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| VcsError::ChangeListJson {
        path: path.to_path_buf(),
        source,
    })
}
