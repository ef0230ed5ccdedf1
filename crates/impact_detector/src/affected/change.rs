//! Changed files as reported by version control.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// How a file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    /// Whether dependents of a file with this kind must be re-examined.
    /// Deleted files seed nothing.
    pub fn seeds_propagation(self) -> bool {
        matches!(self, ChangeKind::Added | ChangeKind::Modified)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single changed file.
///
/// Paths coming from version control are repository-relative; call
/// [`Change::resolve`] before looking them up in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl Change {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Resolve the path against the canonical repository root.
    ///
    /// Existing files are canonicalized like graph keys are. Files that are
    /// gone (deletions) are joined lexically, with `.` and `..` folded.
    pub fn resolve(&self, canonical_root: &Path) -> Change {
        Change {
            path: resolve_path(canonical_root, &self.path),
            kind: self.kind,
        }
    }
}

/// Resolve every change against the canonical repository root.
pub fn resolve_changes(canonical_root: &Path, changes: &[Change]) -> Vec<Change> {
    changes.iter().map(|c| c.resolve(canonical_root)).collect()
}

fn resolve_path(canonical_root: &Path, path: &Path) -> PathBuf {
    let joined = canonical_root.join(path);
    joined
        .canonicalize()
        .unwrap_or_else(|_| lexical_normalize(&joined))
}

fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
