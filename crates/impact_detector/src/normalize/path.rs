//! Path normalization utilities for cross-platform consistency.
//!
//! Normalizes paths to forward slashes and projects absolute paths onto the
//! repository root for display.

use std::path::Path;

/// Maximum path length for logging.
const MAX_PATH_LOG_LENGTH: usize = 256;

/// Rewrite backslashes as `/` and collapse runs of separators.
pub fn normalize_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars().map(|c| if c == '\\' { '/' } else { c }) {
        if c != '/' || !out.ends_with('/') {
            out.push(c);
        }
    }
    out
}

/// Path relative to `root`, forward-slash normalized.
///
/// Returns None when `path` is not under `root`.
pub fn to_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|p| normalize_slashes(&p.to_string_lossy()))
}

/// Like [`to_relative`], falling back to the full normalized path.
pub fn relative_display(path: &Path, root: &Path) -> String {
    to_relative(path, root).unwrap_or_else(|| normalize_slashes(&path.to_string_lossy()))
}

/// Shorten a path for log output, keeping its tail.
pub fn truncate_for_log(path: &Path) -> String {
    let s = path.display().to_string();
    if s.len() <= MAX_PATH_LOG_LENGTH {
        return s;
    }
    let mut start = s.len() - MAX_PATH_LOG_LENGTH + 3;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &s[start..])
}
