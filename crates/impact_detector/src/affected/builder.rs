//! Dependency graph construction.
//!
//! Walks the workspace, parses each source file's static imports and
//! re-exports, and records a reverse edge for every import that resolves to
//! another scanned file.

use super::graph::DepGraph;
use super::parser::{ImportParser, ParseError};
use super::resolver::{PathResolver, DEPENDENCY_DIRS};
use crate::normalize::path::truncate_for_log;
use clap::ValueEnum;
use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Extensions of files that take part in the graph.
pub const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mts", "mjs", "cts", "cjs"];

/// Errors that abort graph construction.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("repository root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("repository root is not a directory: {}", .0.display())]
    RootNotDirectory(PathBuf),
    #[error("no source files found under {}", .0.display())]
    NoSourceFiles(PathBuf),
    #[error("tsconfig not found: {}", .0.display())]
    TsconfigNotFound(PathBuf),
    #[error("cannot load tsconfig {}: {source}", path.display())]
    Tsconfig {
        path: PathBuf,
        #[source]
        source: oxc_resolver::ResolveError,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// What to do when a source file cannot be parsed.
#[derive(ValueEnum, Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParsePolicy {
    /// Log a warning and keep the file in the graph without import edges.
    #[default]
    Warn,
    /// Fail the whole build.
    Abort,
}

/// Options for [`build`].
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Explicit tsconfig for path aliases. When None, `<root>/tsconfig.json`
    /// is used if it exists.
    pub tsconfig: Option<PathBuf>,
    pub parse_policy: ParsePolicy,
    /// Skip files excluded by `.gitignore`. Off by default: generated files
    /// can sit in an import chain.
    pub respect_gitignore: bool,
}

/// Counters collected while building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub files_scanned: usize,
    pub edges: usize,
    pub parse_failures: usize,
    pub unresolved_imports: usize,
}

/// A freshly built graph together with its canonical root.
#[derive(Debug)]
pub struct BuiltGraph {
    pub root: PathBuf,
    pub graph: DepGraph,
    pub stats: BuildStats,
}

/// Build the reverse dependency graph for everything under `root`.
///
/// Every discovered source file becomes a node, even when nothing imports it.
///
/// # Errors
/// Fails when the root is unusable, when the tsconfig cannot be loaded, when
/// no source files exist, or on a parse failure under [`ParsePolicy::Abort`].
pub fn build(root: &Path, options: &BuildOptions) -> Result<BuiltGraph, BuildError> {
    let start = Instant::now();
    let root = canonical_root(root)?;
    let tsconfig = locate_tsconfig(&root, options.tsconfig.as_deref())?;
    let resolver = match PathResolver::new(root.clone(), tsconfig.clone()) {
        Ok(resolver) => resolver,
        Err(source) => {
            let path = tsconfig.unwrap_or_else(|| root.join("tsconfig.json"));
            return Err(BuildError::Tsconfig { path, source });
        }
    };

    info!(root = %root.display(), "starting graph build");

    let files = discover_source_files(&root, options.respect_gitignore);
    if files.is_empty() {
        return Err(BuildError::NoSourceFiles(root));
    }

    let mut graph = DepGraph::new();
    for file in &files {
        graph.add_file(file.clone());
    }

    let mut parser = ImportParser::new()?;
    let mut stats = BuildStats {
        files_scanned: graph.node_count(),
        ..BuildStats::default()
    };

    for file in &files {
        let imports = match parser.parse_file(file) {
            Ok(imports) => imports,
            Err(e) if options.parse_policy == ParsePolicy::Warn => {
                warn!(path = %truncate_for_log(file), error = %e, "skipping unparseable file");
                stats.parse_failures += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        for import in imports {
            let target = match resolver.resolve(file, &import.specifier) {
                Ok(target) => target,
                Err(reason) => {
                    stats.unresolved_imports += 1;
                    if reason.is_expected() {
                        debug!(
                            from = %truncate_for_log(file),
                            specifier = %import.specifier,
                            %reason,
                            "unresolved import"
                        );
                    } else {
                        warn!(
                            from = %truncate_for_log(file),
                            specifier = %import.specifier,
                            %reason,
                            "import resolution failed"
                        );
                    }
                    continue;
                }
            };
            if graph.add_dependency(file, &target) {
                trace!(
                    from = %truncate_for_log(file),
                    to = %truncate_for_log(&target),
                    kind = ?import.kind,
                    "edge"
                );
            } else {
                stats.unresolved_imports += 1;
                debug!(
                    from = %truncate_for_log(file),
                    target = %truncate_for_log(&target),
                    "import target is not another scanned source file"
                );
            }
        }
    }

    stats.edges = graph.edge_count();
    info!(
        files = stats.files_scanned,
        edges = stats.edges,
        parse_failures = stats.parse_failures,
        unresolved = stats.unresolved_imports,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "graph build complete"
    );

    Ok(BuiltGraph { root, graph, stats })
}

/// Canonicalize a repository root, checking that it is an existing directory.
///
/// # Errors
/// Returns `RootNotFound` or `RootNotDirectory`.
pub fn canonical_root(root: &Path) -> Result<PathBuf, BuildError> {
    if !root.exists() {
        return Err(BuildError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(BuildError::RootNotDirectory(root.to_path_buf()));
    }
    root.canonicalize()
        .map_err(|_| BuildError::RootNotFound(root.to_path_buf()))
}

fn locate_tsconfig(root: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>, BuildError> {
    if let Some(path) = explicit {
        let path = if path.is_absolute() { path.to_path_buf() } else { root.join(path) };
        if !path.is_file() {
            return Err(BuildError::TsconfigNotFound(path));
        }
        return Ok(Some(path));
    }
    let default = root.join("tsconfig.json");
    Ok(default.is_file().then_some(default))
}

/// Enumerate source files under the canonical root in a stable order.
///
/// Only `.git` and package manager directories are always skipped. Ignore
/// files apply only when `respect_gitignore` is set.
fn discover_source_files(root: &Path, respect_gitignore: bool) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .ignore(false)
        .git_ignore(respect_gitignore)
        .git_global(false)
        .git_exclude(respect_gitignore)
        .parents(respect_gitignore)
        .require_git(false);
    let walker = builder
        .hidden(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| !is_excluded_dir(entry))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "walk error");
                continue;
            }
        };
        // links are not followed, so entry paths under the canonical root
        // are canonical already
        if entry.file_type().is_some_and(|ft| ft.is_file()) && is_source_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files
}

fn is_excluded_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_some_and(|ft| ft.is_dir()) {
        return false;
    }
    let name = entry.file_name();
    name == ".git" || DEPENDENCY_DIRS.iter().any(|d| name == *d)
}

/// Whether the path has a TypeScript/JavaScript extension.
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}
