//! Import path resolver using `oxc_resolver`.
//!
//! Resolves import specifiers to canonical absolute paths, handling tsconfig
//! paths, package.json exports, and various module resolution strategies.

use oxc_resolver::{
    ResolveError, ResolveOptions, Resolver, TsconfigDiscovery, TsconfigOptions, TsconfigReferences,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// Directories owned by package managers. Files under them are never part of
/// the scanned tree.
pub const DEPENDENCY_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// Why an import did not become a graph edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unresolved {
    /// No file matches the specifier.
    NotFound,
    /// The target lies outside the workspace root.
    OutsideWorkspace,
    /// The target is an installed package.
    DependencyDirectory,
    /// Resolution itself failed, e.g. on a broken `package.json`.
    Failed(String),
}

impl Unresolved {
    /// Whether the specifier simply names nothing in the workspace.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Unresolved::Failed(_))
    }
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::NotFound => f.write_str("not found"),
            Unresolved::OutsideWorkspace => f.write_str("outside workspace"),
            Unresolved::DependencyDirectory => f.write_str("installed package"),
            Unresolved::Failed(reason) => write!(f, "resolver error: {reason}"),
        }
    }
}

impl From<ResolveError> for Unresolved {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::NotFound(_)
            | ResolveError::MatchedAliasNotFound(..)
            | ResolveError::Ignored(_)
            | ResolveError::Builtin { .. } => Unresolved::NotFound,
            other => Unresolved::Failed(other.to_string()),
        }
    }
}

/// Path resolver for TypeScript/JavaScript imports.
pub struct PathResolver {
    resolver: Resolver,
    workspace_root: PathBuf,
}

impl PathResolver {
    /// Create a resolver for the canonical workspace root.
    ///
    /// `tsconfig` enables `compilerOptions.paths` aliases when given. It is
    /// loaded eagerly, following `extends`, so a broken config surfaces here
    /// instead of failing every later lookup.
    ///
    /// # Errors
    /// Returns the resolver error when the tsconfig cannot be loaded.
    pub fn new(workspace_root: PathBuf, tsconfig: Option<PathBuf>) -> Result<Self, ResolveError> {
        let resolver = Resolver::new(build_resolve_options(tsconfig.clone()));
        if let Some(config) = &tsconfig {
            resolver.resolve_tsconfig(config)?;
        }
        Ok(Self {
            resolver,
            workspace_root,
        })
    }

    /// Resolve an import specifier to a canonical absolute path.
    ///
    /// # Errors
    /// Returns the reason when the specifier does not lead to a workspace file.
    pub fn resolve(&self, from: &Path, specifier: &str) -> Result<PathBuf, Unresolved> {
        let from_dir = from.parent().ok_or(Unresolved::NotFound)?;

        let resolution = self.resolver.resolve(from_dir, specifier)?;

        let canonical = resolution
            .into_path_buf()
            .canonicalize()
            .map_err(|_| Unresolved::NotFound)?;

        let Ok(relative) = canonical.strip_prefix(&self.workspace_root) else {
            return Err(Unresolved::OutsideWorkspace);
        };

        if is_in_dependency_dir(relative) {
            return Err(Unresolved::DependencyDirectory);
        }

        Ok(canonical)
    }
}

/// Whether any component of `path` is a package manager directory.
pub fn is_in_dependency_dir(path: &Path) -> bool {
    path.components()
        .any(|c| DEPENDENCY_DIRS.iter().any(|d| c.as_os_str() == *d))
}

fn build_resolve_options(tsconfig: Option<PathBuf>) -> ResolveOptions {
    ResolveOptions {
        extensions: vec![
            ".ts".into(),
            ".tsx".into(),
            ".js".into(),
            ".jsx".into(),
            ".mts".into(),
            ".mjs".into(),
            ".cts".into(),
            ".cjs".into(),
        ],
        // ESM-style TypeScript imports name the emitted `.js` file
        extension_alias: vec![
            (".js".into(), vec![".ts".into(), ".tsx".into(), ".js".into()]),
            (".mjs".into(), vec![".mts".into(), ".mjs".into()]),
            (".cjs".into(), vec![".cts".into(), ".cjs".into()]),
        ],
        main_files: vec!["index".into()],
        condition_names: vec![
            "import".into(),
            "require".into(),
            "node".into(),
            "default".into(),
        ],
        tsconfig: tsconfig.map(|config_file| {
            TsconfigDiscovery::Manual(TsconfigOptions {
                config_file,
                references: TsconfigReferences::Disabled,
            })
        }),
        ..Default::default()
    }
}
