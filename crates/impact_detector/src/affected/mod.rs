//! Affected test selection module.
//!
//! Provides import parsing, path resolution, dependency graph construction,
//! impact propagation and test classification to find the tests affected by
//! a set of changed files.

pub mod builder;
pub mod change;
pub mod compute;
pub mod discovery;
pub mod graph;
pub mod parser;
pub mod resolver;

// Re-export key types used by the analysis pipeline
pub use builder::{build, canonical_root, BuildError, BuildOptions, BuiltGraph, ParsePolicy};
pub use change::{resolve_changes, Change, ChangeKind};
pub use compute::propagate;
pub use discovery::{classify, ImpactedTest, TestFileConvention};
