//! Impact analysis pipeline.
//!
//! Combines graph construction, change resolution, propagation and test
//! classification into a single run.

use crate::affected::{
    build, classify, propagate, resolve_changes, BuildError, BuildOptions, BuiltGraph, Change,
    ImpactedTest, TestFileConvention,
};
use crate::report::ReportError;
use crate::vcs::VcsError;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that abort an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Options for one analysis run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOptions {
    pub build: BuildOptions,
    pub convention: TestFileConvention,
}

/// Result of affected test computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub impacted_tests: Vec<ImpactedTest>,
    pub files_scanned: usize,
    pub files_changed: usize,
    pub files_impacted: usize,
    pub edges: usize,
    pub parse_failures: usize,
}

/// Everything a run produced. The graph is kept for optional export.
#[derive(Debug)]
pub struct Analysis {
    pub built: BuiltGraph,
    pub report: AnalysisReport,
}

/// Run the pipeline for repository-relative `changes` under `repo_root`.
///
/// # Errors
/// Fails only when the graph cannot be built; propagation and classification
/// cannot fail.
pub fn analyze(
    repo_root: &Path,
    changes: &[Change],
    options: &AnalysisOptions,
) -> Result<Analysis, AnalysisError> {
    info!("building dependency graph");
    let built = build(repo_root, &options.build)?;

    let resolved = resolve_changes(&built.root, changes);
    for change in &resolved {
        if !built.graph.contains(&change.path) {
            debug!(
                path = %change.path.display(),
                kind = %change.kind,
                "changed file is not in the graph"
            );
        }
    }
    let impacted = propagate(&resolved, &built.graph);
    let impacted_tests = classify(&built.root, &impacted, &options.convention);

    info!(
        changed = changes.len(),
        impacted = impacted.len(),
        tests = impacted_tests.len(),
        "impact analysis complete"
    );

    let report = AnalysisReport {
        impacted_tests,
        files_scanned: built.stats.files_scanned,
        files_changed: changes.len(),
        files_impacted: impacted.len(),
        edges: built.stats.edges,
        parse_failures: built.stats.parse_failures,
    };

    Ok(Analysis { built, report })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::affected::ChangeKind;
    use std::fs;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn sample_repo() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        let files = [
            ("src/util.ts", "export const add = (a: number, b: number) => a + b;"),
            ("src/service.ts", "import { add } from './util';\nexport const sum = add(1, 2);"),
            ("src/orphan.ts", "export const lonely = true;"),
            ("tests/service.spec.ts", "import { sum } from '../src/service';\nsum;"),
            ("tests/util.test.ts", "import { add } from '../src/util';\nadd(1, 1);"),
        ];
        for (rel, content) in files {
            write(dir.path(), rel, content);
        }
        dir
    }

    fn test_names(report: &AnalysisReport) -> Vec<&str> {
        report.impacted_tests.iter().map(|t| t.test_name.as_str()).collect()
    }

    #[test]
    fn util_change_reaches_both_tests() {
        let dir = sample_repo();
        let changes = [Change::new("src/util.ts", ChangeKind::Modified)];

        let analysis = analyze(dir.path(), &changes, &AnalysisOptions::default()).unwrap();
        let mut names = test_names(&analysis.report);
        names.sort_unstable();
        assert_eq!(names, vec!["tests/service.spec.ts", "tests/util.test.ts"]);
        assert_eq!(analysis.report.files_scanned, 5);
        assert_eq!(analysis.report.files_changed, 1);
        assert_eq!(analysis.report.files_impacted, 4);
        assert!(analysis
            .report
            .impacted_tests
            .iter()
            .all(|t| t.change_type == ChangeKind::Modified));
    }

    #[test]
    fn service_change_reaches_only_its_spec() {
        let dir = sample_repo();
        let changes = [Change::new("src/service.ts", ChangeKind::Modified)];

        let analysis = analyze(dir.path(), &changes, &AnalysisOptions::default()).unwrap();
        assert_eq!(test_names(&analysis.report), vec!["tests/service.spec.ts"]);
        assert_eq!(analysis.report.impacted_tests[0].reason, "depends on src/service.ts");
    }

    #[test]
    fn orphan_change_impacts_no_tests() {
        let dir = sample_repo();
        let changes = [Change::new("src/orphan.ts", ChangeKind::Added)];

        let analysis = analyze(dir.path(), &changes, &AnalysisOptions::default()).unwrap();
        assert!(analysis.report.impacted_tests.is_empty());
        assert_eq!(analysis.report.files_impacted, 1);
    }

    #[test]
    fn deleted_test_is_reported_as_deleted() {
        let dir = sample_repo();
        let changes = [Change::new("tests/removed.spec.ts", ChangeKind::Deleted)];

        let analysis = analyze(dir.path(), &changes, &AnalysisOptions::default()).unwrap();
        assert_eq!(test_names(&analysis.report), vec!["tests/removed.spec.ts"]);
        assert_eq!(analysis.report.impacted_tests[0].change_type, ChangeKind::Deleted);
    }

    #[test]
    fn custom_convention_changes_selection() {
        let dir = sample_repo();
        let changes = [Change::new("src/util.ts", ChangeKind::Modified)];
        let options = AnalysisOptions {
            convention: TestFileConvention {
                suffixes: vec![".spec".into()],
                directories: vec![],
            },
            ..AnalysisOptions::default()
        };

        let analysis = analyze(dir.path(), &changes, &options).unwrap();
        assert_eq!(test_names(&analysis.report), vec!["tests/service.spec.ts"]);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let dir = sample_repo();
        let changes = [Change::new("src/util.ts", ChangeKind::Modified)];
        let first = analyze(dir.path(), &changes, &AnalysisOptions::default()).unwrap();
        let second = analyze(dir.path(), &changes, &AnalysisOptions::default()).unwrap();
        assert_eq!(first.report, second.report);
    }

    #[test]
    fn missing_repo_fails_with_build_error() {
        let dir = tempdir().unwrap();
        let result = analyze(&dir.path().join("missing"), &[], &AnalysisOptions::default());
        assert!(matches!(result, Err(AnalysisError::Build(BuildError::RootNotFound(_)))));
    }
}
