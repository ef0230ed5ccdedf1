//! Test file classification.
//!
//! Filters impacted files down to test files by naming convention and projects
//! them to repository-relative paths.

use super::builder::is_source_file;
use super::change::ChangeKind;
use super::compute::{ImpactMap, ImpactOrigin};
use crate::normalize::path::{relative_display, to_relative};
use serde::Serialize;
use std::path::Path;

/// Default markers that end a test file's stem.
pub const DEFAULT_TEST_SUFFIXES: &[&str] = &[".spec", ".test"];
/// Default directories whose source files are all tests.
pub const DEFAULT_TEST_DIRS: &[&str] = &["__tests__"];

/// How test files are recognized.
///
/// A source file is a test if its name without the extension ends with one
/// of `suffixes` (`service.spec.ts` for `.spec`), or if it lives under a
/// directory named in `directories`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFileConvention {
    pub suffixes: Vec<String>,
    pub directories: Vec<String>,
}

impl Default for TestFileConvention {
    fn default() -> Self {
        Self {
            suffixes: DEFAULT_TEST_SUFFIXES.iter().map(|s| (*s).to_string()).collect(),
            directories: DEFAULT_TEST_DIRS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl TestFileConvention {
    /// Check if a repository-relative path is a test file.
    pub fn is_test_file(&self, path: &Path) -> bool {
        if !is_source_file(path) {
            return false;
        }
        let Some(stem) = path.file_stem().and_then(|n| n.to_str()) else {
            return false;
        };

        if self.suffixes.iter().any(|s| stem.len() > s.len() && stem.ends_with(s.as_str())) {
            return true;
        }

        let Some(parent) = path.parent() else {
            return false;
        };
        parent
            .components()
            .any(|c| self.directories.iter().any(|d| c.as_os_str() == d.as_str()))
    }
}

/// An impacted test, ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedTest {
    /// Repository-relative, forward-slash path.
    pub test_name: String,
    pub change_type: ChangeKind,
    /// Why the test is impacted.
    pub reason: String,
}

/// Project the impacted files that are tests, in impact order.
///
/// Files outside `root` are skipped.
pub fn classify(
    root: &Path,
    impacted: &ImpactMap,
    convention: &TestFileConvention,
) -> Vec<ImpactedTest> {
    impacted
        .iter()
        .filter_map(|(path, record)| {
            let relative = path.strip_prefix(root).ok()?;
            if !convention.is_test_file(relative) {
                return None;
            }
            let reason = match &record.origin {
                ImpactOrigin::Direct => format!("directly {}", record.kind),
                ImpactOrigin::Transitive { via } => {
                    format!("depends on {}", relative_display(via, root))
                }
            };
            Some(ImpactedTest {
                test_name: to_relative(path, root)?,
                change_type: record.kind,
                reason,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::affected::change::Change;
    use crate::affected::compute::{propagate, ImpactRecord};
    use crate::affected::graph::DepGraph;
    use std::path::PathBuf;

    const ROOT: &str = "/repo";

    fn abs(rel: &str) -> PathBuf {
        Path::new(ROOT).join(rel)
    }

    fn scenario_graph() -> DepGraph {
        // util.ts <- service.ts <- service.spec.ts
        let mut graph = DepGraph::new();
        for f in ["util.ts", "service.ts", "service.spec.ts", "orphan.ts"] {
            graph.add_file(abs(f));
        }
        graph.add_dependency(&abs("service.ts"), &abs("util.ts"));
        graph.add_dependency(&abs("service.spec.ts"), &abs("service.ts"));
        graph
    }

    #[test]
    fn is_test_file_detects_patterns() {
        let convention = TestFileConvention::default();
        for path in [
            "foo.test.ts",
            "foo.test.tsx",
            "foo.spec.ts",
            "foo.spec.tsx",
            "foo.test.js",
            "foo.spec.js",
            "foo.test.mts",
            "foo.spec.mjs",
            "__tests__/foo.ts",
            "src/__tests__/nested/foo.ts",
        ] {
            assert!(convention.is_test_file(Path::new(path)), "{path}");
        }

        for path in ["foo.ts", "foo.tsx", "spec.ts", "foo.spec.json", "specs/foo.ts", "__tests__"] {
            assert!(!convention.is_test_file(Path::new(path)), "{path}");
        }
    }

    #[test]
    fn custom_convention() {
        let convention = TestFileConvention {
            suffixes: vec!["_test".into()],
            directories: vec![],
        };
        assert!(convention.is_test_file(Path::new("src/foo_test.ts")));
        assert!(!convention.is_test_file(Path::new("src/foo.spec.ts")));
        assert!(!convention.is_test_file(Path::new("__tests__/foo.ts")));
    }

    #[test]
    fn modified_util_impacts_spec_through_service() {
        let graph = scenario_graph();
        let changes = [Change::new(abs("util.ts"), ChangeKind::Modified)];
        let impacted = propagate(&changes, &graph);

        let tests = classify(Path::new(ROOT), &impacted, &TestFileConvention::default());
        assert_eq!(
            tests,
            vec![ImpactedTest {
                test_name: "service.spec.ts".into(),
                change_type: ChangeKind::Modified,
                reason: "depends on service.ts".into(),
            }]
        );
    }

    #[test]
    fn added_orphan_impacts_nothing() {
        let graph = scenario_graph();
        let changes = [Change::new(abs("orphan.ts"), ChangeKind::Added)];
        let impacted = propagate(&changes, &graph);

        let tests = classify(Path::new(ROOT), &impacted, &TestFileConvention::default());
        assert!(tests.is_empty());
    }

    #[test]
    fn directly_changed_test_keeps_kind() {
        let graph = scenario_graph();
        let changes = [Change::new(abs("service.spec.ts"), ChangeKind::Deleted)];
        let impacted = propagate(&changes, &graph);

        let tests = classify(Path::new(ROOT), &impacted, &TestFileConvention::default());
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].change_type, ChangeKind::Deleted);
        assert_eq!(tests[0].reason, "directly deleted");
    }

    #[test]
    fn classification_is_repeatable() {
        let graph = scenario_graph();
        let changes = [
            Change::new(abs("util.ts"), ChangeKind::Modified),
            Change::new(abs("orphan.ts"), ChangeKind::Added),
        ];
        let impacted = propagate(&changes, &graph);
        let convention = TestFileConvention::default();

        let first = classify(Path::new(ROOT), &impacted, &convention);
        let second = classify(Path::new(ROOT), &impacted, &convention);
        assert_eq!(first, second);
    }

    #[test]
    fn files_outside_root_are_skipped() {
        let mut impacted = ImpactMap::new();
        impacted.insert(
            PathBuf::from("/elsewhere/a.spec.ts"),
            ImpactRecord {
                kind: ChangeKind::Added,
                origin: ImpactOrigin::Direct,
            },
        );
        let tests = classify(Path::new(ROOT), &impacted, &TestFileConvention::default());
        assert!(tests.is_empty());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let test = ImpactedTest {
            test_name: "tests/a.spec.ts".into(),
            change_type: ChangeKind::Added,
            reason: "directly added".into(),
        };
        let json = serde_json::to_value(&test).unwrap();
        assert_eq!(json["testName"], "tests/a.spec.ts");
        assert_eq!(json["changeType"], "added");
    }
}
