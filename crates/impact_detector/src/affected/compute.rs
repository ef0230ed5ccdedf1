//! Impact propagation using reverse BFS.
//!
//! Computes the transitive closure of files affected by a set of changes.

use super::change::{Change, ChangeKind};
use super::graph::DepGraph;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

/// How a file entered the impacted set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpactOrigin {
    /// The file itself was changed.
    Direct,
    /// The file depends on `via`, which was already impacted.
    Transitive { via: PathBuf },
}

/// Change kind and origin of one impacted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpactRecord {
    pub kind: ChangeKind,
    pub origin: ImpactOrigin,
}

/// Impacted files in insertion order: direct changes first, then dependents
/// in discovery order.
pub type ImpactMap = IndexMap<PathBuf, ImpactRecord>;

/// Propagate `changes` through the reverse dependency graph.
///
/// Changed paths must already be resolved to the graph's canonical form.
/// Every changed file keeps its own kind; every file reachable from an added
/// or modified file is recorded as modified. Files unknown to the graph are
/// kept in the result but have no dependents.
pub fn propagate(changes: &[Change], graph: &DepGraph) -> ImpactMap {
    let mut impacted = ImpactMap::new();

    // Direct kinds go in before any traversal so they are never relabeled
    for change in changes {
        impacted.insert(
            change.path.clone(),
            ImpactRecord {
                kind: change.kind,
                origin: ImpactOrigin::Direct,
            },
        );
    }

    let mut queue: VecDeque<PathBuf> = impacted
        .iter()
        .filter(|(_, record)| record.kind.seeds_propagation())
        .map(|(path, _)| path.clone())
        .collect();
    let mut marked: HashSet<PathBuf> = queue.iter().cloned().collect();

    while let Some(current) = queue.pop_front() {
        for dependent in graph.get_dependents(&current) {
            if marked.contains(dependent) {
                continue;
            }
            marked.insert(dependent.to_path_buf());
            queue.push_back(dependent.to_path_buf());
            impacted
                .entry(dependent.to_path_buf())
                .or_insert_with(|| ImpactRecord {
                    kind: ChangeKind::Modified,
                    origin: ImpactOrigin::Transitive {
                        via: current.clone(),
                    },
                });
        }
    }

    impacted
}
