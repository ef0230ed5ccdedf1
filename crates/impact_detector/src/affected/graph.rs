//! Reverse dependency graph using petgraph.
//!
//! Stores file dependencies as a directed graph where edge A→B means "B imports A",
//! so the outgoing neighbors of a file are the files that depend on it.

use crate::normalize::path::relative_display;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Reverse dependency graph keyed by canonical file path.
///
/// Paths are interned once into node indices; edges only ever refer to
/// indices, never to other file records.
#[derive(Debug, Default)]
pub struct DepGraph {
    graph: DiGraph<PathBuf, ()>,
    path_to_idx: HashMap<PathBuf, NodeIndex>,
}

impl DepGraph {
    /// Create a new empty dependency graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the graph. Returns the node index.
    pub fn add_file(&mut self, path: PathBuf) -> NodeIndex {
        if let Some(&idx) = self.path_to_idx.get(&path) {
            return idx;
        }
        let idx = self.graph.add_node(path.clone());
        self.path_to_idx.insert(path, idx);
        idx
    }

    /// Record that `dependent` imports `dependency`.
    ///
    /// Both files must already be in the graph. Returns false when either is
    /// unknown or when the edge would be a self-import. Repeated calls for the
    /// same pair keep a single edge.
    pub fn add_dependency(&mut self, dependent: &Path, dependency: &Path) -> bool {
        let (Some(&from), Some(&to)) = (
            self.path_to_idx.get(dependency),
            self.path_to_idx.get(dependent),
        ) else {
            return false;
        };
        if from == to {
            return false;
        }
        self.graph.update_edge(from, to, ());
        true
    }

    /// Get all files that directly depend on (import) the given file.
    ///
    /// Unknown files have no dependents.
    pub fn get_dependents(&self, path: &Path) -> Vec<&Path> {
        let Some(&idx) = self.path_to_idx.get(path) else {
            return Vec::new();
        };

        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].as_path())
            .collect()
    }

    /// Get current node count.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get current edge count.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if graph contains a file.
    pub fn contains(&self, path: &Path) -> bool {
        self.path_to_idx.contains_key(path)
    }

    /// Iterate over every file in insertion order.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.graph.node_indices().map(|n| self.graph[n].as_path())
    }

    /// Flatten the graph into `file -> sorted dependents`, with paths relative
    /// to `root` and forward-slash separated.
    pub fn to_adjacency(&self, root: &Path) -> BTreeMap<String, Vec<String>> {
        self.files()
            .map(|file| {
                let mut dependents: Vec<String> = self
                    .get_dependents(file)
                    .into_iter()
                    .map(|d| relative_display(d, root))
                    .collect();
                dependents.sort();
                (relative_display(file, root), dependents)
            })
            .collect()
    }
}
