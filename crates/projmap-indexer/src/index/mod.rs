//! The project index: the root artifact produced by a scan and mutated by
//! incremental updates.

mod record;
mod table;

pub use record::{
    is_relative_specifier, ClassInfo, ConstantInfo, FileRecord, FunctionSignature, ImportInfo,
    ImportKind, InitKind, MethodSignature, Parameter, PropertyInfo,
};
pub use table::{FileId, FileTable, KnownFiles};

use crate::tree::TreeNode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Version of the persisted index layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Include/exclude pattern configuration for one scan or update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub include: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,
}

impl FilterOptions {
    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            include: include.into_iter().map(Into::into).collect(),
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }
}

/// A directed dependency `from -> to` between two project-relative paths.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Index metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    /// Layout version for format compatibility
    pub version: u32,

    /// Absolute project root
    pub root_path: PathBuf,

    /// When the index was produced by a full scan
    pub created_at: DateTime<Utc>,

    /// Last full scan or update
    pub updated_at: DateTime<Utc>,

    /// Number of indexed files
    pub total_files: usize,

    /// Filters the index was produced with
    pub filters: FilterOptions,
}

impl IndexMetadata {
    pub fn new(root_path: PathBuf, filters: FilterOptions) -> Self {
        let now = Utc::now();
        Self {
            version: SCHEMA_VERSION,
            root_path,
            created_at: now,
            updated_at: now,
            total_files: 0,
            filters,
        }
    }

    /// Update the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// The complete index of one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectIndex {
    pub metadata: IndexMetadata,

    /// Directory/file view derived from `nodes`
    pub tree: TreeNode,

    /// Sorted, unique project-relative file paths
    pub nodes: Vec<String>,

    /// Dependency edges, sorted by `(from, to)`
    pub edges: Vec<Edge>,

    /// Per-file records keyed by relative path
    pub files: BTreeMap<String, FileRecord>,
}

impl ProjectIndex {
    pub fn record(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.binary_search_by(|n| n.as_str().cmp(path)).is_ok()
    }

    /// The contiguous block of edges leaving `path`.
    pub fn outgoing(&self, path: &str) -> &[Edge] {
        let range = outgoing_range(&self.edges, path);
        &self.edges[range]
    }

    /// Edges whose target is no longer indexed.
    ///
    /// These appear when a file is removed by an incremental update while
    /// other files still import it; they disappear once the importers are
    /// updated or the project is rescanned.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|e| !self.contains(&e.to)).collect()
    }

    /// Checks the structural invariants and returns every violation found.
    ///
    /// Dangling targets are reported as [`InvariantViolation::DanglingEdge`]
    /// so callers can tell the accepted deletion window apart from real
    /// corruption.
    pub fn check_invariants(&self) -> Vec<InvariantViolation> {
        let mut violations = Vec::new();

        if self.nodes.windows(2).any(|w| w[0] >= w[1]) {
            violations.push(InvariantViolation::NodesNotSorted);
        }
        if !self.nodes.iter().eq(self.files.keys()) {
            violations.push(InvariantViolation::NodesMismatchFiles);
        }
        if self.metadata.total_files != self.nodes.len() {
            violations.push(InvariantViolation::TotalFilesMismatch {
                recorded: self.metadata.total_files,
                actual: self.nodes.len(),
            });
        }

        let mut seen = HashSet::new();
        for edge in &self.edges {
            if !self.contains(&edge.from) {
                violations.push(InvariantViolation::UnknownSource(edge.clone()));
            }
            if !self.contains(&edge.to) {
                violations.push(InvariantViolation::DanglingEdge(edge.clone()));
            }
            if !seen.insert(edge) {
                violations.push(InvariantViolation::DuplicateEdge(edge.clone()));
            }
        }
        if self.edges.windows(2).any(|w| w[0] > w[1]) {
            violations.push(InvariantViolation::EdgesNotSorted);
        }

        for (path, record) in &self.files {
            let targets: Vec<&str> = self.outgoing(path).iter().map(|e| e.to.as_str()).collect();
            let deps: Vec<&str> = record.dependencies.iter().map(String::as_str).collect();
            if targets != deps {
                violations.push(InvariantViolation::DependenciesMismatch(path.clone()));
            }
        }

        violations
    }
}

/// Range of `edges` (sorted by `from`) whose source is `path`.
pub(crate) fn outgoing_range(edges: &[Edge], path: &str) -> std::ops::Range<usize> {
    let start = edges.partition_point(|e| e.from.as_str() < path);
    let end = start + edges[start..].partition_point(|e| e.from.as_str() == path);
    start..end
}

/// A broken index invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    NodesNotSorted,
    NodesMismatchFiles,
    TotalFilesMismatch { recorded: usize, actual: usize },
    UnknownSource(Edge),
    DanglingEdge(Edge),
    DuplicateEdge(Edge),
    EdgesNotSorted,
    DependenciesMismatch(String),
}

impl InvariantViolation {
    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::DanglingEdge(_))
    }
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodesNotSorted => write!(f, "nodes are not sorted and unique"),
            Self::NodesMismatchFiles => write!(f, "nodes differ from file record keys"),
            Self::TotalFilesMismatch { recorded, actual } => {
                write!(f, "totalFiles is {recorded} but {actual} nodes exist")
            }
            Self::UnknownSource(e) => write!(f, "edge {} -> {} has unknown source", e.from, e.to),
            Self::DanglingEdge(e) => write!(f, "edge {} -> {} targets a removed file", e.from, e.to),
            Self::DuplicateEdge(e) => write!(f, "edge {} -> {} is duplicated", e.from, e.to),
            Self::EdgesNotSorted => write!(f, "edges are not sorted"),
            Self::DependenciesMismatch(p) => {
                write!(f, "dependencies of {p} differ from its outgoing edges")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn index_with(files: &[(&str, &[&str])]) -> ProjectIndex {
        let mut map = BTreeMap::new();
        let mut edges = Vec::new();
        for (path, deps) in files {
            let record = FileRecord {
                dependencies: deps.iter().map(|d| d.to_string()).collect(),
                ..Default::default()
            };
            for dep in deps.iter() {
                edges.push(Edge::new(*path, *dep));
            }
            map.insert(path.to_string(), record);
        }
        let nodes: Vec<String> = map.keys().cloned().collect();
        let mut metadata = IndexMetadata::new(PathBuf::from("/project"), FilterOptions::default());
        metadata.total_files = nodes.len();
        ProjectIndex {
            metadata,
            tree: TreeBuilder::new("project").build(&nodes),
            nodes,
            edges,
            files: map,
        }
    }

    #[test]
    fn test_consistent_index_has_no_violations() {
        let index = index_with(&[("a.ts", &["b.ts", "c.ts"]), ("b.ts", &["c.ts"]), ("c.ts", &[])]);
        assert!(index.check_invariants().is_empty());
        assert_eq!(index.outgoing("a.ts").len(), 2);
        assert_eq!(index.outgoing("b.ts"), &[Edge::new("b.ts", "c.ts")]);
        assert!(index.outgoing("c.ts").is_empty());
        assert!(index.outgoing("zzz.ts").is_empty());
    }

    #[test]
    fn test_dangling_edge_is_reported() {
        let mut index = index_with(&[("a.ts", &["b.ts"]), ("b.ts", &[])]);
        index.files.remove("b.ts");
        index.nodes.retain(|n| n != "b.ts");
        index.metadata.total_files = 1;

        let violations = index.check_invariants();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].is_dangling());
        assert_eq!(index.dangling_edges(), vec![&Edge::new("a.ts", "b.ts")]);
    }

    #[test]
    fn test_mismatched_dependencies_are_reported() {
        let mut index = index_with(&[("a.ts", &["b.ts"]), ("b.ts", &[])]);
        index.files.get_mut("a.ts").unwrap().dependencies.clear();
        assert_eq!(
            index.check_invariants(),
            vec![InvariantViolation::DependenciesMismatch("a.ts".to_string())]
        );
    }

    #[test]
    fn test_filter_options_serialization() {
        let filters = FilterOptions::new(["src/**"], ["**/*.test.*"]);
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(json, r#"{"include":["src/**"],"exclude":["**/*.test.*"]}"#);
        let empty: FilterOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, FilterOptions::default());
    }

    #[test]
    fn test_metadata_touch() {
        let mut metadata = IndexMetadata::new(PathBuf::from("/test"), FilterOptions::default());
        let original = metadata.updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        metadata.touch();

        assert!(metadata.updated_at > original);
        assert_eq!(metadata.created_at, original);
        assert_eq!(metadata.version, SCHEMA_VERSION);
    }
}
