//! Index-based file table.
//!
//! During a scan every discovered path gets a dense [`FileId`]. Workers
//! share the table read-only; edges are collected as id pairs and only
//! turned back into path strings by the reducer.

use std::collections::HashMap;

/// Position of a file in a [`FileTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read-only membership test over a set of project-relative paths.
pub trait KnownFiles: Sync {
    /// Id of `path` if it is a known file.
    fn lookup(&self, path: &str) -> Option<FileId>;

    /// Path of a previously looked-up id.
    fn path_of(&self, id: FileId) -> &str;

    fn has_file(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }
}

/// Sorted, deduplicated paths with O(1) lookup.
#[derive(Debug, Clone, Default)]
pub struct FileTable {
    paths: Vec<String>,
    ids: HashMap<String, FileId>,
}

impl FileTable {
    /// Builds a table; input is sorted and deduplicated here.
    pub fn new(mut paths: Vec<String>) -> Self {
        paths.sort();
        paths.dedup();

        let ids = paths
            .iter()
            .enumerate()
            .map(|(i, p)| (p.clone(), FileId(i as u32)))
            .collect();

        Self { paths, ids }
    }

    pub fn path(&self, id: FileId) -> &str {
        &self.paths[id.index()]
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }
}

impl KnownFiles for FileTable {
    fn lookup(&self, path: &str) -> Option<FileId> {
        self.ids.get(path).copied()
    }

    fn path_of(&self, id: FileId) -> &str {
        self.path(id)
    }
}

/// A sorted slice (such as `ProjectIndex::nodes`) answers membership by
/// binary search, so updates do not rebuild a hash table.
impl KnownFiles for [String] {
    fn lookup(&self, path: &str) -> Option<FileId> {
        self.binary_search_by(|p| p.as_str().cmp(path))
            .ok()
            .map(|i| FileId(i as u32))
    }

    fn path_of(&self, id: FileId) -> &str {
        &self[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorts_and_dedups() {
        let table = FileTable::new(vec![
            "b.ts".to_string(),
            "a.ts".to_string(),
            "b.ts".to_string(),
        ]);
        assert_eq!(table.paths(), &["a.ts".to_string(), "b.ts".to_string()]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_lookup() {
        let table = FileTable::new(vec!["src/x.ts".to_string(), "a.ts".to_string()]);
        let id = table.lookup("src/x.ts").unwrap();
        assert_eq!(table.path(id), "src/x.ts");
        assert!(!table.has_file("src/y.ts"));
    }

    #[test]
    fn test_sorted_slice_lookup() {
        let nodes = vec!["a.ts".to_string(), "b/index.ts".to_string(), "c.js".to_string()];
        let known: &[String] = &nodes;
        assert!(known.has_file("b/index.ts"));
        assert!(!known.has_file("b.ts"));
        let id = known.lookup("c.js").unwrap();
        assert_eq!(id.index(), 2);
        assert_eq!(known.path_of(id), "c.js");
    }
}
