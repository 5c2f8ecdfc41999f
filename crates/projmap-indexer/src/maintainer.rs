//! Index maintenance: full scans and single-file incremental updates.
//!
//! A full scan runs discovery, then extraction on a bounded rayon pool in
//! batches, then resolution as a second parallel pass against the complete
//! file table. A single-threaded reducer assembles `files` and `edges`.
//! An update touches exactly one file's record and outgoing edge block.

use crate::config::IndexerConfig;
use crate::extract::{Extraction, Extractor};
use crate::index::{
    outgoing_range, Edge, FileRecord, FileTable, IndexMetadata, ProjectIndex,
};
use crate::patterns::{PathFilter, PatternCache};
use crate::progress::{emit, ProgressEvent, ProgressSink};
use crate::resolve::{normalize, DependencyResolver};
use crate::scanner::{relative_path, Scanner};
use crate::tree::{root_name, TreeBuilder};
use crate::{FilterOptions, IndexWarning, IndexerError};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of a full scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub index: ProjectIndex,
    /// Discovery and per-file warnings, in that order
    pub warnings: Vec<IndexWarning>,
    pub duration_ms: u64,
}

/// What an update did to the target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    /// File was not indexed and now is
    Added,
    /// File was indexed and its record was rebuilt
    Replaced,
    /// File was indexed and is now absent or filtered out
    Removed,
    /// File is absent or filtered out and was not indexed
    NotIndexed,
}

/// Result of an incremental update.
#[derive(Debug, Clone)]
pub struct UpdateOutcome {
    /// Project-relative path of the target
    pub path: String,
    pub action: UpdateAction,
    pub warnings: Vec<IndexWarning>,
}

/// Builds and maintains project indexes.
pub struct IndexMaintainer {
    config: IndexerConfig,
    cache: Arc<PatternCache>,
    extractor: Extractor,
}

impl IndexMaintainer {
    /// Create a maintainer with its own pattern cache.
    pub fn new(config: IndexerConfig) -> Self {
        let cache = Arc::new(config.pattern_cache());
        Self::with_cache(config, cache)
    }

    /// Create a maintainer sharing an existing pattern cache.
    pub fn with_cache(config: IndexerConfig, cache: Arc<PatternCache>) -> Self {
        Self {
            config,
            cache,
            extractor: Extractor::new(),
        }
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    pub fn cache(&self) -> &PatternCache {
        &self.cache
    }

    /// Build a complete index of `root`.
    pub fn scan(
        &self,
        root: &Path,
        filters: &FilterOptions,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ScanOutcome, IndexerError> {
        let start = Instant::now();

        // Patterns are validated before anything touches the tree.
        let filter = PathFilter::new(root, filters, &self.cache)?;
        let discovery = Scanner::new()
            .strict_patterns(self.config.strict_patterns)
            .discover(root, &filter)?;
        let root = discovery.root;
        let mut warnings = discovery.warnings;

        info!(path = ?root, files = discovery.files.len(), "Starting scan");
        emit(
            progress,
            ProgressEvent::DiscoveryComplete {
                files: discovery.files.len(),
            },
        );

        let table = FileTable::new(discovery.files);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads())
            .build()
            .map_err(|e| IndexerError::WorkerPool(e.to_string()))?;

        // Extraction, batch by batch.
        let total = table.len();
        let mut extractions: Vec<Extraction> = Vec::with_capacity(total);
        for batch in table.paths().chunks(self.config.batch_size.max(1)) {
            let results: Vec<Extraction> = pool.install(|| {
                batch
                    .par_iter()
                    .map(|path| self.extract_file(&root, path))
                    .collect()
            });
            extractions.extend(results);
            emit(
                progress,
                ProgressEvent::Parsed {
                    done: extractions.len(),
                    total,
                },
            );
        }

        // Resolution against the complete, read-only table.
        let resolver = DependencyResolver::new(&table);
        let resolved: Vec<Vec<_>> = pool.install(|| {
            table
                .paths()
                .par_iter()
                .zip(extractions.par_iter())
                .map(|(path, extraction)| resolver.resolve_ids(path, &extraction.record.imports))
                .collect()
        });

        // Single-threaded reduction. Paths are sorted and each dependency
        // list is sorted, so edges come out ordered by (from, to).
        let mut files = BTreeMap::new();
        let mut edges = Vec::new();
        for ((path, extraction), deps) in table.paths().iter().zip(extractions).zip(resolved) {
            let Extraction {
                mut record,
                warning,
            } = extraction;

            record.dependencies = deps
                .into_iter()
                .map(|id| table.path(id).to_string())
                .collect();
            edges.extend(
                record
                    .dependencies
                    .iter()
                    .map(|dep| Edge::new(path.as_str(), dep.as_str())),
            );
            if let Some(warning) = warning {
                warn!(%warning, "Degraded file");
                warnings.push(warning);
            }
            files.insert(path.clone(), record);
        }
        emit(
            progress,
            ProgressEvent::ResolutionComplete { edges: edges.len() },
        );

        let nodes = table.into_paths();
        let tree = TreeBuilder::new(root_name(&root)).build(&nodes);
        emit(progress, ProgressEvent::TreeBuilt { nodes: nodes.len() });

        let mut metadata = IndexMetadata::new(root, filters.clone());
        metadata.total_files = nodes.len();

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(
            files = nodes.len(),
            edges = edges.len(),
            warnings = warnings.len(),
            duration_ms,
            "Scan complete"
        );

        Ok(ScanOutcome {
            index: ProjectIndex {
                metadata,
                tree,
                nodes,
                edges,
                files,
            },
            warnings,
            duration_ms,
        })
    }

    /// Re-index one file of an existing index.
    ///
    /// `target` may be absolute or relative to the index root. Only the
    /// target's record and outgoing edges change; edges from other files
    /// into a removed target are kept (see [`ProjectIndex::dangling_edges`]).
    pub fn update(
        &self,
        index: &mut ProjectIndex,
        target: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<UpdateOutcome, IndexerError> {
        let root = index.metadata.root_path.clone();
        let rel = target_relative(&root, target)?;
        let filter = PathFilter::new(&root, &index.metadata.filters, &self.cache)?;

        let on_disk = std::fs::symlink_metadata(root.join(&rel))
            .map(|m| m.file_type().is_file())
            .unwrap_or(false);
        let admitted = on_disk && filter.admits(&rel);
        debug!(path = %rel, on_disk, admitted, "Updating file");

        let mut warnings = Vec::new();
        let action = if admitted {
            let Extraction { record, warning } = self.extract_file(&root, &rel);
            if let Some(warning) = warning {
                warn!(%warning, "Degraded file");
                warnings.push(warning);
            }
            let action = insert_node(&mut index.nodes, &rel);
            self.apply_record(index, &rel, record);
            action
        } else if index.files.remove(&rel).is_some() {
            if let Ok(pos) = index.nodes.binary_search(&rel) {
                index.nodes.remove(pos);
            }
            let range = outgoing_range(&index.edges, &rel);
            index.edges.drain(range);
            UpdateAction::Removed
        } else {
            UpdateAction::NotIndexed
        };

        if action != UpdateAction::NotIndexed {
            index.tree = TreeBuilder::new(root_name(&root)).build(&index.nodes);
            emit(
                progress,
                ProgressEvent::TreeBuilt {
                    nodes: index.nodes.len(),
                },
            );
        }
        index.metadata.total_files = index.nodes.len();
        index.metadata.touch();

        info!(path = %rel, ?action, "Update applied");
        emit(progress, ProgressEvent::UpdateApplied { path: rel.clone() });

        Ok(UpdateOutcome {
            path: rel,
            action,
            warnings,
        })
    }

    /// Resolve `record` against the current nodes and splice it and its
    /// outgoing edge block into the index.
    fn apply_record(&self, index: &mut ProjectIndex, rel: &str, mut record: FileRecord) {
        let resolver = DependencyResolver::new(index.nodes.as_slice());
        record.dependencies = resolver.resolve(rel, &record.imports);

        let range = outgoing_range(&index.edges, rel);
        let block: Vec<Edge> = record
            .dependencies
            .iter()
            .map(|dep| Edge::new(rel, dep.as_str()))
            .collect();
        index.edges.splice(range, block);
        index.files.insert(rel.to_string(), record);
    }

    /// Read and extract one file. Failures degrade to an empty record.
    fn extract_file(&self, root: &Path, rel: &str) -> Extraction {
        match read_source(&root.join(rel), rel, self.config.max_file_size) {
            Ok(source) => self.extractor.extract(rel, &source),
            Err(warning) => Extraction {
                record: FileRecord::default(),
                warning: Some(warning),
            },
        }
    }
}

impl Default for IndexMaintainer {
    fn default() -> Self {
        Self::new(IndexerConfig::default())
    }
}

/// Insert `rel` into sorted `nodes`; reports whether it was new.
fn insert_node(nodes: &mut Vec<String>, rel: &str) -> UpdateAction {
    match nodes.binary_search_by(|n| n.as_str().cmp(rel)) {
        Ok(_) => UpdateAction::Replaced,
        Err(pos) => {
            nodes.insert(pos, rel.to_string());
            UpdateAction::Added
        }
    }
}

fn read_source(path: &Path, rel: &str, max_size: u64) -> Result<String, IndexWarning> {
    let read_failed = |message: String| IndexWarning::ReadFailed {
        path: rel.to_string(),
        message,
    };

    let size = std::fs::metadata(path)
        .map_err(|e| read_failed(e.to_string()))?
        .len();
    if size > max_size {
        return Err(IndexWarning::FileTooLarge {
            path: rel.to_string(),
            size,
            limit: max_size,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| read_failed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| read_failed("invalid UTF-8".to_string()))
}

/// Project-relative form of an update target.
fn target_relative(root: &Path, target: &Path) -> Result<String, IndexerError> {
    let outside = || IndexerError::OutsideRoot {
        path: target.to_path_buf(),
        root: root.to_path_buf(),
    };

    // Relative targets are resolved lexically; `..` may not climb above
    // the root.
    if !target.is_absolute() {
        let text = target.to_str().ok_or_else(outside)?.replace('\\', "/");
        return normalize("", &text)
            .filter(|rel| !rel.is_empty())
            .ok_or_else(outside);
    }
    if let Some(rel) = relative_path(root, target) {
        return Ok(rel);
    }

    // The root is canonical; retry with a canonical target, or with a
    // canonical parent when the target itself was deleted.
    let canonical = match target.canonicalize() {
        Ok(path) => Some(path),
        Err(_) => canonical_via_parent(target),
    };
    canonical
        .and_then(|path| relative_path(root, &path))
        .ok_or_else(outside)
}

fn canonical_via_parent(target: &Path) -> Option<PathBuf> {
    let parent = target.parent()?.canonicalize().ok()?;
    Some(parent.join(target.file_name()?))
}
