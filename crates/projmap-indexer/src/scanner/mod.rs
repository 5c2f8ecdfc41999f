//! File discovery.
//!
//! Walks a project root, applies the pattern engine, and returns a sorted
//! list of project-relative source paths together with any non-fatal
//! warnings.

mod language;
mod walker;

pub use language::{
    detect_dialect, is_supported, Dialect, INDEX_FILE_STEM, RESOLUTION_EXTENSIONS,
    SUPPORTED_EXTENSIONS,
};
pub use walker::{relative_path, WalkOutput, Walker};

use crate::patterns::{Membership, PathFilter};
use crate::{IndexWarning, IndexerError};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Result of discovering a project's files.
#[derive(Debug, Clone)]
pub struct Discovery {
    /// Canonical project root
    pub root: PathBuf,
    /// Sorted, unique, project-relative member paths
    pub files: Vec<String>,
    /// Walk errors and pattern-effectiveness warnings
    pub warnings: Vec<IndexWarning>,
}

/// Canonicalize a project root and check that it is a readable directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf, IndexerError> {
    let canonical = root
        .canonicalize()
        .map_err(|_| IndexerError::RootNotFound(root.to_path_buf()))?;

    if !canonical.is_dir() {
        return Err(IndexerError::RootNotFound(root.to_path_buf()));
    }
    std::fs::read_dir(&canonical).map_err(|source| IndexerError::RootUnreadable {
        path: canonical.clone(),
        source,
    })?;

    Ok(canonical)
}

/// The file discovery stage.
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    strict_patterns: bool,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Promote pattern-effectiveness warnings to errors.
    pub fn strict_patterns(mut self, strict: bool) -> Self {
        self.strict_patterns = strict;
        self
    }

    /// Discover the member files under `root`.
    pub fn discover(&self, root: &Path, filter: &PathFilter) -> Result<Discovery, IndexerError> {
        let start = Instant::now();
        let root = resolve_root(root)?;

        info!(path = ?root, "Starting discovery");

        let walked = Walker::new(&root, filter.ignore_rules().clone()).walk();
        debug!(count = walked.files.len(), "Files walked");

        let mut included = 0usize;
        let mut files = Vec::new();
        for path in walked.files {
            match filter.evaluate(&path) {
                Membership::Member => {
                    included += 1;
                    files.push(path);
                }
                Membership::Excluded => included += 1,
                Membership::NotIncluded => {}
            }
        }

        let mut warnings = walked.errors;
        for warning in &warnings {
            warn!(%warning, "Discovery");
        }

        if let Some(warning) = effectiveness_warning(filter, included, files.len()) {
            if self.strict_patterns {
                return Err(IndexerError::PatternEffectiveness(warning.to_string()));
            }
            warn!(%warning, "Pattern check");
            warnings.push(warning);
        }

        info!(
            files = files.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Discovery complete"
        );

        Ok(Discovery {
            root,
            files,
            warnings,
        })
    }
}

fn effectiveness_warning(
    filter: &PathFilter,
    included: usize,
    members: usize,
) -> Option<IndexWarning> {
    let patterns = filter.patterns();
    if patterns.has_includes() && included == 0 {
        return Some(IndexWarning::IncludeMatchedNothing {
            patterns: patterns.key().include.clone(),
        });
    }
    if included > 0 && members == 0 {
        return Some(IndexWarning::ExclusionRemovedAll { included });
    }
    None
}
