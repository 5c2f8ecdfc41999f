//! Pattern engine: validation, compilation, caching and evaluation of
//! include/exclude rules.
//!
//! A path is a member of the index when it is *included* (supported
//! extension, and matches an include pattern if any are given) and not
//! *excluded* (exclude pattern, root `.gitignore`, or a built-in directory).
//! Exclusion is evaluated after inclusion and always wins.

mod cache;
mod compiled;
mod ignore_rules;
mod validate;

pub use cache::{CacheStats, PatternCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
pub use compiled::{CompiledPatterns, PatternKey};
pub use ignore_rules::{
    in_builtin_excluded_dir, is_builtin_excluded_dir, IgnoreRules, BUILTIN_EXCLUDED_DIRS,
};
pub use validate::{
    normalize_pattern, MAX_GLOBSTARS, MAX_GROUP_DEPTH, MAX_PATTERNS_PER_LIST, MAX_PATTERN_LEN,
};

use crate::scanner::is_supported;
use crate::{FilterOptions, IndexerError};
use std::path::Path;
use std::sync::Arc;

/// Outcome of evaluating one relative path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Included and not excluded
    Member,
    /// Unsupported extension, or no include pattern matched
    NotIncluded,
    /// Included, then removed by an exclude pattern or ignore rule
    Excluded,
}

/// Evaluates candidate paths for one project root and filter set.
#[derive(Debug, Clone)]
pub struct PathFilter {
    patterns: Arc<CompiledPatterns>,
    ignore: IgnoreRules,
}

impl PathFilter {
    /// Validates and compiles `filters` (through the cache) and loads the
    /// root ignore rules.
    pub fn new(
        root: &Path,
        filters: &FilterOptions,
        cache: &PatternCache,
    ) -> Result<Self, IndexerError> {
        Ok(Self {
            patterns: cache.get_or_compile(filters)?,
            ignore: IgnoreRules::load(root),
        })
    }

    pub fn patterns(&self) -> &CompiledPatterns {
        &self.patterns
    }

    pub fn ignore_rules(&self) -> &IgnoreRules {
        &self.ignore
    }

    /// Evaluate a project-relative, `/`-separated file path.
    pub fn evaluate(&self, rel_path: &str) -> Membership {
        if !is_supported(rel_path) || !self.patterns.matches_include(rel_path) {
            return Membership::NotIncluded;
        }
        if self.patterns.matches_exclude(rel_path) || self.ignore.is_ignored(rel_path) {
            return Membership::Excluded;
        }
        Membership::Member
    }

    pub fn admits(&self, rel_path: &str) -> bool {
        self.evaluate(rel_path) == Membership::Member
    }

    /// Whether the walk may skip a whole directory. Only ignore rules prune;
    /// exclude patterns are checked per file.
    pub fn prunes_dir(&self, rel_dir: &str) -> bool {
        self.ignore.is_dir_ignored(rel_dir)
    }
}
