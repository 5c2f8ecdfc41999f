//! Compiled include/exclude matchers.

use super::validate::{check_list_len, normalize_pattern};
use crate::{FilterOptions, IndexerError};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Normalized, sorted, deduplicated pattern sets. Two filter options that
/// differ only in order or duplicates produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternKey {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl PatternKey {
    /// Validates every pattern and builds the key.
    pub fn from_filters(filters: &FilterOptions) -> Result<Self, IndexerError> {
        check_list_len("include", &filters.include)?;
        check_list_len("exclude", &filters.exclude)?;

        Ok(Self {
            include: normalize_list(&filters.include)?,
            exclude: normalize_list(&filters.exclude)?,
        })
    }
}

fn normalize_list(patterns: &[String]) -> Result<Vec<String>, IndexerError> {
    let mut out = patterns
        .iter()
        .map(|p| normalize_pattern(p))
        .collect::<Result<Vec<_>, _>>()?;
    out.sort();
    out.dedup();
    Ok(out)
}

/// Glob matchers for one pattern key.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    include: Option<GlobSet>,
    exclude: GlobSet,
    key: PatternKey,
}

impl CompiledPatterns {
    pub fn compile(key: PatternKey) -> Result<Self, IndexerError> {
        let include = if key.include.is_empty() {
            None
        } else {
            Some(build_set(&key.include)?)
        };
        let exclude = build_set(&key.exclude)?;

        Ok(Self {
            include,
            exclude,
            key,
        })
    }

    pub fn key(&self) -> &PatternKey {
        &self.key
    }

    pub fn has_includes(&self) -> bool {
        self.include.is_some()
    }

    /// True when there are no include patterns or one of them matches.
    pub fn matches_include(&self, rel_path: &str) -> bool {
        self.include
            .as_ref()
            .map_or(true, |set| set.is_match(rel_path))
    }

    pub fn matches_exclude(&self, rel_path: &str) -> bool {
        self.exclude.is_match(rel_path)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, IndexerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // Slash-free patterns match at any depth, as in ignore files.
        let anchored = if pattern.contains('/') || pattern == "**" {
            pattern.clone()
        } else {
            format!("**/{pattern}")
        };
        let glob = GlobBuilder::new(&anchored)
            .literal_separator(true)
            .build()
            .map_err(|e| IndexerError::invalid_pattern(pattern.as_str(), e.kind().to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| IndexerError::invalid_pattern(patterns.join(", "), e.to_string()))
}
