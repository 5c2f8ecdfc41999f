//! Indexer error types.
//!
//! Everything in [`IndexerError`] is fatal for the operation that returned
//! it. Per-file problems are not errors; they travel as
//! [`IndexWarning`](crate::IndexWarning) values next to a successful result.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during indexing operations.
#[derive(Debug, Error)]
pub enum IndexerError {
    /// A filter pattern failed validation or compilation
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Too many patterns in a single include or exclude list
    #[error("Too many {list} patterns: {count} (limit {limit})")]
    TooManyPatterns {
        list: &'static str,
        count: usize,
        limit: usize,
    },

    /// Project root does not exist or is not a directory
    #[error("Project root not found: {0}")]
    RootNotFound(PathBuf),

    /// Project root exists but cannot be enumerated
    #[error("Project root is not readable: {path}: {source}")]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Update target lies outside the indexed project
    #[error("Path {path} is outside project root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// An update was requested but no index artifact exists
    #[error("Index not found: {0}")]
    IndexNotFound(PathBuf),

    /// Pattern-effectiveness warning promoted to an error by configuration
    #[error("Pattern check failed: {0}")]
    PatternEffectiveness(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The extraction worker pool could not be started
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// I/O error during file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl IndexerError {
    /// Shorthand for a rejected pattern.
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error belongs to the configuration class (bad input
    /// detected before any indexing work starts).
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPattern { .. }
                | Self::TooManyPatterns { .. }
                | Self::RootNotFound(_)
                | Self::RootUnreadable { .. }
                | Self::OutsideRoot { .. }
                | Self::IndexNotFound(_)
                | Self::PatternEffectiveness(_)
                | Self::Config(_)
        )
    }
}

impl From<serde_json::Error> for IndexerError {
    fn from(e: serde_json::Error) -> Self {
        IndexerError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for IndexerError {
    fn from(e: serde_yaml::Error) -> Self {
        IndexerError::Config(e.to_string())
    }
}
