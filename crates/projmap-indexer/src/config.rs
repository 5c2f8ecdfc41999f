//! Indexer configuration.

use crate::patterns::{PatternCache, DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL};
use crate::IndexerError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tunables for the worker pool, pattern cache and warnings policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Files handed to the worker pool per batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Worker threads (0 = available parallelism)
    #[serde(default)]
    pub threads: usize,

    /// Files larger than this many bytes are not parsed (default: 2MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Compiled pattern sets kept in the cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Seconds a compiled pattern set stays valid
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Treat pattern-effectiveness warnings as errors
    #[serde(default)]
    pub strict_patterns: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_batch_size() -> usize {
    256
}

fn default_max_file_size() -> u64 {
    2 * 1024 * 1024 // 2MB
}

fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Directory holding the user configuration.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".projmap")
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            threads: 0,
            max_file_size: default_max_file_size(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
            strict_patterns: false,
            log_level: default_log_level(),
        }
    }
}

impl IndexerConfig {
    /// Load `~/.projmap/config.yaml`, falling back to defaults
    pub fn load() -> Self {
        let config_path = config_dir().join("config.yaml");

        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!(path = ?config_path, error = %e, "Failed to load config file");
                }
            }
        }

        Self::default()
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, IndexerError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IndexerError> {
        if self.batch_size == 0 {
            return Err(IndexerError::Config("batch_size must be at least 1".to_string()));
        }
        if self.max_file_size == 0 {
            return Err(IndexerError::Config("max_file_size must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// A pattern cache sized by this configuration.
    pub fn pattern_cache(&self) -> PatternCache {
        PatternCache::new(self.cache_capacity, self.cache_ttl())
    }

    /// Worker threads to start.
    pub fn worker_threads(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}
