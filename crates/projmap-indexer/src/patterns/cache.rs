//! Process-wide cache of compiled pattern sets.

use super::compiled::{CompiledPatterns, PatternKey};
use crate::{FilterOptions, IndexerError};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default number of compiled pattern sets kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Default time-to-live of a cached entry.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    patterns: Arc<CompiledPatterns>,
    inserted: Instant,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// LRU + TTL cache of compiled include/exclude matchers.
///
/// Lookups and inserts hold the lock briefly; compilation runs outside it.
/// Two threads missing on the same key may both compile; the later insert
/// wins and both get equivalent matchers.
pub struct PatternCache {
    entries: Mutex<LruCache<PatternKey, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl PatternCache {
    /// Create a cache. A zero capacity is raised to one.
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Validate, then return the compiled matchers for `filters`.
    pub fn get_or_compile(
        &self,
        filters: &FilterOptions,
    ) -> Result<Arc<CompiledPatterns>, IndexerError> {
        let key = PatternKey::from_filters(filters)?;

        if let Some(found) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(found);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let compiled = Arc::new(CompiledPatterns::compile(key.clone())?);
        debug!(
            include = key.include.len(),
            exclude = key.exclude.len(),
            "Compiled pattern set"
        );

        self.entries.lock().put(
            key,
            CacheEntry {
                patterns: Arc::clone(&compiled),
                inserted: Instant::now(),
            },
        );
        Ok(compiled)
    }

    fn lookup(&self, key: &PatternKey) -> Option<Arc<CompiledPatterns>> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.inserted.elapsed() < self.ttl => {
                return Some(Arc::clone(&entry.patterns));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.lock().len(),
        }
    }
}

impl Default for PatternCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

impl std::fmt::Debug for PatternCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCache")
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish()
    }
}
