//! In-memory snapshot cache keyed by source and fetch parameters.
//!
//! Bounded: holds at most `capacity` snapshots and evicts the least
//! recently used key on overflow. Snapshots are never mutated after
//! insertion; a key change means a different entry.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::debug;

use super::provider::SourceKind;
use crate::domain::{FetchParams, Snapshot};

pub const DEFAULT_CAPACITY: usize = 8;

/// Cache key: which source, which parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: SourceKind,
    pub params: FetchParams,
}

impl CacheKey {
    pub fn new(source: SourceKind, params: FetchParams) -> Self {
        Self { source, params }
    }
}

/// Hit/miss/eviction counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// The snapshot cache.
#[derive(Debug)]
pub struct SnapshotCache {
    capacity: usize,
    entries: HashMap<CacheKey, Arc<Snapshot>>,
    /// Front = least recently used.
    recency: VecDeque<CacheKey>,
    stats: CacheStats,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl SnapshotCache {
    /// Create a cache; capacity is raised to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
            stats: CacheStats::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Look up a snapshot and mark it most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<Snapshot>> {
        match self.entries.get(key).cloned() {
            Some(snapshot) => {
                self.stats.hits += 1;
                self.touch(key);
                Some(snapshot)
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Insert (or replace) a snapshot, evicting the oldest entry if full.
    pub fn insert(&mut self, key: CacheKey, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        if self.entries.insert(key, Arc::clone(&snapshot)).is_some() {
            self.touch(&key);
        } else {
            self.recency.push_back(key);
            while self.entries.len() > self.capacity {
                let Some(oldest) = self.recency.pop_front() else {
                    break;
                };
                self.entries.remove(&oldest);
                self.stats.evictions += 1;
                debug!(params = %oldest.params, source = %oldest.source, "evicted snapshot");
            }
        }
        snapshot
    }

    /// Return the cached snapshot or run `load` and cache its result.
    ///
    /// A failed load inserts nothing.
    pub fn get_or_try_insert_with<E, F>(&mut self, key: CacheKey, load: F) -> Result<Arc<Snapshot>, E>
    where
        F: FnOnce() -> Result<Snapshot, E>,
    {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let snapshot = load()?;
        Ok(self.insert(key, snapshot))
    }

    /// Drop one entry. Returns true if it existed.
    pub fn invalidate(&mut self, key: &CacheKey) -> bool {
        let existed = self.entries.remove(key).is_some();
        if existed {
            self.recency.retain(|k| k != key);
        }
        existed
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            self.recency.remove(pos);
        }
        self.recency.push_back(*key);
    }
}
