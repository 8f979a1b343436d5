//! One source plus its snapshot cache.
//!
//! The single writer of the cache. A load is a cache hit or exactly one
//! blocking fetch; failures leave the cache untouched.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::cache::{CacheKey, CacheStats, SnapshotCache};
use super::provider::{DataError, MarketDataSource, SourceKind};
use crate::domain::{FetchParams, Snapshot};

pub struct MarketSession {
    source: Box<dyn MarketDataSource>,
    cache: SnapshotCache,
}

impl MarketSession {
    pub fn new(source: Box<dyn MarketDataSource>, cache_capacity: usize) -> Self {
        Self {
            source,
            cache: SnapshotCache::new(cache_capacity),
        }
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source.kind()
    }

    fn key(&self, params: &FetchParams) -> CacheKey {
        CacheKey::new(self.source.kind(), *params)
    }

    /// Cached snapshot for `params`, fetching it on a miss.
    pub fn load(&mut self, params: &FetchParams) -> Result<Arc<Snapshot>, DataError> {
        let key = self.key(params);
        let source = &self.source;
        let result = self.cache.get_or_try_insert_with(key, || source.fetch(params));
        match &result {
            Ok(snapshot) => debug!(%params, records = snapshot.len(), "snapshot ready"),
            Err(e) => warn!(%params, error = %e, "load failed"),
        }
        result
    }

    /// Drop the cached entry for `params` and fetch it again.
    pub fn refresh(&mut self, params: &FetchParams) -> Result<Arc<Snapshot>, DataError> {
        let key = self.key(params);
        if self.cache.invalidate(&key) {
            info!(%params, "invalidated cached snapshot");
        }
        self.load(params)
    }

    /// Whether a load for `params` would be served from memory.
    pub fn is_cached(&self, params: &FetchParams) -> bool {
        self.cache.contains(&self.key(params))
    }

    pub fn clear_cache(&mut self) {
        info!(entries = self.cache.len(), "clearing snapshot cache");
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
