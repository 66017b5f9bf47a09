//! Bounded memoization cache for service read paths.
//!
//! Entries are keyed by the arguments of the memoized call and evicted
//! least-recently-used once `capacity` is exceeded. Nothing expires on its
//! own; writers invalidate explicitly.

use moka::future::Cache;
use moka::policy::EvictionPolicy;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use crate::observability::Metrics;

/// A named, capacity-bounded memo table owned by one service instance
#[derive(Clone)]
pub struct MemoCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    name: &'static str,
    capacity: u64,
    entries: Cache<K, V>,
    metrics: Option<Arc<Metrics>>,
}

impl<K, V> MemoCache<K, V>
where
    K: Hash + Eq + Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str, capacity: u64) -> Self {
        let entries = Cache::builder()
            .name(name)
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            name,
            capacity,
            entries,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Approximate entry count; exact after `run_pending_tasks`
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Return the cached value for `key`, or run `load` and cache its result.
    ///
    /// Failed loads are not cached. Concurrent misses on the same key each run
    /// `load`; the last one to finish wins.
    pub async fn get_or_try_load<F, Fut, E>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.entries.get(&key).await {
            tracing::debug!(cache = self.name, key = ?key, "Cache hit");
            self.record_lookup(true);
            return Ok(value);
        }

        tracing::debug!(cache = self.name, key = ?key, "Cache miss");
        self.record_lookup(false);

        let value = load().await?;
        self.entries.insert(key, value.clone()).await;

        if let Some(metrics) = &self.metrics {
            metrics.set_cache_entries(self.name, self.entries.entry_count());
        }

        Ok(value)
    }

    /// Drop a single entry
    pub async fn invalidate(&self, key: &K) {
        self.entries.invalidate(key).await;
        tracing::debug!(cache = self.name, key = ?key, "Cache entry invalidated");

        if let Some(metrics) = &self.metrics {
            metrics.record_cache_invalidation(self.name, "key");
        }
    }

    /// Drop every entry
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
        tracing::debug!(cache = self.name, "Cache cleared");

        if let Some(metrics) = &self.metrics {
            metrics.record_cache_invalidation(self.name, "all");
            metrics.set_cache_entries(self.name, 0);
        }
    }

    /// Apply pending evictions and invalidations so counts are exact
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }

    fn record_lookup(&self, hit: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_cache_lookup(self.name, hit);
        }
    }
}
