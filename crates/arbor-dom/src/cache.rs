//! Bounded memo of query results.
//!
//! The tree does not change once built, so the answer to "which elements
//! under node N match X" can be reused. The cache is owned by the tree rather
//! than by individual nodes and holds at most `capacity` results, evicting the
//! least recently used one.
//!
//! All access goes through a mutex, so a `&DomTree` can be queried from many
//! threads at once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::NodeId;

/// What was asked of the subtree rooted at a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// A full selector string as passed to `query_selector_all`.
    Selector(String),
    /// `getElementsByTagName`
    TagName(String),
    /// `getElementsByClassName`
    ClassName(String),
}

type CacheKey = (NodeId, Lookup);

#[derive(Debug)]
struct CacheEntry {
    result: Vec<NodeId>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Monotonic counter stamped on every touch, for LRU ordering.
    clock: u64,
}

impl CacheState {
    const fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_least_recent(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_used)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            let _ = self.entries.remove(&key);
        }
    }
}

/// LRU cache of query results keyed by `(start node, lookup)`.
#[derive(Debug)]
pub struct QueryCache {
    capacity: usize,
    state: Mutex<CacheState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl QueryCache {
    /// Number of results kept when no capacity is given.
    pub const DEFAULT_CAPACITY: usize = 128;

    /// Create a cache with [`Self::DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a cache holding at most `capacity` results. Zero disables caching.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Maximum number of results kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    // The cache only ever holds complete results, so a panic in another
    // thread cannot leave a half-written entry behind.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a cached result, refreshing its recency on a hit.
    #[must_use]
    pub fn get(&self, node: NodeId, lookup: &Lookup) -> Option<Vec<NodeId>> {
        if self.capacity == 0 {
            return None;
        }
        let mut state = self.lock();
        let now = state.tick();
        let found = state
            .entries
            .get_mut(&(node, lookup.clone()))
            .map(|entry| {
                entry.last_used = now;
                entry.result.clone()
            });
        drop(state);

        let counter = if found.is_some() { &self.hits } else { &self.misses };
        let _ = counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Store a result, evicting the least recently used entry when full.
    pub fn insert(&self, node: NodeId, lookup: Lookup, result: Vec<NodeId>) {
        if self.capacity == 0 {
            return;
        }
        let mut state = self.lock();
        let now = state.tick();
        let key = (node, lookup);
        if !state.entries.contains_key(&key) && state.entries.len() >= self.capacity {
            state.evict_least_recent();
        }
        let _ = state.entries.insert(
            key,
            CacheEntry {
                result,
                last_used: now,
            },
        );
    }

    /// Return the cached result or compute, store and return it.
    ///
    /// `compute` runs without the lock held, so two threads racing on the same
    /// key may both compute; the results are identical and the later write wins.
    ///
    /// # Errors
    ///
    /// Propagates the error from `compute`; failed computations are not cached.
    pub fn get_or_try_insert_with<E>(
        &self,
        node: NodeId,
        lookup: Lookup,
        compute: impl FnOnce() -> Result<Vec<NodeId>, E>,
    ) -> Result<Vec<NodeId>, E> {
        if let Some(hit) = self.get(node, &lookup) {
            return Ok(hit);
        }
        let result = compute()?;
        self.insert(node, lookup, result.clone());
        Ok(result)
    }

    /// Infallible form of [`Self::get_or_try_insert_with`].
    pub fn get_or_insert_with(
        &self,
        node: NodeId,
        lookup: Lookup,
        compute: impl FnOnce() -> Vec<NodeId>,
    ) -> Vec<NodeId> {
        self.get_or_try_insert_with::<std::convert::Infallible>(node, lookup, || Ok(compute()))
            .unwrap_or_else(|never| match never {})
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    /// Number of cached results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from the cache.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that had to be computed.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str) -> Lookup {
        Lookup::TagName(name.to_string())
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = QueryCache::new();
        assert_eq!(cache.get(NodeId::ROOT, &tag("li")), None);
        cache.insert(NodeId::ROOT, tag("li"), vec![NodeId(3), NodeId(5)]);
        assert_eq!(
            cache.get(NodeId::ROOT, &tag("li")),
            Some(vec![NodeId(3), NodeId(5)])
        );
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_key_includes_start_node_and_lookup_kind() {
        let cache = QueryCache::new();
        cache.insert(NodeId(1), tag("a"), vec![NodeId(2)]);
        assert_eq!(cache.get(NodeId(4), &tag("a")), None);
        assert_eq!(
            cache.get(NodeId(1), &Lookup::ClassName("a".to_string())),
            None
        );
    }

    #[test]
    fn test_least_recently_used_is_evicted() {
        let cache = QueryCache::with_capacity(2);
        cache.insert(NodeId::ROOT, tag("a"), vec![NodeId(1)]);
        cache.insert(NodeId::ROOT, tag("b"), vec![NodeId(2)]);

        // Touch "a" so "b" becomes the oldest
        let _ = cache.get(NodeId::ROOT, &tag("a"));
        cache.insert(NodeId::ROOT, tag("c"), vec![NodeId(3)]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(NodeId::ROOT, &tag("a")).is_some());
        assert!(cache.get(NodeId::ROOT, &tag("b")).is_none());
        assert!(cache.get(NodeId::ROOT, &tag("c")).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = QueryCache::with_capacity(2);
        cache.insert(NodeId::ROOT, tag("a"), vec![NodeId(1)]);
        cache.insert(NodeId::ROOT, tag("b"), vec![NodeId(2)]);
        cache.insert(NodeId::ROOT, tag("a"), vec![NodeId(9)]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(NodeId::ROOT, &tag("a")), Some(vec![NodeId(9)]));
        assert!(cache.get(NodeId::ROOT, &tag("b")).is_some());
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let cache = QueryCache::with_capacity(0);
        cache.insert(NodeId::ROOT, tag("a"), vec![NodeId(1)]);
        assert!(cache.is_empty());
        assert_eq!(cache.get(NodeId::ROOT, &tag("a")), None);
    }

    #[test]
    fn test_failed_computation_is_not_cached() {
        let cache = QueryCache::new();
        let failed: Result<Vec<NodeId>, &str> =
            cache.get_or_try_insert_with(NodeId::ROOT, tag("x"), || Err("bad"));
        assert_eq!(failed, Err("bad"));
        assert!(cache.is_empty());

        let computed = cache.get_or_insert_with(NodeId::ROOT, tag("x"), || vec![NodeId(7)]);
        assert_eq!(computed, vec![NodeId(7)]);
        let again = cache.get_or_insert_with(NodeId::ROOT, tag("x"), Vec::new);
        assert_eq!(again, vec![NodeId(7)]);
    }

    #[test]
    fn test_clear() {
        let cache = QueryCache::new();
        cache.insert(NodeId::ROOT, tag("a"), vec![]);
        cache.clear();
        assert!(cache.is_empty());
    }
}
