// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded memoization for resolved type descriptors.
//!
//! The cache ensures that type resolution for a given declared type happens
//! once; later conversions are served from memory. It is a pure cache: every
//! entry can be recomputed from the declaration alone, so eviction only
//! costs time, never correctness.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::RwLock;

use crate::descriptor::TypeDescriptor;

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy)]
pub struct LookupStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU-bounded concurrent cache for shape descriptors.
///
/// Once the capacity bound is reached, inserting a new entry evicts the
/// least-recently-used one.
pub struct DescriptorCache<K: Hash + Eq> {
    inner: RwLock<LruCache<K, Arc<TypeDescriptor>>>,
    stats: RwLock<LookupStats>,
}

impl<K: Hash + Eq> DescriptorCache<K> {
    /// Create a cache bounded to `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: RwLock::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN),
            )),
            stats: RwLock::new(LookupStats::default()),
        }
    }

    /// Return the cached descriptor for `key`, or resolve, store and return
    /// it. Resolution failures propagate unmodified and are not cached.
    pub fn get_or_resolve<E, F>(&self, key: K, resolve: F) -> Result<Arc<TypeDescriptor>, E>
    where
        F: FnOnce() -> Result<Arc<TypeDescriptor>, E>,
    {
        if let Some(hit) = self.try_peek(&key) {
            self.record_hit();
            return Ok(hit);
        }

        {
            let mut cache = self.inner.write();
            if let Some(hit) = cache.get(&key) {
                let hit = Arc::clone(hit);
                drop(cache);
                self.record_hit();
                return Ok(hit);
            }
        }

        // Resolution recurses back into this cache for nested named types,
        // so the lock must not be held while resolving. Two threads racing
        // on the same key both resolve; the results are identical and
        // immutable, so the second `put` is harmless.
        let resolved = resolve()?;
        self.inner.write().put(key, Arc::clone(&resolved));
        self.record_miss();
        Ok(resolved)
    }

    /// Whether `key` is currently cached (does not touch recency).
    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns `true` if the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Drop all cached entries. Later lookups recompute from declarations.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Snapshot of the hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> LookupStats {
        *self.stats.read()
    }

    fn try_peek(&self, key: &K) -> Option<Arc<TypeDescriptor>> {
        self.inner.read().peek(key).map(Arc::clone)
    }

    fn record_hit(&self) {
        let mut stats = self.stats.write();
        stats.hits = stats.hits.saturating_add(1);
    }

    fn record_miss(&self) {
        let mut stats = self.stats.write();
        stats.misses = stats.misses.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeKind;

    fn desc(name: &str) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor::new(name, TypeKind::Str))
    }

    #[test]
    fn miss_then_hit() {
        let cache: DescriptorCache<String> = DescriptorCache::new(4);
        let first = cache
            .get_or_resolve("a".to_string(), || Ok::<_, ()>(desc("a")))
            .unwrap();
        let second = cache
            .get_or_resolve("a".to_string(), || -> Result<_, ()> { panic!("must be cached") })
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn eviction_respects_capacity() {
        let cache: DescriptorCache<String> = DescriptorCache::new(2);
        for key in ["a", "b", "c"] {
            cache
                .get_or_resolve(key.to_string(), || Ok::<_, ()>(desc(key)))
                .unwrap();
        }
        assert_eq!(cache.len(), 2);
        // "a" is the least recently used entry and must have been evicted.
        assert!(!cache.contains(&"a".to_string()));
        assert!(cache.contains(&"b".to_string()));
        assert!(cache.contains(&"c".to_string()));
    }

    #[test]
    fn evicted_entries_are_recomputed() {
        let cache: DescriptorCache<String> = DescriptorCache::new(1);
        cache
            .get_or_resolve("a".to_string(), || Ok::<_, ()>(desc("a")))
            .unwrap();
        cache
            .get_or_resolve("b".to_string(), || Ok::<_, ()>(desc("b")))
            .unwrap();
        let recomputed = cache
            .get_or_resolve("a".to_string(), || Ok::<_, ()>(desc("a")))
            .unwrap();
        assert_eq!(recomputed.name, "a");
        assert_eq!(cache.stats().misses, 3);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache: DescriptorCache<String> = DescriptorCache::new(4);
        let err = cache.get_or_resolve("a".to_string(), || Err::<Arc<TypeDescriptor>, _>("boom"));
        assert_eq!(err.unwrap_err(), "boom");
        assert!(cache.is_empty());

        cache
            .get_or_resolve("a".to_string(), || Ok::<_, &str>(desc("a")))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache: DescriptorCache<String> = DescriptorCache::new(4);
        cache
            .get_or_resolve("a".to_string(), || Ok::<_, ()>(desc("a")))
            .unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
