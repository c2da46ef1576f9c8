use std::hash::Hash;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Fixed-capacity LRU map over decoded records. Capacity is set at
/// construction and never resized; recency updates on both hit and
/// insert.
pub(crate) struct RecordCache<K: Hash + Eq, V> {
    inner: LruCache<K, V>,
}

impl<K: Hash + Eq, V> RecordCache<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity =
            NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).expect("1 is non-zero"));
        Self {
            inner: LruCache::new(capacity),
        }
    }

    /// Look up a key, promoting it to most-recently-used on hit.
    pub(crate) fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    /// Membership check without a recency update.
    pub(crate) fn contains(&self, key: &K) -> bool {
        self.inner.contains(key)
    }

    /// Insert as most-recently-used, returning the entry evicted by the
    /// LRU policy when the cache was full (or the displaced value when
    /// the key was already present).
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        self.inner.push(key, value)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}
