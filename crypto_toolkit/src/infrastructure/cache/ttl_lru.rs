// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # L1 Cache
//!
//! Recency-ordered in-process cache with per-entry TTL and a synchronous
//! eviction callback. Built on the `lru` crate's ordered map.
//!
//! ## Semantics
//!
//! - `get` refreshes recency; an expired entry is treated as absent and
//!   removed lazily, without firing the eviction callback
//! - `set` over capacity evicts the least-recently-used live entry and
//!   fires the callback synchronously (the adaptive manager demotes the
//!   victim to L2 from that callback)
//! - `sweep` purges every expired entry; callers drive it periodically

use lru::LruCache;
use parking_lot::Mutex;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

type EvictFn<K, V> = Box<dyn Fn(&K, &V) + Send + Sync>;

/// LRU cache with TTL and eviction notification.
pub struct TtlLruCache<K: Hash + Eq + Clone, V: Clone> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    on_evict: Option<EvictFn<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> TtlLruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self::with_evict_hook(capacity, None)
    }

    pub fn with_evict_hook(capacity: usize, on_evict: Option<EvictFn<K, V>>) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("max(1) is non-zero");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            on_evict,
        }
    }

    /// Looks up a key, refreshing its recency. Expired entries are removed
    /// and reported as absent.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.pop(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    /// Inserts or updates a key. Over capacity, the least-recently-used
    /// entry is evicted and the callback fires before this call returns.
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) {
        let entry = Entry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        let evicted = {
            let mut entries = self.entries.lock();
            match entries.push(key.clone(), entry) {
                // push returns the displaced LRU pair; the same key coming
                // back means an update, not an eviction.
                Some((old_key, old_entry)) if old_key != key => Some((old_key, old_entry)),
                _ => None,
            }
        };
        if let (Some((key, entry)), Some(hook)) = (evicted, self.on_evict.as_ref()) {
            hook(&key, &entry.value);
        }
    }

    pub fn delete(&self, key: &K) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Purges expired entries eagerly, returning how many were removed.
    /// TTL expiry does not fire the eviction callback.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let expired: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Live entries in most-recent-first order, with their remaining TTLs.
    /// Used by the adaptive manager when rebuilding at a new capacity.
    pub fn snapshot_by_recency(&self) -> Vec<(K, V, Option<Duration>)> {
        let now = Instant::now();
        self.entries
            .lock()
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| {
                let remaining = entry.expires_at.map(|at| at.saturating_duration_since(now));
                (key.clone(), entry.value.clone(), remaining)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Tests basic set/get and the LRU eviction order.
    ///
    /// Validates that:
    /// - `set` then `get` returns the value
    /// - Inserting `capacity + 1` distinct keys evicts exactly one entry
    /// - The victim is the least recently accessed key
    #[test]
    fn test_lru_eviction_order() {
        let cache: TtlLruCache<&str, i32> = TtlLruCache::new(2);
        cache.set("a", 1, None);
        cache.set("b", 2, None);
        assert_eq!(cache.get(&"a"), Some(1)); // refresh "a"
        cache.set("c", 3, None);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"b"), None, "least recently used evicted");
        assert_eq!(cache.get(&"a"), Some(1));
        assert_eq!(cache.get(&"c"), Some(3));
    }

    /// Tests that the eviction callback fires synchronously on capacity
    /// eviction and not on update.
    #[test]
    fn test_eviction_callback() {
        let evictions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&evictions);
        let cache: TtlLruCache<&str, i32> =
            TtlLruCache::with_evict_hook(1, Some(Box::new(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })));

        cache.set("a", 1, None);
        cache.set("a", 2, None); // update, no eviction
        assert_eq!(evictions.load(Ordering::SeqCst), 0);
        cache.set("b", 3, None);
        assert_eq!(evictions.load(Ordering::SeqCst), 1);
    }

    /// Tests TTL expiry: lazy on get, eager on sweep, no callback.
    #[test]
    fn test_ttl_expiry() {
        let evictions = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&evictions);
        let cache: TtlLruCache<&str, i32> =
            TtlLruCache::with_evict_hook(8, Some(Box::new(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            })));

        cache.set("gone", 1, Some(Duration::from_millis(0)));
        cache.set("kept", 2, Some(Duration::from_secs(600)));
        std::thread::sleep(Duration::from_millis(5));

        assert_eq!(cache.get(&"gone"), None);
        assert_eq!(cache.get(&"kept"), Some(2));

        cache.set("gone2", 3, Some(Duration::from_millis(0)));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.sweep(), 1);
        assert_eq!(evictions.load(Ordering::SeqCst), 0, "TTL expiry never fires the hook");
    }

    #[test]
    fn test_snapshot_by_recency_orders_mru_first() {
        let cache: TtlLruCache<&str, i32> = TtlLruCache::new(4);
        cache.set("a", 1, None);
        cache.set("b", 2, None);
        cache.set("c", 3, None);
        cache.get(&"a");

        let keys: Vec<&str> = cache.snapshot_by_recency().into_iter().map(|(k, _, _)| k).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
    }
}
