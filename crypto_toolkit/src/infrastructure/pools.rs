// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Object and Buffer Pools
//!
//! Pooling for the toolkit's hot allocations: a parametric object pool with
//! factory and reset hooks, a power-of-two-bucketed byte buffer pool, and a
//! bounded LRU cache for Base64 encodings of frequently re-encoded byte
//! strings.
//!
//! ## Bookkeeping invariants
//!
//! - `released + in_use == acquired` at every observable instant
//! - a pool never retains more than `max_size` idle objects; surplus
//!   releases drop the object
//! - buffers that held sensitive bytes are zeroed by the release path
//!   before they re-enter the free list

use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use zeroize::Zeroize;

/// Pool observation counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub created: u64,
    pub acquired: u64,
    pub released: u64,
    #[serde(rename = "inUse")]
    pub in_use: u64,
    pub peak: u64,
    #[serde(rename = "maxSize")]
    pub max_size: usize,
}

/// Parametric pool with a factory, a reset hook, and a bounded free list.
pub struct ObjectPool<T> {
    factory: Box<dyn Fn() -> T + Send + Sync>,
    reset: Box<dyn Fn(&mut T) + Send + Sync>,
    free: Mutex<Vec<T>>,
    max_size: usize,
    created: AtomicU64,
    acquired: AtomicU64,
    released: AtomicU64,
    peak: AtomicU64,
}

impl<T> ObjectPool<T> {
    /// Creates a pool. `reset` runs on every release before the object
    /// re-enters the free list; it is the place to scrub sensitive state.
    pub fn new(
        max_size: usize,
        factory: impl Fn() -> T + Send + Sync + 'static,
        reset: impl Fn(&mut T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            factory: Box::new(factory),
            reset: Box::new(reset),
            free: Mutex::new(Vec::new()),
            max_size,
            created: AtomicU64::new(0),
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            peak: AtomicU64::new(0),
        }
    }

    /// Takes an object from the free list, constructing one when empty.
    pub fn acquire(&self) -> T {
        let object = {
            let mut free = self.free.lock();
            free.pop()
        };
        let object = match object {
            Some(object) => object,
            None => {
                self.created.fetch_add(1, Ordering::Relaxed);
                (self.factory)()
            }
        };
        let acquired = self.acquired.fetch_add(1, Ordering::Relaxed) + 1;
        let in_use = acquired - self.released.load(Ordering::Relaxed);
        self.peak.fetch_max(in_use, Ordering::Relaxed);
        object
    }

    /// Resets the object and returns it to the free list; surplus beyond
    /// `max_size` idle objects is dropped.
    pub fn release(&self, mut object: T) {
        (self.reset)(&mut object);
        self.released.fetch_add(1, Ordering::Relaxed);
        let mut free = self.free.lock();
        if free.len() < self.max_size {
            free.push(object);
        }
    }

    /// Eagerly constructs `count` idle objects, up to `max_size`.
    pub fn prewarm(&self, count: usize) {
        let mut free = self.free.lock();
        while free.len() < count.min(self.max_size) {
            self.created.fetch_add(1, Ordering::Relaxed);
            free.push((self.factory)());
        }
    }

    pub fn stats(&self) -> PoolStats {
        let acquired = self.acquired.load(Ordering::Relaxed);
        let released = self.released.load(Ordering::Relaxed);
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            acquired,
            released,
            in_use: acquired.saturating_sub(released),
            peak: self.peak.load(Ordering::Relaxed),
            max_size: self.max_size,
        }
    }

    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }
}

/// Smallest power-of-two bucket covering 64..=65536 bytes.
const BUCKET_SIZES: [usize; 11] = [64, 128, 256, 512, 1024, 2048, 4096, 8192, 16384, 32768, 65536];

/// Size-bucketed byte buffer pool.
///
/// `acquire(n)` hands out a zero-filled buffer of length `n` whose capacity
/// matches the smallest bucket `>= n`. Requests beyond the largest bucket
/// allocate exactly and bypass the pool on release.
pub struct BufferPool {
    buckets: Vec<Mutex<Vec<Vec<u8>>>>,
    per_bucket: usize,
    acquired: AtomicU64,
    released: AtomicU64,
    pooled_hits: AtomicU64,
}

impl BufferPool {
    /// `per_bucket` caps the idle buffers retained per size class.
    pub fn new(per_bucket: usize) -> Self {
        Self {
            buckets: BUCKET_SIZES.iter().map(|_| Mutex::new(Vec::new())).collect(),
            per_bucket,
            acquired: AtomicU64::new(0),
            released: AtomicU64::new(0),
            pooled_hits: AtomicU64::new(0),
        }
    }

    fn bucket_index(len: usize) -> Option<usize> {
        BUCKET_SIZES.iter().position(|&size| size >= len)
    }

    /// Hands out a zeroed buffer of length `len`.
    pub fn acquire(&self, len: usize) -> Vec<u8> {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        match Self::bucket_index(len) {
            Some(index) => {
                let reused = self.buckets[index].lock().pop();
                match reused {
                    Some(mut buffer) => {
                        self.pooled_hits.fetch_add(1, Ordering::Relaxed);
                        buffer.clear();
                        buffer.resize(len, 0);
                        buffer
                    }
                    None => {
                        let mut buffer = Vec::with_capacity(BUCKET_SIZES[index]);
                        buffer.resize(len, 0);
                        buffer
                    }
                }
            }
            // Oversize request: exact allocation, never pooled.
            None => vec![0u8; len],
        }
    }

    /// Scrubs and returns a buffer. Buffers whose capacity matches no
    /// bucket are dropped after zeroing.
    pub fn release(&self, mut buffer: Vec<u8>) {
        buffer.zeroize();
        self.released.fetch_add(1, Ordering::Relaxed);
        if let Some(index) = BUCKET_SIZES.iter().position(|&size| size == buffer.capacity()) {
            let mut bucket = self.buckets[index].lock();
            if bucket.len() < self.per_bucket {
                bucket.push(buffer);
            }
        }
    }

    pub fn stats(&self) -> PoolStats {
        let acquired = self.acquired.load(Ordering::Relaxed);
        let released = self.released.load(Ordering::Relaxed);
        PoolStats {
            created: acquired - self.pooled_hits.load(Ordering::Relaxed),
            acquired,
            released,
            in_use: acquired.saturating_sub(released),
            peak: 0,
            max_size: self.per_bucket * BUCKET_SIZES.len(),
        }
    }
}

/// Bounded LRU from a digest of raw bytes to their Base64 encoding.
///
/// Keyed by the full SHA-256 of the input so distinct byte strings cannot
/// alias. Capacity-bounded only; entries carry no TTL.
pub struct Base64ResultCache {
    entries: Mutex<LruCache<[u8; 32], String>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl Base64ResultCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("max(1) is non-zero");
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached encoding or computes, stores, and returns it.
    pub fn encode(&self, data: &[u8]) -> String {
        use base64::Engine as _;
        let key: [u8; 32] = Sha256::digest(data).into();
        if let Some(found) = self.entries.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return found.clone();
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        self.entries.lock().put(key, encoded.clone());
        encoded
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let total = hits + self.misses.load(Ordering::Relaxed) as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }
}
