// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Adaptive Cache Manager
//!
//! Orchestrates the L1 ([`TtlLruCache`]) and optional L2
//! ([`PersistentCacheStore`]) tiers for memoized operation results, and
//! adapts the L1 capacity to the observed workload.
//!
//! ## Tier movement
//!
//! - L1 hit: serve, refresh recency
//! - L1 miss, L2 hit: promote into L1, serve
//! - L1 capacity eviction: demote the victim to L2
//! - TTL expiry and explicit deletes affect both tiers
//!
//! ## Access-pattern tracking
//!
//! Every key keeps a ring of its last `interval_window` inter-access
//! deltas. The predicted next access is a linearly-weighted moving average
//! of those deltas (recent intervals weigh more) added to the last access
//! time. Predictions feed the TIME_BASED and HYBRID prewarm strategies.
//!
//! ## Adaptive resize
//!
//! Each maintenance tick reads the memory-pressure probe (fallback 0.5
//! when none is injected) and the cache efficiency score
//! `hit_rate*50 + (1 - eviction_rate)*30 + max(0, 20 - 2*avg_access_ms)`,
//! then applies at most one rule:
//!
//! | condition                                   | action                  |
//! |---------------------------------------------|-------------------------|
//! | pressure > threshold (default 0.8)          | shrink to 0.8 × current |
//! | efficiency < 60 and eviction rate > 0.2     | grow to 1.2 × current   |
//! | efficiency > 80 and eviction rate < 0.05    | shrink to 0.95 × current|
//!
//! The new capacity is clamped to `[min_size, max_size]`; live entries are
//! carried over most-recent-first until the new capacity is full.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crypto_toolkit_domain::services::PersistentCacheStore;
use crypto_toolkit_domain::CryptoError;

use super::ttl_lru::TtlLruCache;

/// Tuning for the adaptive manager.
#[derive(Clone)]
pub struct AdaptiveCacheConfig {
    pub min_size: usize,
    pub max_size: usize,
    pub initial_size: usize,
    pub default_ttl: Option<Duration>,
    pub memory_pressure_threshold: f64,
    pub resize_interval: Duration,
    pub prewarm_batch: usize,
    pub interval_window: usize,
}

impl Default for AdaptiveCacheConfig {
    fn default() -> Self {
        Self {
            min_size: 64,
            max_size: 4096,
            initial_size: 1024,
            default_ttl: Some(Duration::from_secs(3600)),
            memory_pressure_threshold: 0.8,
            resize_interval: Duration::from_secs(10),
            prewarm_batch: 50,
            interval_window: 10,
        }
    }
}

/// Candidate-ranking strategies for prewarming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrewarmStrategy {
    /// Most recently used first.
    Lru,
    /// Most frequently used first.
    Lfu,
    /// Nearest predicted future access first.
    TimeBased,
    /// 0.4·recency + 0.4·frequency + 0.2·inverse-size, top 20% of capacity.
    Hybrid,
}

/// Statistics snapshot emitted by [`AdaptiveCache::statistics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStatistics {
    #[serde(rename = "hitRate")]
    pub hit_rate: f64,
    #[serde(rename = "missRate")]
    pub miss_rate: f64,
    #[serde(rename = "evictionRate")]
    pub eviction_rate: f64,
    #[serde(rename = "avgAccessMs")]
    pub avg_access_ms: f64,
    #[serde(rename = "efficiencyScore")]
    pub efficiency_score: f64,
    #[serde(rename = "memoryUsageMb")]
    pub memory_usage_mb: f64,
    #[serde(rename = "hotDataCount")]
    pub hot_data_count: usize,
    #[serde(rename = "currentCapacity")]
    pub current_capacity: usize,
    pub entries: usize,
}

struct AccessMeta {
    access_count: u64,
    last_access: Instant,
    created_at: Instant,
    size_bytes: usize,
    intervals: VecDeque<Duration>,
    predicted_next: Option<Instant>,
}

impl AccessMeta {
    fn new(size_bytes: usize) -> Self {
        let now = Instant::now();
        Self {
            access_count: 0,
            last_access: now,
            created_at: now,
            size_bytes,
            intervals: VecDeque::new(),
            predicted_next: None,
        }
    }

    fn record_access(&mut self, window: usize) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_access);
        if self.access_count > 0 {
            if self.intervals.len() == window {
                self.intervals.pop_front();
            }
            self.intervals.push_back(delta);
            self.predicted_next = weighted_prediction(&self.intervals).map(|ahead| now + ahead);
        }
        self.access_count += 1;
        self.last_access = now;
    }
}

/// Linearly-weighted moving average of inter-access deltas; the most
/// recent interval carries the highest weight.
fn weighted_prediction(intervals: &VecDeque<Duration>) -> Option<Duration> {
    if intervals.is_empty() {
        return None;
    }
    let mut weighted_sum = 0.0f64;
    let mut weight_total = 0.0f64;
    for (index, delta) in intervals.iter().enumerate() {
        let weight = (index + 1) as f64;
        weighted_sum += delta.as_secs_f64() * weight;
        weight_total += weight;
    }
    Some(Duration::from_secs_f64(weighted_sum / weight_total))
}

/// Two-tier memoization cache with access-pattern prediction and
/// pressure-driven resizing. Values are opaque byte payloads.
pub struct AdaptiveCache {
    config: AdaptiveCacheConfig,
    l1: RwLock<TtlLruCache<String, Vec<u8>>>,
    l2: Option<Arc<dyn PersistentCacheStore>>,
    meta: Mutex<HashMap<String, AccessMeta>>,
    /// Victims of L1 capacity evictions awaiting the async demotion write.
    pending_demotions: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    /// L1 writes done on the sync path awaiting their L2 mirror.
    pending_l2_writes: Mutex<Vec<(String, Vec<u8>)>>,
    memory_pressure_probe: Option<Box<dyn Fn() -> f64 + Send + Sync>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    access_time_us: AtomicU64,
    accesses: AtomicU64,
}

impl AdaptiveCache {
    pub fn new(config: AdaptiveCacheConfig, l2: Option<Arc<dyn PersistentCacheStore>>) -> Self {
        let pending_demotions = Arc::new(Mutex::new(Vec::new()));
        let l1 = Self::build_l1(config.initial_size.clamp(config.min_size, config.max_size), &pending_demotions);
        Self {
            config,
            l1: RwLock::new(l1),
            l2,
            meta: Mutex::new(HashMap::new()),
            pending_demotions,
            pending_l2_writes: Mutex::new(Vec::new()),
            memory_pressure_probe: None,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            access_time_us: AtomicU64::new(0),
            accesses: AtomicU64::new(0),
        }
    }

    /// Injects a heap-pressure probe returning `used / limit` in `[0, 1]`.
    /// Without one, the resize logic assumes 0.5.
    pub fn with_memory_pressure_probe(mut self, probe: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.memory_pressure_probe = Some(Box::new(probe));
        self
    }

    fn build_l1(capacity: usize, pending: &Arc<Mutex<Vec<(String, Vec<u8>)>>>) -> TtlLruCache<String, Vec<u8>> {
        let queue = Arc::clone(pending);
        TtlLruCache::with_evict_hook(
            capacity,
            Some(Box::new(move |key: &String, value: &Vec<u8>| {
                let mut queue = queue.lock();
                // Bounded: a stalled async side must not grow this without limit.
                if queue.len() < 4096 {
                    queue.push((key.clone(), value.clone()));
                }
            })),
        )
    }

    /// Full lookup: L1, then L2 with promotion. Access metadata is updated
    /// with microsecond timing either way.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CryptoError> {
        self.drain_pending().await?;
        let started = Instant::now();

        if let Some(value) = self.l1.read().get(&key.to_string()) {
            self.note_access(key, value.len(), started, true);
            return Ok(Some(value));
        }

        if let Some(l2) = &self.l2 {
            if let Some(value) = l2.get(key).await? {
                self.l1
                    .read()
                    .set(key.to_string(), value.clone(), self.config.default_ttl);
                self.note_access(key, value.len(), started, true);
                debug!(key, "promoted entry from L2");
                return Ok(Some(value));
            }
        }

        self.note_access(key, 0, started, false);
        Ok(None)
    }

    /// L1-only lookup for synchronous callers. Never touches L2.
    pub fn get_sync(&self, key: &str) -> Option<Vec<u8>> {
        let started = Instant::now();
        let found = self.l1.read().get(&key.to_string());
        self.note_access(key, found.as_ref().map_or(0, |v| v.len()), started, found.is_some());
        found
    }

    /// Full write: L1 plus the L2 mirror when enabled.
    pub async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CryptoError> {
        self.init_meta(key, value.len());
        self.l1
            .read()
            .set(key.to_string(), value.clone(), self.config.default_ttl);
        if let Some(l2) = &self.l2 {
            l2.set(key, value).await?;
        }
        self.drain_pending().await
    }

    /// Synchronous write: L1 now, the L2 mirror queued for the next async
    /// call or maintenance tick.
    pub fn set_sync(&self, key: &str, value: Vec<u8>) {
        self.init_meta(key, value.len());
        self.l1
            .read()
            .set(key.to_string(), value.clone(), self.config.default_ttl);
        if self.l2.is_some() {
            let mut queue = self.pending_l2_writes.lock();
            if queue.len() < 4096 {
                queue.push((key.to_string(), value));
            }
        }
    }

    pub async fn delete(&self, key: &str) -> Result<(), CryptoError> {
        self.l1.read().delete(&key.to_string());
        self.meta.lock().remove(key);
        if let Some(l2) = &self.l2 {
            l2.delete(key).await?;
        }
        Ok(())
    }

    pub async fn clear(&self) -> Result<(), CryptoError> {
        self.l1.read().clear();
        self.meta.lock().clear();
        self.pending_demotions.lock().clear();
        self.pending_l2_writes.lock().clear();
        if let Some(l2) = &self.l2 {
            l2.clear().await?;
        }
        Ok(())
    }

    /// Clears only the in-process tier; L2 and the access tracker are
    /// untouched, so a later prewarm still knows which keys were hot.
    pub fn clear_sync(&self) {
        self.l1.read().clear();
    }

    fn init_meta(&self, key: &str, size: usize) {
        let mut meta = self.meta.lock();
        let entry = meta.entry(key.to_string()).or_insert_with(|| AccessMeta::new(size));
        entry.size_bytes = size;
        entry.created_at = Instant::now();
    }

    fn note_access(&self, key: &str, size: usize, started: Instant, hit: bool) {
        let elapsed_us = started.elapsed().as_micros() as u64;
        self.access_time_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.accesses.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        let mut meta = self.meta.lock();
        let entry = meta.entry(key.to_string()).or_insert_with(|| AccessMeta::new(size));
        if hit && size > 0 {
            entry.size_bytes = size;
        }
        entry.record_access(self.config.interval_window);
    }

    /// Flushes queued demotions and sync-path mirror writes into L2.
    async fn drain_pending(&self) -> Result<(), CryptoError> {
        let Some(l2) = &self.l2 else {
            let dropped = {
                let mut pending = self.pending_demotions.lock();
                let count = pending.len() as u64;
                pending.clear();
                count
            };
            self.evictions.fetch_add(dropped, Ordering::Relaxed);
            self.pending_l2_writes.lock().clear();
            return Ok(());
        };
        let demotions: Vec<_> = std::mem::take(&mut *self.pending_demotions.lock());
        let writes: Vec<_> = std::mem::take(&mut *self.pending_l2_writes.lock());
        self.evictions.fetch_add(demotions.len() as u64, Ordering::Relaxed);
        for (key, value) in demotions.into_iter().chain(writes) {
            l2.set(&key, value).await?;
        }
        Ok(())
    }

    /// Selects candidates by the given strategy and pulls them from L2
    /// into L1 in batches, yielding between batches so the caller's
    /// executor stays responsive. Returns the number of entries warmed.
    pub async fn prewarm(&self, strategy: PrewarmStrategy) -> Result<usize, CryptoError> {
        let Some(l2) = &self.l2 else {
            return Ok(0);
        };
        let candidates = self.rank_candidates(strategy);
        let mut warmed = 0usize;
        for batch in candidates.chunks(self.config.prewarm_batch.max(1)) {
            for key in batch {
                if self.l1.read().get(key).is_some() {
                    continue;
                }
                if let Some(value) = l2.get(key).await? {
                    self.l1.read().set(key.clone(), value, self.config.default_ttl);
                    warmed += 1;
                }
            }
            tokio::task::yield_now().await;
        }
        info!(strategy = ?strategy, warmed, "prewarm pass complete");
        Ok(warmed)
    }

    fn rank_candidates(&self, strategy: PrewarmStrategy) -> Vec<String> {
        let now = Instant::now();
        let meta = self.meta.lock();
        let mut scored: Vec<(String, f64)> = match strategy {
            // Ascending: smallest idle time first.
            PrewarmStrategy::Lru => meta
                .iter()
                .map(|(key, m)| (key.clone(), now.duration_since(m.last_access).as_secs_f64()))
                .collect(),
            // Descending: highest access count first (negate for one sort).
            PrewarmStrategy::Lfu => meta
                .iter()
                .map(|(key, m)| (key.clone(), -(m.access_count as f64)))
                .collect(),
            // Ascending: nearest predicted future access first; keys with
            // no prediction sort last.
            PrewarmStrategy::TimeBased => meta
                .iter()
                .map(|(key, m)| {
                    let horizon = m
                        .predicted_next
                        .map(|at| at.saturating_duration_since(now).as_secs_f64())
                        .unwrap_or(f64::MAX);
                    (key.clone(), horizon)
                })
                .collect(),
            PrewarmStrategy::Hybrid => {
                let max_count = meta.values().map(|m| m.access_count).max().unwrap_or(1).max(1) as f64;
                meta.iter()
                    .map(|(key, m)| {
                        let recency = 1.0 / (1.0 + now.duration_since(m.last_access).as_secs_f64());
                        let frequency = m.access_count as f64 / max_count;
                        let inv_size = 1.0 / (1.0 + m.size_bytes as f64);
                        (key.clone(), -(0.4 * recency + 0.4 * frequency + 0.2 * inv_size))
                    })
                    .collect()
            }
        };
        drop(meta);

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let limit = match strategy {
            PrewarmStrategy::Hybrid => (self.l1.read().capacity() / 5).max(1),
            _ => self.l1.read().capacity(),
        };
        scored.into_iter().take(limit).map(|(key, _)| key).collect()
    }

    pub fn statistics(&self) -> CacheStatistics {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let evictions = self.evictions.load(Ordering::Relaxed) as f64
            + self.pending_demotions.lock().len() as f64;
        let accesses = (hits + misses).max(1.0);
        let hit_rate = hits / accesses;
        let miss_rate = misses / accesses;
        let eviction_rate = evictions / accesses;
        let avg_access_ms =
            self.access_time_us.load(Ordering::Relaxed) as f64 / 1000.0 / self.accesses.load(Ordering::Relaxed).max(1) as f64;
        let efficiency_score =
            hit_rate * 50.0 + (1.0 - eviction_rate).max(0.0) * 30.0 + (20.0 - 2.0 * avg_access_ms).max(0.0);

        let now = Instant::now();
        let meta = self.meta.lock();
        let hot_data_count = meta
            .values()
            .filter(|m| m.access_count > 5 && now.duration_since(m.last_access) < Duration::from_secs(60))
            .count();
        let memory_usage_mb = meta.values().map(|m| m.size_bytes as f64).sum::<f64>() / (1024.0 * 1024.0);
        drop(meta);

        let l1 = self.l1.read();
        CacheStatistics {
            hit_rate,
            miss_rate,
            eviction_rate,
            avg_access_ms,
            efficiency_score,
            memory_usage_mb,
            hot_data_count,
            current_capacity: l1.capacity(),
            entries: l1.len(),
        }
    }

    /// One maintenance pass: sweep expired entries, flush pending L2
    /// traffic, and apply at most one resize rule.
    pub async fn maintenance_tick(&self) -> Result<(), CryptoError> {
        self.l1.read().sweep();
        self.drain_pending().await?;

        let pressure = self.memory_pressure_probe.as_ref().map_or(0.5, |probe| probe());
        let stats = self.statistics();
        let current = stats.current_capacity;

        let target = if pressure > self.config.memory_pressure_threshold {
            Some(((current as f64 * 0.8).round() as usize).max(self.config.min_size))
        } else if stats.efficiency_score < 60.0 && stats.eviction_rate > 0.2 {
            Some(((current as f64 * 1.2).round() as usize).min(self.config.max_size))
        } else if stats.efficiency_score > 80.0 && stats.eviction_rate < 0.05 {
            Some(((current as f64 * 0.95).round() as usize).max(self.config.min_size))
        } else {
            None
        };

        if let Some(target) = target {
            if target != current {
                self.resize_to(target);
                info!(
                    from = current,
                    to = target,
                    pressure,
                    efficiency = stats.efficiency_score,
                    "adaptive cache resized"
                );
            }
        }
        Ok(())
    }

    /// Spawns the periodic maintenance loop on the current tokio runtime.
    pub fn spawn_maintenance(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let cache = Arc::clone(self);
        let period = cache.config.resize_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(error) = cache.maintenance_tick().await {
                    debug!(%error, "cache maintenance tick failed");
                }
            }
        })
    }

    /// Rebuilds L1 at the new capacity, carrying entries most-recent-first.
    fn resize_to(&self, capacity: usize) {
        let capacity = capacity.clamp(self.config.min_size, self.config.max_size);
        let mut l1 = self.l1.write();
        let survivors = l1.snapshot_by_recency();
        let replacement = Self::build_l1(capacity, &self.pending_demotions);
        // Insert least-recent-first so recency order is preserved and the
        // most recent entries win when capacity is short.
        for (key, value, ttl) in survivors.into_iter().take(capacity).rev() {
            replacement.set(key, value, ttl);
        }
        *l1 = replacement;
    }

    pub fn capacity(&self) -> usize {
        self.l1.read().capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::persistent::InMemoryStore;

    fn small_config() -> AdaptiveCacheConfig {
        AdaptiveCacheConfig {
            min_size: 2,
            max_size: 16,
            initial_size: 4,
            default_ttl: None,
            ..AdaptiveCacheConfig::default()
        }
    }

    /// Tests the L1/L2 promotion path.
    ///
    /// Validates that:
    /// - A value present only in L2 is served and promoted on get
    /// - The promoted value is then an L1 hit
    #[tokio::test]
    async fn test_l2_promotion() {
        let l2 = Arc::new(InMemoryStore::new());
        l2.set("warm", b"value".to_vec()).await.unwrap();
        let cache = AdaptiveCache::new(small_config(), Some(l2));

        assert_eq!(cache.get("warm").await.unwrap(), Some(b"value".to_vec()));
        assert_eq!(cache.get_sync("warm"), Some(b"value".to_vec()), "promoted into L1");
    }

    /// Tests that capacity evictions demote their victims to L2.
    #[tokio::test]
    async fn test_eviction_demotes_to_l2() {
        let l2 = Arc::new(InMemoryStore::new());
        let cache = AdaptiveCache::new(
            AdaptiveCacheConfig {
                min_size: 2,
                max_size: 2,
                initial_size: 2,
                default_ttl: None,
                ..AdaptiveCacheConfig::default()
            },
            Some(Arc::clone(&l2) as Arc<dyn PersistentCacheStore>),
        );

        cache.set_sync("a", b"1".to_vec());
        cache.set_sync("b", b"2".to_vec());
        cache.set_sync("c", b"3".to_vec()); // evicts "a"
        cache.maintenance_tick().await.unwrap();

        assert_eq!(cache.get_sync("a"), None);
        assert_eq!(l2.get("a").await.unwrap(), Some(b"1".to_vec()), "victim demoted");
        // And the demoted entry promotes back on demand.
        assert_eq!(cache.get("a").await.unwrap(), Some(b"1".to_vec()));
    }

    /// Tests the pressure-shrink resize rule in isolation.
    #[tokio::test]
    async fn test_pressure_shrink_rule() {
        let cache = AdaptiveCache::new(
            AdaptiveCacheConfig {
                min_size: 2,
                max_size: 16,
                initial_size: 10,
                default_ttl: None,
                ..AdaptiveCacheConfig::default()
            },
            None,
        )
        .with_memory_pressure_probe(|| 0.95);

        assert_eq!(cache.capacity(), 10);
        cache.maintenance_tick().await.unwrap();
        assert_eq!(cache.capacity(), 8, "0.8 × 10");
        cache.maintenance_tick().await.unwrap();
        assert_eq!(cache.capacity(), 6, "one rule per tick, applied again");
    }

    /// Tests that resize keeps the most recent entries.
    #[tokio::test]
    async fn test_resize_preserves_recency_order() {
        let cache = AdaptiveCache::new(
            AdaptiveCacheConfig {
                min_size: 2,
                max_size: 16,
                initial_size: 4,
                default_ttl: None,
                ..AdaptiveCacheConfig::default()
            },
            None,
        );
        for key in ["a", "b", "c", "d"] {
            cache.set_sync(key, key.as_bytes().to_vec());
        }
        cache.get_sync("a");
        cache.resize_to(2);

        assert_eq!(cache.capacity(), 2);
        assert!(cache.get_sync("a").is_some(), "most recently accessed survives");
        assert!(cache.get_sync("d").is_some());
        assert!(cache.get_sync("b").is_none());
    }

    /// Tests prediction from a steady access cadence.
    #[test]
    fn test_weighted_prediction_prefers_recent_intervals() {
        let mut intervals = VecDeque::new();
        intervals.push_back(Duration::from_secs(10));
        intervals.push_back(Duration::from_secs(2));
        let predicted = weighted_prediction(&intervals).unwrap();
        // (10*1 + 2*2) / 3 is about 4.67s, pulled toward the newer gap.
        assert!(predicted < Duration::from_secs(5));
        assert!(predicted > Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_statistics_track_hits_and_misses() {
        let cache = AdaptiveCache::new(small_config(), None);
        cache.set_sync("k", vec![0u8; 1024]);
        cache.get_sync("k");
        cache.get_sync("absent");

        let stats = cache.statistics();
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
        assert!((stats.miss_rate - 0.5).abs() < f64::EPSILON);
        assert!(stats.memory_usage_mb > 0.0);
    }

    #[tokio::test]
    async fn test_prewarm_hybrid_pulls_from_l2() {
        let l2 = Arc::new(InMemoryStore::new());
        for key in ["x", "y", "z"] {
            l2.set(key, key.as_bytes().to_vec()).await.unwrap();
        }
        let cache = AdaptiveCache::new(
            AdaptiveCacheConfig {
                min_size: 2,
                max_size: 32,
                initial_size: 20,
                default_ttl: None,
                ..AdaptiveCacheConfig::default()
            },
            Some(Arc::clone(&l2) as Arc<dyn PersistentCacheStore>),
        );

        // Make the keys known to the tracker, then drop them from L1 only
        // so the access metadata survives.
        for key in ["x", "y", "z"] {
            cache.get(key).await.unwrap();
        }
        cache.l1.read().clear();

        let warmed = cache.prewarm(PrewarmStrategy::Hybrid).await.unwrap();
        assert!(warmed >= 1, "top 20% of capacity 20 is at least 4 candidates");
        assert!(["x", "y", "z"].iter().any(|k| cache.get_sync(k).is_some()));
    }
}
