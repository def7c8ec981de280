// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Core Runtime
//!
//! Owns the toolkit's shared machinery: the primitive provider, the
//! adaptive cache, the buffer and encoding pools, the rate limiter, and
//! the performance observer. Every facade operation takes a
//! `&CoreRuntime`; there is no hidden initialization order.
//!
//! Callers that want a process-wide instance use [`CoreRuntime::global`],
//! a lazily-built default runtime. Private instances are first-class:
//! construct one per tenant, per test, or per configuration.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crypto_toolkit_domain::services::{CryptoPrimitive, PersistentCacheStore};

use crate::infrastructure::adapters::RustCryptoPrimitive;
use crate::infrastructure::cache::{AdaptiveCache, InMemoryStore};
use crate::infrastructure::config::RuntimeConfig;
use crate::infrastructure::metrics::PerformanceObserver;
use crate::infrastructure::pools::{Base64ResultCache, BufferPool};
use crate::infrastructure::rate_limiter::RateLimiter;

static GLOBAL_RUNTIME: Lazy<CoreRuntime> = Lazy::new(CoreRuntime::new);

/// Cooperative cancellation handle. Operations observe the flag at their
/// suspension and dispatch points; setting it makes the operation return
/// `Cancelled` instead of a payload.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Shared service container for the toolkit.
pub struct CoreRuntime {
    config: RuntimeConfig,
    primitive: Arc<dyn CryptoPrimitive>,
    cache: Arc<AdaptiveCache>,
    buffer_pool: BufferPool,
    base64_cache: Base64ResultCache,
    rate_limiter: RateLimiter,
    observer: PerformanceObserver,
    operation_seq: AtomicU64,
}

impl Default for CoreRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl CoreRuntime {
    /// Runtime with default configuration and no L2 tier.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Runtime from explicit configuration, no L2 tier.
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::default()
    }

    /// The process-wide default instance.
    pub fn global() -> &'static CoreRuntime {
        &GLOBAL_RUNTIME
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn primitive(&self) -> &dyn CryptoPrimitive {
        self.primitive.as_ref()
    }

    pub fn cache(&self) -> &Arc<AdaptiveCache> {
        &self.cache
    }

    pub fn buffer_pool(&self) -> &BufferPool {
        &self.buffer_pool
    }

    pub fn base64_cache(&self) -> &Base64ResultCache {
        &self.base64_cache
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn observer(&self) -> &PerformanceObserver {
        &self.observer
    }

    /// Fresh span id for the observer.
    pub fn next_operation_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.operation_seq.fetch_add(1, Ordering::Relaxed))
    }
}

/// Assembles a [`CoreRuntime`] from parts; everything has a default.
#[derive(Default)]
pub struct RuntimeBuilder {
    config: Option<RuntimeConfig>,
    primitive: Option<Arc<dyn CryptoPrimitive>>,
    l2: Option<Arc<dyn PersistentCacheStore>>,
    pressure_probe: Option<Box<dyn Fn() -> f64 + Send + Sync>>,
}

impl RuntimeBuilder {
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn primitive(mut self, primitive: Arc<dyn CryptoPrimitive>) -> Self {
        self.primitive = Some(primitive);
        self
    }

    /// Durable L2 tier. Implies `cache.l2-enabled`.
    pub fn l2_store(mut self, store: Arc<dyn PersistentCacheStore>) -> Self {
        self.l2 = Some(store);
        self
    }

    pub fn memory_pressure_probe(mut self, probe: impl Fn() -> f64 + Send + Sync + 'static) -> Self {
        self.pressure_probe = Some(Box::new(probe));
        self
    }

    pub fn build(self) -> CoreRuntime {
        let config = self.config.unwrap_or_default();
        let l2 = match (self.l2, config.cache.l2_enabled) {
            (Some(store), _) => Some(store),
            (None, true) => Some(Arc::new(InMemoryStore::new()) as Arc<dyn PersistentCacheStore>),
            (None, false) => None,
        };
        let mut cache = AdaptiveCache::new(config.cache.to_adaptive_config(), l2);
        if let Some(probe) = self.pressure_probe {
            cache = cache.with_memory_pressure_probe(probe);
        }
        CoreRuntime {
            primitive: self.primitive.unwrap_or_else(|| Arc::new(RustCryptoPrimitive::new())),
            cache: Arc::new(cache),
            buffer_pool: BufferPool::new(config.pools.buffers_per_bucket),
            base64_cache: Base64ResultCache::new(config.pools.base64_cache_capacity),
            rate_limiter: RateLimiter::new(config.rate_limiter.to_limiter_config()),
            observer: PerformanceObserver::new(config.observer.to_observer_config()),
            operation_seq: AtomicU64::new(0),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_default_build() {
        let runtime = CoreRuntime::new();
        assert_eq!(runtime.cache().capacity(), runtime.config().cache.initial_size);
        let id_a = runtime.next_operation_id("op");
        let id_b = runtime.next_operation_id("op");
        assert_ne!(id_a, id_b);
    }

    #[test]
    fn test_global_is_shared() {
        let a = CoreRuntime::global() as *const _;
        let b = CoreRuntime::global() as *const _;
        assert_eq!(a, b);
    }

    #[test]
    fn test_cancellation_flag() {
        let flag = CancellationFlag::new();
        let observer = flag.clone();
        assert!(!observer.is_cancelled());
        flag.cancel();
        assert!(observer.is_cancelled());
    }
}
