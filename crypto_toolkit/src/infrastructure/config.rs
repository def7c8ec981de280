// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Runtime Configuration
//!
//! Serde-backed tuning for the shared runtime: cache sizing, rate limits,
//! observer sampling, pool caps, and streaming chunk size. Every section
//! has working defaults; hosts override the parts they care about, either
//! in code or from a TOML fragment.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crypto_toolkit_domain::{ChunkSize, CryptoError};

use super::cache::adaptive::AdaptiveCacheConfig;
use super::metrics::observer::ObserverConfig;
use super::rate_limiter::RateLimiterConfig;

/// Top-level runtime tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RuntimeConfig {
    pub cache: CacheSettings,
    pub rate_limiter: RateLimiterSettings,
    pub observer: ObserverSettings,
    pub pools: PoolSettings,
    pub streaming: StreamingSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            rate_limiter: RateLimiterSettings::default(),
            observer: ObserverSettings::default(),
            pools: PoolSettings::default(),
            streaming: StreamingSettings::default(),
        }
    }
}

impl RuntimeConfig {
    /// Parses and validates a TOML fragment.
    pub fn from_toml_str(raw: &str) -> Result<Self, CryptoError> {
        let config: Self =
            toml::from_str(raw).map_err(|e| CryptoError::invalid_input(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CryptoError> {
        let cache = &self.cache;
        if cache.min_size == 0 || cache.min_size > cache.max_size {
            return Err(CryptoError::invalid_input(
                "cache sizes must satisfy 0 < min-size <= max-size",
            ));
        }
        if cache.initial_size < cache.min_size || cache.initial_size > cache.max_size {
            return Err(CryptoError::invalid_input(
                "cache initial-size must lie within [min-size, max-size]",
            ));
        }
        if !(0.0..=1.0).contains(&cache.memory_pressure_threshold) {
            return Err(CryptoError::invalid_input(
                "memory-pressure-threshold must lie within [0, 1]",
            ));
        }
        if !(self.observer.sampling_rate > 0.0 && self.observer.sampling_rate <= 1.0) {
            return Err(CryptoError::invalid_input("observer sampling-rate must lie in (0, 1]"));
        }
        if self.rate_limiter.capacity == 0 {
            return Err(CryptoError::invalid_input("rate-limiter capacity must be non-zero"));
        }
        ChunkSize::new(self.streaming.chunk_size_bytes)?;
        Ok(())
    }
}

/// Adaptive cache sizing and cadence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheSettings {
    pub min_size: usize,
    pub max_size: usize,
    pub initial_size: usize,
    /// Per-entry TTL in seconds; absent means entries never expire.
    pub default_ttl_secs: Option<u64>,
    pub memory_pressure_threshold: f64,
    pub resize_interval_secs: u64,
    pub prewarm_batch: usize,
    pub interval_window: usize,
    /// Mirror entries into the configured L2 store.
    pub l2_enabled: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let adaptive = AdaptiveCacheConfig::default();
        Self {
            min_size: adaptive.min_size,
            max_size: adaptive.max_size,
            initial_size: adaptive.initial_size,
            default_ttl_secs: adaptive.default_ttl.map(|ttl| ttl.as_secs()),
            memory_pressure_threshold: adaptive.memory_pressure_threshold,
            resize_interval_secs: adaptive.resize_interval.as_secs(),
            prewarm_batch: adaptive.prewarm_batch,
            interval_window: adaptive.interval_window,
            l2_enabled: false,
        }
    }
}

impl CacheSettings {
    pub fn to_adaptive_config(&self) -> AdaptiveCacheConfig {
        AdaptiveCacheConfig {
            min_size: self.min_size,
            max_size: self.max_size,
            initial_size: self.initial_size,
            default_ttl: self.default_ttl_secs.map(Duration::from_secs),
            memory_pressure_threshold: self.memory_pressure_threshold,
            resize_interval: Duration::from_secs(self.resize_interval_secs.max(1)),
            prewarm_batch: self.prewarm_batch,
            interval_window: self.interval_window.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RateLimiterSettings {
    pub capacity: u32,
    pub refill_per_sec: f64,
}

impl Default for RateLimiterSettings {
    fn default() -> Self {
        let config = RateLimiterConfig::default();
        Self {
            capacity: config.capacity,
            refill_per_sec: config.refill_per_sec,
        }
    }
}

impl RateLimiterSettings {
    pub fn to_limiter_config(&self) -> RateLimiterConfig {
        RateLimiterConfig {
            capacity: self.capacity,
            refill_per_sec: self.refill_per_sec,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObserverSettings {
    pub max_metrics: usize,
    pub sampling_rate: f64,
}

impl Default for ObserverSettings {
    fn default() -> Self {
        let config = ObserverConfig::default();
        Self {
            max_metrics: config.max_metrics,
            sampling_rate: config.sampling_rate,
        }
    }
}

impl ObserverSettings {
    pub fn to_observer_config(&self) -> ObserverConfig {
        ObserverConfig {
            max_metrics: self.max_metrics.max(1),
            sampling_rate: self.sampling_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PoolSettings {
    /// Idle buffers retained per size bucket.
    pub buffers_per_bucket: usize,
    /// Capacity of the Base64 result cache.
    pub base64_cache_capacity: usize,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            buffers_per_bucket: 32,
            base64_cache_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StreamingSettings {
    pub chunk_size_bytes: usize,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            chunk_size_bytes: ChunkSize::DEFAULT_BYTES,
        }
    }
}
