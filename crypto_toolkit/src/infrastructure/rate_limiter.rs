// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Rate Limiter
//!
//! Token-bucket gate for sensitive operations (RSA, signing, key
//! derivation, rotation traffic). A rejected call returns immediately with
//! a retry hint; it is never queued and never reaches the primitive.

use parking_lot::Mutex;
use std::time::Instant;
use tracing::warn;

use crypto_toolkit_domain::CryptoError;

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateLimiterConfig {
    /// Maximum burst size.
    pub capacity: u32,
    /// Tokens restored per second.
    pub refill_per_sec: f64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            refill_per_sec: 100.0,
        }
    }
}

/// Outcome of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Granted,
    Rejected { retry_after_ms: u64 },
}

struct Bucket {
    tokens: f64,
    refilled_at: Instant,
}

/// Token-bucket rate limiter.
pub struct RateLimiter {
    config: RateLimiterConfig,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: config.capacity as f64,
                refilled_at: Instant::now(),
            }),
            config,
        }
    }

    /// Attempts to take one token.
    pub fn try_acquire(&self) -> Admission {
        let mut bucket = self.bucket.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.config.refill_per_sec).min(self.config.capacity as f64);
        bucket.refilled_at = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Admission::Granted
        } else {
            let deficit = 1.0 - bucket.tokens;
            let retry_after_ms = if self.config.refill_per_sec > 0.0 {
                (deficit / self.config.refill_per_sec * 1000.0).ceil() as u64
            } else {
                u64::MAX
            };
            warn!(retry_after_ms, "rate limiter rejected operation");
            Admission::Rejected { retry_after_ms }
        }
    }

    /// Convenience wrapper turning a rejection into the domain error.
    pub fn check(&self) -> Result<(), CryptoError> {
        match self.try_acquire() {
            Admission::Granted => Ok(()),
            Admission::Rejected { retry_after_ms } => Err(CryptoError::RateLimited { retry_after_ms }),
        }
    }

    pub fn config(&self) -> RateLimiterConfig {
        self.config
    }
}
