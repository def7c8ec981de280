// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Memoization tiers: the TTL'd LRU (L1), persistent stores (L2), and the
//! adaptive manager that orchestrates both.

pub mod adaptive;
pub mod persistent;
pub mod ttl_lru;

pub use adaptive::{AdaptiveCache, AdaptiveCacheConfig, CacheStatistics, PrewarmStrategy};
pub use persistent::{InMemoryStore, JsonFileStore};
pub use ttl_lru::TtlLruCache;
