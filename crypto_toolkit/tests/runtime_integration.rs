// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Cross-cutting runtime behavior: the two-tier cache with a durable L2,
//! secure storage over a file-backed adapter pattern, rate limiting under
//! burst, and the performance report shape.

use std::sync::Arc;

use crypto_toolkit::domain::services::PersistentCacheStore;
use crypto_toolkit::infrastructure::cache::{InMemoryStore, JsonFileStore, PrewarmStrategy};
use crypto_toolkit::{
    Admission, CoreRuntime, HashFacade, HashOptions, MemoryStorageBackend, RateLimiter, RateLimiterConfig,
    RuntimeConfig, SecureStorage, SecureStorageConfig, SymmetricFacade, SymmetricOptions,
};

/// The durable L2 tier serves entries across runtime instances.
#[tokio::test]
async fn l2_tier_survives_runtime_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    {
        let store = Arc::new(JsonFileStore::open(&path).await.unwrap());
        let runtime = CoreRuntime::builder()
            .l2_store(Arc::clone(&store) as Arc<dyn PersistentCacheStore>)
            .build();
        runtime.cache().set("warm-key", b"warm-value".to_vec()).await.unwrap();
    }

    let store = Arc::new(JsonFileStore::open(&path).await.unwrap());
    let runtime = CoreRuntime::builder()
        .l2_store(store as Arc<dyn PersistentCacheStore>)
        .build();
    // Fresh L1 misses, L2 promotes.
    assert_eq!(
        runtime.cache().get("warm-key").await.unwrap(),
        Some(b"warm-value".to_vec())
    );
}

/// Prewarming pulls known-hot keys back into L1 after a clear.
#[tokio::test]
async fn prewarm_restores_hot_entries() {
    let l2 = Arc::new(InMemoryStore::new());
    let runtime = CoreRuntime::builder()
        .l2_store(Arc::clone(&l2) as Arc<dyn PersistentCacheStore>)
        .build();

    for i in 0..10 {
        let key = format!("entry-{}", i);
        runtime.cache().set(&key, vec![i as u8]).await.unwrap();
        // Touch a few keys so the tracker ranks them.
        if i < 3 {
            runtime.cache().get(&key).await.unwrap();
        }
    }
    runtime.cache().clear_sync();

    let warmed = runtime.cache().prewarm(PrewarmStrategy::Hybrid).await.unwrap();
    assert!(warmed > 0);
}

/// Memoized hashing shows up as cache hits in the statistics.
#[test]
fn hash_memoization_reflected_in_statistics() {
    let runtime = CoreRuntime::new();
    let hashing = HashFacade::new(&runtime);

    for _ in 0..5 {
        hashing.sha256(b"repeated input", &HashOptions::default()).digest().unwrap();
    }
    let stats = runtime.cache().statistics();
    assert!(stats.hit_rate > 0.0, "repeats served from cache");
}

/// Burst property: for capacity R and a burst of N > R, at least N - R
/// calls are rejected and none of them reaches the primitive.
#[test]
fn rate_limiter_burst_property() {
    let limiter = RateLimiter::new(RateLimiterConfig {
        capacity: 10,
        refill_per_sec: 0.001,
    });

    let n = 40;
    let rejected = (0..n)
        .filter(|_| matches!(limiter.try_acquire(), Admission::Rejected { .. }))
        .count();
    assert!(rejected >= n - 10);
}

/// Secure storage over an injected backend: sealed at rest, namespaced,
/// transparent round trip.
#[tokio::test]
async fn secure_storage_end_to_end() {
    let runtime = CoreRuntime::new();
    let backend = Arc::new(MemoryStorageBackend::new());
    let storage = SecureStorage::new(
        &runtime,
        backend,
        "vault master key",
        SecureStorageConfig {
            prefix: Some("vault".to_string()),
            default_ttl: None,
        },
    )
    .unwrap();

    storage.set("credentials", b"user:pass", None).await.unwrap();
    storage.set("session", b"opaque blob", None).await.unwrap();

    assert_eq!(storage.get("credentials").await.unwrap(), Some(b"user:pass".to_vec()));
    assert_eq!(
        storage.keys().await.unwrap(),
        vec!["credentials".to_string(), "session".to_string()]
    );

    storage.remove("session").await.unwrap();
    assert_eq!(storage.get("session").await.unwrap(), None);
}

/// The performance report aggregates facade activity by operation and
/// algorithm over the requested window.
#[test]
fn performance_report_covers_facade_activity() {
    let runtime = CoreRuntime::with_config(RuntimeConfig::default());
    let crypto = SymmetricFacade::new(&runtime);
    let hashing = HashFacade::new(&runtime);

    let sealed = crypto.encrypt_aes(b"observed", "key", &SymmetricOptions::default());
    crypto.decrypt_aes(
        sealed.data.as_deref().unwrap(),
        "key",
        &SymmetricOptions {
            iv: sealed.iv.clone(),
            ..SymmetricOptions::default()
        },
    );
    hashing.sha256(b"observed", &HashOptions::default());

    let report = runtime.observer().generate_report(None);
    assert_eq!(report.total_operations, 3);
    assert!(report.by_operation.contains_key("encrypt"));
    assert!(report.by_operation.contains_key("decrypt"));
    assert!(report.by_operation.contains_key("hash"));
    assert!(report.by_algorithm.contains_key("AES"));
    assert!((report.success_rate - 1.0).abs() < f64::EPSILON);

    let json = runtime.observer().export_json(None).unwrap();
    assert!(json.contains("totalOperations"));
}

/// Pool bookkeeping stays consistent while the facade works.
#[test]
fn pool_invariants_hold_under_load() {
    let runtime = CoreRuntime::new();
    let crypto = SymmetricFacade::new(&runtime);

    for i in 0..16 {
        let payload = vec![i as u8; 1000 + i * 37];
        let sealed = crypto.encrypt_aes(&payload, "pool key", &SymmetricOptions::default());
        assert!(sealed.success);
    }

    let stats = runtime.buffer_pool().stats();
    assert_eq!(stats.released + stats.in_use, stats.acquired);
}
