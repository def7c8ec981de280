// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Performance Observer
//!
//! Per-operation span collection for the toolkit. Spans open at
//! `start_operation`, close at `end_operation`, and the completed records
//! land in a bounded ring. Reports aggregate by algorithm and operation
//! and bin a timeseries by minute, always over the window the caller
//! asked for, never over process uptime.
//!
//! A sampling rate below 1.0 drops a deterministic share of spans at
//! start; dropped spans cost one counter increment and nothing else.
//! Real-time subscribers receive every completed (sampled) metric
//! synchronously.

use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::debug;

use crypto_toolkit_domain::entities::{OperationStats, PerformanceMetric, PerformanceReport, TimeseriesBin};
use crypto_toolkit_domain::CryptoError;

/// Observer tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverConfig {
    /// Ring capacity for completed metrics.
    pub max_metrics: usize,
    /// Share of spans recorded, in `(0, 1]`.
    pub sampling_rate: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            max_metrics: 10_000,
            sampling_rate: 1.0,
        }
    }
}

struct OpenSpan {
    operation_id: String,
    algorithm: Option<String>,
    started: Instant,
    started_at_ms: i64,
}

type Subscriber = Box<dyn Fn(&PerformanceMetric) + Send + Sync>;

/// Bounded-ring span collector.
pub struct PerformanceObserver {
    config: ObserverConfig,
    open: Mutex<HashMap<String, OpenSpan>>,
    completed: Mutex<VecDeque<PerformanceMetric>>,
    subscribers: Mutex<Vec<Subscriber>>,
    sequence: AtomicU64,
}

impl PerformanceObserver {
    pub fn new(config: ObserverConfig) -> Self {
        Self {
            config,
            open: Mutex::new(HashMap::new()),
            completed: Mutex::new(VecDeque::new()),
            subscribers: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
        }
    }

    /// Opens a span. Returns `false` when the span was sampled out; the
    /// matching `end_operation` then becomes a no-op.
    pub fn start_operation(&self, id: &str, algorithm: Option<&str>) -> bool {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        if self.config.sampling_rate < 1.0 {
            // Deterministic stride sampling; no RNG on the hot path.
            let keep_every = (1.0 / self.config.sampling_rate.max(f64::MIN_POSITIVE)).round() as u64;
            if keep_every > 1 && sequence % keep_every != 0 {
                return false;
            }
        }
        self.open.lock().insert(
            id.to_string(),
            OpenSpan {
                operation_id: id.to_string(),
                algorithm: algorithm.map(|a| a.to_string()),
                started: Instant::now(),
                started_at_ms: Utc::now().timestamp_millis(),
            },
        );
        true
    }

    /// Closes a span and pushes the completed metric into the ring.
    pub fn end_operation(
        &self,
        id: &str,
        operation: &str,
        success: bool,
        data_size: Option<u64>,
        error_kind: Option<&str>,
        algorithm: Option<&str>,
    ) {
        let Some(span) = self.open.lock().remove(id) else {
            return; // sampled out or unknown id
        };
        let metric = PerformanceMetric {
            id: span.operation_id,
            operation: operation.to_string(),
            algorithm: algorithm.map(|a| a.to_string()).or(span.algorithm),
            started_at_ms: span.started_at_ms,
            duration_ms: span.started.elapsed().as_secs_f64() * 1000.0,
            success,
            data_size,
            error_kind: error_kind.map(|k| k.to_string()),
        };

        for subscriber in self.subscribers.lock().iter() {
            subscriber(&metric);
        }

        let mut completed = self.completed.lock();
        if completed.len() == self.config.max_metrics {
            completed.pop_front();
        }
        completed.push_back(metric);
    }

    /// Registers a real-time subscriber for completed metrics.
    pub fn subscribe(&self, subscriber: impl Fn(&PerformanceMetric) + Send + Sync + 'static) {
        self.subscribers.lock().push(Box::new(subscriber));
    }

    /// Drops metrics older than the given epoch-millisecond cutoff.
    pub fn cleanup_before(&self, cutoff_ms: i64) -> usize {
        let mut completed = self.completed.lock();
        let before = completed.len();
        completed.retain(|metric| metric.started_at_ms >= cutoff_ms);
        before - completed.len()
    }

    /// Builds the aggregate report over `[since_ms, now]`. With no `since`
    /// the whole ring is the window.
    pub fn generate_report(&self, since_ms: Option<i64>) -> PerformanceReport {
        let now_ms = Utc::now().timestamp_millis();
        let since_ms = since_ms.unwrap_or(0);
        let completed = self.completed.lock();

        let mut by_algorithm: HashMap<String, OperationStats> = HashMap::new();
        let mut by_operation: HashMap<String, OperationStats> = HashMap::new();
        let mut bins: HashMap<i64, (u64, f64, u64)> = HashMap::new(); // count, total_ms, errors
        let mut total = 0u64;
        let mut successes = 0u64;
        let mut total_ms = 0.0f64;
        let mut total_bytes = 0u64;

        for metric in completed.iter().filter(|m| m.started_at_ms >= since_ms) {
            total += 1;
            if metric.success {
                successes += 1;
            }
            total_ms += metric.duration_ms;
            total_bytes += metric.data_size.unwrap_or(0);

            if let Some(algorithm) = &metric.algorithm {
                by_algorithm.entry(algorithm.clone()).or_default().absorb(metric);
            }
            by_operation.entry(metric.operation.clone()).or_default().absorb(metric);

            let minute = metric.started_at_ms - metric.started_at_ms.rem_euclid(60_000);
            let bin = bins.entry(minute).or_insert((0, 0.0, 0));
            bin.0 += 1;
            bin.1 += metric.duration_ms;
            if !metric.success {
                bin.2 += 1;
            }
        }

        let mut timeseries: Vec<TimeseriesBin> = bins
            .into_iter()
            .map(|(minute_start_ms, (count, bin_ms, errors))| TimeseriesBin {
                minute_start_ms,
                ops_per_sec: count as f64 / 60.0,
                avg_latency_ms: if count > 0 { bin_ms / count as f64 } else { 0.0 },
                error_rate: if count > 0 { errors as f64 / count as f64 } else { 0.0 },
            })
            .collect();
        timeseries.sort_by_key(|bin| bin.minute_start_ms);

        debug!(total, since_ms, "generated performance report");
        PerformanceReport {
            generated_at_ms: now_ms,
            since_ms,
            total_operations: total,
            success_rate: if total > 0 { successes as f64 / total as f64 } else { 0.0 },
            avg_duration_ms: if total > 0 { total_ms / total as f64 } else { 0.0 },
            total_bytes,
            by_algorithm,
            by_operation,
            timeseries,
        }
    }

    /// JSON projection of the report for export endpoints.
    pub fn export_json(&self, since_ms: Option<i64>) -> Result<String, CryptoError> {
        serde_json::to_string_pretty(&self.generate_report(since_ms)).map_err(CryptoError::from)
    }

    /// Fresh operation id for a span.
    pub fn next_operation_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.sequence.load(Ordering::Relaxed))
    }

    pub fn recorded_len(&self) -> usize {
        self.completed.lock().len()
    }
}
