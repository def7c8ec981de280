// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Performance Observation Records
//!
//! Serializable records produced by the performance observer: one
//! [`PerformanceMetric`] per completed operation, aggregated into a
//! [`PerformanceReport`] on demand. Live timing state (`Instant`s) never
//! appears here; completed records carry epoch-millisecond timestamps and
//! millisecond durations so they serialize cleanly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One completed operation span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub id: String,
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
    /// Milliseconds since the Unix epoch at span start.
    #[serde(rename = "startedAt")]
    pub started_at_ms: i64,
    #[serde(rename = "durationMs")]
    pub duration_ms: f64,
    pub success: bool,
    #[serde(rename = "dataSize", skip_serializing_if = "Option::is_none")]
    pub data_size: Option<u64>,
    #[serde(rename = "errorKind", skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
}

/// Aggregate statistics for one algorithm or operation name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationStats {
    pub count: u64,
    #[serde(rename = "avgMs")]
    pub avg_ms: f64,
    #[serde(rename = "successRate")]
    pub success_rate: f64,
    #[serde(rename = "totalBytes")]
    pub total_bytes: u64,
}

impl OperationStats {
    /// Folds one metric into the aggregate.
    pub fn absorb(&mut self, metric: &PerformanceMetric) {
        let successes = self.success_rate * self.count as f64;
        let total_ms = self.avg_ms * self.count as f64;
        self.count += 1;
        self.avg_ms = (total_ms + metric.duration_ms) / self.count as f64;
        self.success_rate = (successes + if metric.success { 1.0 } else { 0.0 }) / self.count as f64;
        self.total_bytes += metric.data_size.unwrap_or(0);
    }
}

/// One minute of activity in the report timeseries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesBin {
    /// Start of the minute, milliseconds since the Unix epoch.
    #[serde(rename = "minuteStart")]
    pub minute_start_ms: i64,
    #[serde(rename = "opsPerSec")]
    pub ops_per_sec: f64,
    #[serde(rename = "avgLatencyMs")]
    pub avg_latency_ms: f64,
    #[serde(rename = "errorRate")]
    pub error_rate: f64,
}

/// Aggregated view over a requested window. Rates are computed over the
/// window of the report, never over process uptime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    #[serde(rename = "generatedAt")]
    pub generated_at_ms: i64,
    /// Start of the reporting window.
    #[serde(rename = "since")]
    pub since_ms: i64,
    #[serde(rename = "totalOperations")]
    pub total_operations: u64,
    #[serde(rename = "successRate")]
    pub success_rate: f64,
    #[serde(rename = "avgDurationMs")]
    pub avg_duration_ms: f64,
    #[serde(rename = "totalBytes")]
    pub total_bytes: u64,
    #[serde(rename = "byAlgorithm")]
    pub by_algorithm: HashMap<String, OperationStats>,
    #[serde(rename = "byOperation")]
    pub by_operation: HashMap<String, OperationStats>,
    pub timeseries: Vec<TimeseriesBin>,
}
