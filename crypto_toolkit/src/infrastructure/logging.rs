// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Tracing bootstrap for hosts that want the toolkit's structured logs.
//!
//! The library itself only emits `tracing` events; installing a subscriber
//! is the host's decision. `init_tracing` is a convenience for binaries
//! and test harnesses.

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a formatted subscriber honoring `RUST_LOG`, defaulting to
/// `info` for the toolkit's own targets. Calling it twice is harmless; the
/// second call is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crypto_toolkit=info"));
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}
