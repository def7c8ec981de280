// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Infrastructure layer: concrete implementations of the domain ports plus
//! the cross-cutting machinery (pools, caches, rate limiting, metrics,
//! encoding, configuration).

pub mod adapters;
pub mod cache;
pub mod config;
pub mod encoding;
pub mod logging;
pub mod metrics;
pub mod pools;
pub mod rate_limiter;
