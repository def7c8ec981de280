// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application layer: the shared runtime and the public facade services.

pub mod runtime;
pub mod services;

pub use runtime::{CancellationFlag, CoreRuntime, RuntimeBuilder};
