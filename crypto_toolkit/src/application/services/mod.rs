// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services: the public facades and the engines composed from
//! them.

pub mod asymmetric;
pub mod digest;
pub mod key_derivation;
pub mod key_rotation;
pub mod secure_storage;
pub mod serializer;
pub mod signature;
pub mod streaming;
pub mod support;
pub mod symmetric;

pub use asymmetric::{KeyPairResult, RsaFacade, RsaOptions};
pub use digest::{HashFacade, HashOptions};
pub use key_derivation::{Pbkdf2Facade, Pbkdf2Options, MIN_ITERATIONS};
pub use key_rotation::{KeyRotationEngine, ReencryptOutcome, RegistryExport, VersionedEncryptResult};
pub use secure_storage::{MemoryStorageBackend, SecureStorage, SecureStorageConfig};
pub use serializer::{EnvelopeInfo, ResultSerializer, SerializationFormat, SerializerOptions, ENVELOPE_VERSION};
pub use signature::SignatureFacade;
pub use streaming::{ChunkDecryptor, ChunkEncryptor, StreamConfig, StreamProgress};
pub use support::OperationOptions;
pub use symmetric::{SymmetricFacade, SymmetricOptions};
