// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Chunked Stream Engine
//!
//! Applies a block cipher over a lazy sequence of byte chunks without
//! materializing the whole input. The engine buffers partial blocks
//! internally, so chunk boundaries are irrelevant: the concatenated output
//! is bit-identical to the single-shot operation over the concatenated
//! input.
//!
//! ## State machine
//!
//! ```text
//! Created → Configured → Running → Finalized
//!                  │         ↑ │
//!                  └──error──┘ ↓
//!                         Failed (terminal)
//! ```
//!
//! `init` configures, the first `update` starts the run, `finalize`
//! flushes buffered bytes and applies final padding. Engines are
//! single-use; any call after `finalize` is `InvalidState`. A primitive
//! failure moves the engine to `Failed` after zeroing its internal state.
//!
//! Streaming supports the chainable block modes (CBC, ECB). The stream
//! and AEAD modes keep whole-message state the chunk protocol cannot
//! split; they are rejected at `init`.

use zeroize::Zeroize;

use crypto_toolkit_domain::services::SymmetricRequest;
use crypto_toolkit_domain::value_objects::{ChunkSize, CipherMode, PaddingScheme, SymmetricAlgorithm};
use crypto_toolkit_domain::{CryptoError, SecretBuffer};

use crate::application::runtime::CoreRuntime;
use crate::application::services::support::normalize_key;
use crate::infrastructure::encoding::{self, EncodingKind};

/// Progress snapshot emitted after each `update`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamProgress {
    pub processed_bytes: u64,
    pub total_bytes: Option<u64>,
    pub percentage: Option<f64>,
}

type ProgressFn = Box<dyn FnMut(StreamProgress) + Send>;

/// Stream configuration; `chunk_size` is advisory for callers that read
/// their own input.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    pub algorithm: SymmetricAlgorithm,
    pub mode: CipherMode,
    pub padding: PaddingScheme,
    pub chunk_size: ChunkSize,
    /// Expected input size, for percentage reporting.
    pub total_bytes: Option<u64>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            algorithm: SymmetricAlgorithm::Aes,
            mode: CipherMode::Cbc,
            padding: PaddingScheme::Pkcs7,
            chunk_size: ChunkSize::default(),
            total_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Created,
    Configured,
    Running,
    Finalized,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

struct StreamCore<'r> {
    runtime: &'r CoreRuntime,
    direction: Direction,
    state: StreamState,
    config: StreamConfig,
    key: Option<SecretBuffer>,
    /// Chaining IV for CBC; empty for ECB.
    chain_iv: Vec<u8>,
    /// Hex of the initial IV, surfaced so the peer can be configured.
    initial_iv: Option<String>,
    buffered: Vec<u8>,
    processed: u64,
    progress: Option<ProgressFn>,
}

impl<'r> StreamCore<'r> {
    fn new(runtime: &'r CoreRuntime, direction: Direction) -> Self {
        Self {
            runtime,
            direction,
            state: StreamState::Created,
            config: StreamConfig::default(),
            key: None,
            chain_iv: Vec::new(),
            initial_iv: None,
            buffered: Vec::new(),
            processed: 0,
            progress: None,
        }
    }

    fn init(&mut self, config: StreamConfig, key: &str, iv_hex: Option<&str>) -> Result<(), CryptoError> {
        if self.state != StreamState::Created {
            return Err(CryptoError::invalid_state("stream already configured"));
        }
        if !matches!(config.mode, CipherMode::Cbc | CipherMode::Ecb) {
            return Err(CryptoError::unsupported(format!(
                "streaming supports CBC and ECB, not {}",
                config.mode
            )));
        }
        if !config.algorithm.supports_mode(config.mode) {
            return Err(CryptoError::unsupported(format!(
                "{} does not support {} mode",
                config.algorithm, config.mode
            )));
        }

        let target_len = match config.algorithm {
            SymmetricAlgorithm::Aes => 32,
            SymmetricAlgorithm::Blowfish => 56,
            other => other.fixed_key_len().unwrap_or(32),
        };
        let key = normalize_key(key, target_len)?;

        let required_iv = config.mode.iv_len(config.algorithm.block_size());
        let iv = match (iv_hex, required_iv) {
            (Some(_), 0) => return Err(CryptoError::InvalidIv("ECB mode takes no IV".to_string())),
            (Some(iv_hex), required) => {
                let iv = encoding::decode(iv_hex, EncodingKind::Hex)
                    .map_err(|_| CryptoError::InvalidIv("IV must be hex".to_string()))?;
                if iv.len() != required {
                    return Err(CryptoError::InvalidIv(format!(
                        "{} requires a {}-byte IV, got {}",
                        config.mode,
                        required,
                        iv.len()
                    )));
                }
                iv
            }
            (None, 0) => Vec::new(),
            (None, required) => match self.direction {
                Direction::Encrypt => self.runtime.primitive().random_bytes(required)?,
                Direction::Decrypt => {
                    return Err(CryptoError::InvalidIv("decryption requires the original IV".to_string()))
                }
            },
        };

        self.initial_iv = (!iv.is_empty()).then(|| hex::encode(&iv));
        self.chain_iv = iv;
        self.key = Some(key);
        self.config = config;
        self.state = StreamState::Configured;
        Ok(())
    }

    fn on_progress(&mut self, callback: ProgressFn) {
        self.progress = Some(callback);
    }

    fn emit_progress(&mut self) {
        if let Some(callback) = &mut self.progress {
            let total = self.config.total_bytes;
            callback(StreamProgress {
                processed_bytes: self.processed,
                total_bytes: total,
                percentage: total
                    .filter(|&t| t > 0)
                    .map(|t| (self.processed as f64 / t as f64 * 100.0).min(100.0)),
            });
        }
    }

    fn fail(&mut self, error: CryptoError) -> CryptoError {
        if let Some(mut key) = self.key.take() {
            key.as_mut_slice().zeroize();
        }
        self.buffered.zeroize();
        self.buffered.clear();
        self.chain_iv.zeroize();
        self.chain_iv.clear();
        self.state = StreamState::Failed;
        error
    }

    /// Bytes safe to transform now. Decryption must hold back the last
    /// complete block until `finalize`, since it may carry the padding.
    fn drainable_len(&self) -> usize {
        let block = self.config.algorithm.block_size();
        let complete = self.buffered.len() - self.buffered.len() % block;
        match self.direction {
            Direction::Encrypt => complete,
            Direction::Decrypt => {
                if self.buffered.len() % block == 0 {
                    complete.saturating_sub(block)
                } else {
                    complete
                }
            }
        }
    }

    fn run_primitive(&mut self, input: &[u8], padding: PaddingScheme) -> Result<Vec<u8>, CryptoError> {
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| CryptoError::invalid_state("stream carries no key"))?;
        let request = SymmetricRequest {
            algorithm: self.config.algorithm,
            mode: self.config.mode,
            padding,
            key: key.as_slice(),
            iv: (!self.chain_iv.is_empty()).then_some(self.chain_iv.as_slice()),
            input,
        };
        let output = match self.direction {
            Direction::Encrypt => self.runtime.primitive().encrypt_sym(&request),
            Direction::Decrypt => self.runtime.primitive().decrypt_sym(&request),
        }?;

        // CBC chains on ciphertext: the next IV is the last ciphertext
        // block that crossed the boundary, whichever side produced it.
        if self.config.mode == CipherMode::Cbc {
            let block = self.config.algorithm.block_size();
            let ciphertext = match self.direction {
                Direction::Encrypt => &output,
                Direction::Decrypt => input,
            };
            if ciphertext.len() >= block {
                self.chain_iv.clear();
                self.chain_iv.extend_from_slice(&ciphertext[ciphertext.len() - block..]);
            }
        }
        Ok(output)
    }

    fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match self.state {
            StreamState::Configured | StreamState::Running => {}
            StreamState::Created => return Err(CryptoError::invalid_state("stream is not configured")),
            StreamState::Finalized => return Err(CryptoError::invalid_state("stream already finalized")),
            StreamState::Failed => return Err(CryptoError::invalid_state("stream failed")),
        }
        self.state = StreamState::Running;
        self.buffered.extend_from_slice(chunk);
        self.processed += chunk.len() as u64;

        let drainable = self.drainable_len();
        let output = if drainable > 0 {
            // Stage the run through the buffer pool; the staging copy is
            // scrubbed on release.
            let pool = self.runtime.buffer_pool();
            let mut staging = pool.acquire(drainable);
            staging.copy_from_slice(&self.buffered[..drainable]);
            let result = self.run_primitive(&staging[..], PaddingScheme::NoPadding);
            pool.release(staging);
            let transformed = result.map_err(|e| self.fail(e))?;
            self.buffered.drain(..drainable);
            transformed
        } else {
            Vec::new()
        };

        self.emit_progress();
        Ok(output)
    }

    fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        match self.state {
            StreamState::Configured | StreamState::Running => {}
            StreamState::Created => return Err(CryptoError::invalid_state("stream is not configured")),
            StreamState::Finalized => return Err(CryptoError::invalid_state("stream already finalized")),
            StreamState::Failed => return Err(CryptoError::invalid_state("stream failed")),
        }

        let block = self.config.algorithm.block_size();
        let tail = std::mem::take(&mut self.buffered);
        let output = match self.direction {
            Direction::Encrypt => {
                if self.config.padding == PaddingScheme::NoPadding && tail.len() % block != 0 {
                    return Err(self.fail(CryptoError::invalid_input(format!(
                        "input length must be a multiple of {} bytes without padding",
                        block
                    ))));
                }
                if tail.is_empty() && self.config.padding != PaddingScheme::Pkcs7 {
                    Vec::new()
                } else {
                    let padding = self.config.padding;
                    self.run_primitive(&tail, padding).map_err(|e| self.fail(e))?
                }
            }
            Direction::Decrypt => {
                if tail.is_empty() {
                    Vec::new()
                } else if tail.len() % block != 0 {
                    return Err(self.fail(CryptoError::DecryptionFailed));
                } else {
                    let padding = self.config.padding;
                    self.run_primitive(&tail, padding).map_err(|e| self.fail(e))?
                }
            }
        };

        if let Some(mut key) = self.key.take() {
            key.as_mut_slice().zeroize();
        }
        self.state = StreamState::Finalized;
        self.emit_progress();
        Ok(output)
    }
}

/// Chunk-at-a-time encryptor.
pub struct ChunkEncryptor<'r> {
    core: StreamCore<'r>,
}

impl<'r> ChunkEncryptor<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self {
            core: StreamCore::new(runtime, Direction::Encrypt),
        }
    }

    /// Configures the stream. Without an IV, CBC generates one; read it
    /// back with [`ChunkEncryptor::iv_hex`].
    pub fn init(&mut self, config: StreamConfig, key: &str, iv_hex: Option<&str>) -> Result<(), CryptoError> {
        self.core.init(config, key, iv_hex)
    }

    /// Registers a progress callback invoked after every `update`.
    pub fn on_progress(&mut self, callback: impl FnMut(StreamProgress) + Send + 'static) {
        self.core.on_progress(Box::new(callback));
    }

    /// Feeds one chunk; returns the ciphertext produced so far. Output
    /// length differs from input length because partial blocks stay
    /// buffered.
    pub fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.core.update(chunk)
    }

    /// Flushes buffered bytes with final padding. The engine is spent
    /// afterwards.
    pub fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.core.finalize()
    }

    pub fn iv_hex(&self) -> Option<&str> {
        self.core.initial_iv.as_deref()
    }
}

/// Chunk-at-a-time decryptor; mirror of [`ChunkEncryptor`].
pub struct ChunkDecryptor<'r> {
    core: StreamCore<'r>,
}

impl<'r> ChunkDecryptor<'r> {
    pub fn new(runtime: &'r CoreRuntime) -> Self {
        Self {
            core: StreamCore::new(runtime, Direction::Decrypt),
        }
    }

    /// Configures the stream. Decryption always needs the original IV for
    /// IV-bearing modes.
    pub fn init(&mut self, config: StreamConfig, key: &str, iv_hex: Option<&str>) -> Result<(), CryptoError> {
        self.core.init(config, key, iv_hex)
    }

    pub fn on_progress(&mut self, callback: impl FnMut(StreamProgress) + Send + 'static) {
        self.core.on_progress(Box::new(callback));
    }

    pub fn update(&mut self, chunk: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.core.update(chunk)
    }

    pub fn finalize(&mut self) -> Result<Vec<u8>, CryptoError> {
        self.core.finalize()
    }
}
