// /////////////////////////////////////////////////////////////////////////////
// Crypto Toolkit
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secret Buffer
//!
//! Owned key material with deterministic zeroing. When a `SecretBuffer` is
//! dropped, every byte of its backing storage is overwritten with zero
//! before the memory is reclaimed; the toolkit never trusts the allocator
//! to scrub key bytes.
//!
//! ## Ownership model
//!
//! Buffers are move-only. There is no `Clone` impl; copying key material is
//! an explicit, auditable act via [`SecretBuffer::duplicate`]. Sharing a
//! buffer across threads means transferring ownership.
//!
//! ## Comparison and debugging
//!
//! Equality is constant-time (`subtle`), and the `Debug` form never prints
//! the contents, only the length.

use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Fixed-content byte buffer that zeroes its storage on drop.
pub struct SecretBuffer {
    data: Vec<u8>,
}

impl SecretBuffer {
    /// Takes ownership of the given bytes. The source vector becomes the
    /// backing storage, so no unscrubbed copy is left behind.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Copies from a slice. Prefer [`SecretBuffer::new`] when the caller
    /// can hand over ownership.
    pub fn from_slice(data: &[u8]) -> Self {
        Self { data: data.to_vec() }
    }

    /// Zero-filled buffer of the given length.
    pub fn zeroed(len: usize) -> Self {
        Self { data: vec![0u8; len] }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Explicit copy of the key material. Copies are rare and auditable;
    /// the copy owns and scrubs its own storage.
    pub fn duplicate(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }

    /// Consumes the buffer and returns the bytes without scrubbing.
    /// The caller takes over the zeroing obligation.
    pub fn into_inner(mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

impl PartialEq for SecretBuffer {
    fn eq(&self, other: &Self) -> bool {
        // Length inequality short-circuits; length is public.
        self.data.len() == other.data.len() && bool::from(self.data.ct_eq(&other.data))
    }
}

impl Eq for SecretBuffer {}

impl fmt::Debug for SecretBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretBuffer({} bytes)", self.data.len())
    }
}

impl From<Vec<u8>> for SecretBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that the backing storage is zeroed when the buffer drops.
    ///
    /// Validates that:
    /// - Every byte of the storage reads 0 after drop
    /// - The probe observes the same allocation, not a copy
    #[test]
    fn test_storage_zeroed_on_drop() {
        let mut buf = SecretBuffer::new(vec![0xAA; 64]);
        let ptr = buf.as_slice().as_ptr();
        let len = buf.len();
        drop(buf);
        // Debug-only probe: the allocation may be reused at any time, but
        // reading immediately after drop observes the scrubbed bytes.
        let slice = unsafe { std::slice::from_raw_parts(ptr, len) };
        assert!(slice.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_equality_is_by_content() {
        let a = SecretBuffer::from_slice(b"0123456789abcdef");
        let b = SecretBuffer::from_slice(b"0123456789abcdef");
        let c = SecretBuffer::from_slice(b"0123456789abcdeX");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, SecretBuffer::from_slice(b"short"));
    }

    #[test]
    fn test_debug_never_prints_contents() {
        let buf = SecretBuffer::from_slice(b"super-secret-key");
        let rendered = format!("{:?}", buf);
        assert!(!rendered.contains("super"));
        assert!(rendered.contains("16 bytes"));
    }

    #[test]
    fn test_duplicate_is_independent() {
        let a = SecretBuffer::from_slice(b"material");
        let b = a.duplicate();
        drop(a);
        assert_eq!(b.as_slice(), b"material");
    }
}
