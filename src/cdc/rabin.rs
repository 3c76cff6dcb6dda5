//! Rabin-style rolling fingerprint over a fixed sliding window.
//!
//! The recurrence is
//!
//! ```text
//! hash = (hash * prime + in - out * prime^window) mod 2^shift
//! ```
//!
//! where `out` is the byte leaving the window. The modulus is a power of two,
//! so the reduction is a mask, and `out * prime^window` comes from the
//! [`PopTable`].

use std::sync::Arc;

use super::PopTable;
use crate::config::ChunkConfig;
use crate::error::ChunkError;

/// Rolling fingerprint state.
///
/// After at least `window_size` updates the value depends only on the last
/// `window_size` bytes fed in.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rabinrs::{ChunkConfig, PopTable, RabinHash};
///
/// let config = ChunkConfig::default();
/// let table = Arc::new(PopTable::from_config(&config));
/// let mut hash = RabinHash::new(&config, table)?;
///
/// for &byte in b"some bytes to roll over" {
///     hash.update(byte);
/// }
/// assert!(hash.hash() < 1 << config.shift());
/// # Ok::<(), rabinrs::ChunkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct RabinHash {
    /// Current fingerprint, always below `2^shift`.
    hash: u64,

    /// The last `window_size` bytes, indexed by `scanned & window_mask`.
    window: Box<[u8]>,

    /// Bytes fed since the last reset.
    scanned: u64,

    prime: u64,
    mask: u64,
    window_mask: u64,
    table: Arc<PopTable>,
}

impl RabinHash {
    /// Creates a cleared fingerprint for `config`, sharing `table`.
    ///
    /// `table` must have been built from the same prime, window and shift.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` fails
    /// [`ChunkConfig::validate`].
    pub fn new(config: &ChunkConfig, table: Arc<PopTable>) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self::from_valid(config, table))
    }

    /// Like [`new`](Self::new) for a configuration already validated.
    pub(crate) fn from_valid(config: &ChunkConfig, table: Arc<PopTable>) -> Self {
        let window_size = config.window_size();
        Self {
            hash: 0,
            window: vec![0u8; window_size].into_boxed_slice(),
            scanned: 0,
            prime: config.prime(),
            mask: config.modulus_mask(),
            window_mask: window_size as u64 - 1,
            table,
        }
    }

    /// Rolls `byte` into the window and returns the new fingerprint.
    #[inline]
    pub fn update(&mut self, byte: u8) -> u64 {
        let slot = (self.scanned & self.window_mask) as usize;
        let window_len = self.window.len() as u64;

        let outgoing = if self.scanned >= window_len {
            self.table.get(self.window[slot])
        } else {
            0
        };

        self.hash = self
            .hash
            .wrapping_mul(self.prime)
            .wrapping_add(byte as u64)
            .wrapping_sub(outgoing)
            & self.mask;

        self.window[slot] = byte;
        self.scanned += 1;
        self.hash
    }

    /// Returns true if every bit of `boundary_mask` is clear in the fingerprint.
    #[inline]
    pub fn is_boundary(&self, boundary_mask: u64) -> bool {
        self.hash & boundary_mask == 0
    }

    /// Returns the current fingerprint.
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Returns the number of bytes fed since the last reset.
    pub fn bytes_scanned(&self) -> u64 {
        self.scanned
    }

    /// Clears the fingerprint and the window.
    pub fn reset(&mut self) {
        self.hash = 0;
        self.scanned = 0;
        // Stale slots are never read before being overwritten.
        self.window.fill(0);
    }
}
