//! Pop table for the Rabin rolling hash.
//!
//! When a byte leaves the sliding window its contribution to the fingerprint
//! has been multiplied by `prime` once per byte that followed it, i.e.
//! `byte * prime^window_size`. The table holds that product for every byte
//! value so removal is a single lookup.

use crate::config::ChunkConfig;

/// Precomputed outgoing-byte contributions, `(i * prime^window) mod 2^shift`.
///
/// Built once per [`Chunker`](crate::Chunker) and shared read-only by every
/// iterator it creates.
#[derive(Clone, PartialEq, Eq)]
pub struct PopTable {
    entries: [u64; 256],
    pow: u64,
}

impl PopTable {
    /// Builds the table for the given hash constants.
    ///
    /// `shift` is clamped to 64. Arithmetic wraps in `u64` and is then
    /// masked, which is exact because the modulus is a power of two.
    pub fn new(prime: u64, window_size: usize, shift: u32) -> Self {
        let mask = if shift >= 64 {
            u64::MAX
        } else {
            (1u64 << shift) - 1
        };
        let pow = pow_mod(prime, window_size as u64, mask);

        let mut entries = [0u64; 256];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = (i as u64).wrapping_mul(pow) & mask;
        }

        Self { entries, pow }
    }

    /// Builds the table described by `config`.
    pub fn from_config(config: &ChunkConfig) -> Self {
        Self::new(config.prime(), config.window_size(), config.shift())
    }

    /// Returns the contribution of `byte` as it leaves the window.
    #[inline]
    pub fn get(&self, byte: u8) -> u64 {
        self.entries[byte as usize]
    }

    /// Returns `prime^window_size mod 2^shift`.
    pub fn pow(&self) -> u64 {
        self.pow
    }

    /// Returns the raw table.
    pub fn as_array(&self) -> &[u64; 256] {
        &self.entries
    }
}

impl std::fmt::Debug for PopTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PopTable").field("pow", &self.pow).finish_non_exhaustive()
    }
}

/// Square-and-multiply exponentiation modulo `mask + 1` (a power of two).
fn pow_mod(base: u64, mut exp: u64, mask: u64) -> u64 {
    let mut result = 1u64 & mask;
    let mut base = base & mask;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base) & mask;
        }
        base = base.wrapping_mul(base) & mask;
        exp >>= 1;
    }
    result
}
