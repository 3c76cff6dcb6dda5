//! Configuration for chunking behavior.
//!
//! This module provides types to configure how chunking is performed:
//!
//! - [`ChunkConfig`] - Rolling hash parameters, chunk size bounds, read granularity
//! - [`HashConfig`] - Specifies whether materialized chunks carry a BLAKE3 hash
//!
//! # Example
//!
//! ```
//! use rabinrs::{ChunkConfig, HashConfig};
//!
//! // Custom chunk sizes
//! let config = ChunkConfig::new(64 * 1024, 256 * 1024)?;
//!
//! // Disable hashing
//! let config = config.with_hash_config(HashConfig::disabled());
//!
//! # Ok::<(), rabinrs::ChunkError>(())
//! ```

use crate::error::ChunkError;

/// Default hash multiplier (the Adler-32 prime).
pub const DEFAULT_PRIME: u64 = 65521;

/// Default sliding window width in bytes.
pub const DEFAULT_WINDOW_SIZE: usize = 16;

/// Default bit width of the hash modulus (`2^31`).
pub const DEFAULT_SHIFT: u32 = 31;

/// Default number of low hash bits that must be zero to cut (about 8 KiB
/// expected scan past the minimum).
pub const DEFAULT_BOUNDARY_BITS: u32 = 13;

/// Default minimum chunk size (4 MiB).
pub const DEFAULT_MIN_CHUNK_SIZE: u64 = 4 << 20;

/// Default maximum scan length past the minimum (5 MiB).
pub const DEFAULT_MAX_CHUNK_SIZE: u64 = 5 << 20;

/// Default size of each positioned read (8 KiB).
pub const DEFAULT_READ_BLOCK_SIZE: usize = 8192;

/// Largest supported sliding window.
pub const MAX_WINDOW_SIZE: usize = 256;

/// Configuration for content-defined chunking behavior.
///
/// `ChunkConfig` holds the rolling hash constants and the size policy used to
/// place boundaries:
///
/// - `min_size` - bytes skipped without hashing at the start of every chunk
/// - `max_size` - hard ceiling on bytes hashed after the skip; a cut is forced
///   when it is reached
/// - `boundary_bits` - a boundary is declared when this many low bits of the
///   fingerprint are zero, so the expected scan length is about
///   `2^boundary_bits` bytes
///
/// A chunk is therefore never longer than `min_size + max_size` (see
/// [`ChunkConfig::max_chunk_len`]), and never shorter than `min_size` unless it
/// is the last one.
///
/// # Constraints
///
/// - `prime` is odd
/// - `window_size` is a power of two no larger than [`MAX_WINDOW_SIZE`]
/// - `1 <= shift <= 64` and `1 <= boundary_bits <= shift`
/// - `min_size`, `max_size` and `read_block_size` are non-zero
///
/// # Example
///
/// ```
/// use rabinrs::ChunkConfig;
///
/// // Use default configuration (4 MiB minimum, 5 MiB scan ceiling)
/// let config = ChunkConfig::default();
///
/// // Builder pattern
/// let config = ChunkConfig::default()
///     .with_min_size(8192)
///     .with_max_size(65536)
///     .with_boundary_bits(12);
/// config.validate()?;
/// # Ok::<(), rabinrs::ChunkError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkConfig {
    /// Multiplier in the hash recurrence.
    prime: u64,

    /// Number of trailing bytes tracked by the fingerprint.
    window_size: usize,

    /// Bit width of the hash modulus.
    shift: u32,

    /// Low bits tested for the stop condition.
    boundary_bits: u32,

    /// Bytes skipped before hashing begins.
    min_size: u64,

    /// Ceiling on bytes hashed per boundary search.
    max_size: u64,

    /// Granularity of source reads.
    read_block_size: usize,

    /// Configuration for hashing behavior.
    hash_config: HashConfig,
}

impl ChunkConfig {
    /// Creates a new configuration with the given size bounds and default hash
    /// parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if either size is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use rabinrs::ChunkConfig;
    ///
    /// let config = ChunkConfig::new(4096, 65536)?;
    /// assert_eq!(config.min_size(), 4096);
    /// assert_eq!(config.max_chunk_len(), 4096 + 65536);
    /// # Ok::<(), rabinrs::ChunkError>(())
    /// ```
    pub fn new(min_size: u64, max_size: u64) -> Result<Self, ChunkError> {
        let config = Self {
            min_size,
            max_size,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Sets the hash multiplier.
    pub fn with_prime(mut self, prime: u64) -> Self {
        self.prime = prime;
        self
    }

    /// Sets the sliding window width.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Sets the bit width of the hash modulus.
    pub fn with_shift(mut self, shift: u32) -> Self {
        self.shift = shift;
        self
    }

    /// Sets the number of low fingerprint bits tested for a boundary.
    pub fn with_boundary_bits(mut self, bits: u32) -> Self {
        self.boundary_bits = bits;
        self
    }

    /// Sets the minimum chunk size.
    ///
    /// Note: This does not validate the configuration. Use [`ChunkConfig::validate`]
    /// to check if the configuration is valid.
    ///
    /// # Example
    ///
    /// ```
    /// use rabinrs::ChunkConfig;
    ///
    /// let config = ChunkConfig::default().with_min_size(8192);
    /// assert_eq!(config.min_size(), 8192);
    /// ```
    pub fn with_min_size(mut self, size: u64) -> Self {
        self.min_size = size;
        self
    }

    /// Sets the maximum number of bytes hashed after the minimum skip.
    ///
    /// Note: This does not validate the configuration.
    pub fn with_max_size(mut self, size: u64) -> Self {
        self.max_size = size;
        self
    }

    /// Sets the size of each positioned read.
    pub fn with_read_block_size(mut self, size: usize) -> Self {
        self.read_block_size = size;
        self
    }

    /// Sets the hash configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use rabinrs::{ChunkConfig, HashConfig};
    ///
    /// let config = ChunkConfig::default()
    ///     .with_hash_config(HashConfig::disabled());
    /// assert!(!config.hash_config().enabled);
    /// ```
    pub fn with_hash_config(mut self, config: HashConfig) -> Self {
        self.hash_config = config;
        self
    }

    /// Returns the hash multiplier.
    pub fn prime(&self) -> u64 {
        self.prime
    }

    /// Returns the sliding window width.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Returns the bit width of the hash modulus.
    pub fn shift(&self) -> u32 {
        self.shift
    }

    /// Returns the number of low bits tested for a boundary.
    pub fn boundary_bits(&self) -> u32 {
        self.boundary_bits
    }

    /// Returns the minimum chunk size.
    pub fn min_size(&self) -> u64 {
        self.min_size
    }

    /// Returns the maximum number of bytes hashed after the minimum skip.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Returns the longest chunk this configuration can produce.
    pub fn max_chunk_len(&self) -> u64 {
        self.min_size.saturating_add(self.max_size)
    }

    /// Returns the size of each positioned read.
    pub fn read_block_size(&self) -> usize {
        self.read_block_size
    }

    /// Returns the hash configuration.
    pub fn hash_config(&self) -> &HashConfig {
        &self.hash_config
    }

    /// Returns the mask that reduces a value modulo `2^shift`.
    pub(crate) fn modulus_mask(&self) -> u64 {
        low_bits(self.shift)
    }

    /// Returns the mask whose bits must all be zero at a boundary.
    pub(crate) fn boundary_mask(&self) -> u64 {
        low_bits(self.boundary_bits)
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use rabinrs::ChunkConfig;
    ///
    /// let config = ChunkConfig::default().with_window_size(12);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.prime % 2 == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "prime must be odd",
            });
        }

        if !self.window_size.is_power_of_two() || self.window_size > MAX_WINDOW_SIZE {
            return Err(ChunkError::InvalidConfig {
                message: "window_size must be a power of two no larger than 256",
            });
        }

        if self.shift == 0 || self.shift > 64 {
            return Err(ChunkError::InvalidConfig {
                message: "shift must be between 1 and 64",
            });
        }

        if self.boundary_bits == 0 || self.boundary_bits > self.shift {
            return Err(ChunkError::InvalidConfig {
                message: "boundary_bits must be between 1 and shift",
            });
        }

        if self.min_size == 0 || self.max_size == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "chunk sizes must be non-zero",
            });
        }

        if self.read_block_size == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "read_block_size must be non-zero",
            });
        }

        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            prime: DEFAULT_PRIME,
            window_size: DEFAULT_WINDOW_SIZE,
            shift: DEFAULT_SHIFT,
            boundary_bits: DEFAULT_BOUNDARY_BITS,
            min_size: DEFAULT_MIN_CHUNK_SIZE,
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            read_block_size: DEFAULT_READ_BLOCK_SIZE,
            hash_config: HashConfig::default(),
        }
    }
}

fn low_bits(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Configuration for chunk hashing behavior.
///
/// `HashConfig` controls whether BLAKE3 hashes are computed when a chunk is
/// materialized. Hashing is enabled by default.
///
/// # Example
///
/// ```
/// use rabinrs::HashConfig;
///
/// // Enable hashing
/// let config = HashConfig::enabled();
///
/// // Disable hashing
/// let config = HashConfig::disabled();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashConfig {
    /// Whether to compute BLAKE3 hashes for chunks.
    pub enabled: bool,
}

impl HashConfig {
    /// Creates a new hash configuration.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enables hashing.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disables hashing.
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
