//! Strong content hashes for chunk identity.
//!
//! The rolling fingerprint only places boundaries; deduplication needs a
//! collision-resistant digest of each chunk's bytes. Currently BLAKE3 via the
//! `hash-blake3` feature.
//!
//! - [`Blake3Hasher`] - BLAKE3 hash implementation (requires `hash-blake3` feature)

#[cfg(feature = "hash-blake3")]
mod blake3;

#[cfg(feature = "hash-blake3")]
pub(crate) use self::blake3::Blake3Hasher;
