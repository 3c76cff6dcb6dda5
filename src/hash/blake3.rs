//! BLAKE3 chunk hashing.

use crate::chunk::ChunkHash;

/// Incremental BLAKE3 hasher producing [`ChunkHash`]es.
///
/// Used to hash a [`ChunkView`](crate::ChunkView) block by block without
/// materializing it.
#[derive(Debug, Clone, Default)]
pub struct Blake3Hasher {
    state: blake3::Hasher,
}

impl Blake3Hasher {
    /// Creates a new hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds more chunk bytes.
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    /// Returns the digest of everything fed so far.
    pub fn finalize(&self) -> ChunkHash {
        ChunkHash::new(self.state.finalize().into())
    }

    /// Hashes `data` in one shot.
    pub(crate) fn hash(data: &[u8]) -> ChunkHash {
        ChunkHash::new(blake3::hash(data).into())
    }
}
