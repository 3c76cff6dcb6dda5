//! The owned `Chunk` type.

use bytes::Bytes;
use std::fmt;
use std::ops::Range;

use super::ChunkHash;
use crate::config::HashConfig;

/// A materialized chunk: its bytes, where they came from, and optionally
/// their content hash.
///
/// Produced by [`ChunkView::to_chunk`](crate::ChunkView::to_chunk) and
/// [`Chunker::chunk_bytes`](crate::Chunker::chunk_bytes).
///
/// # Example
///
/// ```
/// use rabinrs::Chunk;
/// use bytes::Bytes;
///
/// let chunk = Chunk::new(Bytes::from_static(b"hello world"), 100);
///
/// assert_eq!(chunk.len(), 11);
/// assert_eq!(chunk.range(), 100..111);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk bytes.
    pub data: Bytes,

    /// Offset of the first byte in the source stream.
    pub offset: u64,

    /// The content hash, if hashing was enabled.
    pub hash: Option<ChunkHash>,
}

impl Chunk {
    /// Creates an unhashed chunk starting at `offset`.
    pub fn new(data: impl Into<Bytes>, offset: u64) -> Self {
        Self {
            data: data.into(),
            offset,
            hash: None,
        }
    }

    /// Attaches a content hash.
    pub fn with_hash(mut self, hash: ChunkHash) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Attaches the BLAKE3 hash of the data when `config` enables hashing.
    ///
    /// Without the `hash-blake3` feature the chunk is returned unchanged.
    pub(crate) fn hashed_if(self, config: &HashConfig) -> Self {
        #[cfg(feature = "hash-blake3")]
        {
            if config.enabled {
                let hash = crate::hash::Blake3Hasher::hash(&self.data);
                return self.with_hash(hash);
            }
        }
        #[cfg(not(feature = "hash-blake3"))]
        let _ = config;

        self
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the start offset.
    pub fn start(&self) -> u64 {
        self.offset
    }

    /// Returns the end offset (exclusive).
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }

    /// Returns the chunk as a range of the source stream.
    pub fn range(&self) -> Range<u64> {
        self.start()..self.end()
    }

    /// Consumes the chunk and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({} bytes @ {}", self.len(), self.offset)?;
        if let Some(hash) = self.hash {
            write!(f, ", hash={}", hash)?;
        }
        write!(f, ")")
    }
}
