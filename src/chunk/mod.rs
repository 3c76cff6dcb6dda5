//! Chunk types.
//!
//! - [`ChunkView`] - Lazy `[start, end)` view over a byte source
//! - [`Chunk`] - Materialized chunk with data, offset, hash
//! - [`ChunkHash`] - 32-byte BLAKE3 hash

mod data;
mod hash;
mod view;

pub use data::Chunk;
pub use hash::ChunkHash;
pub use view::ChunkView;
