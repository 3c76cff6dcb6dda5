//! Chunking engine for processing byte sources.
//!
//! - [`Chunker`] - Validated configuration plus the shared pop table
//! - [`ChunkIter`] - Pull-based iterator yielding one view per chunk

mod iter;

pub use iter::{ChunkIter, Chunker};
