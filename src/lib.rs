//! rabinrs
//!
//! Rabin-fingerprint Content-Defined Chunking (CDC) for Rust.
//!
//! `rabinrs` splits a byte source into variable-length chunks whose
//! boundaries depend only on nearby content. An insertion or deletion moves
//! the boundaries around the edit and leaves the rest of the stream's chunks
//! untouched, which is what makes it useful for:
//!
//! - delta synchronization
//! - deduplication
//! - backup systems
//! - content-addressable storage
//!
//! A rolling polynomial fingerprint is computed over a small sliding window.
//! A chunk ends after the first byte whose fingerprint has its low
//! `boundary_bits` bits clear, but never before `min_size` bytes and never
//! after `max_size` hashed bytes.
//!
//! The crate intentionally:
//! - does NOT manage files or paths
//! - does NOT manage concurrency
//! - does NOT persist chunks
//!
//! It only does one thing: **Read bytes → yield chunk boundaries**
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use rabinrs::{Chunker, ChunkConfig, ChunkError};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let file = File::open("data.bin")?;
//!     let chunker = Chunker::new(ChunkConfig::default())?;
//!
//!     for view in chunker.chunk(&file)? {
//!         let view = view?;
//!         let chunk = view.to_chunk(chunker.config().hash_config())?;
//!         println!("{chunk}");
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod error;
mod source;

mod buffer; // internal (thread-local reuse)
mod hash; // internal blake3 impl

pub mod cdc;

//
// Public surface
//

pub use cdc::{BoundaryScanner, Cut, PopTable, RabinHash};
pub use chunk::{Chunk, ChunkHash, ChunkView};
pub use chunker::{ChunkIter, Chunker};
pub use config::{ChunkConfig, HashConfig};
pub use error::ChunkError;
pub use source::ByteSource;
