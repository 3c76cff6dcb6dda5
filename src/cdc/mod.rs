//! Content-Defined Chunking (CDC) engine.
//!
//! This module contains the core algorithms for identifying chunk boundaries
//! based on content patterns rather than fixed sizes.
//!
//! - [`PopTable`] - Precomputed outgoing-byte contributions
//! - [`RabinHash`] - Rolling fingerprint over a fixed sliding window
//! - [`BoundaryScanner`] - Min/max chunk policy over positioned reads

mod rabin;
mod scanner;
mod table;

pub use rabin::RabinHash;
pub use scanner::{BoundaryScanner, Cut};
pub use table::PopTable;
