//! Core chunking API - Chunker and ChunkIter.
//!
//! - [`Chunker`] - Holds the configuration and the shared pop table, attaches
//!   streams
//! - [`ChunkIter`] - Iterator that yields one [`ChunkView`] per chunk of a
//!   [`ByteSource`]
//!
//! # Example
//!
//! ```no_run
//! use std::fs::File;
//! use rabinrs::{Chunker, ChunkConfig};
//!
//! let file = File::open("data.bin")?;
//! let chunker = Chunker::new(ChunkConfig::default())?;
//!
//! for chunk in chunker.chunk(&file)? {
//!     let chunk = chunk?;
//!     println!("chunk {:?}: {} bytes", chunk.range(), chunk.len());
//! }
//! # Ok::<(), rabinrs::ChunkError>(())
//! ```

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::cdc::{BoundaryScanner, PopTable};
use crate::chunk::{Chunk, ChunkView};
use crate::config::ChunkConfig;
use crate::error::ChunkError;
use crate::source::ByteSource;

/// A chunker that splits byte sources into content-defined chunks.
///
/// `Chunker` validates a [`ChunkConfig`] and builds the [`PopTable`] for it
/// once. Every iterator created by [`Chunker::chunk`], and every clone of the
/// chunker, shares that table.
///
/// # Example
///
/// ```
/// use rabinrs::{Chunker, ChunkConfig};
///
/// let data: Vec<u8> = (0..100_000u32).map(|i| (i * 7 + i / 251) as u8).collect();
/// let chunker = Chunker::new(ChunkConfig::new(4096, 65536)?.with_boundary_bits(10))?;
///
/// let mut total = 0;
/// for chunk in chunker.chunk(&data)? {
///     total += chunk?.len();
/// }
/// assert_eq!(total, data.len() as u64);
/// # Ok::<(), rabinrs::ChunkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
    table: Arc<PopTable>,
}

impl Chunker {
    /// Creates a new chunker with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` fails
    /// [`ChunkConfig::validate`].
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: ChunkConfig) -> Self {
        Self {
            table: Arc::new(PopTable::from_config(&config)),
            config,
        }
    }

    /// Attaches a source and returns an iterator over its chunks.
    ///
    /// The source is borrowed for the lifetime of the iterator and of every
    /// view it yields.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Io`] if the length of the source cannot be read.
    pub fn chunk<'a, S>(&self, source: &'a S) -> Result<ChunkIter<'a, S>, ChunkError>
    where
        S: ByteSource + ?Sized,
    {
        ChunkIter::new(source, self.config, Arc::clone(&self.table))
    }

    /// Chunks an in-memory buffer into owned [`Chunk`]s.
    ///
    /// Chunk data is zero-copy sliced from `data`. Hashes are attached when
    /// the configuration's [`HashConfig`](crate::HashConfig) enables them.
    ///
    /// # Example
    ///
    /// ```
    /// use rabinrs::{Chunker, ChunkConfig};
    ///
    /// let chunker = Chunker::new(ChunkConfig::new(16, 64)?)?;
    /// let chunks = chunker.chunk_bytes(&b"hello world, this is a short stream"[..])?;
    ///
    /// assert!(!chunks.is_empty());
    /// assert_eq!(chunks[0].offset, 0);
    /// # Ok::<(), rabinrs::ChunkError>(())
    /// ```
    pub fn chunk_bytes(&self, data: impl Into<Bytes>) -> Result<Vec<Chunk>, ChunkError> {
        let data = data.into();
        let hash_config = *self.config.hash_config();

        self.chunk(&data)?
            .map(|view| {
                let view = view?;
                let slice = data.slice(view.start() as usize..view.end() as usize);
                Ok(Chunk::new(slice, view.start()).hashed_if(&hash_config))
            })
            .collect()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Returns the shared pop table.
    pub fn table(&self) -> &Arc<PopTable> {
        &self.table
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::with_valid_config(ChunkConfig::default())
    }
}

/// Per-stream iteration state.
#[derive(Debug)]
enum State {
    /// The stream is shorter than `min_size` and is yielded whole, without
    /// fingerprinting.
    Single { len: u64, done: bool },

    /// Boundaries are found by scanning.
    Scan(BoundaryScanner),

    /// A read failed at `position`. Nothing more is yielded until a reset.
    Failed { position: u64 },
}

impl State {
    fn attach(config: &ChunkConfig, table: &Arc<PopTable>, len: u64) -> Self {
        if len < config.min_size() {
            State::Single {
                len,
                done: len == 0,
            }
        } else {
            State::Scan(BoundaryScanner::from_valid(config, Arc::clone(table), len))
        }
    }
}

/// An iterator over the chunks of a [`ByteSource`].
///
/// Each item is a lazy [`ChunkView`] of `[start, end)`. Views are contiguous,
/// non-overlapping, and together cover the source exactly once. Iteration ends
/// (`None`) when the whole stream has been yielded.
///
/// A stream shorter than `min_size` is yielded as one chunk covering all of
/// it. An empty stream yields no chunks at all.
///
/// After an `Err` item the iterator yields `None` until
/// [`reset`](ChunkIter::reset) or [`reset_with`](ChunkIter::reset_with) is
/// called.
///
/// # Example
///
/// ```
/// use rabinrs::{Chunker, ChunkConfig};
///
/// let data = vec![0u8; 1000];
/// let chunker = Chunker::new(ChunkConfig::new(64, 4096)?)?;
/// let mut iter = chunker.chunk(&data)?;
///
/// let first: Vec<_> = iter.by_ref().map(|c| c.map(|c| c.range())).collect::<Result<_, _>>()?;
/// iter.reset()?;
/// let second: Vec<_> = iter.map(|c| c.map(|c| c.range())).collect::<Result<_, _>>()?;
///
/// assert_eq!(first, second);
/// # Ok::<(), rabinrs::ChunkError>(())
/// ```
pub struct ChunkIter<'a, S: ?Sized> {
    source: &'a S,
    config: ChunkConfig,
    table: Arc<PopTable>,
    stream_len: u64,
    state: State,
}

impl<'a, S: ByteSource + ?Sized> ChunkIter<'a, S> {
    fn new(source: &'a S, config: ChunkConfig, table: Arc<PopTable>) -> Result<Self, ChunkError> {
        let stream_len = source.len()?;
        let state = State::attach(&config, &table, stream_len);
        debug!(
            stream_len,
            single = matches!(state, State::Single { .. }),
            "attached stream"
        );

        Ok(Self {
            source,
            config,
            table,
            stream_len,
            state,
        })
    }

    /// Rewinds the current source and restarts iteration from offset zero.
    ///
    /// The length is queried again, so a source that grew or shrank is
    /// chunked as it is now.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Io`] if the source cannot be rewound or its
    /// length cannot be read; the iterator is left unchanged.
    pub fn reset(&mut self) -> Result<(), ChunkError> {
        self.reset_with(self.source)
    }

    /// Rebinds the iterator to `source` and restarts from offset zero.
    ///
    /// # Errors
    ///
    /// Same as [`reset`](ChunkIter::reset).
    pub fn reset_with(&mut self, source: &'a S) -> Result<(), ChunkError> {
        source.rewind()?;
        let stream_len = source.len()?;

        self.source = source;
        self.stream_len = stream_len;
        self.state = State::attach(&self.config, &self.table, stream_len);
        debug!(stream_len, "reset chunk iterator");
        Ok(())
    }

    /// Returns the absolute offset where the next chunk starts.
    pub fn position(&self) -> u64 {
        match &self.state {
            State::Single { len, done } => {
                if *done {
                    *len
                } else {
                    0
                }
            }
            State::Scan(scanner) => scanner.position(),
            State::Failed { position } => *position,
        }
    }

    /// Returns the length of the attached stream.
    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    /// Returns true if the stream is yielded as a single unhashed chunk.
    pub fn is_single_chunk(&self) -> bool {
        matches!(self.state, State::Single { .. })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }
}

impl<'a, S: ByteSource + ?Sized> Iterator for ChunkIter<'a, S> {
    type Item = Result<ChunkView<'a, S>, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.state {
            State::Single { len, done } => {
                if *done {
                    return None;
                }
                let len = *len;
                *done = true;

                // The whole stream is one chunk; hand it out from the start.
                if let Err(e) = self.source.rewind() {
                    self.state = State::Failed { position: 0 };
                    return Some(Err(e.into()));
                }
                trace!(len, "stream below min_size, yielding it whole");
                Some(Ok(ChunkView::new(self.source, 0, len)))
            }
            State::Scan(scanner) => {
                if scanner.is_exhausted() {
                    return None;
                }
                match scanner.find_next_cut(self.source) {
                    Ok((start, end, cut)) => {
                        debug!(start, end, len = end - start, ?cut, "chunk boundary");
                        Some(Ok(ChunkView::new(self.source, start, end)))
                    }
                    Err(e) => {
                        let position = scanner.position();
                        self.state = State::Failed { position };
                        Some(Err(e))
                    }
                }
            }
            State::Failed { .. } => None,
        }
    }
}

impl<S: ?Sized> std::fmt::Debug for ChunkIter<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkIter")
            .field("config", &self.config)
            .field("stream_len", &self.stream_len)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn ranges<S: ByteSource + ?Sized>(iter: ChunkIter<'_, S>) -> Vec<(u64, u64)> {
        iter.map(|view| {
            let view = view.unwrap();
            (view.start(), view.end())
        })
        .collect()
    }

    #[test]
    fn test_empty_stream() {
        let chunker = Chunker::default();
        let data: Vec<u8> = Vec::new();
        let iter = chunker.chunk(&data).unwrap();
        assert!(iter.is_single_chunk());
        assert!(ranges(iter).is_empty());
    }

    #[test]
    fn test_small_stream_is_one_chunk() {
        let chunker = Chunker::default();
        let data = vec![0xAAu8; 1024];
        let iter = chunker.chunk(&data).unwrap();
        assert!(iter.is_single_chunk());
        assert_eq!(ranges(iter), vec![(0, 1024)]);
    }

    #[test]
    fn test_stream_of_exactly_min_size_scans() {
        let chunker = Chunker::new(ChunkConfig::new(64, 4096).unwrap()).unwrap();
        let data = vec![0u8; 64];
        let iter = chunker.chunk(&data).unwrap();
        assert!(!iter.is_single_chunk());
        assert_eq!(ranges(iter), vec![(0, 64)]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ChunkConfig::default().with_window_size(3);
        assert!(matches!(
            Chunker::new(config),
            Err(ChunkError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_position_tracks_progress() {
        let chunker = Chunker::new(ChunkConfig::new(64, 4096).unwrap()).unwrap();
        let data = vec![0u8; 200];
        let mut iter = chunker.chunk(&data).unwrap();

        assert_eq!(iter.position(), 0);
        iter.next().unwrap().unwrap();
        assert_eq!(iter.position(), 65);
        assert_eq!(iter.by_ref().count(), 3);
        assert_eq!(iter.position(), 200);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_reset_restarts() {
        let chunker = Chunker::new(ChunkConfig::new(64, 4096).unwrap()).unwrap();
        let data = vec![0u8; 500];
        let mut iter = chunker.chunk(&data).unwrap();

        let first: Vec<_> = iter.by_ref().map(|v| v.unwrap().range()).collect();
        iter.reset().unwrap();
        assert_eq!(iter.position(), 0);
        let second: Vec<_> = iter.map(|v| v.unwrap().range()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_reset_with_switches_mode() {
        let chunker = Chunker::new(ChunkConfig::new(64, 4096).unwrap()).unwrap();
        let long = vec![0u8; 500];
        let short = vec![0u8; 10];

        let mut iter = chunker.chunk(&long[..]).unwrap();
        assert!(!iter.is_single_chunk());
        iter.next();

        iter.reset_with(&short[..]).unwrap();
        assert!(iter.is_single_chunk());
        assert_eq!(iter.stream_len(), 10);
        assert_eq!(ranges(iter), vec![(0, 10)]);
    }

    #[test]
    fn test_clones_share_table() {
        let chunker = Chunker::default();
        let clone = chunker.clone();
        assert!(Arc::ptr_eq(chunker.table(), clone.table()));
    }

    #[test]
    fn test_chunk_bytes_is_zero_copy() {
        let data = Bytes::from(vec![0u8; 300]);
        let chunker = Chunker::new(
            ChunkConfig::new(64, 4096)
                .unwrap()
                .with_hash_config(crate::HashConfig::disabled()),
        )
        .unwrap();

        let chunks = chunker.chunk_bytes(data.clone()).unwrap();
        assert_eq!(chunks.len(), 5);
        assert_eq!(chunks[0].data.as_ptr(), data.as_ptr());
        assert!(chunks.iter().all(|c| c.hash.is_none()));
        assert_eq!(chunks.iter().map(Chunk::len).sum::<usize>(), 300);
    }

    struct Flaky {
        data: Vec<u8>,
        fail_at: u64,
    }

    impl ByteSource for Flaky {
        fn len(&self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
            if offset >= self.fail_at {
                return Err(io::Error::other("flaky source"));
            }
            self.data.read_at(buf, offset)
        }
    }

    #[test]
    fn test_error_stops_iteration_until_reset() {
        let chunker = Chunker::new(
            ChunkConfig::new(64, 4096)
                .unwrap()
                .with_read_block_size(16),
        )
        .unwrap();
        let flaky = Flaky {
            data: vec![0u8; 500],
            fail_at: 100,
        };
        let mut iter = chunker.chunk(&flaky).unwrap();

        assert_eq!(iter.next().unwrap().unwrap().range(), 0..65);
        assert!(iter.next().unwrap().unwrap_err().is_io());
        assert!(iter.next().is_none());

        let healthy = Flaky {
            data: vec![0u8; 500],
            fail_at: u64::MAX,
        };
        iter.reset_with(&healthy).unwrap();
        assert_eq!(iter.map(|v| v.unwrap().len()).sum::<u64>(), 500);
    }
}
