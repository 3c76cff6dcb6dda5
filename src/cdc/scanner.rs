//! Boundary scanner: the min/max policy around the rolling fingerprint.
//!
//! Each search starts at the end of the previous chunk and proceeds in three
//! steps:
//!
//! 1. Jump `min_size` bytes ahead without hashing. This is the hard lower
//!    bound on chunk length and also caps the hashing work per chunk.
//! 2. Read the source in `read_block_size` blocks and roll every byte into a
//!    freshly cleared fingerprint.
//! 3. Cut after the first byte whose fingerprint has its low `boundary_bits`
//!    bits clear, or after `max_size` hashed bytes, whichever comes first.
//!
//! The end of the stream always finalizes the current search, so the last
//! chunk may be shorter than `min_size`.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{PopTable, RabinHash};
use crate::buffer::Buffer;
use crate::config::ChunkConfig;
use crate::error::ChunkError;
use crate::source::ByteSource;

/// Why a search ended where it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cut {
    /// The fingerprint matched the boundary pattern.
    Content,
    /// `max_size` bytes were hashed without a match.
    Forced,
    /// The stream ended first.
    EndOfStream,
}

/// Scanning state for one stream.
#[derive(Debug)]
pub struct BoundaryScanner {
    fingerprint: RabinHash,

    /// Absolute offset of the next unread byte.
    position: u64,

    /// Bytes hashed since the current search began.
    scan_offset: u64,

    /// Total length of the attached stream.
    stream_len: u64,

    min_size: u64,
    max_size: u64,
    boundary_mask: u64,
    block: Buffer,
}

impl BoundaryScanner {
    /// Creates a scanner positioned at the start of a stream of `stream_len`
    /// bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `config` fails
    /// [`ChunkConfig::validate`].
    pub fn new(
        config: &ChunkConfig,
        table: Arc<PopTable>,
        stream_len: u64,
    ) -> Result<Self, ChunkError> {
        config.validate()?;
        Ok(Self::from_valid(config, table, stream_len))
    }

    /// Like [`new`](Self::new) for a configuration already validated.
    pub(crate) fn from_valid(config: &ChunkConfig, table: Arc<PopTable>, stream_len: u64) -> Self {
        Self {
            fingerprint: RabinHash::from_valid(config, table),
            position: 0,
            scan_offset: 0,
            stream_len,
            min_size: config.min_size(),
            max_size: config.max_size(),
            boundary_mask: config.boundary_mask(),
            block: Buffer::take(config.read_block_size()),
        }
    }

    /// Finds the next chunk, returning its `(start, end)` offsets.
    ///
    /// Returns `(position, position)` if the stream is already exhausted.
    ///
    /// # Errors
    ///
    /// Any read failure is returned as [`ChunkError::Io`]. The position is
    /// left wherever the last successful block put it.
    pub fn find_next_boundary<S>(&mut self, source: &S) -> Result<(u64, u64), ChunkError>
    where
        S: ByteSource + ?Sized,
    {
        self.find_next_cut(source).map(|(start, end, _)| (start, end))
    }

    /// Like [`find_next_boundary`](Self::find_next_boundary), also reporting
    /// why the search stopped.
    pub fn find_next_cut<S>(&mut self, source: &S) -> Result<(u64, u64, Cut), ChunkError>
    where
        S: ByteSource + ?Sized,
    {
        let start = self.position;
        self.scan_offset = 0;
        self.fingerprint.reset();

        // Unhashed jump, truncated at the end of the stream.
        self.position = start.saturating_add(self.min_size).min(self.stream_len);

        while self.position < self.stream_len {
            let remaining = self.stream_len - self.position;
            let want = self.block.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));

            let n = match source.read_at(&mut self.block[..want], self.position) {
                Ok(n) => n,
                Err(e) => {
                    warn!(offset = self.position, error = %e, "source read failed");
                    return Err(e.into());
                }
            };
            if n == 0 {
                debug!(
                    offset = self.position,
                    reported = self.stream_len,
                    "source ended before its reported length"
                );
                self.stream_len = self.position;
                break;
            }

            let mut consumed = n;
            let mut cut = None;
            for (i, &byte) in self.block[..n].iter().enumerate() {
                self.fingerprint.update(byte);
                self.scan_offset += 1;

                if self.fingerprint.is_boundary(self.boundary_mask) {
                    cut = Some(Cut::Content);
                } else if self.scan_offset >= self.max_size {
                    cut = Some(Cut::Forced);
                }

                if cut.is_some() {
                    consumed = i + 1;
                    break;
                }
            }

            self.position += consumed as u64;
            if let Some(cut) = cut {
                return Ok((start, self.position, cut));
            }
        }

        Ok((start, self.position, Cut::EndOfStream))
    }

    /// Returns the absolute offset of the next unread byte.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the number of bytes hashed in the most recent search.
    pub fn scan_offset(&self) -> u64 {
        self.scan_offset
    }

    /// Returns the length of the attached stream.
    pub fn stream_len(&self) -> u64 {
        self.stream_len
    }

    /// Returns true once every byte of the stream belongs to a chunk.
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.stream_len
    }

    /// Rewinds to offset zero of a stream of `stream_len` bytes.
    pub fn reset(&mut self, stream_len: u64) {
        self.fingerprint.reset();
        self.position = 0;
        self.scan_offset = 0;
        self.stream_len = stream_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn scanner(config: &ChunkConfig, len: usize) -> BoundaryScanner {
        let table = Arc::new(PopTable::from_config(config));
        BoundaryScanner::new(config, table, len as u64).unwrap()
    }

    fn cuts(config: &ChunkConfig, data: &[u8]) -> Vec<(u64, u64, Cut)> {
        let mut scanner = scanner(config, data.len());
        let mut out = Vec::new();
        while !scanner.is_exhausted() {
            out.push(scanner.find_next_cut(data).unwrap());
        }
        out
    }

    #[test]
    fn test_zeros_cut_right_after_min() {
        // A zero byte leaves the fresh fingerprint at zero, which always matches.
        let config = ChunkConfig::new(64, 4096).unwrap();
        let data = vec![0u8; 1000];

        let found = cuts(&config, &data);
        assert_eq!(found.len(), 16);
        for (i, &(start, end, cut)) in found[..15].iter().enumerate() {
            assert_eq!(start, i as u64 * 65);
            assert_eq!(end - start, 65);
            assert_eq!(cut, Cut::Content);
        }
        assert_eq!(found[15], (975, 1000, Cut::EndOfStream));
    }

    #[test]
    fn test_forced_cut_at_max() {
        // Constant ones settle on a non-zero fingerprint, which never has all
        // 31 bits clear.
        let config = ChunkConfig::new(16, 100)
            .unwrap()
            .with_boundary_bits(31)
            .with_read_block_size(7);
        let data = vec![1u8; 1000];

        let found = cuts(&config, &data);
        let lens: Vec<u64> = found.iter().map(|&(s, e, _)| e - s).collect();
        assert_eq!(lens, vec![116, 116, 116, 116, 116, 116, 116, 116, 72]);
        assert!(found[..8].iter().all(|&(_, _, cut)| cut == Cut::Forced));
        assert_eq!(found[8].2, Cut::EndOfStream);
    }

    #[test]
    fn test_block_size_does_not_change_boundaries() {
        let data: Vec<u8> = (0..20_000u32)
            .map(|i| (i.wrapping_mul(2654435761) >> 13) as u8)
            .collect();
        let base = ChunkConfig::new(256, 8192).unwrap().with_boundary_bits(8);

        let expected = cuts(&base, &data);
        for block in [1, 3, 64, 1000, 65536] {
            assert_eq!(cuts(&base.with_read_block_size(block), &data), expected);
        }
    }

    #[test]
    fn test_short_tail_after_jump() {
        let config = ChunkConfig::new(64, 4096).unwrap();
        let data = vec![0u8; 100];

        let found = cuts(&config, &data);
        assert_eq!(found, vec![(0, 65, Cut::Content), (65, 100, Cut::EndOfStream)]);
    }

    #[test]
    fn test_exhausted_returns_empty_range() {
        let config = ChunkConfig::new(4, 16).unwrap();
        let data = vec![0u8; 5];
        let mut scanner = scanner(&config, data.len());

        assert_eq!(scanner.find_next_boundary(&data[..]).unwrap(), (0, 5));
        assert!(scanner.is_exhausted());
        assert_eq!(scanner.find_next_boundary(&data[..]).unwrap(), (5, 5));
    }

    #[test]
    fn test_source_shorter_than_reported() {
        let config = ChunkConfig::new(4, 1000).unwrap().with_boundary_bits(31);
        let data = vec![1u8; 50];
        // Pretend the stream is longer than the data actually available.
        let mut scanner = scanner(&config, 80);

        assert_eq!(
            scanner.find_next_cut(&data[..]).unwrap(),
            (0, 50, Cut::EndOfStream)
        );
        assert!(scanner.is_exhausted());
        assert_eq!(scanner.stream_len(), 50);
    }

    struct FailingSource {
        len: u64,
        fail_at: u64,
    }

    impl ByteSource for FailingSource {
        fn len(&self) -> io::Result<u64> {
            Ok(self.len)
        }

        fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
            if offset >= self.fail_at {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "disk gone"));
            }
            let n = buf.len().min((self.fail_at - offset) as usize);
            buf[..n].fill(1);
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_is_surfaced() {
        let config = ChunkConfig::new(8, 1000)
            .unwrap()
            .with_boundary_bits(31)
            .with_read_block_size(16);
        let source = FailingSource {
            len: 500,
            fail_at: 40,
        };
        let mut scanner = scanner(&config, 500);

        let err = scanner.find_next_boundary(&source).unwrap_err();
        assert!(matches!(err, ChunkError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert_eq!(scanner.position(), 40);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad = [
            ChunkConfig::new(4, 16).unwrap().with_read_block_size(0),
            ChunkConfig::new(4, 16).unwrap().with_window_size(0),
            ChunkConfig::new(4, 16).unwrap().with_window_size(3),
            ChunkConfig::new(4, 16).unwrap().with_max_size(0),
        ];
        for config in bad {
            let table = Arc::new(PopTable::from_config(&config));
            assert!(matches!(
                BoundaryScanner::new(&config, table, 100),
                Err(ChunkError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_reset() {
        let config = ChunkConfig::new(64, 4096).unwrap();
        let data = vec![0u8; 300];
        let mut scanner = scanner(&config, data.len());

        scanner.find_next_boundary(&data[..]).unwrap();
        assert_eq!(scanner.position(), 65);

        scanner.reset(10);
        assert_eq!(scanner.position(), 0);
        assert_eq!(scanner.stream_len(), 10);
        assert_eq!(scanner.find_next_boundary(&data[..]).unwrap(), (0, 10));
    }
}
