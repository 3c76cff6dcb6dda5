//! Lazy, bounded views over a byte source.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom};
use std::ops::Range;

use bytes::{Bytes, BytesMut};

use super::Chunk;
use crate::config::HashConfig;
use crate::error::ChunkError;
use crate::source::ByteSource;

/// A chunk as yielded by [`ChunkIter`](crate::ChunkIter): the byte range
/// `[start, end)` of the source, read on demand.
///
/// Creating a view copies nothing. Reading goes through
/// [`ByteSource::read_at`], so views are independent of each other and of the
/// iterator that produced them; each keeps its own cursor for [`Read`] and
/// [`Seek`], relative to `start`.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use rabinrs::{ChunkConfig, Chunker};
///
/// let data = vec![7u8; 100];
/// let chunker = Chunker::new(ChunkConfig::new(4096, 4096)?)?;
///
/// for view in chunker.chunk(&data)? {
///     let mut view = view?;
///     let mut buf = Vec::new();
///     view.read_to_end(&mut buf)?;
///     assert_eq!(buf.len() as u64, view.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ChunkView<'a, S: ?Sized> {
    source: &'a S,
    start: u64,
    end: u64,
    cursor: u64,
}

impl<'a, S: ByteSource + ?Sized> ChunkView<'a, S> {
    pub(crate) fn new(source: &'a S, start: u64, end: u64) -> Self {
        debug_assert!(start <= end);
        Self {
            source,
            start,
            end,
            cursor: 0,
        }
    }

    /// Returns the offset of the first byte in the source.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Returns the offset one past the last byte.
    pub fn end(&self) -> u64 {
        self.end
    }

    /// Returns `start..end`.
    pub fn range(&self) -> Range<u64> {
        self.start..self.end
    }

    /// Returns the number of bytes in the view.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Returns true if the view covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the underlying source.
    pub fn source(&self) -> &'a S {
        self.source
    }

    /// Reads the whole range into memory, ignoring the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::Io`] if a read fails or the source ends early.
    pub fn to_bytes(&self) -> Result<Bytes, ChunkError> {
        let len = usize::try_from(self.len())
            .map_err(|_| io::Error::new(io::ErrorKind::OutOfMemory, "chunk too large for memory"))?;
        let mut buf = BytesMut::zeroed(len);

        let mut filled = 0;
        while filled < len {
            let n = self
                .source
                .read_at(&mut buf[filled..], self.start + filled as u64)?;
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            filled += n;
        }

        Ok(buf.freeze())
    }

    /// Streams the range through BLAKE3, ignoring the cursor.
    #[cfg(feature = "hash-blake3")]
    pub fn content_hash(&self) -> Result<crate::ChunkHash, ChunkError> {
        use crate::buffer::Buffer;
        use crate::hash::Blake3Hasher;

        const HASH_BLOCK_SIZE: usize = 64 * 1024;

        let mut hasher = Blake3Hasher::new();
        let mut block = Buffer::take(HASH_BLOCK_SIZE);
        let mut offset = self.start;
        while offset < self.end {
            let want = block.len().min((self.end - offset) as usize);
            let n = self.source.read_at(&mut block[..want], offset)?;
            if n == 0 {
                return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
            }
            hasher.update(&block[..n]);
            offset += n as u64;
        }
        Ok(hasher.finalize())
    }

    /// Materializes the view as an owned [`Chunk`], hashing it when
    /// `hash_config` asks for it and the `hash-blake3` feature is on.
    pub fn to_chunk(&self, hash_config: &HashConfig) -> Result<Chunk, ChunkError> {
        Ok(Chunk::new(self.to_bytes()?, self.start).hashed_if(hash_config))
    }
}

impl<S: ByteSource + ?Sized> Read for ChunkView<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.len().saturating_sub(self.cursor);
        if remaining == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        let n = self
            .source
            .read_at(&mut buf[..want], self.start + self.cursor)?;
        self.cursor += n as u64;
        Ok(n)
    }
}

impl<S: ByteSource + ?Sized> Seek for ChunkView<'_, S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::End(delta) => self.len().checked_add_signed(delta),
            SeekFrom::Current(delta) => self.cursor.checked_add_signed(delta),
        };
        match target {
            Some(n) => {
                self.cursor = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

impl<S: ?Sized> Clone for ChunkView<'_, S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source,
            start: self.start,
            end: self.end,
            cursor: self.cursor,
        }
    }
}

impl<S: ?Sized> fmt::Debug for ChunkView<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkView")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("cursor", &self.cursor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> Vec<u8> {
        (0..=255u8).collect()
    }

    #[test]
    fn test_bounds() {
        let data = data();
        let view = ChunkView::new(&data[..], 10, 20);
        assert_eq!(view.len(), 10);
        assert_eq!(view.range(), 10..20);
        assert!(!view.is_empty());
        assert!(ChunkView::new(&data[..], 5, 5).is_empty());
    }

    #[test]
    fn test_read_stays_in_range() {
        let data = data();
        let mut view = ChunkView::new(&data[..], 10, 20);
        let mut buf = Vec::new();
        view.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, (10..20u8).collect::<Vec<_>>());
        assert_eq!(view.read(&mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn test_seek() {
        let data = data();
        let mut view = ChunkView::new(&data[..], 100, 110);
        let mut byte = [0u8; 1];

        assert_eq!(view.seek(SeekFrom::End(-1)).unwrap(), 9);
        view.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], 109);

        assert_eq!(view.seek(SeekFrom::Start(2)).unwrap(), 2);
        assert_eq!(view.seek(SeekFrom::Current(3)).unwrap(), 5);
        view.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], 105);

        assert!(view.seek(SeekFrom::Current(-100)).is_err());

        // Past the end is allowed, reads just return nothing.
        view.seek(SeekFrom::Start(50)).unwrap();
        assert_eq!(view.read(&mut byte).unwrap(), 0);
    }

    #[test]
    fn test_independent_cursors() {
        let data = data();
        let mut a = ChunkView::new(&data[..], 0, 8);
        let mut b = a.clone();
        let mut buf = [0u8; 4];

        a.read_exact(&mut buf).unwrap();
        b.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [0, 1, 2, 3]);
    }

    #[test]
    fn test_to_bytes_ignores_cursor() {
        let data = data();
        let mut view = ChunkView::new(&data[..], 3, 6);
        view.seek(SeekFrom::Start(2)).unwrap();
        assert_eq!(&view.to_bytes().unwrap()[..], &[3u8, 4, 5]);
    }

    #[test]
    fn test_to_bytes_short_source() {
        let data = data();
        let view = ChunkView::new(&data[..], 250, 300);
        let err = view.to_bytes().unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_to_chunk() {
        let data = data();
        let view = ChunkView::new(&data[..], 16, 32);

        let chunk = view.to_chunk(&HashConfig::disabled()).unwrap();
        assert_eq!(chunk.offset, 16);
        assert_eq!(chunk.len(), 16);
        assert!(chunk.hash.is_none());
    }

    #[test]
    #[cfg(feature = "hash-blake3")]
    fn test_content_hash_matches_to_chunk() {
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 253) as u8).collect();
        let view = ChunkView::new(&data[..], 1000, 150_000);

        let streamed = view.content_hash().unwrap();
        let chunk = view.to_chunk(&HashConfig::enabled()).unwrap();
        assert_eq!(chunk.hash, Some(streamed));
        assert_eq!(
            streamed.as_bytes(),
            blake3::hash(&data[1000..150_000]).as_bytes()
        );
    }
}
