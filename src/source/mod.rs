//! Random-access byte sources.
//!
//! The chunker never owns its input. It needs three things from a source:
//! the total length, positioned reads, and a way to rewind. [`ByteSource`]
//! captures exactly that, with implementations for files and in-memory
//! buffers.
//!
//! Reads take `&self`, so any number of [`ChunkView`](crate::ChunkView)s can
//! read from one source while the iterator keeps scanning it.

use std::fs::File;
use std::io;
use std::sync::Arc;

use bytes::Bytes;

/// A random-access provider of bytes.
///
/// # Example
///
/// ```
/// use rabinrs::ByteSource;
///
/// let data = b"hello world".to_vec();
/// let mut buf = [0u8; 5];
///
/// assert_eq!(ByteSource::len(&data)?, 11);
/// assert_eq!(data.read_at(&mut buf, 6)?, 5);
/// assert_eq!(&buf, b"world");
/// # Ok::<(), std::io::Error>(())
/// ```
pub trait ByteSource {
    /// Returns the total length of the source in bytes.
    fn len(&self) -> io::Result<u64>;

    /// Returns true if the source holds no bytes.
    fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Reads up to `buf.len()` bytes starting at `offset`.
    ///
    /// Returns the number of bytes read; `0` means `offset` is at or past
    /// the end of the source.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Positions any underlying cursor back at the start of the source.
    ///
    /// Positioned reads do not depend on a cursor, so the default does nothing.
    fn rewind(&self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteSource for [u8] {
    fn len(&self) -> io::Result<u64> {
        Ok(<[u8]>::len(self) as u64)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= <[u8]>::len(self) {
            return Ok(0);
        }
        let n = buf.len().min(<[u8]>::len(self) - start);
        buf[..n].copy_from_slice(&self[start..start + n]);
        Ok(n)
    }
}

impl ByteSource for Vec<u8> {
    fn len(&self) -> io::Result<u64> {
        Ok(Vec::len(self) as u64)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.as_slice().read_at(buf, offset)
    }
}

impl ByteSource for Bytes {
    fn len(&self) -> io::Result<u64> {
        Ok(Bytes::len(self) as u64)
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self[..].read_at(buf, offset)
    }
}

impl ByteSource for File {
    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }

    fn rewind(&self) -> io::Result<()> {
        let mut file = self;
        io::Seek::rewind(&mut file)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn len(&self) -> io::Result<u64> {
        (**self).len()
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn rewind(&self) -> io::Result<()> {
        (**self).rewind()
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Arc<T> {
    fn len(&self) -> io::Result<u64> {
        (**self).len()
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }

    fn rewind(&self) -> io::Result<()> {
        (**self).rewind()
    }
}
