//! Thread-local pool of read blocks.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Maximum number of blocks to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// Blocks larger than this are dropped instead of pooled (1 MiB).
pub const MAX_POOLED_CAPACITY: usize = 1 << 20;

/// A reusable, fixed-length read block.
///
/// Dereferences to a zeroed `[u8]` of the requested length. On drop the
/// allocation goes back to the current thread's pool.
#[derive(Debug)]
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Takes a block of `len` bytes from the thread-local pool or allocates one.
    pub fn take(len: usize) -> Self {
        let mut data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();
        data.clear();
        data.resize(len, 0);
        Self { data }
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.data.capacity() <= MAX_POOLED_CAPACITY {
            let data = std::mem::take(&mut self.data);
            // The pool may already be gone during thread teardown.
            let _ = THREAD_BUFFER_POOL.try_with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(data);
                }
            });
        }
    }
}

// Thread-local buffer pool
thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_take() {
        let buf = Buffer::take(8192);
        assert_eq!(buf.len(), 8192);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_buffer_reuse_is_zeroed() {
        {
            let mut buf = Buffer::take(64);
            buf.copy_from_slice(&[0xAB; 64]);
        }

        let buf2 = Buffer::take(128);
        assert_eq!(buf2.len(), 128);
        assert!(buf2.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_pool_is_bounded() {
        let bufs: Vec<_> = (0..MAX_POOL_SIZE + 2).map(|_| Buffer::take(16)).collect();
        drop(bufs);
        THREAD_BUFFER_POOL.with(|pool| assert!(pool.borrow().len() <= MAX_POOL_SIZE));
    }
}
