//! Internal buffer management.
//!
//! This module provides a thread-local pool of read blocks so that attaching
//! many short streams does not allocate a fresh block each time. It is an
//! implementation detail and not part of the public API.

mod pool;

pub(crate) use pool::Buffer;
