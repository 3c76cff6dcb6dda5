//! Error types for rabinrs.

use std::fmt;

/// Errors that can occur during chunking operations.
///
/// Reaching the end of a stream is not an error: [`ChunkIter`](crate::ChunkIter)
/// simply stops yielding items.
#[derive(Debug)]
pub enum ChunkError {
    /// An I/O error occurred while reading from the byte source.
    ///
    /// The iterator that produced it stops until it is reset.
    Io(std::io::Error),

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },
}

impl ChunkError {
    /// Returns true if this error came from the byte source.
    pub fn is_io(&self) -> bool {
        matches!(self, ChunkError::Io(_))
    }
}

impl fmt::Display for ChunkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkError::Io(e) => write!(f, "io error: {}", e),
            ChunkError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
        }
    }
}

impl std::error::Error for ChunkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChunkError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ChunkError {
    fn from(e: std::io::Error) -> Self {
        ChunkError::Io(e)
    }
}

impl From<ChunkError> for std::io::Error {
    fn from(e: ChunkError) -> Self {
        match e {
            ChunkError::Io(e) => e,
            ChunkError::InvalidConfig { message } => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: ChunkError = io_err.into();
        assert!(err.is_io());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_display() {
        let err = ChunkError::InvalidConfig {
            message: "window_size must be a power of two",
        };
        assert!(err.to_string().contains("invalid config"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_into_io_error() {
        let err = ChunkError::InvalidConfig { message: "bad" };
        let io: std::io::Error = err.into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidInput);
    }
}
