//! Stream-level error taxonomy.
//!
//! Failures a byte stream reports to its caller. Argument-contract errors
//! (`Bounds`) are caller bugs and never reach the transport; `Io` wraps any
//! transport failure unchanged. Nothing here is retried internally: retry
//! policy for a vanished device belongs to the application, not the stream.

use crate::transport::TransportError;
use thiserror::Error;

/// A specialized `Result` type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors that can occur on a byte stream.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The stream has been released. Covers both use-after-close and a
    /// second close; the remedy is the same either way (construct a new
    /// stream over a still-open port).
    #[error("Byte stream has been closed")]
    Closed,

    /// The offset/length pair does not fit the supplied buffer.
    #[error("Read range out of bounds: offset {offset} + length {length} exceeds buffer of {buffer_len} bytes")]
    Bounds {
        offset: usize,
        length: usize,
        buffer_len: usize,
    },

    /// A transport-level failure surfaced from a blocking call.
    #[error("Transport failure: {0}")]
    Io(#[from] TransportError),
}

impl From<StreamError> for std::io::Error {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Closed => {
                std::io::Error::new(std::io::ErrorKind::NotConnected, err.to_string())
            }
            StreamError::Bounds { .. } => {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
            }
            StreamError::Io(TransportError::Io(e)) => e,
            StreamError::Io(inner) => std::io::Error::other(inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_display() {
        assert_eq!(StreamError::Closed.to_string(), "Byte stream has been closed");
    }

    #[test]
    fn test_bounds_display_names_all_three_values() {
        let err = StreamError::Bounds {
            offset: 4,
            length: 10,
            buffer_len: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains('4') && msg.contains("10") && msg.contains('8'));
    }

    #[test]
    fn test_io_error_conversion_preserves_kind() {
        let io: std::io::Error = StreamError::Closed.into();
        assert_eq!(io.kind(), std::io::ErrorKind::NotConnected);

        let io: std::io::Error = StreamError::Bounds {
            offset: 0,
            length: 1,
            buffer_len: 0,
        }
        .into();
        assert_eq!(io.kind(), std::io::ErrorKind::InvalidInput);

        let inner = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let io: std::io::Error = StreamError::Io(TransportError::Io(inner)).into();
        assert_eq!(io.kind(), std::io::ErrorKind::BrokenPipe);
    }
}
