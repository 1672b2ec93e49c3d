//! Blocking output byte stream over a serial port session.
//!
//! Write-side counterpart of [`crate::stream::BlockingByteStream`], with the
//! same lifecycle rules: streams close exactly once, never reopen, and never
//! close the underlying port. The transport may accept a write partially;
//! `write_all` loops until the whole slice is accepted.

use crate::error::{StreamError, StreamResult};
use crate::stream::lifecycle::StreamLifecycleGuard;
use crate::transport::{PortHandle, PortTransport};
use tracing::{debug, warn};

/// Byte stream writing to one serial port session.
#[derive(Debug)]
pub struct OutByteStream<T: PortTransport> {
    transport: T,
    handle: PortHandle,
    guard: StreamLifecycleGuard,
}

impl<T: PortTransport> OutByteStream<T> {
    /// Construct a write stream over `handle`. No platform tuning is needed
    /// on the write path.
    pub fn new(transport: T, handle: PortHandle) -> Self {
        debug!(%handle, "output byte stream constructed");
        Self {
            transport,
            handle,
            guard: StreamLifecycleGuard::new(),
        }
    }

    /// The session handle this stream writes to.
    pub fn handle(&self) -> PortHandle {
        self.handle
    }

    /// Whether the stream is still usable.
    pub fn is_open(&self) -> bool {
        self.guard.is_open()
    }

    /// Write a single byte.
    pub fn write_one(&mut self, byte: u8) -> StreamResult<()> {
        self.write_all(&[byte])
    }

    /// Write the whole of `data`, looping over partial transport acceptance.
    pub fn write_all(&mut self, data: &[u8]) -> StreamResult<()> {
        self.guard.ensure_open()?;
        let mut remaining = data;
        while !remaining.is_empty() {
            let n = self.transport.write_bytes(self.handle, remaining)?;
            if n == 0 {
                return Err(StreamError::Io(
                    crate::transport::TransportError::Io(std::io::Error::new(
                        std::io::ErrorKind::WriteZero,
                        "transport accepted no bytes",
                    )),
                ));
            }
            remaining = &remaining[n..];
        }
        Ok(())
    }

    /// Release the stream. Single-shot; the port stays open.
    pub fn close(&mut self) -> StreamResult<()> {
        self.guard.ensure_open()?;
        self.transport.release_stream(self.handle)?;
        self.guard.close()?;
        debug!(handle = %self.handle, "output byte stream closed");
        Ok(())
    }
}

impl<T: PortTransport> std::io::Write for OutByteStream<T> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.guard.ensure_open().map_err(std::io::Error::from)?;
        self.transport
            .write_bytes(self.handle, buf)
            .map_err(|e| StreamError::Io(e).into())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        // The transport transmits as it accepts; nothing is buffered here.
        Ok(())
    }
}

impl<T: PortTransport> Drop for OutByteStream<T> {
    fn drop(&mut self) {
        if self.guard.is_open() {
            if let Err(e) = self.transport.release_stream(self.handle) {
                warn!(handle = %self.handle, error = %e, "release on drop failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    const H: PortHandle = PortHandle::new(2);

    #[test]
    fn test_write_all_in_one_call() {
        let transport = MockTransport::new();
        let mut stream = OutByteStream::new(transport.clone(), H);

        stream.write_all(b"hello").unwrap();
        assert_eq!(transport.write_log(), vec![b"hello".to_vec()]);
    }

    #[test]
    fn test_write_all_loops_over_partial_acceptance() {
        let mut transport = MockTransport::new();
        transport.set_write_acceptance(2);
        let mut stream = OutByteStream::new(transport.clone(), H);

        stream.write_all(b"hello").unwrap();
        assert_eq!(
            transport.write_log(),
            vec![b"he".to_vec(), b"ll".to_vec(), b"o".to_vec()]
        );
    }

    #[test]
    fn test_write_one() {
        let transport = MockTransport::new();
        let mut stream = OutByteStream::new(transport.clone(), H);

        stream.write_one(0x07).unwrap();
        assert_eq!(transport.write_log(), vec![vec![0x07]]);
    }

    #[test]
    fn test_close_is_single_shot_and_releases() {
        let transport = MockTransport::new();
        let mut stream = OutByteStream::new(transport.clone(), H);

        stream.close().unwrap();
        assert_eq!(transport.released_handles(), vec![H]);
        assert!(matches!(stream.close(), Err(StreamError::Closed)));
        assert!(matches!(stream.write_one(0), Err(StreamError::Closed)));
    }

    #[test]
    fn test_io_write_impl() {
        use std::io::Write;

        let transport = MockTransport::new();
        let mut stream = OutByteStream::new(transport.clone(), H);

        let n = stream.write(b"abc").unwrap();
        assert_eq!(n, 3);
        stream.flush().unwrap();
        assert_eq!(transport.write_log(), vec![b"abc".to_vec()]);
    }

    #[test]
    fn test_drop_releases_open_stream() {
        let transport = MockTransport::new();
        {
            let _stream = OutByteStream::new(transport.clone(), H);
        }
        assert_eq!(transport.released_handles(), vec![H]);
    }
}
