//! Blocking input byte stream over a serial port session.
//!
//! This is the read side of the crate: a pull-based, EOF-free byte interface
//! that blocks the calling thread until data arrives. Every read is built on
//! the transport's single blocking primitive, so the blocking contract is
//! uniform across `read_one`, `read_into` and `read_all`.
//!
//! The stream borrows its [`PortHandle`]; closing the stream releases the
//! stream only and never closes the underlying port. Callers must not close
//! the port while a read is blocked on it.

use crate::error::{StreamError, StreamResult};
use crate::platform::{Platform, PlatformReadMode};
use crate::stream::lifecycle::StreamLifecycleGuard;
use crate::transport::{PortHandle, PortTransport};
use tracing::{debug, warn};

/// Blocking byte stream reading from one serial port session.
///
/// Reads block until at least one byte is available or a transport error
/// occurs; there is no timeout, no cancellation and no end-of-stream value
/// while the stream is open. Serial ports are not seekable, so the
/// mark/reset/skip family is deliberately inert.
///
/// # Example
/// ```
/// use serial_bytestream::stream::BlockingByteStream;
/// use serial_bytestream::transport::{MockTransport, PortHandle};
///
/// let mut transport = MockTransport::new();
/// transport.enqueue_read(b"ACK");
///
/// let mut stream = BlockingByteStream::new(transport.clone(), PortHandle::new(1))?;
/// assert_eq!(stream.read_one()?, b'A');
/// stream.close()?;
/// # Ok::<(), serial_bytestream::StreamError>(())
/// ```
#[derive(Debug)]
pub struct BlockingByteStream<T: PortTransport> {
    transport: T,
    handle: PortHandle,
    guard: StreamLifecycleGuard,
    mode: PlatformReadMode,
}

impl<T: PortTransport> BlockingByteStream<T> {
    /// Construct a stream over `handle` for the detected host platform.
    ///
    /// On platforms whose native read does not reliably block for a single
    /// byte, this issues exactly one tuning call requesting "block until at
    /// least one byte, no inter-byte timeout". The selection is made here
    /// and never re-evaluated.
    pub fn new(transport: T, handle: PortHandle) -> StreamResult<Self> {
        Self::with_platform(transport, handle, Platform::detect())
    }

    /// Construct a stream for an explicit platform. Exposed so the tuning
    /// dispatch can be exercised off-target.
    pub fn with_platform(
        mut transport: T,
        handle: PortHandle,
        platform: Platform,
    ) -> StreamResult<Self> {
        let mode = PlatformReadMode::for_platform(platform);
        if mode.needs_tuning() {
            transport.configure_blocking_read(handle, 1, 0)?;
        }
        debug!(%handle, ?mode, "input byte stream constructed");
        Ok(Self {
            transport,
            handle,
            guard: StreamLifecycleGuard::new(),
            mode,
        })
    }

    /// The session handle this stream reads from.
    pub fn handle(&self) -> PortHandle {
        self.handle
    }

    /// The blocking strategy fixed at construction.
    pub fn read_mode(&self) -> PlatformReadMode {
        self.mode
    }

    /// Whether the stream is still usable.
    pub fn is_open(&self) -> bool {
        self.guard.is_open()
    }

    /// Estimate of the bytes readable without blocking.
    ///
    /// This is the transport's inbound buffer occupancy: a racy, best-effort
    /// lower bound, never an exact figure.
    pub fn available(&mut self) -> StreamResult<usize> {
        self.guard.ensure_open()?;
        let counts = self.transport.buffered_byte_count(self.handle)?;
        Ok(counts.inbound)
    }

    /// Read the next byte, blocking until it arrives.
    ///
    /// There is no "no data" return: a successful call always yields a byte.
    pub fn read_one(&mut self) -> StreamResult<u8> {
        self.guard.ensure_open()?;
        let data = self.transport.read_blocking(self.handle, 1)?;
        match data.first() {
            Some(&byte) => Ok(byte),
            // A blocking read must not come back empty; treat it as a device
            // fault rather than inventing an end-of-stream convention.
            None => Err(StreamError::Io(
                crate::transport::TransportError::EmptyRead,
            )),
        }
    }

    /// Read up to `length` bytes into `buf` starting at `offset`, blocking
    /// until at least one byte is available.
    ///
    /// Returns the number of bytes copied, `1..=length` for a positive
    /// request. `length == 0` returns 0 immediately without a transport
    /// call; it is the only zero-result return. Bytes outside
    /// `buf[offset..offset + n]` are left untouched.
    pub fn read_into(
        &mut self,
        buf: &mut [u8],
        offset: usize,
        length: usize,
    ) -> StreamResult<usize> {
        self.guard.ensure_open()?;
        let in_range = offset
            .checked_add(length)
            .is_some_and(|end| end <= buf.len());
        if !in_range {
            return Err(StreamError::Bounds {
                offset,
                length,
                buffer_len: buf.len(),
            });
        }
        if length == 0 {
            return Ok(0);
        }

        let data = self.transport.read_blocking(self.handle, length)?;
        if data.is_empty() {
            return Err(StreamError::Io(
                crate::transport::TransportError::EmptyRead,
            ));
        }
        debug_assert!(data.len() <= length, "transport returned more than requested");
        let n = data.len().min(length);
        buf[offset..offset + n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    /// Read into the whole of `buf`; same as `read_into(buf, 0, buf.len())`.
    pub fn read_all(&mut self, buf: &mut [u8]) -> StreamResult<usize> {
        self.read_into(buf, 0, buf.len())
    }

    /// Release the stream.
    ///
    /// Single-shot: closing twice fails with [`StreamError::Closed`]. The
    /// underlying port stays open; closing it is a separate transport-level
    /// operation.
    pub fn close(&mut self) -> StreamResult<()> {
        self.guard.ensure_open()?;
        self.transport.release_stream(self.handle)?;
        self.guard.close()?;
        debug!(handle = %self.handle, "input byte stream closed");
        Ok(())
    }

    /// Mark is not supported on a live device stream; accepted as a no-op.
    pub fn mark(&mut self, _read_limit: usize) {}

    /// Always false: serial ports are not seekable.
    pub fn mark_supported(&self) -> bool {
        false
    }

    /// Reset is not supported; accepted as a no-op.
    pub fn reset(&mut self) {}

    /// Skip is not supported: always reports 0 bytes skipped and issues no
    /// transport call, whatever `count` is.
    pub fn skip(&mut self, _count: u64) -> u64 {
        0
    }
}

impl<T: PortTransport> std::io::Read for BlockingByteStream<T> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.read_all(buf).map_err(Into::into)
    }
}

impl<T: PortTransport> Drop for BlockingByteStream<T> {
    fn drop(&mut self) {
        if self.guard.is_open() {
            if let Err(e) = self.transport.release_stream(self.handle) {
                warn!(handle = %self.handle, error = %e, "release on drop failed");
            }
        }
    }
}
