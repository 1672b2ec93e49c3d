//! Mock transport implementation for testing.
//!
//! Provides a `MockTransport` that simulates the native transport without
//! requiring hardware. Supports queued read data, a write log, call counters
//! for the tuning and read paths, and injectable failures.

use super::error::TransportError;
use super::traits::{BufferCounts, LineStatus, PortHandle, PortTransport};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Inner state of the mock transport, protected by a mutex for interior
/// mutability (clones share it, so a test can keep a handle for inspection
/// while the stream owns another).
#[derive(Debug, Default)]
struct MockState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Log of all bytes accepted by write operations.
    write_log: Vec<Vec<u8>>,
    /// Maximum bytes accepted per `write_bytes` call (None = all).
    write_acceptance: Option<usize>,
    /// Override for the occupancy snapshot (None = derive from the queue).
    buffer_counts: Option<BufferCounts>,
    /// Control-line snapshot returned by `line_status`.
    line_status: LineStatus,
    /// Every `configure_blocking_read` call, in order.
    configure_calls: Vec<(PortHandle, u8, u8)>,
    /// Number of `read_blocking` calls issued.
    read_calls: usize,
    /// Handles passed to `release_stream`, in order.
    released: Vec<PortHandle>,
    /// Fail the next transport call with this I/O error kind.
    fail_next: Option<std::io::ErrorKind>,
    /// Make the next `read_blocking` return an empty buffer.
    empty_next_read: bool,
}

impl MockState {
    fn take_failure(&mut self) -> Result<(), TransportError> {
        match self.fail_next.take() {
            Some(kind) => Err(TransportError::Io(std::io::Error::new(
                kind,
                "injected transport failure",
            ))),
            None => Ok(()),
        }
    }
}

/// Mock transport for testing byte streams.
///
/// This implementation allows you to:
/// - Enqueue data to be returned by blocking reads
/// - Inspect what data was written
/// - Count tuning and read calls
/// - Record which streams were released
/// - Inject transport failures and empty-read faults
///
/// # Example
/// ```
/// use serial_bytestream::transport::{MockTransport, PortHandle, PortTransport};
///
/// let mut transport = MockTransport::new();
/// transport.enqueue_read(b"Hello");
///
/// let data = transport.read_blocking(PortHandle::new(1), 16).unwrap();
/// assert_eq!(data, b"Hello");
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock transport with an empty read queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue bytes to be returned by subsequent blocking reads.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Get a copy of all data accepted by write operations.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Cap the number of bytes each `write_bytes` call accepts.
    pub fn set_write_acceptance(&mut self, max_per_call: usize) {
        self.state.lock().write_acceptance = Some(max_per_call);
    }

    /// Override the occupancy snapshot reported by `buffered_byte_count`.
    pub fn set_buffer_counts(&mut self, counts: BufferCounts) {
        self.state.lock().buffer_counts = Some(counts);
    }

    /// Set the control-line snapshot reported by `line_status`.
    pub fn set_line_status(&mut self, status: LineStatus) {
        self.state.lock().line_status = status;
    }

    /// Fail the next transport call with the given I/O error kind.
    pub fn fail_next(&mut self, kind: std::io::ErrorKind) {
        self.state.lock().fail_next = Some(kind);
    }

    /// Make the next blocking read return no data, simulating a device that
    /// broke the blocking contract.
    pub fn empty_next_read(&mut self) {
        self.state.lock().empty_next_read = true;
    }

    /// Number of `configure_blocking_read` calls received so far.
    pub fn configure_call_count(&self) -> usize {
        self.state.lock().configure_calls.len()
    }

    /// Arguments of every `configure_blocking_read` call, in order.
    pub fn configure_calls(&self) -> Vec<(PortHandle, u8, u8)> {
        self.state.lock().configure_calls.clone()
    }

    /// Number of `read_blocking` calls received so far.
    pub fn read_call_count(&self) -> usize {
        self.state.lock().read_calls
    }

    /// Handles released via `release_stream`, in order.
    pub fn released_handles(&self) -> Vec<PortHandle> {
        self.state.lock().released.clone()
    }

    /// Bytes currently queued for reading.
    pub fn queued_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }
}

impl PortTransport for MockTransport {
    fn configure_blocking_read(
        &mut self,
        handle: PortHandle,
        min_bytes: u8,
        timeout_deciseconds: u8,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        state
            .configure_calls
            .push((handle, min_bytes, timeout_deciseconds));
        Ok(())
    }

    fn buffered_byte_count(&mut self, _handle: PortHandle) -> Result<BufferCounts, TransportError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        Ok(state.buffer_counts.unwrap_or(BufferCounts {
            inbound: state.read_queue.len(),
            outbound: 0,
        }))
    }

    fn read_blocking(
        &mut self,
        _handle: PortHandle,
        max_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        state.take_failure()?;

        if state.empty_next_read {
            state.empty_next_read = false;
            return Ok(Vec::new());
        }

        let take = max_len.min(state.read_queue.len());
        if take == 0 && max_len > 0 {
            // A real transport would block here; a test with an empty queue
            // is a test bug, surfaced as WouldBlock.
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "No data available",
            )));
        }
        Ok(state.read_queue.drain(..take).collect())
    }

    fn write_bytes(&mut self, _handle: PortHandle, data: &[u8]) -> Result<usize, TransportError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        let accepted = state.write_acceptance.map_or(data.len(), |max| {
            data.len().min(max.max(1))
        });
        state.write_log.push(data[..accepted].to_vec());
        Ok(accepted)
    }

    fn line_status(&mut self, _handle: PortHandle) -> Result<LineStatus, TransportError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        Ok(state.line_status)
    }

    fn release_stream(&mut self, handle: PortHandle) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        state.take_failure()?;
        state.released.push(handle);
        Ok(())
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockTransport")
            .field("queued_bytes", &state.read_queue.len())
            .field("read_calls", &state.read_calls)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const H: PortHandle = PortHandle::new(1);

    #[test]
    fn test_enqueue_and_read() {
        let mut transport = MockTransport::new();
        transport.enqueue_read(b"Hello");

        let data = transport.read_blocking(H, 10).unwrap();
        assert_eq!(data, b"Hello");
        assert_eq!(transport.read_call_count(), 1);
    }

    #[test]
    fn test_partial_read_leaves_remainder_queued() {
        let mut transport = MockTransport::new();
        transport.enqueue_read(b"Hello, World!");

        let data = transport.read_blocking(H, 5).unwrap();
        assert_eq!(data, b"Hello");
        assert_eq!(transport.queued_bytes(), 8);
    }

    #[test]
    fn test_empty_queue_read_is_would_block() {
        let mut transport = MockTransport::new();
        let result = transport.read_blocking(H, 10);
        match result {
            Err(TransportError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::WouldBlock)
            }
            other => panic!("Expected WouldBlock error, got: {:?}", other),
        }
    }

    #[test]
    fn test_write_logging() {
        let mut transport = MockTransport::new();
        transport.write_bytes(H, b"Test1").unwrap();
        transport.write_bytes(H, b"Test2").unwrap();

        let log = transport.write_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0], b"Test1");
        assert_eq!(log[1], b"Test2");
    }

    #[test]
    fn test_write_acceptance_cap() {
        let mut transport = MockTransport::new();
        transport.set_write_acceptance(3);

        let n = transport.write_bytes(H, b"Hello").unwrap();
        assert_eq!(n, 3);
        assert_eq!(transport.write_log()[0], b"Hel");
    }

    #[test]
    fn test_buffer_counts_override() {
        let mut transport = MockTransport::new();
        transport.enqueue_read(b"abc");
        assert_eq!(transport.buffered_byte_count(H).unwrap().inbound, 3);

        transport.set_buffer_counts(BufferCounts {
            inbound: 7,
            outbound: 11,
        });
        let counts = transport.buffered_byte_count(H).unwrap();
        assert_eq!(counts.inbound, 7);
        assert_eq!(counts.outbound, 11);
    }

    #[test]
    fn test_injected_failure_fires_once() {
        let mut transport = MockTransport::new();
        transport.enqueue_read(b"ok");
        transport.fail_next(std::io::ErrorKind::BrokenPipe);

        assert!(transport.read_blocking(H, 1).is_err());
        assert_eq!(transport.read_blocking(H, 2).unwrap(), b"ok");
    }

    #[test]
    fn test_release_is_recorded() {
        let mut transport = MockTransport::new();
        transport.release_stream(H).unwrap();
        assert_eq!(transport.released_handles(), vec![H]);
    }

    #[test]
    fn test_clones_share_state() {
        let mut transport = MockTransport::new();
        let mut clone = transport.clone();
        transport.enqueue_read(b"shared");

        let data = clone.read_blocking(H, 6).unwrap();
        assert_eq!(data, b"shared");
        assert_eq!(transport.read_call_count(), 1);
    }
}
