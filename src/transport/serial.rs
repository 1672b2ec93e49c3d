//! Real serial transport implementation.
//!
//! Wraps the `serialport` crate behind the [`PortTransport`] trait, keeping a
//! session table of open ports keyed by [`PortHandle`]. Port lifecycle
//! (`open_port`/`close_port`) is deliberately separate from stream release:
//! `release_stream` only drops bookkeeping, never the device.

use super::error::TransportError;
use super::traits::{BufferCounts, LineStatus, PortConfiguration, PortHandle, PortTransport};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// Timeout installed by `configure_blocking_read`. The `serialport` crate has
/// no "wait forever" mode, so blocking reads use a long per-attempt timeout
/// and retry on expiry.
const BLOCKING_READ_SLICE: Duration = Duration::from_secs(3600);

/// One open port session.
struct Session {
    port: Box<dyn serialport::SerialPort>,
    name: String,
}

/// Retry loop for a blocking read: per-attempt timeout slices expire and go
/// around again, interrupts are transparent, and a zero-byte read is a
/// device fault (detached or misbehaving hardware), never end-of-stream.
fn read_with_retry<R: Read + ?Sized>(
    reader: &mut R,
    handle: PortHandle,
    buf: &mut [u8],
) -> Result<usize, TransportError> {
    loop {
        match reader.read(buf) {
            Ok(0) => return Err(TransportError::EmptyRead),
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                // Per-attempt timeout slice expired with no data; a
                // blocking read has no deadline, so go around again.
                trace!(%handle, "blocking read slice expired, retrying");
                continue;
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransportError::Io(e)),
        }
    }
}

/// Transport over real serial hardware via the `serialport` crate.
///
/// Holds any number of open sessions; streams address them by handle. The
/// transport owns the device handles, so dropping it closes every port.
#[derive(Default)]
pub struct SerialTransport {
    sessions: HashMap<PortHandle, Session>,
    next_handle: u64,
}

impl SerialTransport {
    /// Create a transport with no open sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a serial port and register a session for it.
    ///
    /// # Arguments
    /// * `port_name` - The system path to the serial port (e.g., "/dev/ttyUSB0" or "COM3")
    /// * `config` - Configuration parameters for the port
    pub fn open_port(
        &mut self,
        port_name: &str,
        config: PortConfiguration,
    ) -> Result<PortHandle, TransportError> {
        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(config.data_bits.into())
            .flow_control(config.flow_control.into())
            .parity(config.parity.into())
            .stop_bits(config.stop_bits.into())
            .timeout(config.timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => TransportError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => TransportError::config(e.to_string()),
                _ => TransportError::Serial(e),
            })?;

        self.next_handle += 1;
        let handle = PortHandle::new(self.next_handle);
        self.sessions.insert(
            handle,
            Session {
                port,
                name: port_name.to_string(),
            },
        );
        debug!(%handle, port = port_name, "opened serial port");
        Ok(handle)
    }

    /// Open a serial port with default configuration (9600 baud, 8N1).
    pub fn open_port_default(&mut self, port_name: &str) -> Result<PortHandle, TransportError> {
        self.open_port(port_name, PortConfiguration::default())
    }

    /// Close the port behind `handle` and drop its session.
    ///
    /// This is the caller's responsibility and is distinct from releasing a
    /// stream; a released stream leaves the port open.
    pub fn close_port(&mut self, handle: PortHandle) -> Result<(), TransportError> {
        let session = self
            .sessions
            .remove(&handle)
            .ok_or(TransportError::UnknownHandle(handle))?;
        debug!(%handle, port = %session.name, "closed serial port");
        Ok(())
    }

    /// The system name of the port behind `handle`.
    pub fn port_name(&self, handle: PortHandle) -> Result<&str, TransportError> {
        self.sessions
            .get(&handle)
            .map(|s| s.name.as_str())
            .ok_or(TransportError::UnknownHandle(handle))
    }

    fn session_mut(&mut self, handle: PortHandle) -> Result<&mut Session, TransportError> {
        self.sessions
            .get_mut(&handle)
            .ok_or(TransportError::UnknownHandle(handle))
    }
}

impl PortTransport for SerialTransport {
    fn configure_blocking_read(
        &mut self,
        handle: PortHandle,
        min_bytes: u8,
        timeout_deciseconds: u8,
    ) -> Result<(), TransportError> {
        if min_bytes == 0 {
            return Err(TransportError::config(
                "blocking read requires min_bytes >= 1",
            ));
        }
        // timeout_deciseconds = 0 means no inter-byte timeout: reads return
        // as soon as min_bytes arrive, however long that takes.
        let session = self.session_mut(handle)?;
        session
            .port
            .set_timeout(BLOCKING_READ_SLICE)
            .map_err(TransportError::Serial)?;
        debug!(
            %handle,
            min_bytes,
            timeout_deciseconds,
            "tuned session for pure blocking reads"
        );
        Ok(())
    }

    fn buffered_byte_count(&mut self, handle: PortHandle) -> Result<BufferCounts, TransportError> {
        let session = self.session_mut(handle)?;
        let inbound = session.port.bytes_to_read().map_err(TransportError::Serial)?;
        let outbound = session
            .port
            .bytes_to_write()
            .map_err(TransportError::Serial)?;
        Ok(BufferCounts {
            inbound: inbound as usize,
            outbound: outbound as usize,
        })
    }

    fn read_blocking(
        &mut self,
        handle: PortHandle,
        max_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        if max_len == 0 {
            return Ok(Vec::new());
        }
        let session = self.session_mut(handle)?;
        let mut buf = vec![0u8; max_len];
        let n = read_with_retry(&mut *session.port, handle, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }

    fn write_bytes(&mut self, handle: PortHandle, data: &[u8]) -> Result<usize, TransportError> {
        let session = self.session_mut(handle)?;
        session.port.write(data).map_err(TransportError::Io)
    }

    fn line_status(&mut self, handle: PortHandle) -> Result<LineStatus, TransportError> {
        let session = self.session_mut(handle)?;
        Ok(LineStatus {
            cts: session
                .port
                .read_clear_to_send()
                .map_err(TransportError::Serial)?,
            dsr: session
                .port
                .read_data_set_ready()
                .map_err(TransportError::Serial)?,
            ri: session
                .port
                .read_ring_indicator()
                .map_err(TransportError::Serial)?,
            cd: session
                .port
                .read_carrier_detect()
                .map_err(TransportError::Serial)?,
        })
    }

    fn release_stream(&mut self, handle: PortHandle) -> Result<(), TransportError> {
        self.session_mut(handle)?;
        debug!(%handle, "stream released");
        Ok(())
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("sessions", &self.sessions.len())
            .field("next_handle", &self.next_handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_not_found_error() {
        let mut transport = SerialTransport::new();
        let result = transport.open_port_default("/dev/nonexistent_port_12345");

        assert!(result.is_err());
        if let Err(e) = result {
            match e {
                TransportError::NotFound(name) => {
                    assert!(name.contains("nonexistent"));
                }
                _ => panic!("Expected NotFound error, got: {:?}", e),
            }
        }
    }

    #[test]
    fn test_unknown_handle_everywhere() {
        let mut transport = SerialTransport::new();
        let stale = PortHandle::new(99);

        assert!(matches!(
            transport.buffered_byte_count(stale),
            Err(TransportError::UnknownHandle(_))
        ));
        assert!(matches!(
            transport.read_blocking(stale, 4),
            Err(TransportError::UnknownHandle(_))
        ));
        assert!(matches!(
            transport.write_bytes(stale, b"x"),
            Err(TransportError::UnknownHandle(_))
        ));
        assert!(matches!(
            transport.release_stream(stale),
            Err(TransportError::UnknownHandle(_))
        ));
        assert!(matches!(
            transport.close_port(stale),
            Err(TransportError::UnknownHandle(_))
        ));
    }

    /// Scripted reader: plays back a sequence of read outcomes.
    struct ScriptedReader {
        script: Vec<Result<Vec<u8>, std::io::ErrorKind>>,
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.script.remove(0) {
                Ok(data) => {
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    Ok(n)
                }
                Err(kind) => Err(std::io::Error::new(kind, "scripted")),
            }
        }
    }

    #[test]
    fn test_zero_byte_read_is_a_fault_not_a_spin() {
        // A detached device can yield EOF-style zero-byte reads forever;
        // the first one must unblock the caller with an error.
        let mut reader = ScriptedReader {
            script: vec![Ok(Vec::new())],
        };
        let mut buf = [0u8; 4];
        let result = read_with_retry(&mut reader, PortHandle::new(1), &mut buf);
        assert!(matches!(result, Err(TransportError::EmptyRead)));
        assert!(reader.script.is_empty(), "exactly one read attempt");
    }

    #[test]
    fn test_timeout_slices_retry_until_data() {
        let mut reader = ScriptedReader {
            script: vec![
                Err(std::io::ErrorKind::TimedOut),
                Err(std::io::ErrorKind::Interrupted),
                Ok(vec![0x41, 0x42]),
            ],
        };
        let mut buf = [0u8; 4];
        let n = read_with_retry(&mut reader, PortHandle::new(1), &mut buf).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..2], &[0x41, 0x42]);
    }

    #[test]
    fn test_hard_error_propagates_immediately() {
        let mut reader = ScriptedReader {
            script: vec![Err(std::io::ErrorKind::BrokenPipe)],
        };
        let mut buf = [0u8; 4];
        let result = read_with_retry(&mut reader, PortHandle::new(1), &mut buf);
        match result {
            Err(TransportError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("Expected Io error, got: {:?}", other),
        }
    }

    #[test]
    fn test_configure_rejects_zero_min_bytes() {
        let mut transport = SerialTransport::new();
        // Handle validity is checked after the argument contract.
        let result = transport.configure_blocking_read(PortHandle::new(1), 0, 0);
        assert!(matches!(result, Err(TransportError::Config(_))));
    }
}
