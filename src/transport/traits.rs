//! Core traits for the serial port transport layer.
//!
//! Defines the `PortTransport` trait that allows both real serial transports
//! and mock implementations to be used interchangeably by the byte streams.

use super::error::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Opaque token identifying one open transport session on one port.
///
/// Streams borrow a handle by value; they never own the session it names and
/// never close the underlying port through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortHandle(u64);

impl PortHandle {
    /// Wrap a raw session identifier.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw session identifier.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PortHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupancy snapshot of the transport's I/O buffers for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferCounts {
    /// Bytes buffered inbound (received, not yet read).
    pub inbound: usize,
    /// Bytes buffered outbound (written, not yet transmitted).
    pub outbound: usize,
}

/// Snapshot of the hardware control lines for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStatus {
    /// Clear To Send.
    pub cts: bool,
    /// Data Set Ready.
    pub dsr: bool,
    /// Ring Indicator.
    pub ri: bool,
    /// Carrier Detect.
    pub cd: bool,
}

/// Configuration parameters for opening a serial port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Number of data bits (5, 6, 7, or 8).
    pub data_bits: DataBits,

    /// Flow control mode.
    pub flow_control: FlowControl,

    /// Parity checking mode.
    pub parity: Parity,

    /// Number of stop bits.
    pub stop_bits: StopBits,

    /// Initial read/write timeout; replaced by the blocking-read tuning
    /// when a stream is constructed over the session.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: DataBits::Eight,
            flow_control: FlowControl::None,
            parity: Parity::None,
            stop_bits: StopBits::One,
            timeout: Duration::from_secs(1),
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

/// Flow control modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowControl {
    None,
    Software,
    Hardware,
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => serialport::FlowControl::None,
            FlowControl::Software => serialport::FlowControl::Software,
            FlowControl::Hardware => serialport::FlowControl::Hardware,
        }
    }
}

/// Parity checking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

/// Trait for the native transport behind a serial port session.
///
/// This trait abstracts over the per-OS device facility, allowing both real
/// hardware transports and mock implementations for testing. All methods
/// take the [`PortHandle`] of the session they act on; a transport may carry
/// any number of sessions.
pub trait PortTransport: Send + fmt::Debug {
    /// One-time read tuning: block until at least `min_bytes` are available,
    /// waiting up to `timeout_deciseconds` between bytes (0 = forever).
    ///
    /// Issued only on platforms whose native read would otherwise return
    /// early; never called on platforms that already block correctly.
    fn configure_blocking_read(
        &mut self,
        handle: PortHandle,
        min_bytes: u8,
        timeout_deciseconds: u8,
    ) -> Result<(), TransportError>;

    /// Occupancy snapshot of the session's inbound and outbound buffers.
    fn buffered_byte_count(&mut self, handle: PortHandle) -> Result<BufferCounts, TransportError>;

    /// Block until at least one byte is available, then return up to
    /// `max_len` bytes. Never returns an empty buffer for `max_len > 0`.
    fn read_blocking(
        &mut self,
        handle: PortHandle,
        max_len: usize,
    ) -> Result<Vec<u8>, TransportError>;

    /// Write bytes to the session; returns the number of bytes accepted,
    /// which may be less than `data.len()`.
    fn write_bytes(&mut self, handle: PortHandle, data: &[u8]) -> Result<usize, TransportError>;

    /// Poll the hardware control lines of the session.
    fn line_status(&mut self, handle: PortHandle) -> Result<LineStatus, TransportError>;

    /// Bookkeeping notification that a stream over `handle` has been
    /// released. Must not close the port or the session.
    fn release_stream(&mut self, handle: PortHandle) -> Result<(), TransportError>;
}

/// A shared transport handle, so one transport can back an input stream and
/// an output stream at the same time. Transport calls are serialized by the
/// mutex; stream state is not shared.
impl<T: PortTransport> PortTransport for Arc<parking_lot::Mutex<T>> {
    fn configure_blocking_read(
        &mut self,
        handle: PortHandle,
        min_bytes: u8,
        timeout_deciseconds: u8,
    ) -> Result<(), TransportError> {
        self.lock()
            .configure_blocking_read(handle, min_bytes, timeout_deciseconds)
    }

    fn buffered_byte_count(&mut self, handle: PortHandle) -> Result<BufferCounts, TransportError> {
        self.lock().buffered_byte_count(handle)
    }

    fn read_blocking(
        &mut self,
        handle: PortHandle,
        max_len: usize,
    ) -> Result<Vec<u8>, TransportError> {
        self.lock().read_blocking(handle, max_len)
    }

    fn write_bytes(&mut self, handle: PortHandle, data: &[u8]) -> Result<usize, TransportError> {
        self.lock().write_bytes(handle, data)
    }

    fn line_status(&mut self, handle: PortHandle) -> Result<LineStatus, TransportError> {
        self.lock().line_status(handle)
    }

    fn release_stream(&mut self, handle: PortHandle) -> Result<(), TransportError> {
        self.lock().release_stream(handle)
    }
}
