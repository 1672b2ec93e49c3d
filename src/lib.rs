//! Blocking byte streams over serial ports.
//!
//! This library presents a platform-uniform blocking I/O contract on top of
//! heterogeneous OS serial read semantics: a [`stream::BlockingByteStream`]
//! blocks until at least one byte arrives, with no timeout and no
//! end-of-stream value, whether the native read would block on its own
//! (Windows overlapped I/O) or needs one-time tuning (POSIX termios).
//!
//! # Modules
//!
//! - `stream`: the blocking input/output byte streams and their lifecycle
//! - `transport`: the `PortTransport` trait, the real `serialport`-backed
//!   transport and a mock for tests
//! - `platform`: host detection and blocking-read strategy selection
//! - `error`: stream-level error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use serial_bytestream::stream::BlockingByteStream;
//! use serial_bytestream::transport::{PortConfiguration, SerialTransport};
//!
//! let mut transport = SerialTransport::new();
//! let handle = transport.open_port("/dev/ttyUSB0", PortConfiguration::default())?;
//!
//! let mut stream = BlockingByteStream::new(transport, handle)?;
//! let byte = stream.read_one()?;
//! println!("got {byte:#04x}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod platform;
pub mod stream;
pub mod transport;

// Re-export commonly used types for convenience
pub use error::{StreamError, StreamResult};
pub use platform::{Platform, PlatformReadMode};
pub use stream::{BlockingByteStream, OutByteStream, StreamLifecycleGuard, StreamState};
pub use transport::{
    BufferCounts, DataBits, FlowControl, LineStatus, MockTransport, Parity, PortConfiguration,
    PortHandle, PortTransport, SerialTransport, StopBits, TransportError,
};
