//! Transport layer for serial communication.
//!
//! Provides the [`PortTransport`] trait the byte streams delegate to,
//! a real implementation over the `serialport` crate, and an instrumented
//! mock for tests.

pub mod error;
pub mod mock;
pub mod serial;
pub mod traits;

pub use error::TransportError;
pub use mock::MockTransport;
pub use serial::SerialTransport;
pub use traits::*;
