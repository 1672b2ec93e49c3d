//! Transport-level error types.
//!
//! Errors raised by the native transport layer, separate from the
//! stream-level errors in [`crate::error`] so each layer reports failures in
//! its own vocabulary.

use super::traits::PortHandle;
use thiserror::Error;

/// Errors that can occur inside a port transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// The handle does not refer to an open transport session.
    #[error("No open session for handle {0}")]
    UnknownHandle(PortHandle),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A blocking read produced no data for a positive-length request.
    ///
    /// A correctly blocking read never returns empty; this indicates a
    /// misbehaving or vanished device, not end-of-stream.
    #[error("Blocking read returned no data")]
    EmptyRead,

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl TransportError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
