//! Byte streams over serial port sessions.
//!
//! The input stream is the core of the crate; the output stream mirrors its
//! lifecycle for the write path. Both borrow a [`crate::transport::PortHandle`]
//! and never close the port they stream over.

pub mod inbyte;
pub mod lifecycle;
pub mod outbyte;

pub use inbyte::BlockingByteStream;
pub use lifecycle::{StreamLifecycleGuard, StreamState};
pub use outbyte::OutByteStream;
