//! Open/Closed state machine for byte streams.

use crate::error::{StreamError, StreamResult};

/// Lifecycle state of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Closed,
}

/// Enforces the stream lifecycle: streams start Open, close exactly once,
/// and never reopen. Every public stream operation checks this guard before
/// touching the transport.
#[derive(Debug)]
pub struct StreamLifecycleGuard {
    state: StreamState,
}

impl StreamLifecycleGuard {
    /// A guard in the initial Open state.
    pub fn new() -> Self {
        Self {
            state: StreamState::Open,
        }
    }

    /// Current state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Whether the stream is still usable.
    pub fn is_open(&self) -> bool {
        self.state == StreamState::Open
    }

    /// Fails with [`StreamError::Closed`] if the stream has been released.
    pub fn ensure_open(&self) -> StreamResult<()> {
        match self.state {
            StreamState::Open => Ok(()),
            StreamState::Closed => Err(StreamError::Closed),
        }
    }

    /// Transition Open -> Closed. Single-shot: a second close fails with
    /// [`StreamError::Closed`], the same kind as use-after-close.
    pub fn close(&mut self) -> StreamResult<()> {
        self.ensure_open()?;
        self.state = StreamState::Closed;
        Ok(())
    }
}

impl Default for StreamLifecycleGuard {
    fn default() -> Self {
        Self::new()
    }
}
