//! Host platform detection and blocking-read strategy selection.
//!
//! Native serial read semantics differ by OS: Windows overlapped reads
//! already block until data arrives, while POSIX termios reads can return
//! early unless VMIN/VTIME are tuned. The strategy is chosen once, at stream
//! construction, and never re-evaluated.

use serde::{Deserialize, Serialize};

/// Host platform family, as far as serial read semantics are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// Windows-like: the native blocking read blocks correctly end-to-end.
    Windows,
    /// POSIX-like (Linux, macOS, BSDs): reads need explicit VMIN/VTIME-style
    /// tuning to block until at least one byte arrives.
    Posix,
}

impl Platform {
    /// Detect the compile-target platform.
    pub const fn detect() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

/// How a stream obtains blocking semantics from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformReadMode {
    /// Issue a one-time "block until >= 1 byte, no inter-byte timeout"
    /// tuning call at construction.
    PureBlocking,
    /// Rely on the OS native read, which already blocks correctly; no
    /// tuning call at all.
    OsNativeBlocking,
}

impl PlatformReadMode {
    /// Select the read mode for a platform.
    pub const fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Windows => PlatformReadMode::OsNativeBlocking,
            Platform::Posix => PlatformReadMode::PureBlocking,
        }
    }

    /// Whether constructing a stream must issue the tuning call.
    pub const fn needs_tuning(self) -> bool {
        matches!(self, PlatformReadMode::PureBlocking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posix_uses_pure_blocking() {
        let mode = PlatformReadMode::for_platform(Platform::Posix);
        assert_eq!(mode, PlatformReadMode::PureBlocking);
        assert!(mode.needs_tuning());
    }

    #[test]
    fn test_windows_uses_native_blocking() {
        let mode = PlatformReadMode::for_platform(Platform::Windows);
        assert_eq!(mode, PlatformReadMode::OsNativeBlocking);
        assert!(!mode.needs_tuning());
    }

    #[test]
    fn test_detect_matches_target() {
        let platform = Platform::detect();
        if cfg!(windows) {
            assert_eq!(platform, Platform::Windows);
        } else {
            assert_eq!(platform, Platform::Posix);
        }
    }
}
