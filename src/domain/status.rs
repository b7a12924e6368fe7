//! Machine status and the probe exit-code translation table.
//!
//! The status-check script reports through its exit code only. This module is
//! the single place that knows the numeric contract:
//!
//! | code | status                   |
//! |------|--------------------------|
//! | 0    | `AcceleratedRunning`     |
//! | 1    | `AcceleratedWithServer`  |
//! | 10   | `UnacceleratedVfkit`     |
//! | 11   | `NotRunning`             |
//! | 12   | `UnacceleratedRunning`   |
//! | 127  | `NotInstalled`           |
//!
//! Any other code means the script itself is broken and is fatal for the
//! caller.

use std::fmt;

/// State of the Podman machine with respect to GPU acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineStatus {
    /// VM up, accelerator active, no inference server yet.
    AcceleratedRunning,
    /// VM up, accelerator active, inference server container running.
    AcceleratedWithServer,
    /// Support binaries are absent.
    NotInstalled,
    /// VM running on the vfkit backend instead of krunkit.
    UnacceleratedVfkit,
    /// VM not running at all.
    NotRunning,
    /// VM running, accelerator backend available but not engaged.
    UnacceleratedRunning,
}

impl MachineStatus {
    /// Translate a probe exit code. `None` means the code is not part of the
    /// contract.
    #[must_use]
    pub const fn from_exit_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::AcceleratedRunning),
            1 => Some(Self::AcceleratedWithServer),
            10 => Some(Self::UnacceleratedVfkit),
            11 => Some(Self::NotRunning),
            12 => Some(Self::UnacceleratedRunning),
            127 => Some(Self::NotInstalled),
            _ => None,
        }
    }

    /// Exit code the probe script uses for this status.
    #[must_use]
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::AcceleratedRunning => 0,
            Self::AcceleratedWithServer => 1,
            Self::UnacceleratedVfkit => 10,
            Self::NotRunning => 11,
            Self::UnacceleratedRunning => 12,
            Self::NotInstalled => 127,
        }
    }

    /// True for the two states where API remoting is active.
    #[must_use]
    pub const fn is_accelerated(self) -> bool {
        matches!(self, Self::AcceleratedRunning | Self::AcceleratedWithServer)
    }

    /// True for the recoverable "wrong mode" states (10, 11, 12).
    #[must_use]
    pub const fn is_unaccelerated(self) -> bool {
        matches!(
            self,
            Self::UnacceleratedVfkit | Self::NotRunning | Self::UnacceleratedRunning
        )
    }

    /// Replace an accelerated status with the variant matching whether an
    /// inference server container is actually running. Other states are
    /// returned unchanged.
    #[must_use]
    pub const fn with_server_running(self, running: bool) -> Self {
        if !self.is_accelerated() {
            return self;
        }
        if running {
            Self::AcceleratedWithServer
        } else {
            Self::AcceleratedRunning
        }
    }

    /// Short label for status displays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AcceleratedRunning => "API remoting active",
            Self::AcceleratedWithServer => "API remoting active, inference server running",
            Self::NotInstalled => "API remoting binaries not installed",
            Self::UnacceleratedVfkit => "machine running with vfkit (no API remoting)",
            Self::NotRunning => "machine not running",
            Self::UnacceleratedRunning => "machine running without API remoting",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
