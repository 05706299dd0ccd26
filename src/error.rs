//! Unified error types for the JTAG switch firmware.
//!
//! Two layers: [`LineFault`] is what a single line backend reports
//! (it knows nothing about which select line it drives), and
//! [`SwitchError`] is what the controller hands back to its callers,
//! tagged with the offending line.  All variants are `Copy` so they can
//! be passed through adapters and latched without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Line identity
// ---------------------------------------------------------------------------

/// One of the two physical JTAG select lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LineId {
    Select0 = 0,
    Select1 = 1,
}

impl LineId {
    /// Both lines, in boot/initialisation order.
    pub const ALL: [LineId; 2] = [LineId::Select0, LineId::Select1];

    /// Convert a raw line number from an outer surface.
    pub fn from_index(line: u8) -> Result<Self> {
        match line {
            0 => Ok(Self::Select0),
            1 => Ok(Self::Select1),
            other => Err(SwitchError::InvalidLine(other)),
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// The line that must never be HIGH together with `self`.
    pub const fn other(self) -> Self {
        match self {
            Self::Select0 => Self::Select1,
            Self::Select1 => Self::Select0,
        }
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select{}", *self as u8)
    }
}

// ---------------------------------------------------------------------------
// Backend faults
// ---------------------------------------------------------------------------

/// Failure reported by a [`LinePort`](crate::app::ports::LinePort) backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFault {
    /// The underlying GPIO device is not ready.
    NotReady,
    /// Driving the output level failed.
    WriteFailed,
    /// Reading the pad level back failed.
    ReadFailed,
}

impl fmt::Display for LineFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => write!(f, "GPIO device not ready"),
            Self::WriteFailed => write!(f, "GPIO write failed"),
            Self::ReadFailed => write!(f, "GPIO read failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller errors
// ---------------------------------------------------------------------------

/// Every fallible controller operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchError {
    /// `initialize()` has not completed successfully yet.
    NotInitialized,
    /// Line number outside `{0, 1}`.
    InvalidLine(u8),
    /// The GPIO device behind a line is not ready (init only).
    HardwareNotReady(LineId),
    /// Configuring or driving the line failed.
    HardwareWriteFailed(LineId),
    /// The line read back a different level than was driven.
    VerificationFailed(LineId),
    /// A compensating write after a failed `set` did not take.
    ///
    /// Irrecoverable: the line is left in a safe but unconfirmed state.
    RollbackFailed(LineId),
}

impl SwitchError {
    /// The line this error names, if any.
    pub fn line(&self) -> Option<LineId> {
        match self {
            Self::NotInitialized | Self::InvalidLine(_) => None,
            Self::HardwareNotReady(l)
            | Self::HardwareWriteFailed(l)
            | Self::VerificationFailed(l)
            | Self::RollbackFailed(l) => Some(*l),
        }
    }

    /// True when the request itself was malformed (a line number outside
    /// `{0, 1}`).  `NotInitialized` is a lifecycle state, not a bad
    /// argument, and reports `false`.
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidLine(_))
    }
}

impl fmt::Display for SwitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "select control not initialized"),
            Self::InvalidLine(l) => write!(f, "invalid select line {l}"),
            Self::HardwareNotReady(l) => write!(f, "{l}: GPIO device not ready"),
            Self::HardwareWriteFailed(l) => write!(f, "{l}: GPIO write failed"),
            Self::VerificationFailed(l) => write!(f, "{l}: readback mismatch"),
            Self::RollbackFailed(l) => write!(f, "{l}: rollback failed"),
        }
    }
}

impl std::error::Error for SwitchError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, SwitchError>;
