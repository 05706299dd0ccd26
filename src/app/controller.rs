//! Select-line arbitration controller: the hexagonal core.
//!
//! [`SelectController`] owns both [`LinePort`] handles and the tracked
//! level of each line.  Every operation runs under one mutex, so `set`,
//! `get`, `toggle` and `status` on either line are fully serialised.
//!
//! ## Mutual exclusion
//!
//! The two select lines must never be HIGH at the same time: that would
//! short two JTAG drivers onto the shared bus.  Writes to two pins are not
//! atomic, so raising a line while its neighbour is HIGH goes in order:
//!
//! ```text
//!   (1,0) --clear select0--> (0,0) --raise select1--> (0,1)
//! ```
//!
//! and a failed raise restores the neighbour afterwards.  The forbidden
//! `(1,1)` pair is never produced by any path, with or without readback.
//!
//! ## Tracked state
//!
//! A line's tracked level only changes after a write to it succeeded and
//! (under [`VerifyPolicy::Readback`]) read back as driven.  `get` returns
//! this cached level, never a live pin read.
//!
//! A line whose safe-level write could not be confirmed after a failed
//! operation is tracked LOW but marked unconfirmed.  Raising the other
//! line clears and verifies it first, and the raise is refused if that
//! clear fails.

use std::sync::{Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::PinState;
use log::{debug, error, info, warn};
use serde::Serialize;

use crate::config::{SwitchConfig, VerifyPolicy};
use crate::error::{LineId, Result, SwitchError};

use super::ports::LinePort;

// ───────────────────────────────────────────────────────────────
// Status snapshot
// ───────────────────────────────────────────────────────────────

/// Both tracked levels, taken under a single lock acquisition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SwitchStatus {
    pub select0: bool,
    pub select1: bool,
}

impl SwitchStatus {
    pub fn get(&self, line: LineId) -> bool {
        match line {
            LineId::Select0 => self.select0,
            LineId::Select1 => self.select1,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// SelectController
// ───────────────────────────────────────────────────────────────

/// Arbitrates the two JTAG select lines.
///
/// One instance per board.  Construct it once at boot and hand out
/// `&SelectController` (or an `Arc`) to every caller.
pub struct SelectController<L> {
    inner: Mutex<Lines<L>>,
}

struct Lines<L> {
    ports: [L; 2],
    /// Last written-and-verified level per line.
    state: [bool; 2],
    /// Line whose last safe-level write was never confirmed, so its pad
    /// may still be HIGH whatever `state` says.
    unconfirmed: [bool; 2],
    initialized: bool,
    verify: VerifyPolicy,
    /// Latched rollback failure.
    critical: Option<SwitchError>,
}

impl<L: LinePort> SelectController<L> {
    /// Wrap two line handles.  Nothing touches hardware until
    /// [`initialize`](Self::initialize).
    pub fn new(select0: L, select1: L, verify: VerifyPolicy) -> Self {
        Self {
            inner: Mutex::new(Lines {
                ports: [select0, select1],
                state: [false; 2],
                unconfirmed: [false; 2],
                initialized: false,
                verify,
                critical: None,
            }),
        }
    }

    pub fn from_config(select0: L, select1: L, config: &SwitchConfig) -> Self {
        Self::new(select0, select1, config.verify)
    }

    // Tracked state is only written after a confirmed write, so a panic
    // mid-operation cannot leave it describing an unapplied level.
    fn lock(&self) -> MutexGuard<'_, Lines<L>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Configure both lines as outputs driven LOW and confirm them.
    ///
    /// A repeat call after success is a no-op.
    pub fn initialize(&self) -> Result<()> {
        let mut lines = self.lock();

        if lines.initialized {
            warn!("Select control already initialized");
            return Ok(());
        }

        for line in LineId::ALL {
            if !lines.port(line).is_ready() {
                error!("{line}: GPIO device not ready");
                return Err(SwitchError::HardwareNotReady(line));
            }
        }

        // LOW/LOW is the one state valid whatever the lines did before.
        for line in LineId::ALL {
            if let Err(fault) = lines.port_mut(line).configure_output(PinState::Low) {
                error!("Failed to configure {line}: {fault}");
                return Err(SwitchError::HardwareWriteFailed(line));
            }
            lines.verify_level(line, false)?;
        }

        lines.state = [false; 2];
        lines.unconfirmed = [false; 2];
        lines.initialized = true;
        info!("Select control initialized (verify={:?})", lines.verify);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().initialized
    }

    // ── Line operations ───────────────────────────────────────

    /// Drive `line` to `high` (`true` = connector 1), clearing the other
    /// line first if both would otherwise be HIGH.
    pub fn set(&self, line: u8, high: bool) -> Result<()> {
        let line = checked_line(line)?;
        let mut lines = self.lock();
        lines.ensure_initialized()?;
        lines.apply(line, high)
    }

    /// Tracked level of `line`.
    pub fn get(&self, line: u8) -> Result<bool> {
        let line = checked_line(line)?;
        let lines = self.lock();
        lines.ensure_initialized()?;
        Ok(lines.state[line.index()])
    }

    /// Invert `line` and return its new level.
    ///
    /// The read and the write share one critical section, so the result
    /// always inverts the level this call observed.
    pub fn toggle(&self, line: u8) -> Result<bool> {
        let line = checked_line(line)?;
        let mut lines = self.lock();
        lines.ensure_initialized()?;
        let next = !lines.state[line.index()];
        lines.apply(line, next)?;
        Ok(next)
    }

    /// Both tracked levels at one instant.
    pub fn status(&self) -> Result<SwitchStatus> {
        let lines = self.lock();
        lines.ensure_initialized()?;
        Ok(SwitchStatus {
            select0: lines.state[0],
            select1: lines.state[1],
        })
    }

    /// The last rollback failure, if one ever happened.  Once set it stays
    /// set: the affected line's physical level was never confirmed.
    pub fn critical_fault(&self) -> Option<SwitchError> {
        self.lock().critical
    }
}

fn checked_line(line: u8) -> Result<LineId> {
    LineId::from_index(line).inspect_err(|_| error!("Invalid select line: {line}"))
}

const fn level(high: bool) -> PinState {
    if high { PinState::High } else { PinState::Low }
}

// ───────────────────────────────────────────────────────────────
// Locked internals
// ───────────────────────────────────────────────────────────────

impl<L: LinePort> Lines<L> {
    fn port(&self, line: LineId) -> &L {
        &self.ports[line.index()]
    }

    fn port_mut(&mut self, line: LineId) -> &mut L {
        &mut self.ports[line.index()]
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            error!("Select control not initialized");
            Err(SwitchError::NotInitialized)
        }
    }

    fn apply(&mut self, line: LineId, high: bool) -> Result<()> {
        let other = line.other();
        let cleared_other = high && self.state[other.index()];

        if high && (cleared_other || self.unconfirmed[other.index()]) {
            warn!("Mutual exclusion: clearing {other} before setting {line} HIGH");
            self.drive(other, false)?;
            self.state[other.index()] = false;
            self.unconfirmed[other.index()] = false;
            debug!("{other} cleared to LOW");
        }

        if let Err(e) = self.drive(line, high) {
            self.recover(line, high, cleared_other, e);
            return Err(e);
        }

        self.state[line.index()] = high;
        self.unconfirmed[line.index()] = false;
        debug!(
            "{line} set to {} (connector {})",
            if high { "HIGH" } else { "LOW" },
            u8::from(high)
        );
        Ok(())
    }

    /// Compensate for a failed target write.
    ///
    /// A target that was driven HIGH but read back wrong may really be
    /// HIGH, so it is brought back LOW before the neighbour is raised
    /// again.  If that fails the neighbour is left LOW.
    fn recover(&mut self, line: LineId, high: bool, cleared_other: bool, cause: SwitchError) {
        if high && matches!(cause, SwitchError::VerificationFailed(_)) {
            if self.drive(line, false).is_err() {
                self.escalate(line);
                return;
            }
            self.state[line.index()] = false;
            self.unconfirmed[line.index()] = false;
        }

        if !cleared_other {
            return;
        }

        let other = line.other();
        match self.drive(other, true) {
            Ok(()) => {
                self.state[other.index()] = true;
                warn!("Rolled back {other} to original state after {cause}");
            }
            Err(_) => self.escalate(other),
        }
    }

    /// The pad of `line` may be HIGH while it is tracked LOW; the next
    /// raise of the other line has to clear it first.
    fn escalate(&mut self, line: LineId) {
        error!("CRITICAL: rollback failed for {line}, physical level unconfirmed");
        self.unconfirmed[line.index()] = true;
        self.critical = Some(SwitchError::RollbackFailed(line));
    }

    /// Write then verify.
    fn drive(&mut self, line: LineId, high: bool) -> Result<()> {
        if let Err(fault) = self.port_mut(line).write(level(high)) {
            error!("Failed to set {line}: {fault}");
            return Err(SwitchError::HardwareWriteFailed(line));
        }
        self.verify_level(line, high)
    }

    fn verify_level(&mut self, line: LineId, expected: bool) -> Result<()> {
        if self.verify == VerifyPolicy::Skip {
            return Ok(());
        }
        match self.port_mut(line).read() {
            Ok(actual) if actual == level(expected) => Ok(()),
            Ok(actual) => {
                error!(
                    "GPIO {line} readback mismatch: expected {}, got {}",
                    u8::from(expected),
                    u8::from(actual == PinState::High)
                );
                Err(SwitchError::VerificationFailed(line))
            }
            Err(fault) => {
                error!("Failed to read {line}: {fault}");
                Err(SwitchError::VerificationFailed(line))
            }
        }
    }
}
