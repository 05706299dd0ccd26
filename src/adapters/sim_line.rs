//! Simulated select-line backend.
//!
//! [`SimBus`] models both select pins in memory and hands out one
//! [`SimLine`] per pin.  Every configure/write/read is appended to a
//! journal, and after each level change the bus checks that the two pins
//! are not HIGH together; a breach is counted in [`SimBus::violations`]
//! instead of frying anything.
//!
//! Faults can be injected per line: not-ready devices, failing writes,
//! failing reads, and pads stuck at a level (readback disagrees with the
//! driven value).
//!
//! Used by host tests, fuzzing, and builds without real GPIO.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::PinState;
use log::error;

use crate::app::ports::LinePort;
use crate::error::{LineFault, LineId};

/// One recorded hardware access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Configure { line: LineId, level: PinState },
    /// `applied` is false when an injected fault rejected the write.
    Write {
        line: LineId,
        level: PinState,
        applied: bool,
    },
    Read { line: LineId, level: PinState },
}

impl BusOp {
    pub fn line(&self) -> LineId {
        match self {
            Self::Configure { line, .. } | Self::Write { line, .. } | Self::Read { line, .. } => {
                *line
            }
        }
    }
}

#[derive(Debug, Default)]
struct PinModel {
    /// Output register; `None` until configured.
    driven: Option<PinState>,
    not_ready: bool,
    /// Outcome of upcoming writes, front first.  Empty = succeed.
    write_plan: VecDeque<bool>,
    stuck: Option<PinState>,
    fail_reads: bool,
}

impl PinModel {
    /// What the pad actually carries.
    fn pad(&self) -> PinState {
        self.stuck.or(self.driven).unwrap_or(PinState::Low)
    }
}

#[derive(Debug, Default)]
struct BusState {
    pins: [PinModel; 2],
    journal: Vec<BusOp>,
    violations: u32,
}

impl BusState {
    fn check_exclusion(&mut self) {
        if self.pins.iter().all(|p| p.pad() == PinState::High) {
            error!("SIM: both select lines HIGH");
            self.violations += 1;
        }
    }
}

/// Shared model of both select pins.  Cloning yields another handle to
/// the same bus.
#[derive(Debug, Clone, Default)]
pub struct SimBus {
    state: Arc<Mutex<BusState>>,
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle for one pin.
    pub fn line(&self, line: LineId) -> SimLine {
        SimLine {
            id: line,
            bus: self.clone(),
        }
    }

    /// Handles for `(select0, select1)`.
    pub fn lines(&self) -> (SimLine, SimLine) {
        (self.line(LineId::Select0), self.line(LineId::Select1))
    }

    // ── Observation ───────────────────────────────────────────

    /// Pad level of one pin.
    pub fn level(&self, line: LineId) -> PinState {
        self.lock().pins[line.index()].pad()
    }

    /// Pad levels as `[select0, select1]`, `true` = HIGH.
    pub fn levels(&self) -> [bool; 2] {
        let s = self.lock();
        [
            s.pins[0].pad() == PinState::High,
            s.pins[1].pad() == PinState::High,
        ]
    }

    pub fn journal(&self) -> Vec<BusOp> {
        self.lock().journal.clone()
    }

    /// Write attempts in order, applied or not.
    pub fn writes(&self) -> Vec<(LineId, PinState)> {
        self.lock()
            .journal
            .iter()
            .filter_map(|op| match *op {
                BusOp::Write { line, level, .. } => Some((line, level)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_journal(&self) {
        self.lock().journal.clear();
    }

    /// How many times both pads were HIGH after a level change.
    pub fn violations(&self) -> u32 {
        self.lock().violations
    }

    // ── Fault injection ───────────────────────────────────────

    pub fn set_ready(&self, line: LineId, ready: bool) {
        self.lock().pins[line.index()].not_ready = !ready;
    }

    /// Reject the `nth` upcoming write to `line` (0 = the next one).
    pub fn fail_write(&self, line: LineId, nth: usize) {
        let mut s = self.lock();
        let plan = &mut s.pins[line.index()].write_plan;
        if plan.len() <= nth {
            plan.resize(nth + 1, true);
        }
        plan[nth] = false;
    }

    pub fn fail_next_write(&self, line: LineId) {
        self.fail_write(line, 0);
    }

    /// Pin the pad to `level` regardless of what is driven; `None` frees it.
    pub fn stick(&self, line: LineId, level: Option<PinState>) {
        let mut s = self.lock();
        s.pins[line.index()].stuck = level;
        s.check_exclusion();
    }

    pub fn fail_reads(&self, line: LineId, fail: bool) {
        self.lock().pins[line.index()].fail_reads = fail;
    }
}

/// One simulated select pin.
#[derive(Debug, Clone)]
pub struct SimLine {
    id: LineId,
    bus: SimBus,
}

impl SimLine {
    pub fn id(&self) -> LineId {
        self.id
    }
}

impl LinePort for SimLine {
    fn is_ready(&self) -> bool {
        !self.bus.lock().pins[self.id.index()].not_ready
    }

    fn configure_output(&mut self, initial: PinState) -> Result<(), LineFault> {
        let mut s = self.bus.lock();
        if s.pins[self.id.index()].not_ready {
            return Err(LineFault::NotReady);
        }
        s.pins[self.id.index()].driven = Some(initial);
        s.journal.push(BusOp::Configure {
            line: self.id,
            level: initial,
        });
        s.check_exclusion();
        Ok(())
    }

    fn write(&mut self, level: PinState) -> Result<(), LineFault> {
        let mut s = self.bus.lock();
        let pin = &mut s.pins[self.id.index()];
        let applied = pin.driven.is_some() && pin.write_plan.pop_front().unwrap_or(true);
        if applied {
            pin.driven = Some(level);
        }
        s.journal.push(BusOp::Write {
            line: self.id,
            level,
            applied,
        });
        if !applied {
            return Err(LineFault::WriteFailed);
        }
        s.check_exclusion();
        Ok(())
    }

    fn read(&mut self) -> Result<PinState, LineFault> {
        let mut s = self.bus.lock();
        let pin = &s.pins[self.id.index()];
        if pin.fail_reads {
            return Err(LineFault::ReadFailed);
        }
        let level = pin.pad();
        s.journal.push(BusOp::Read {
            line: self.id,
            level,
        });
        Ok(level)
    }
}
