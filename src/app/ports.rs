//! Port traits: the hexagonal boundary between the select controller and
//! the GPIO hardware.
//!
//! ```text
//!   GpioLine / SimLine ──▶ LinePort ──▶ SelectController (domain)
//! ```
//!
//! The controller owns exactly two `LinePort` handles and is the only
//! code that ever calls them.

use embedded_hal::digital::PinState;

use crate::error::LineFault;

// ───────────────────────────────────────────────────────────────
// Line port (driven adapter: domain → one GPIO output)
// ───────────────────────────────────────────────────────────────

/// Capability interface over a single physical select line.
pub trait LinePort {
    /// Whether the GPIO device behind this line can be used.
    fn is_ready(&self) -> bool {
        true
    }

    /// Configure the pin as an output driving `initial`.
    fn configure_output(&mut self, initial: PinState) -> Result<(), LineFault>;

    /// Drive the output level.
    fn write(&mut self, level: PinState) -> Result<(), LineFault>;

    /// Read the level actually present on the line.
    fn read(&mut self) -> Result<PinState, LineFault>;
}

impl<L: LinePort + ?Sized> LinePort for Box<L> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn configure_output(&mut self, initial: PinState) -> Result<(), LineFault> {
        (**self).configure_output(initial)
    }

    fn write(&mut self, level: PinState) -> Result<(), LineFault> {
        (**self).write(level)
    }

    fn read(&mut self) -> Result<PinState, LineFault> {
        (**self).read()
    }
}
