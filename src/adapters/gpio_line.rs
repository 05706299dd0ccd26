//! GPIO select-line backend over `embedded-hal` 1.0 pins.
//!
//! The pin must be both an output and an input so the controller can read
//! the pad back after every write.  On the ESP32 this is a
//! `PinDriver::input_output`; an output-only driver reads its own
//! register, not the pad, and would hide wiring faults.

use embedded_hal::digital::{Error as _, InputPin, OutputPin, PinState};
use log::debug;

use crate::app::ports::LinePort;
use crate::error::LineFault;

/// Real hardware line.
pub struct GpioLine<P> {
    pin: P,
}

impl<P: OutputPin + InputPin> GpioLine<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }

    /// Give the pin back (e.g. to reconfigure it for another role).
    pub fn release(self) -> P {
        self.pin
    }

    fn drive(&mut self, level: PinState) -> Result<(), LineFault> {
        self.pin.set_state(level).map_err(|e| {
            debug!("gpio: set_state({:?}) failed: {:?}", level, e.kind());
            LineFault::WriteFailed
        })
    }
}

impl<P: OutputPin + InputPin> LinePort for GpioLine<P> {
    fn configure_output(&mut self, initial: PinState) -> Result<(), LineFault> {
        // The driver was put in output mode when it was built; fix the level.
        self.drive(initial)
    }

    fn write(&mut self, level: PinState) -> Result<(), LineFault> {
        self.drive(level)
    }

    fn read(&mut self) -> Result<PinState, LineFault> {
        match self.pin.is_high() {
            Ok(true) => Ok(PinState::High),
            Ok(false) => Ok(PinState::Low),
            Err(e) => {
                debug!("gpio: is_high failed: {:?}", e.kind());
                Err(LineFault::ReadFailed)
            }
        }
    }
}
