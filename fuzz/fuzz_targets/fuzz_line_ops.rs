//! Fuzz target: `SelectController` request sequences
//!
//! Each input byte is one request or one injected write fault against a
//! simulated bus.  Invariants checked:
//! - No panics under any byte sequence
//! - The pads never carry HIGH on both select lines
//! - Tracked levels match the pads (only write faults are injected)
//!
//! cargo fuzz run fuzz_line_ops

#![no_main]

use jtagswitch::adapters::sim_line::SimBus;
use jtagswitch::app::controller::SelectController;
use jtagswitch::config::VerifyPolicy;
use jtagswitch::error::LineId;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let bus = SimBus::new();
    let (l0, l1) = bus.lines();
    let ctrl = SelectController::new(l0, l1, VerifyPolicy::Readback);
    if ctrl.initialize().is_err() {
        return;
    }

    for &b in data {
        // Low two bits pick the line, including two invalid numbers.
        let line = b & 0b11;
        match b >> 5 {
            0 | 1 => {
                let _ = ctrl.set(line, b & 0b100 != 0);
            }
            2 | 3 => {
                let _ = ctrl.toggle(line);
            }
            4 => {
                let _ = ctrl.get(line);
            }
            5 => {
                let id = if line & 1 == 0 { LineId::Select0 } else { LineId::Select1 };
                bus.fail_write(id, usize::from((b >> 2) & 0b111));
            }
            _ => {
                let _ = ctrl.status();
            }
        }

        let s = ctrl.status().unwrap();
        assert!(!(s.select0 && s.select1));
        assert_eq!([s.select0, s.select1], bus.levels());
    }
    assert_eq!(bus.violations(), 0);
});
