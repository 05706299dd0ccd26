//! Shared fixtures: a controller wired to a fresh [`SimBus`].

use jtagswitch::adapters::sim_line::{SimBus, SimLine};
use jtagswitch::app::controller::SelectController;
use jtagswitch::config::VerifyPolicy;

pub type SimController = SelectController<SimLine>;

pub fn rig(verify: VerifyPolicy) -> (SimController, SimBus) {
    let bus = SimBus::new();
    let (l0, l1) = bus.lines();
    (SelectController::new(l0, l1, verify), bus)
}

/// Initialised controller with `(select0, select1)` applied and the
/// journal cleared.
pub fn rig_at(select0: bool, select1: bool) -> (SimController, SimBus) {
    let (ctrl, bus) = rig(VerifyPolicy::Readback);
    ctrl.initialize().unwrap();
    ctrl.set(0, select0).unwrap();
    ctrl.set(1, select1).unwrap();
    bus.clear_journal();
    (ctrl, bus)
}

/// Tracked levels as `[select0, select1]`.
pub fn tracked(ctrl: &SimController) -> [bool; 2] {
    let s = ctrl.status().unwrap();
    [s.select0, s.select1]
}

