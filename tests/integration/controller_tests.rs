//! Integration tests for the select controller against the simulated bus.
//!
//! Covers initialisation, the pre-emption ordering, rollback after a
//! failed write or readback, and argument checking.

use embedded_hal::digital::PinState;
use jtagswitch::adapters::sim_line::BusOp;
use jtagswitch::config::VerifyPolicy;
use jtagswitch::error::{LineId, SwitchError};

use super::rig::{rig, rig_at, tracked};

const S0: LineId = LineId::Select0;
const S1: LineId = LineId::Select1;

// ── Initialisation ────────────────────────────────────────────

#[test]
fn initialize_configures_both_lines_low() {
    let (ctrl, bus) = rig(VerifyPolicy::Readback);
    assert!(ctrl.initialize().is_ok());
    assert!(ctrl.is_initialized());
    assert_eq!(tracked(&ctrl), [false, false]);
    assert_eq!(bus.levels(), [false, false]);
    assert_eq!(
        bus.journal(),
        vec![
            BusOp::Configure { line: S0, level: PinState::Low },
            BusOp::Read { line: S0, level: PinState::Low },
            BusOp::Configure { line: S1, level: PinState::Low },
            BusOp::Read { line: S1, level: PinState::Low },
        ]
    );
}

#[test]
fn second_initialize_touches_no_hardware() {
    let (ctrl, bus) = rig(VerifyPolicy::Readback);
    ctrl.initialize().unwrap();
    ctrl.set(0, true).unwrap();
    let before = bus.journal().len();

    assert!(ctrl.initialize().is_ok());
    assert_eq!(bus.journal().len(), before, "repeat init must not issue hardware ops");
    // Repeat init does not reset tracked state either.
    assert_eq!(tracked(&ctrl), [true, false]);
}

#[test]
fn not_ready_line_blocks_initialization() {
    let (ctrl, bus) = rig(VerifyPolicy::Readback);
    bus.set_ready(S1, false);

    assert_eq!(ctrl.initialize(), Err(SwitchError::HardwareNotReady(S1)));
    assert!(!ctrl.is_initialized());
    assert!(bus.journal().is_empty(), "readiness is checked before configuring");

    bus.set_ready(S1, true);
    assert!(ctrl.initialize().is_ok());
}

#[test]
fn init_readback_mismatch_leaves_controller_uninitialized() {
    let (ctrl, bus) = rig(VerifyPolicy::Readback);
    bus.stick(S0, Some(PinState::High));

    assert_eq!(ctrl.initialize(), Err(SwitchError::VerificationFailed(S0)));
    assert!(!ctrl.is_initialized());
    assert_eq!(ctrl.set(1, true), Err(SwitchError::NotInitialized));
}

#[test]
fn init_skips_readback_for_emulated_gpio() {
    let (ctrl, bus) = rig(VerifyPolicy::Skip);
    bus.stick(S0, Some(PinState::High));
    assert!(ctrl.initialize().is_ok());
    assert!(
        !bus.journal().iter().any(|op| matches!(op, BusOp::Read { .. })),
        "no readback under VerifyPolicy::Skip"
    );
}

// ── Argument and state checks ─────────────────────────────────

#[test]
fn invalid_line_issues_no_hardware_call() {
    let (ctrl, bus) = rig(VerifyPolicy::Readback);

    assert_eq!(ctrl.set(2, true), Err(SwitchError::InvalidLine(2)));
    assert_eq!(ctrl.get(5), Err(SwitchError::InvalidLine(5)));
    assert_eq!(ctrl.toggle(9), Err(SwitchError::InvalidLine(9)));
    assert!(bus.journal().is_empty());

    ctrl.initialize().unwrap();
    bus.clear_journal();

    assert_eq!(ctrl.set(2, true), Err(SwitchError::InvalidLine(2)));
    assert_eq!(ctrl.get(5), Err(SwitchError::InvalidLine(5)));
    assert!(bus.journal().is_empty());
}

#[test]
fn set_before_init_issues_no_hardware_call() {
    let (ctrl, bus) = rig(VerifyPolicy::Readback);
    assert_eq!(ctrl.set(0, true), Err(SwitchError::NotInitialized));
    assert_eq!(ctrl.get(1), Err(SwitchError::NotInitialized));
    assert!(bus.journal().is_empty());
}

// ── Pre-emption ───────────────────────────────────────────────

#[test]
fn raising_a_line_clears_the_other_first() {
    let (ctrl, bus) = rig_at(true, false);

    assert!(ctrl.set(1, true).is_ok());

    assert_eq!(bus.writes(), vec![(S0, PinState::Low), (S1, PinState::High)]);
    assert_eq!(tracked(&ctrl), [false, true]);
    assert_eq!(bus.levels(), [false, true]);
    assert_eq!(bus.violations(), 0);
}

#[test]
fn no_preemption_when_other_line_is_low() {
    let (ctrl, bus) = rig_at(false, false);

    assert!(ctrl.set(0, true).is_ok());

    assert_eq!(bus.writes(), vec![(S0, PinState::High)]);
    assert_eq!(tracked(&ctrl), [true, false]);
}

#[test]
fn lowering_a_line_never_touches_the_other() {
    let (ctrl, bus) = rig_at(false, true);
    assert!(ctrl.set(0, false).is_ok());
    assert_eq!(bus.writes(), vec![(S0, PinState::Low)]);
    assert_eq!(tracked(&ctrl), [false, true]);
}

#[test]
fn repeated_set_rewrites_the_line() {
    let (ctrl, bus) = rig_at(true, false);
    assert!(ctrl.set(0, true).is_ok());
    assert_eq!(bus.writes(), vec![(S0, PinState::High)]);
    assert_eq!(tracked(&ctrl), [true, false]);
}

#[test]
fn failed_preemption_changes_nothing() {
    let (ctrl, bus) = rig_at(true, false);
    bus.fail_next_write(S0);

    assert_eq!(ctrl.set(1, true), Err(SwitchError::HardwareWriteFailed(S0)));

    assert_eq!(bus.writes(), vec![(S0, PinState::Low)], "target must not be written");
    assert_eq!(tracked(&ctrl), [true, false]);
    assert_eq!(bus.levels(), [true, false]);
}

#[test]
fn preemption_readback_mismatch_stops_before_target() {
    let (ctrl, bus) = rig_at(true, false);
    bus.stick(S0, Some(PinState::High));

    assert_eq!(ctrl.set(1, true), Err(SwitchError::VerificationFailed(S0)));

    assert_eq!(bus.writes(), vec![(S0, PinState::Low)]);
    assert_eq!(tracked(&ctrl), [true, false]);
    assert_eq!(bus.violations(), 0);
}

// ── Rollback ──────────────────────────────────────────────────

#[test]
fn target_write_failure_restores_other_line() {
    let (ctrl, bus) = rig_at(true, false);
    bus.fail_next_write(S1);

    assert_eq!(ctrl.set(1, true), Err(SwitchError::HardwareWriteFailed(S1)));

    assert_eq!(
        bus.writes(),
        vec![(S0, PinState::Low), (S1, PinState::High), (S0, PinState::High)]
    );
    assert_eq!(tracked(&ctrl), [true, false]);
    assert_eq!(bus.levels(), [true, false]);
    assert_eq!(ctrl.critical_fault(), None);
    assert_eq!(bus.violations(), 0);
}

#[test]
fn target_readback_mismatch_lowers_target_then_restores_other() {
    let (ctrl, bus) = rig_at(true, false);
    bus.stick(S1, Some(PinState::Low));

    assert_eq!(ctrl.set(1, true), Err(SwitchError::VerificationFailed(S1)));

    assert_eq!(
        bus.writes(),
        vec![
            (S0, PinState::Low),
            (S1, PinState::High),
            (S1, PinState::Low),
            (S0, PinState::High),
        ]
    );
    assert_eq!(tracked(&ctrl), [true, false]);
    assert_eq!(bus.levels(), [true, false]);
    assert_eq!(ctrl.critical_fault(), None);
    assert_eq!(bus.violations(), 0);
}

#[test]
fn failed_rollback_is_latched_and_line_stays_low() {
    let (ctrl, bus) = rig_at(true, false);
    bus.fail_next_write(S1);
    // Write 0 on select0 is the pre-emptive clear, write 1 the rollback.
    bus.fail_write(S0, 1);

    assert_eq!(ctrl.set(1, true), Err(SwitchError::HardwareWriteFailed(S1)));

    assert_eq!(ctrl.critical_fault(), Some(SwitchError::RollbackFailed(S0)));
    assert_eq!(tracked(&ctrl), [false, false]);
    assert_eq!(bus.levels(), [false, false]);
    assert_eq!(bus.violations(), 0);

    // Still usable afterwards; the latch stays.
    assert!(ctrl.set(0, true).is_ok());
    assert_eq!(tracked(&ctrl), [true, false]);
    assert_eq!(ctrl.critical_fault(), Some(SwitchError::RollbackFailed(S0)));
}

#[test]
fn unrecoverable_target_keeps_other_line_low() {
    let (ctrl, bus) = rig_at(true, false);
    bus.stick(S1, Some(PinState::Low));
    // Write 0 on select1 raises it, write 1 is the attempt to lower it again.
    bus.fail_write(S1, 1);

    assert_eq!(ctrl.set(1, true), Err(SwitchError::VerificationFailed(S1)));

    assert_eq!(ctrl.critical_fault(), Some(SwitchError::RollbackFailed(S1)));
    assert_eq!(tracked(&ctrl), [false, false]);
    assert!(
        !bus.writes().contains(&(S0, PinState::High)),
        "select0 must not be re-raised while select1 is unconfirmed"
    );
    assert_eq!(bus.violations(), 0);
}

#[test]
fn unconfirmed_line_is_cleared_before_the_other_is_raised() {
    let (ctrl, bus) = rig_at(false, false);
    bus.fail_reads(S1, true);
    // Write 0 raises select1, write 1 would lower it again.
    bus.fail_write(S1, 1);

    assert_eq!(ctrl.set(1, true), Err(SwitchError::VerificationFailed(S1)));
    assert_eq!(ctrl.critical_fault(), Some(SwitchError::RollbackFailed(S1)));
    assert_eq!(tracked(&ctrl), [false, false]);
    assert_eq!(bus.level(S1), PinState::High, "select1 pad never came back down");

    bus.fail_reads(S1, false);
    bus.clear_journal();

    assert!(ctrl.set(0, true).is_ok());
    assert_eq!(bus.writes(), vec![(S1, PinState::Low), (S0, PinState::High)]);
    assert_eq!(bus.levels(), [true, false]);
    assert_eq!(tracked(&ctrl), [true, false]);
    assert_eq!(bus.violations(), 0);

    // Confirmed now: later raises need no extra clear.
    ctrl.set(0, false).unwrap();
    bus.clear_journal();
    ctrl.set(0, true).unwrap();
    assert_eq!(bus.writes(), vec![(S0, PinState::High)]);
}

#[test]
fn raise_is_refused_while_the_other_line_cannot_be_confirmed_low() {
    let (ctrl, bus) = rig_at(false, false);
    bus.fail_reads(S1, true);
    bus.fail_write(S1, 1);
    assert!(ctrl.set(1, true).is_err());
    bus.clear_journal();

    // Reads still fail, so the clear of select1 stays unconfirmed.
    assert_eq!(ctrl.set(0, true), Err(SwitchError::VerificationFailed(S1)));
    assert!(
        !bus.writes().contains(&(S0, PinState::High)),
        "select0 must not be raised"
    );
    assert_eq!(tracked(&ctrl), [false, false]);
    assert_eq!(bus.violations(), 0);

    // Lowering select0 is always allowed.
    assert!(ctrl.set(0, false).is_ok());
}

#[test]
fn unconfirmed_restore_is_cleared_before_reuse() {
    let (ctrl, bus) = rig_at(true, false);
    // The select0 pad reads LOW whatever is driven, so its restore to
    // HIGH cannot be confirmed.
    bus.stick(S0, Some(PinState::Low));
    bus.fail_next_write(S1);

    assert_eq!(ctrl.set(1, true), Err(SwitchError::HardwareWriteFailed(S1)));
    assert_eq!(ctrl.critical_fault(), Some(SwitchError::RollbackFailed(S0)));
    assert_eq!(tracked(&ctrl), [false, false]);

    // Released, the pad shows the HIGH that was driven during the restore.
    bus.stick(S0, None);
    assert_eq!(bus.levels(), [true, false]);
    bus.clear_journal();

    assert!(ctrl.set(1, true).is_ok());
    assert_eq!(bus.writes(), vec![(S0, PinState::Low), (S1, PinState::High)]);
    assert_eq!(bus.levels(), [false, true]);
    assert_eq!(bus.violations(), 0);
}

#[test]
fn read_failure_counts_as_verification_failure() {
    let (ctrl, bus) = rig_at(false, false);
    bus.fail_reads(S0, true);

    assert_eq!(ctrl.set(0, true), Err(SwitchError::VerificationFailed(S0)));
    // The safe-level write could not be confirmed either.
    assert_eq!(ctrl.critical_fault(), Some(SwitchError::RollbackFailed(S0)));
    assert_eq!(tracked(&ctrl), [false, false]);
    assert_eq!(bus.levels(), [false, false]);
}

#[test]
fn skip_policy_trusts_writes() {
    let (ctrl, bus) = rig(VerifyPolicy::Skip);
    ctrl.initialize().unwrap();
    bus.stick(S1, Some(PinState::Low));

    assert!(ctrl.set(1, true).is_ok());
    assert_eq!(tracked(&ctrl), [false, true]);
}

#[test]
fn skip_policy_still_orders_writes() {
    let (ctrl, bus) = rig(VerifyPolicy::Skip);
    ctrl.initialize().unwrap();
    ctrl.set(0, true).unwrap();
    bus.clear_journal();

    ctrl.set(1, true).unwrap();
    assert_eq!(bus.writes(), vec![(S0, PinState::Low), (S1, PinState::High)]);
    assert_eq!(bus.violations(), 0);
}

// ── Toggle ────────────────────────────────────────────────────

#[test]
fn toggle_twice_returns_to_low() {
    let (ctrl, _bus) = rig_at(false, false);

    assert_eq!(ctrl.toggle(0), Ok(true));
    assert_eq!(ctrl.get(0), Ok(true));
    assert_eq!(ctrl.toggle(0), Ok(false));
    assert_eq!(ctrl.get(0), Ok(false));
}

#[test]
fn toggle_up_preempts_the_other_line() {
    let (ctrl, bus) = rig_at(true, false);

    assert_eq!(ctrl.toggle(1), Ok(true));
    assert_eq!(bus.writes(), vec![(S0, PinState::Low), (S1, PinState::High)]);
    assert_eq!(tracked(&ctrl), [false, true]);
}

#[test]
fn failed_toggle_keeps_tracked_state() {
    let (ctrl, bus) = rig_at(false, true);
    bus.fail_next_write(S1);

    assert_eq!(ctrl.toggle(1), Err(SwitchError::HardwareWriteFailed(S1)));
    assert_eq!(tracked(&ctrl), [false, true]);
    assert_eq!(bus.levels(), [false, true]);
}
