//! Application core: select-line arbitration, zero direct I/O.
//!
//! The [`controller`] is the only code that drives the select lines, and
//! it does so through the [`ports::LinePort`] trait.  Boot wiring and the
//! command surface sit on top of it and never see a pin.

pub mod boot;
pub mod commands;
pub mod controller;
pub mod ports;
