//! GPIO pin assignments for the JTAG switch board.
//!
//! Single source of truth for the default select-line wiring.  The
//! numbers can be overridden through [`SwitchConfig`](crate::config::SwitchConfig).

// ---------------------------------------------------------------------------
// JTAG mux select lines (TS3L110-style analog switch, one per connector pair)
// ---------------------------------------------------------------------------

/// Digital output: LOW = connector 0, HIGH = connector 1.
pub const JTAG_SELECT0_GPIO: i32 = 4;
/// Digital output: LOW = connector 0, HIGH = connector 1.
/// Must never be HIGH while `JTAG_SELECT0_GPIO` is HIGH.
pub const JTAG_SELECT1_GPIO: i32 = 5;
