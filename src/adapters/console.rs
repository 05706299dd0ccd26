//! Serial console command surface (`jtag select0 1`, `jtag status`, ...).
//!
//! The shell backend tokenises the line; this adapter receives a typed
//! [`ConsoleCommand`], runs it through the controller and renders the
//! text the operator sees.  Replies live in fixed-capacity buffers so the
//! shell task never allocates.

use core::fmt::Write as _;

use heapless::String;

use crate::app::commands::{SwitchCommand, SwitchReply, dispatch};
use crate::app::controller::SelectController;
use crate::app::ports::LinePort;
use crate::error::LineId;

/// Rendered console output.
pub type Reply = String<160>;

/// One console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `select0 <value>` / `select1 <value>`; anything but 0 or 1 is refused.
    Select { line: LineId, value: i32 },
    /// `toggle0` / `toggle1`
    Toggle(LineId),
    /// `status`
    Status,
}

impl ConsoleCommand {
    pub const HELP: &'static [(&'static str, &'static str)] = &[
        ("select0", "Set select0 line (0|1)"),
        ("select1", "Set select1 line (0|1)"),
        ("toggle0", "Toggle select0 line"),
        ("toggle1", "Toggle select1 line"),
        ("status", "Show JTAG switch status"),
    ];
}

fn internal_error() -> Reply {
    let mut out = Reply::new();
    let _ = write!(out, "Internal error");
    out
}

/// Run a console command.  `Err` carries the error text to print.
pub fn execute<L: LinePort>(
    controller: &SelectController<L>,
    command: ConsoleCommand,
) -> Result<Reply, Reply> {
    let mut out = Reply::new();

    match command {
        ConsoleCommand::Select { line, value } => {
            if value != 0 && value != 1 {
                let _ = write!(out, "Invalid value. Use 0 or 1");
                return Err(out);
            }
            let cmd = SwitchCommand::Select {
                line,
                high: value == 1,
            };
            match dispatch(controller, cmd) {
                Ok(_) => {
                    let _ = write!(out, "{line} set to {value} (connector {value})");
                }
                Err(e) => {
                    let _ = write!(out, "Failed to set {line}: {e}");
                    return Err(out);
                }
            }
        }
        ConsoleCommand::Toggle(line) => match dispatch(controller, SwitchCommand::Toggle { line }) {
            Ok(SwitchReply::Toggled { high, .. }) => {
                let v = u8::from(high);
                let _ = write!(out, "{line} toggled to {v} (connector {v})");
            }
            Ok(_) => return Err(internal_error()),
            Err(e) => {
                let _ = write!(out, "Failed to toggle {line}: {e}");
                return Err(out);
            }
        },
        ConsoleCommand::Status => match dispatch(controller, SwitchCommand::Status) {
            Ok(SwitchReply::Status(s)) => {
                let _ = writeln!(out, "JTAG Switch Status:");
                for line in LineId::ALL {
                    let v = u8::from(s.get(line));
                    let _ = writeln!(out, "  {line}: {v} (connector {v})");
                }
            }
            Ok(_) => return Err(internal_error()),
            Err(e) => {
                let _ = write!(out, "Failed to get status: {e}");
                return Err(out);
            }
        },
    }

    Ok(out)
}
