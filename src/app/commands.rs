//! Inbound commands to the select controller.
//!
//! These represent actions requested by the outside world (REST handlers,
//! the serial console) after the adapter has validated its own input.
//! [`dispatch`] maps each one onto exactly one controller operation.

use crate::error::{LineId, Result};

use super::controller::{SelectController, SwitchStatus};
use super::ports::LinePort;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    /// Route `line` to connector 1 (`high`) or connector 0.
    Select { line: LineId, high: bool },

    /// Flip `line` to the other connector.
    Toggle { line: LineId },

    /// Report both lines.
    Status,
}

/// Successful outcome of a [`SwitchCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchReply {
    /// Both levels after the select completed.
    Selected(SwitchStatus),
    /// The toggled line and its new level.
    Toggled { line: LineId, high: bool },
    Status(SwitchStatus),
}

pub fn dispatch<L: LinePort>(
    controller: &SelectController<L>,
    command: SwitchCommand,
) -> Result<SwitchReply> {
    match command {
        SwitchCommand::Select { line, high } => {
            controller.set(line as u8, high)?;
            controller.status().map(SwitchReply::Selected)
        }
        SwitchCommand::Toggle { line } => {
            let high = controller.toggle(line as u8)?;
            Ok(SwitchReply::Toggled { line, high })
        }
        SwitchCommand::Status => controller.status().map(SwitchReply::Status),
    }
}
