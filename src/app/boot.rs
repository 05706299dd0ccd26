//! Boot-time bring-up of the select lines.
//!
//! Runs once from `main()` before any adapter can reach the controller:
//! initialise, then apply the configured default on each line in order.

use log::{error, info};

use crate::config::SwitchConfig;
use crate::error::{LineId, Result};

use super::controller::{SelectController, SwitchStatus};
use super::ports::LinePort;

/// Initialise the controller and establish the boot defaults.
///
/// Only an initialisation failure is fatal.  A default that cannot be
/// applied is logged and the line keeps its verified LOW level.
pub fn bring_up<L: LinePort>(
    controller: &SelectController<L>,
    config: &SwitchConfig,
) -> Result<SwitchStatus> {
    controller.initialize()?;

    for line in LineId::ALL {
        let high = config.default_for(line);
        if let Err(e) = controller.set(line as u8, high) {
            error!("Failed to set {line} to boot default: {e}");
        }
    }

    let status = controller.status()?;
    info!(
        "JTAG switch ready - select0: connector {}, select1: connector {}",
        u8::from(status.select0),
        u8::from(status.select1)
    );
    Ok(status)
}
