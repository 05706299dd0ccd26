//! JTAG Switch Firmware - Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │                                                          │
//! │   http_api (REST)        console (serial shell)          │
//! │                                                          │
//! │   ───────────── SwitchCommand / dispatch ─────────────   │
//! │                                                          │
//! │   ┌──────────────────────────────────────────────────┐   │
//! │   │        SelectController (mutual exclusion)       │   │
//! │   └──────────────────────────────────────────────────┘   │
//! │                                                          │
//! │   ──────────────── LinePort boundary ────────────────    │
//! │                                                          │
//! │   GpioLine<PinDriver>  x2        (SimLine on the host)   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! This binary only brings the select lines up and watches for latched
//! faults.  Route registration for the HTTP server and the serial shell
//! lives outside this crate: those transports decode their requests and
//! call `adapters::http_api` / `adapters::console` with a shared
//! `&SelectController`.
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::{Result, anyhow};
use esp_idf_hal::gpio::{AnyIOPin, PinDriver};
use log::{error, info};

use jtagswitch::adapters::gpio_line::GpioLine;
use jtagswitch::app::boot;
use jtagswitch::app::controller::SelectController;
use jtagswitch::config::SwitchConfig;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("JTAG Switch v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Config (build-time override or defaults) ───────────
    let config = match option_env!("JTAG_SWITCH_CONFIG") {
        Some(json) => {
            SwitchConfig::from_json(json).map_err(|e| anyhow!("JTAG_SWITCH_CONFIG: {e}"))?
        }
        None => SwitchConfig::default(),
    };
    info!("  jtag-select0: GPIO{}", config.select0_gpio);
    info!("  jtag-select1: GPIO{}", config.select1_gpio);

    // ── 3. Select lines ───────────────────────────────────────
    // Input/output mode so readback sees the pad, not the output latch.
    // SAFETY: the two GPIO numbers are validated as distinct and no other
    // driver in this firmware claims them.
    let select0 = PinDriver::input_output(unsafe { AnyIOPin::new(config.select0_gpio) })?;
    let select1 = PinDriver::input_output(unsafe { AnyIOPin::new(config.select1_gpio) })?;

    let controller =
        SelectController::from_config(GpioLine::new(select0), GpioLine::new(select1), &config);

    // ── 4. Bring-up ───────────────────────────────────────────
    if let Err(e) = boot::bring_up(&controller, &config) {
        error!("Failed to initialize select control: {e}");
        return Err(e.into());
    }

    // ── 5. Idle ───────────────────────────────────────────────
    // The main task only reports latched rollback failures from here on.
    loop {
        std::thread::sleep(Duration::from_secs(10));
        if let Some(fault) = controller.critical_fault() {
            error!("Select control degraded: {fault}");
        }
    }
}
