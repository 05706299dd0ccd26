//! Adapters: concrete implementations around the hexagonal core.
//!
//! | Adapter     | Role                        | Connects to                  |
//! |-------------|-----------------------------|------------------------------|
//! | `gpio_line` | LinePort                    | embedded-hal GPIO (ESP32)    |
//! | `sim_line`  | LinePort                    | In-memory bus, fault inject  |
//! | `http_api`  | REST façade                 | HTTP server handlers         |
//! | `console`   | Command surface             | Serial shell                 |
//!
//! `http_api` and `console` are transport-agnostic handlers.  The HTTP
//! server and shell that decode requests and call them are not part of
//! this crate.

pub mod console;
pub mod gpio_line;
pub mod http_api;
pub mod sim_line;
