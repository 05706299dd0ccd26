//! JTAG switch firmware library.
//!
//! Exposes the select-line controller, its port trait and adapters for
//! integration testing and fuzzing.  All ESP-IDF-specific code lives in
//! the binary behind the `espidf` feature.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod pins;
