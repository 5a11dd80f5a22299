//! In-memory telemetry hub for an ESP32 pet monitor.
//!
//! Shared between the `pet-hub` server binary and the `simulator` binary
//! that stands in for the device during development.

pub mod config;
pub mod domain;
pub mod server;
pub mod store;
