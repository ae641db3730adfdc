//! Recon UAV firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the host
//! simulator. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod fsm;
pub mod hazard;
pub mod scheduler;
pub mod telemetry;

// Hardware-facing layers.  On host builds the drivers run against
// cfg-gated simulation stubs, so these compile everywhere.
pub mod adapters;
pub mod drivers;
pub mod sensors;

pub mod pins;
