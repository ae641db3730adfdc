//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the reconnaissance
//! vehicle: state machine orchestration, hazard advisories, display
//! paging and the control loop.  All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod control_loop;
pub mod dispatcher;
pub mod display;
pub mod events;
pub mod ports;
pub mod service;
