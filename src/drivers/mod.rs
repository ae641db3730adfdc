//! Actuator and input drivers, hardware initialisation, and peripheral helpers.

pub mod buzzer;
pub mod display;
pub mod hw_init;
pub mod indicator;
pub mod motor;
pub mod remote;
pub mod status_led;
