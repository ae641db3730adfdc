//! Error types for the reconnaissance firmware.
//!
//! Small `Copy` enums, one per subsystem.  Nothing on the control path is
//! fatal: sensor errors become sentinels in the acquisition adapter, and
//! comms/frame errors become warn logs in the service.

use core::fmt;

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The probe did not answer within its protocol timeout.
    Timeout,
    /// A frame arrived but failed its checksum.
    Checksum,
    /// Bus transaction (I2C / ADC driver) returned an error.
    BusFault,
    /// The device was not detected at start-up.
    NotPresent,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "probe timeout"),
            Self::Checksum => write!(f, "checksum mismatch"),
            Self::BusFault => write!(f, "bus fault"),
            Self::NotPresent => write!(f, "device not present"),
        }
    }
}

impl core::error::Error for SensorError {}

// ---------------------------------------------------------------------------
// Actuator errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorError {
    /// PWM duty-cycle write failed.
    PwmWriteFailed,
    /// GPIO set failed.
    GpioWriteFailed,
    /// Display bus write failed.
    DisplayWriteFailed,
}

impl fmt::Display for ActuatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PwmWriteFailed => write!(f, "PWM write failed"),
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
            Self::DisplayWriteFailed => write!(f, "display write failed"),
        }
    }
}

impl core::error::Error for ActuatorError {}

// ---------------------------------------------------------------------------
// Communication errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// Writing to the collector link failed.
    WriteFailed,
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "link write failed"),
        }
    }
}

impl core::error::Error for CommsError {}

// ---------------------------------------------------------------------------
// Telemetry frame errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The rendered record does not fit the line buffer.
    Overflow,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overflow => write!(f, "record exceeds line buffer"),
        }
    }
}

impl core::error::Error for FrameError {}
