//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, actuators, remote, serial link, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.
//!
//! All port errors are typed; the service turns them into sentinels or
//! warn logs and never aborts the loop.

use crate::app::display::DisplayLines;
use crate::drivers::buzzer::TonePattern;
use crate::drivers::indicator::Rgb;
use crate::drivers::remote::RemoteFrame;
use crate::error::{CommsError, SensorError};
use crate::scheduler::TimerId;
use crate::sensors::imu::MotionReading;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port.  One call per channel per sampling tick; the
/// acquisition adapter folds failures into sentinels.
pub trait SensorPort {
    /// Air temperature in °C.
    fn read_temperature(&mut self) -> Result<f32, SensorError>;

    /// Relative humidity in %.
    fn read_humidity(&mut self) -> Result<f32, SensorError>;

    /// Gas concentration on the 10-bit (0–1023) scale.
    fn read_gas(&mut self) -> Result<u16, SensorError>;

    /// Echo pulse width in µs.  `Ok(None)` when no echo arrived before
    /// the timeout.
    fn read_echo(&mut self) -> Result<Option<u32>, SensorError>;

    /// Raw acceleration and yaw rate.
    fn read_motion(&mut self) -> Result<MotionReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port.  Implementations log their own driver failures;
/// the domain fires and forgets.
pub trait ActuatorPort {
    /// Drive motor on (fixed forward duty) or off.
    fn set_motor(&mut self, on: bool);

    /// Steady indicator colour for the current state.
    fn set_indicator(&mut self, colour: Rgb);

    /// Hazard colour held over the steady colour for `hold_ms`.
    fn flash_indicator(&mut self, colour: Rgb, hold_ms: u32);

    /// Drop any hazard flash so the steady colour shows immediately.
    fn clear_flash(&mut self);

    /// Replace both display rows.
    fn show(&mut self, lines: &DisplayLines);

    /// Start an audible pattern, cutting off any pattern in progress.
    fn play(&mut self, pattern: TonePattern);

    /// Motor off, indicator dark, buzzer silent.
    fn all_off(&mut self);

    /// Advance time-based outputs (tone steps, indicator hold).  Called
    /// once at the end of every loop iteration.
    fn advance(&mut self, _now_ms: u64) {}
}

// ───────────────────────────────────────────────────────────────
// Remote port (driven adapter: IR receiver → domain)
// ───────────────────────────────────────────────────────────────

pub trait RemotePort {
    /// Next decoded frame, if one completed since the last poll.
    fn poll_remote(&mut self) -> Option<RemoteFrame>;
}

// ───────────────────────────────────────────────────────────────
// Serial port (driven adapter: domain ↔ collector link)
// ───────────────────────────────────────────────────────────────

/// Line-oriented link to the ground collector.
pub trait SerialPort {
    /// Write `line` followed by `\n` unless it already ends with one.
    fn write_line(&mut self, line: &str) -> Result<(), CommsError>;

    /// Next received byte, `None` when the receive buffer is empty.
    fn read_byte(&mut self) -> Option<u8>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from event system)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a timer fires.
///
/// This decouples the [`Scheduler`](crate::scheduler::Scheduler) from the
/// event queue.  The control loop implements this by pushing onto its
/// [`EventQueue`](crate::events::EventQueue), but the scheduler itself
/// knows nothing about events.
pub trait SchedulerDelegate {
    fn on_timer_fired(&mut self, timer: TimerId);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating [`SystemConfig`](crate::config::SystemConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::error::Error for ConfigError {}
