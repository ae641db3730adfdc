//! Outbound telemetry record.
//!
//! Wire format, one record per line:
//! ```text
//! temp,humid,gas,dist,state,pitch,roll,yaw\n
//! 23.5,55.0,120,150,2,1.2,-0.5,10.0
//! ```
//! Floats carry exactly one decimal; gas, distance and state are integers.
//! Sentinels are sent as-is so the collector can tell a failed channel
//! from a real reading.

use core::fmt::Write;

use heapless::String;

use crate::error::FrameError;
use crate::fsm::OperatingState;
use crate::sensors::Sample;

/// Longest line the framer will build, terminator included.
pub const MAX_LINE_LEN: usize = 96;

pub type TelemetryLine = String<MAX_LINE_LEN>;

/// One outbound snapshot.  Built fresh for every emission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryRecord {
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub gas_level: i32,
    pub distance_cm: i32,
    pub state: u8,
    pub pitch_deg: f32,
    pub roll_deg: f32,
    pub yaw_deg: f32,
}

impl TelemetryRecord {
    pub fn new(sample: &Sample, state: OperatingState) -> Self {
        let o = sample.orientation();
        Self {
            temperature_c: sample.temperature_c(),
            humidity_pct: sample.humidity_pct(),
            gas_level: sample.gas_level(),
            distance_cm: sample.distance_cm(),
            state: state.code(),
            pitch_deg: o.pitch_deg,
            roll_deg: o.roll_deg,
            yaw_deg: o.yaw_deg,
        }
    }

    /// Render the record, newline included.
    pub fn to_line(&self) -> Result<TelemetryLine, FrameError> {
        let mut out = TelemetryLine::new();
        writeln!(
            out,
            "{:.1},{:.1},{},{},{},{:.1},{:.1},{:.1}",
            self.temperature_c,
            self.humidity_pct,
            self.gas_level,
            self.distance_cm,
            self.state,
            self.pitch_deg,
            self.roll_deg,
            self.yaw_deg,
        )
        .map_err(|_| FrameError::Overflow)?;
        Ok(out)
    }
}
