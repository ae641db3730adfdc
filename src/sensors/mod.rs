//! Sensor subsystem: per-channel drivers and the aggregating [`SensorHub`].
//!
//! The hub is the acquisition adapter.  Each tick it calls every
//! [`SensorPort`] capability once and folds the results into an immutable
//! [`Sample`], replacing failed channels with their sentinel.  It never
//! fails as a whole.

pub mod climate;
pub mod gas;
pub mod imu;
pub mod rangefinder;

use log::{info, warn};

use crate::app::ports::SensorPort;
use crate::config::SystemConfig;

/// Marker stored in temperature / humidity when the probe failed.
pub const CLIMATE_SENTINEL: f32 = -999.0;
/// Marker stored in the gas level when the ADC read failed.
pub const GAS_SENTINEL: i32 = -999;
/// Distance marker for "no echo / out of range".  Recoverable, distinct
/// from the hard-failure sentinels.
pub const NO_ECHO_CM: i32 = -1;
/// Marker stored in pitch / roll / yaw when the inertial read failed.
pub const ORIENTATION_SENTINEL: f32 = -999.0;

/// True if `value` carries one of the -999.0 sentinels.
pub fn is_sentinel(value: f32) -> bool {
    (value - CLIMATE_SENTINEL).abs() < f32::EPSILON
}

// ---------------------------------------------------------------------------
// Sample
// ---------------------------------------------------------------------------

/// Attitude in degrees (yaw is the gyro z rate in deg/s).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub pitch_deg: f32,
    pub roll_deg: f32,
    pub yaw_deg: f32,
}

impl Orientation {
    pub const FAILED: Self = Self {
        pitch_deg: ORIENTATION_SENTINEL,
        roll_deg: ORIENTATION_SENTINEL,
        yaw_deg: ORIENTATION_SENTINEL,
    };

    pub fn is_valid(&self) -> bool {
        !(is_sentinel(self.pitch_deg) || is_sentinel(self.roll_deg))
    }
}

/// Snapshot of every channel at one sampling instant.  Immutable once
/// built; the hub replaces it wholesale each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    temperature_c: f32,
    humidity_pct: f32,
    gas_level: i32,
    distance_cm: i32,
    orientation: Orientation,
}

impl Sample {
    pub const fn new(
        temperature_c: f32,
        humidity_pct: f32,
        gas_level: i32,
        distance_cm: i32,
        orientation: Orientation,
    ) -> Self {
        Self {
            temperature_c,
            humidity_pct,
            gas_level,
            distance_cm,
            orientation,
        }
    }

    pub fn temperature_c(&self) -> f32 {
        self.temperature_c
    }

    pub fn humidity_pct(&self) -> f32 {
        self.humidity_pct
    }

    pub fn gas_level(&self) -> i32 {
        self.gas_level
    }

    pub fn distance_cm(&self) -> i32 {
        self.distance_cm
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn temperature_valid(&self) -> bool {
        !is_sentinel(self.temperature_c)
    }

    pub fn humidity_valid(&self) -> bool {
        !is_sentinel(self.humidity_pct)
    }

    pub fn gas_valid(&self) -> bool {
        self.gas_level != GAS_SENTINEL
    }

    /// Both climate channels failed in this sample.
    pub fn critical_sensors_failed(&self) -> bool {
        !self.temperature_valid() && !self.humidity_valid()
    }

    // Copy-with helpers, handy for building scenarios from a baseline.

    pub fn with_temperature(self, temperature_c: f32) -> Self {
        Self { temperature_c, ..self }
    }

    pub fn with_humidity(self, humidity_pct: f32) -> Self {
        Self { humidity_pct, ..self }
    }

    pub fn with_gas(self, gas_level: i32) -> Self {
        Self { gas_level, ..self }
    }

    pub fn with_distance(self, distance_cm: i32) -> Self {
        Self { distance_cm, ..self }
    }

    pub fn with_orientation(self, orientation: Orientation) -> Self {
        Self { orientation, ..self }
    }
}

// ---------------------------------------------------------------------------
// Channel health
// ---------------------------------------------------------------------------

/// Acquisition channels, used to track failure edges for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Temperature,
    Humidity,
    Gas,
    Rangefinder,
    Inertial,
}

impl Channel {
    pub fn mask(self) -> u8 {
        match self {
            Self::Temperature => 1 << 0,
            Self::Humidity => 1 << 1,
            Self::Gas => 1 << 2,
            Self::Rangefinder => 1 << 3,
            Self::Inertial => 1 << 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::Gas => "gas",
            Self::Rangefinder => "rangefinder",
            Self::Inertial => "inertial",
        }
    }
}

// ---------------------------------------------------------------------------
// SensorHub
// ---------------------------------------------------------------------------

/// Acquisition adapter.  Exclusively owns the most recent [`Sample`].
pub struct SensorHub {
    max_distance_cm: i32,
    latest: Option<Sample>,
    /// Bitmask of channels that failed on the previous acquisition.
    faulted: u8,
}

impl SensorHub {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            max_distance_cm: config.max_distance_cm,
            latest: None,
            faulted: 0,
        }
    }

    /// Read every channel once and publish the new sample.
    pub fn acquire(&mut self, port: &mut impl SensorPort) -> Sample {
        let temperature = port.read_temperature();
        self.track(Channel::Temperature, temperature.is_err());
        let humidity = port.read_humidity();
        self.track(Channel::Humidity, humidity.is_err());
        let gas = port.read_gas();
        self.track(Channel::Gas, gas.is_err());
        let echo = port.read_echo();
        self.track(Channel::Rangefinder, echo.is_err());
        let motion = port.read_motion();
        self.track(Channel::Inertial, motion.is_err());

        let sample = Sample::new(
            climate::normalize(temperature),
            climate::normalize(humidity),
            gas::normalize(gas),
            rangefinder::normalize(echo, self.max_distance_cm),
            imu::normalize(motion),
        );
        self.latest = Some(sample);
        sample
    }

    pub fn latest(&self) -> Option<Sample> {
        self.latest
    }

    /// Bitmask of channels currently failing (see [`Channel::mask`]).
    pub fn faulted_channels(&self) -> u8 {
        self.faulted
    }

    fn track(&mut self, channel: Channel, failed: bool) {
        let was = self.faulted & channel.mask() != 0;
        if failed && !was {
            self.faulted |= channel.mask();
            warn!("sensor: {} read failed", channel.name());
        } else if !failed && was {
            self.faulted &= !channel.mask();
            info!("sensor: {} recovered", channel.name());
        }
    }
}
