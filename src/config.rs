//! System configuration parameters
//!
//! All tunable parameters for the reconnaissance vehicle.  Fixed at start:
//! the host binary may load a JSON override file, the ESP-IDF build uses
//! the compiled-in defaults.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Hazard thresholds ---
    /// Temperature (Celsius) at or above which a fire hazard is raised
    pub fire_temperature_c: f32,
    /// Temperature (Celsius) at or below which a blizzard hazard is raised
    pub blizzard_temperature_c: f32,
    /// Lower bound (inclusive) of the hurricane humidity band (%)
    pub hurricane_humidity_min_pct: f32,
    /// Upper bound (inclusive) of the hurricane humidity band (%)
    pub hurricane_humidity_max_pct: f32,
    /// Gas level (0-1023) at or above which gas is hazardous
    pub gas_threshold: u16,
    /// Distance (cm) below which an obstacle is reported
    pub obstacle_distance_cm: i32,
    /// Pitch or roll magnitude (degrees) above which tilt is reported
    pub tilt_threshold_deg: f32,

    // --- Rangefinder ---
    /// Readings beyond this distance (cm) are treated as "no echo"
    pub max_distance_cm: i32,
    /// Echo pulse timeout (microseconds)
    pub echo_timeout_us: u32,

    // --- Timing ---
    /// Sensor sampling tick (milliseconds)
    pub sensor_tick_ms: u32,
    /// Telemetry record interval (milliseconds)
    pub telemetry_interval_ms: u32,
    /// Display page rotation interval (milliseconds)
    pub display_rotation_ms: u32,
    /// Warm-up hold in Idle after power-on (milliseconds)
    pub warmup_ms: u32,
    /// Delay between control loop iterations (milliseconds)
    pub stability_delay_ms: u32,
    /// Cloud handshake deadline (milliseconds)
    pub handshake_timeout_ms: u32,

    // --- Policy ---
    /// Enter Error when temperature and humidity both fail in one sample
    pub error_on_critical_sensor_fault: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Hazards
            fire_temperature_c: 30.0,
            blizzard_temperature_c: 20.0,
            hurricane_humidity_min_pct: 99.0,
            hurricane_humidity_max_pct: 120.0,
            gas_threshold: 460,
            obstacle_distance_cm: 5,
            tilt_threshold_deg: 45.0,

            // Rangefinder
            max_distance_cm: 400,
            echo_timeout_us: 30_000,

            // Timing
            sensor_tick_ms: 2_000,
            telemetry_interval_ms: 15_000,
            display_rotation_ms: 10_000,
            warmup_ms: 2_000,
            stability_delay_ms: 50,
            handshake_timeout_ms: 5_000,

            // Policy
            error_on_critical_sensor_fault: false,
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the classifier or loop inconsistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blizzard_temperature_c >= self.fire_temperature_c {
            return Err(ConfigError::ValidationFailed(
                "blizzard temperature must be below fire temperature",
            ));
        }
        if self.hurricane_humidity_min_pct > self.hurricane_humidity_max_pct {
            return Err(ConfigError::ValidationFailed("hurricane humidity band is empty"));
        }
        if self.gas_threshold > 1023 {
            return Err(ConfigError::ValidationFailed("gas threshold exceeds 10-bit range"));
        }
        if self.obstacle_distance_cm <= 0 || self.max_distance_cm <= self.obstacle_distance_cm {
            return Err(ConfigError::ValidationFailed("distance bounds out of order"));
        }
        if !(self.tilt_threshold_deg > 0.0 && self.tilt_threshold_deg < 180.0) {
            return Err(ConfigError::ValidationFailed("tilt threshold must be in (0, 180)"));
        }
        if self.echo_timeout_us == 0 {
            return Err(ConfigError::ValidationFailed("echo timeout must be non-zero"));
        }
        if self.sensor_tick_ms == 0
            || self.telemetry_interval_ms == 0
            || self.display_rotation_ms == 0
            || self.handshake_timeout_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        if self.stability_delay_ms >= self.sensor_tick_ms {
            return Err(ConfigError::ValidationFailed(
                "stability delay must be shorter than the sensor tick",
            ));
        }
        Ok(())
    }

    /// Parse a (possibly partial) JSON document and validate the result.
    /// Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }
}
