//! MQ-2 combustible gas / smoke sensor.
//!
//! Analog output read through ADC1.  The ESP32-S3 converts at 12 bits;
//! the classifier works on a 10-bit scale so the raw value is shifted down
//! by two.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: oneshot ADC read (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use super::GAS_SENTINEL;
use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Top of the 10-bit scale.
pub const GAS_MAX: u16 = 1023;

#[cfg(not(target_os = "espidf"))]
static SIM_GAS_RAW12: AtomicU16 = AtomicU16::new(480); // ~120 on the 10-bit scale

/// Inject a raw 12-bit conversion.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_gas_adc(raw12: u16) {
    SIM_GAS_RAW12.store(raw12, Ordering::Relaxed);
}

/// Clamp to the 10-bit range; a failed read becomes the gas sentinel.
pub fn normalize(reading: Result<u16, SensorError>) -> i32 {
    match reading {
        Ok(level) => i32::from(level.min(GAS_MAX)),
        Err(_) => GAS_SENTINEL,
    }
}

/// Map a 12-bit conversion onto the 10-bit scale.
pub fn scale_raw12(raw12: u16) -> u16 {
    (raw12 >> 2).min(GAS_MAX)
}

pub struct Mq2Sensor {
    _adc_channel: u32,
}

impl Mq2Sensor {
    pub fn new(adc_channel: u32) -> Self {
        Self {
            _adc_channel: adc_channel,
        }
    }

    /// Gas level on the 10-bit scale.
    pub fn read(&mut self) -> Result<u16, SensorError> {
        self.read_adc().map(scale_raw12)
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self._adc_channel).ok_or(SensorError::BusFault)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, SensorError> {
        Ok(SIM_GAS_RAW12.load(Ordering::Relaxed))
    }
}
