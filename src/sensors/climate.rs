//! DHT11 temperature / humidity probe.
//!
//! Single-wire protocol: the host holds the line low for >18 ms, the probe
//! answers with an 80 µs low / 80 µs high preamble, then 40 bits where the
//! length of each high pulse encodes the bit (~27 µs = 0, ~70 µs = 1).
//! The last byte is the 8-bit sum of the first four.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: bit-banged on [`pins::DHT_DATA_GPIO`] (open-drain, set up by
//! hw_init).  On host/test: frames come from static atomics for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::CLIMATE_SENTINEL;
use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_BITS: AtomicU32 = AtomicU32::new(0x41BC_0000); // 23.5
#[cfg(not(target_os = "espidf"))]
static SIM_HUMID_BITS: AtomicU32 = AtomicU32::new(0x425C_0000); // 55.0
#[cfg(not(target_os = "espidf"))]
static SIM_FAIL: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(temperature_c: f32, humidity_pct: f32) {
    SIM_TEMP_BITS.store(temperature_c.to_bits(), Ordering::Relaxed);
    SIM_HUMID_BITS.store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// Make the simulated probe stop answering.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_climate(fail: bool) {
    SIM_FAIL.store(fail, Ordering::Relaxed);
}

/// A NaN reading or a failed read both become the climate sentinel.
pub fn normalize(reading: Result<f32, SensorError>) -> f32 {
    match reading {
        Ok(v) if v.is_finite() => v,
        _ => CLIMATE_SENTINEL,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateFrame {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Validate the checksum and unpack integral/decimal bytes.
pub fn decode_frame(bytes: [u8; 5]) -> Result<ClimateFrame, SensorError> {
    let sum = bytes[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != bytes[4] {
        return Err(SensorError::Checksum);
    }
    let humidity_pct = bytes[0] as f32 + bytes[1] as f32 * 0.1;
    let magnitude = bytes[2] as f32 + (bytes[3] & 0x7F) as f32 * 0.1;
    let temperature_c = if bytes[3] & 0x80 != 0 { -magnitude } else { magnitude };
    Ok(ClimateFrame {
        temperature_c,
        humidity_pct,
    })
}

/// One transaction yields both channels.  `read_temperature` starts a new
/// frame; `read_humidity` consumes the result of that same frame so one
/// acquisition costs one probe transaction, as the probe allows only ~1 Hz.
pub struct Dht11 {
    pending: Option<Result<ClimateFrame, SensorError>>,
}

impl Dht11 {
    pub fn new() -> Self {
        Self { pending: None }
    }

    pub fn read_temperature(&mut self) -> Result<f32, SensorError> {
        let frame = self.read_frame();
        self.pending = Some(frame);
        frame.map(|f| f.temperature_c)
    }

    pub fn read_humidity(&mut self) -> Result<f32, SensorError> {
        let frame = match self.pending.take() {
            Some(frame) => frame,
            None => self.read_frame(),
        };
        frame.map(|f| f.humidity_pct)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&mut self) -> Result<ClimateFrame, SensorError> {
        if SIM_FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::Timeout);
        }
        Ok(ClimateFrame {
            temperature_c: f32::from_bits(SIM_TEMP_BITS.load(Ordering::Relaxed)),
            humidity_pct: f32::from_bits(SIM_HUMID_BITS.load(Ordering::Relaxed)),
        })
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&mut self) -> Result<ClimateFrame, SensorError> {
        let pin = pins::DHT_DATA_GPIO;

        // Start signal.
        hw_init::gpio_write(pin, false);
        hw_init::delay_us(20_000);
        hw_init::gpio_write(pin, true);
        hw_init::delay_us(30);

        // Preamble: low ~80 µs, high ~80 µs, then the first bit's low.
        wait_level(pin, false, 100)?;
        wait_level(pin, true, 100)?;
        wait_level(pin, false, 100)?;

        let mut bytes = [0u8; 5];
        for bit in 0..40 {
            wait_level(pin, true, 80)?;
            let high_us = wait_level(pin, false, 100)?;
            if high_us > 45 {
                bytes[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        decode_frame(bytes)
    }
}

impl Default for Dht11 {
    fn default() -> Self {
        Self::new()
    }
}

/// Busy-wait until the line reaches `level`; returns the time spent.
#[cfg(target_os = "espidf")]
fn wait_level(pin: i32, level: bool, timeout_us: u64) -> Result<u64, SensorError> {
    let start = hw_init::uptime_us();
    loop {
        let elapsed = hw_init::uptime_us() - start;
        if hw_init::gpio_read(pin) == level {
            return Ok(elapsed);
        }
        if elapsed > timeout_us {
            return Err(SensorError::Timeout);
        }
    }
}
