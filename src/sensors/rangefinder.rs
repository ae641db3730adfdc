//! HC-SR04 ultrasonic rangefinder.
//!
//! A 10 µs trigger pulse starts a ping; the echo line then stays high for
//! the round-trip time of flight.  Distance is `echo_us * 0.034 / 2` cm
//! (speed of sound ~340 m/s).
//!
//! ## Dual-target design
//!
//! On ESP-IDF: trigger/echo via hw_init GPIO accessors, echo timed against
//! the esp_timer counter.  On host/test: the pulse width comes from a
//! static AtomicU32 (0 = no echo).

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU32, Ordering};

use embedded_hal::delay::DelayNs;

use super::NO_ECHO_CM;
use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Sound travels 0.034 cm/µs; halve for the round trip.
const CM_PER_US: f32 = 0.034;

#[cfg(not(target_os = "espidf"))]
static SIM_ECHO_US: AtomicU32 = AtomicU32::new(8_824); // ~150 cm

/// Inject an echo pulse width in µs; `0` simulates no echo.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_echo_us(echo_us: u32) {
    SIM_ECHO_US.store(echo_us, Ordering::Relaxed);
}

/// Convert a pulse width to whole centimetres.
pub fn distance_cm(echo_us: u32) -> i32 {
    (echo_us as f32 * CM_PER_US / 2.0) as i32
}

/// No echo, a zero-length echo, anything beyond `max_cm`, or a failed read
/// all collapse to [`NO_ECHO_CM`].
pub fn normalize(reading: Result<Option<u32>, SensorError>, max_cm: i32) -> i32 {
    match reading {
        Ok(Some(echo_us)) if echo_us > 0 => {
            let cm = distance_cm(echo_us);
            if cm > max_cm { NO_ECHO_CM } else { cm }
        }
        _ => NO_ECHO_CM,
    }
}

pub struct HcSr04<D: DelayNs> {
    trig_gpio: i32,
    echo_gpio: i32,
    timeout_us: u32,
    delay: D,
}

impl<D: DelayNs> HcSr04<D> {
    pub fn new(trig_gpio: i32, echo_gpio: i32, timeout_us: u32, delay: D) -> Self {
        Self {
            trig_gpio,
            echo_gpio,
            timeout_us,
            delay,
        }
    }

    /// Fire one ping.  `Ok(None)` when no echo arrives within the timeout.
    pub fn ping(&mut self) -> Result<Option<u32>, SensorError> {
        self.trigger();
        self.measure_echo()
    }

    fn trigger(&mut self) {
        write_pin(self.trig_gpio, false);
        self.delay.delay_us(2);
        write_pin(self.trig_gpio, true);
        self.delay.delay_us(10);
        write_pin(self.trig_gpio, false);
    }

    #[cfg(target_os = "espidf")]
    fn measure_echo(&mut self) -> Result<Option<u32>, SensorError> {
        let timeout = u64::from(self.timeout_us);
        let start = hw_init::uptime_us();
        while !hw_init::gpio_read(self.echo_gpio) {
            if hw_init::uptime_us() - start > timeout {
                return Ok(None);
            }
        }
        let rise = hw_init::uptime_us();
        while hw_init::gpio_read(self.echo_gpio) {
            if hw_init::uptime_us() - rise > timeout {
                return Ok(None);
            }
        }
        Ok(Some((hw_init::uptime_us() - rise) as u32))
    }

    #[cfg(not(target_os = "espidf"))]
    fn measure_echo(&mut self) -> Result<Option<u32>, SensorError> {
        let _ = self.echo_gpio;
        let echo_us = SIM_ECHO_US.load(Ordering::Relaxed);
        if echo_us == 0 || echo_us > self.timeout_us {
            return Ok(None);
        }
        Ok(Some(echo_us))
    }
}

#[cfg(target_os = "espidf")]
fn write_pin(pin: i32, high: bool) {
    hw_init::gpio_write(pin, high);
}

#[cfg(not(target_os = "espidf"))]
fn write_pin(_pin: i32, _high: bool) {}
