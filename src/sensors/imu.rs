//! MPU6050 inertial sensor on the shared I2C bus.
//!
//! Configured for ±8 g / ±500 °/s with the 21 Hz digital low-pass filter.
//! Orientation is derived from the gravity vector only (no fusion):
//! `pitch = atan2(ay, az)`, `roll = atan2(-ax, az)`, and yaw reports the
//! z-axis rate.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::Orientation;
use crate::error::SensorError;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Raw accelerometer (m/s², x/y/z) and gyro z-rate (rad/s).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionReading {
    pub accel_mps2: [f32; 3],
    pub gyro_z_rad_s: f32,
}

/// Gravity-vector tilt in degrees.  A failed read fills all three axes
/// with the orientation sentinel.
pub fn normalize(reading: Result<MotionReading, SensorError>) -> Orientation {
    match reading {
        Ok(motion) => orientation_from_motion(&motion),
        Err(_) => Orientation::FAILED,
    }
}

pub fn orientation_from_motion(motion: &MotionReading) -> Orientation {
    let [ax, ay, az] = motion.accel_mps2;
    Orientation {
        pitch_deg: ay.atan2(az).to_degrees(),
        roll_deg: (-ax).atan2(az).to_degrees(),
        yaw_deg: motion.gyro_z_rad_s.to_degrees(),
    }
}

// ── Register map ──────────────────────────────────────────────

const REG_CONFIG: u8 = 0x1A;
const REG_GYRO_CONFIG: u8 = 0x1B;
const REG_ACCEL_CONFIG: u8 = 0x1C;
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I_VALUE: u8 = 0x68;

/// LSB per g at ±8 g.
const ACCEL_LSB_PER_G: f32 = 4096.0;
/// LSB per °/s at ±500 °/s.
const GYRO_LSB_PER_DPS: f32 = 65.5;
const STANDARD_GRAVITY: f32 = 9.806_65;

/// Scale the 14-byte burst (accel xyz, temp, gyro xyz, big-endian).
pub fn decode_burst(burst: &[u8; 14]) -> MotionReading {
    let word = |i: usize| i16::from_be_bytes([burst[i], burst[i + 1]]) as f32;
    let accel = |i: usize| word(i) / ACCEL_LSB_PER_G * STANDARD_GRAVITY;
    MotionReading {
        accel_mps2: [accel(0), accel(2), accel(4)],
        gyro_z_rad_s: (word(12) / GYRO_LSB_PER_DPS).to_radians(),
    }
}

#[cfg(not(target_os = "espidf"))]
static SIM_ACCEL_BITS: [AtomicU32; 3] = [
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0x411C_F5C3), // 9.81
];
#[cfg(not(target_os = "espidf"))]
static SIM_GYRO_Z_BITS: AtomicU32 = AtomicU32::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_FAIL: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_motion(motion: MotionReading) {
    for (slot, v) in SIM_ACCEL_BITS.iter().zip(motion.accel_mps2) {
        slot.store(v.to_bits(), Ordering::Relaxed);
    }
    SIM_GYRO_Z_BITS.store(motion.gyro_z_rad_s.to_bits(), Ordering::Relaxed);
}

#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_imu(fail: bool) {
    SIM_FAIL.store(fail, Ordering::Relaxed);
}

pub struct Mpu6050 {
    addr: u8,
    present: bool,
}

impl Mpu6050 {
    pub fn new(addr: u8) -> Self {
        Self { addr, present: false }
    }

    /// Wake the device and program ranges.  A missing device is not fatal:
    /// later reads report [`SensorError::NotPresent`].
    pub fn init(&mut self) -> Result<(), SensorError> {
        let mut id = [0u8; 1];
        self.read_regs(REG_WHO_AM_I, &mut id)?;
        if id[0] != WHO_AM_I_VALUE {
            return Err(SensorError::NotPresent);
        }
        self.write_reg(REG_PWR_MGMT_1, 0x00)?;
        self.write_reg(REG_ACCEL_CONFIG, 0x10)?;
        self.write_reg(REG_GYRO_CONFIG, 0x08)?;
        self.write_reg(REG_CONFIG, 0x04)?;
        self.present = true;
        log::info!("imu: MPU6050 ready at 0x{:02X}", self.addr);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Result<MotionReading, SensorError> {
        if !self.present {
            return Err(SensorError::NotPresent);
        }
        let mut burst = [0u8; 14];
        self.read_regs(REG_ACCEL_XOUT_H, &mut burst)?;
        Ok(decode_burst(&burst))
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Result<MotionReading, SensorError> {
        if !self.present {
            return Err(SensorError::NotPresent);
        }
        if SIM_FAIL.load(Ordering::Relaxed) {
            return Err(SensorError::BusFault);
        }
        let accel = [0, 1, 2].map(|i| f32::from_bits(SIM_ACCEL_BITS[i].load(Ordering::Relaxed)));
        Ok(MotionReading {
            accel_mps2: accel,
            gyro_z_rad_s: f32::from_bits(SIM_GYRO_Z_BITS.load(Ordering::Relaxed)),
        })
    }

    #[cfg(target_os = "espidf")]
    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        hw_init::i2c_write(self.addr, &[reg, value]).map_err(|_| SensorError::BusFault)
    }

    #[cfg(not(target_os = "espidf"))]
    fn write_reg(&mut self, _reg: u8, _value: u8) -> Result<(), SensorError> {
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn read_regs(&mut self, start: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        hw_init::i2c_write_read(self.addr, &[start], buf).map_err(|_| SensorError::BusFault)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_regs(&mut self, _start: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        buf.fill(WHO_AM_I_VALUE);
        Ok(())
    }
}
