//! Drive motor (H-bridge) driver.
//!
//! IN1/IN2 select direction, the enable line carries PWM.  The vehicle only
//! ever runs forward at full duty or stops, but the driver keeps duty and
//! direction explicit.
//!
//! Generic over embedded-hal [`OutputPin`] / [`SetDutyCycle`]; this driver
//! is a dumb actuator and enforces no policy.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running { duty_percent: u8, dir: Direction },
}

pub struct MotorDriver<A, B, E> {
    in1: A,
    in2: B,
    enable: E,
    state: MotorState,
}

impl<A, B, E> MotorDriver<A, B, E>
where
    A: OutputPin,
    B: OutputPin,
    E: SetDutyCycle,
{
    pub fn new(in1: A, in2: B, enable: E) -> Self {
        Self {
            in1,
            in2,
            enable,
            state: MotorState::Stopped,
        }
    }

    pub fn set(&mut self, duty_percent: u8, dir: Direction) -> Result<(), ActuatorError> {
        let duty_percent = duty_percent.min(100);
        if duty_percent == 0 {
            return self.stop();
        }
        let forward = dir == Direction::Forward;
        set_pin(&mut self.in1, forward)?;
        set_pin(&mut self.in2, !forward)?;
        self.enable
            .set_duty_cycle_percent(duty_percent)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.state = MotorState::Running { duty_percent, dir };
        Ok(())
    }

    /// Full speed ahead.
    pub fn run_forward(&mut self) -> Result<(), ActuatorError> {
        self.set(100, Direction::Forward)
    }

    /// Enable low first, then both inputs low (coast).
    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.enable
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        set_pin(&mut self.in1, false)?;
        set_pin(&mut self.in2, false)?;
        self.state = MotorState::Stopped;
        Ok(())
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        !matches!(self.state, MotorState::Stopped)
    }
}

fn set_pin(pin: &mut impl OutputPin, high: bool) -> Result<(), ActuatorError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|_| ActuatorError::GpioWriteFailed)
}
