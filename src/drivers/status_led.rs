//! RGB status indicator driver.
//!
//! Three PWM channels drive a common-cathode RGB LED.  Generic over
//! embedded-hal [`SetDutyCycle`] so the host build can substitute
//! recording channels.

use embedded_hal::pwm::SetDutyCycle;

use super::indicator::Rgb;
use crate::error::ActuatorError;

pub struct RgbLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: Rgb,
}

impl<R, G, B> RgbLed<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    pub fn new(red: R, green: G, blue: B) -> Self {
        Self {
            red,
            green,
            blue,
            current: (0, 0, 0),
        }
    }

    /// Program all three channels.  Skips the bus writes when unchanged.
    pub fn set_colour(&mut self, colour: Rgb) -> Result<(), ActuatorError> {
        if colour == self.current {
            return Ok(());
        }
        let (r, g, b) = colour;
        set_channel(&mut self.red, r)?;
        set_channel(&mut self.green, g)?;
        set_channel(&mut self.blue, b)?;
        self.current = colour;
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.set_colour((0, 0, 0))
    }

    pub fn current_colour(&self) -> Rgb {
        self.current
    }
}

fn set_channel(channel: &mut impl SetDutyCycle, level: u8) -> Result<(), ActuatorError> {
    channel
        .set_duty_cycle_fraction(u16::from(level), 255)
        .map_err(|_| ActuatorError::PwmWriteFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::pwm::ErrorType;

    #[derive(Default)]
    struct FakeChannel {
        duty: u16,
        writes: u32,
    }

    impl ErrorType for FakeChannel {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakeChannel {
        fn max_duty_cycle(&self) -> u16 {
            255
        }
        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.duty = duty;
            self.writes += 1;
            Ok(())
        }
    }

    fn led() -> RgbLed<FakeChannel, FakeChannel, FakeChannel> {
        RgbLed::new(FakeChannel::default(), FakeChannel::default(), FakeChannel::default())
    }

    #[test]
    fn sets_each_channel() {
        let mut led = led();
        led.set_colour((255, 165, 0)).unwrap();
        assert_eq!(led.red.duty, 255);
        assert_eq!(led.green.duty, 165);
        assert_eq!(led.blue.duty, 0);
        assert_eq!(led.current_colour(), (255, 165, 0));
    }

    #[test]
    fn unchanged_colour_skips_writes() {
        let mut led = led();
        led.set_colour((0, 255, 0)).unwrap();
        led.set_colour((0, 255, 0)).unwrap();
        assert_eq!(led.green.writes, 1);
    }
}
