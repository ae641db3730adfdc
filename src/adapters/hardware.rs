//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns every sensor and actuator driver plus the remote receiver, and
//! exposes them through [`SensorPort`], [`ActuatorPort`] and
//! [`RemotePort`].  The collector link is injected as any [`SerialPort`]
//! so the host build can swap in the simulated collector.  On non-espidf
//! targets the underlying drivers use cfg-gated simulation stubs.
//!
//! Driver failures on the actuator side are logged at warn and
//! otherwise swallowed; the domain never sees them.

use log::warn;

use crate::app::display::DisplayLines;
use crate::app::ports::{ActuatorPort, RemotePort, SensorPort, SerialPort};
use crate::config::SystemConfig;
use crate::drivers::buzzer::{Buzzer, TonePattern};
use crate::drivers::display::Lcd1602;
use crate::drivers::hw_init::{BusyDelay, GpioOutput, I2cLcdBus, LedcChannel, LedcTone};
use crate::drivers::indicator::{IndicatorEngine, Rgb};
use crate::drivers::motor::MotorDriver;
use crate::drivers::remote::{RemoteFrame, RemoteReceiver};
use crate::drivers::status_led::RgbLed;
use crate::error::{ActuatorError, CommsError, SensorError};
use crate::pins;
use crate::sensors::climate::Dht11;
use crate::sensors::gas::Mq2Sensor;
use crate::sensors::imu::{MotionReading, Mpu6050};
use crate::sensors::rangefinder::HcSr04;

pub type Motor = MotorDriver<GpioOutput, GpioOutput, LedcChannel>;
pub type StatusLed = RgbLed<LedcChannel, LedcChannel, LedcChannel>;
pub type Display = Lcd1602<I2cLcdBus, BusyDelay>;

/// Every sensor driver, in acquisition order.
pub struct SensorSet {
    pub climate: Dht11,
    pub gas: Mq2Sensor,
    pub sonar: HcSr04<BusyDelay>,
    pub imu: Mpu6050,
}

impl SensorSet {
    /// Drivers on the carrier-board pins.  A missing inertial unit is
    /// logged and left to report `NotPresent` on every read.
    pub fn on_board(config: &SystemConfig) -> Self {
        let mut imu = Mpu6050::new(pins::MPU6050_ADDR);
        if let Err(e) = imu.init() {
            warn!("imu: init failed: {}", e);
        }
        Self {
            climate: Dht11::new(),
            gas: Mq2Sensor::new(pins::GAS_ADC_CHANNEL),
            sonar: HcSr04::new(pins::SONAR_TRIG_GPIO, pins::SONAR_ECHO_GPIO, config.echo_timeout_us, BusyDelay),
            imu,
        }
    }
}

/// Every actuator driver.
pub struct ActuatorSet {
    pub motor: Motor,
    pub led: StatusLed,
    pub buzzer: Buzzer<LedcTone>,
    pub lcd: Display,
}

impl ActuatorSet {
    pub fn on_board() -> Self {
        let mut lcd = Lcd1602::new(I2cLcdBus { addr: pins::LCD_ADDR }, BusyDelay);
        if let Err(e) = lcd.init() {
            warn!("display: init failed: {}", e);
        }
        Self {
            motor: MotorDriver::new(
                GpioOutput(pins::MOTOR_IN1_GPIO),
                GpioOutput(pins::MOTOR_IN2_GPIO),
                LedcChannel(pins::LEDC_CH_MOTOR),
            ),
            led: RgbLed::new(
                LedcChannel(pins::LEDC_CH_LED_R),
                LedcChannel(pins::LEDC_CH_LED_G),
                LedcChannel(pins::LEDC_CH_LED_B),
            ),
            buzzer: Buzzer::new(LedcTone),
            lcd,
        }
    }
}

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<S: SerialPort> {
    sensors: SensorSet,
    actuators: ActuatorSet,
    indicator: IndicatorEngine,
    remote: RemoteReceiver,
    serial: S,
    /// Time of the last `advance`; start time for tones and flashes.
    now_ms: u64,
}

impl<S: SerialPort> HardwareAdapter<S> {
    pub fn new(sensors: SensorSet, actuators: ActuatorSet, serial: S) -> Self {
        Self {
            sensors,
            actuators,
            indicator: IndicatorEngine::new(),
            remote: RemoteReceiver::new(),
            serial,
            now_ms: 0,
        }
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    pub fn indicator(&self) -> &IndicatorEngine {
        &self.indicator
    }

    /// Text currently on the LCD, top then bottom.
    pub fn shown(&self) -> (&str, &str) {
        (self.actuators.lcd.shown(0), self.actuators.lcd.shown(1))
    }

    pub fn motor_running(&self) -> bool {
        self.actuators.motor.is_running()
    }

    fn refresh_led(&mut self) {
        let colour = self.indicator.current();
        log_failure("status LED", self.actuators.led.set_colour(colour));
    }
}

fn log_failure(what: &str, result: Result<(), ActuatorError>) {
    if let Err(e) = result {
        warn!("{}: {}", what, e);
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<S: SerialPort> SensorPort for HardwareAdapter<S> {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.sensors.climate.read_temperature()
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.sensors.climate.read_humidity()
    }

    fn read_gas(&mut self) -> Result<u16, SensorError> {
        self.sensors.gas.read()
    }

    fn read_echo(&mut self) -> Result<Option<u32>, SensorError> {
        self.sensors.sonar.ping()
    }

    fn read_motion(&mut self) -> Result<MotionReading, SensorError> {
        self.sensors.imu.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S: SerialPort> ActuatorPort for HardwareAdapter<S> {
    fn set_motor(&mut self, on: bool) {
        let result = if on {
            self.actuators.motor.run_forward()
        } else {
            self.actuators.motor.stop()
        };
        log_failure("motor", result);
    }

    fn set_indicator(&mut self, colour: Rgb) {
        self.indicator.set_steady(colour);
        self.refresh_led();
    }

    fn flash_indicator(&mut self, colour: Rgb, hold_ms: u32) {
        self.indicator.flash(colour, hold_ms);
        self.refresh_led();
    }

    fn clear_flash(&mut self) {
        self.indicator.clear_flash();
        self.refresh_led();
    }

    fn show(&mut self, lines: &DisplayLines) {
        log_failure("display", self.actuators.lcd.write_lines(&lines.top, &lines.bottom));
    }

    fn play(&mut self, pattern: TonePattern) {
        self.actuators.buzzer.play(pattern, self.now_ms);
    }

    fn all_off(&mut self) {
        log_failure("motor", self.actuators.motor.stop());
        self.indicator.clear_all();
        log_failure("status LED", self.actuators.led.off());
        self.actuators.buzzer.silence();
    }

    fn advance(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        self.actuators.buzzer.tick(now_ms);
        self.indicator.tick(now_ms);
        self.refresh_led();
    }
}

// ── RemotePort / SerialPort ───────────────────────────────────

impl<S: SerialPort> RemotePort for HardwareAdapter<S> {
    fn poll_remote(&mut self) -> Option<RemoteFrame> {
        self.remote.poll()
    }
}

impl<S: SerialPort> SerialPort for HardwareAdapter<S> {
    fn write_line(&mut self, line: &str) -> Result<(), CommsError> {
        self.serial.write_line(line)
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.serial.read_byte()
    }
}
