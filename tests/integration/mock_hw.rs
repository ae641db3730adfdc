//! Mock board for integration tests.
//!
//! Implements every port the control loop needs.  Sensor readings are
//! plain fields the test sets directly; actuator calls and serial writes
//! are recorded so tests can assert on the full command history without
//! touching real GPIO/PWM registers.

use std::collections::VecDeque;

use reconuav::app::display::DisplayLines;
use reconuav::app::events::AppEvent;
use reconuav::app::ports::{ActuatorPort, EventSink, RemotePort, SensorPort, SerialPort};
use reconuav::drivers::buzzer::TonePattern;
use reconuav::drivers::indicator::{IndicatorEngine, Rgb};
use reconuav::drivers::remote::RemoteFrame;
use reconuav::error::{CommsError, SensorError};
use reconuav::sensors::imu::MotionReading;

/// Round-trip time that the rangefinder turns into 150 cm.
pub const ECHO_150_CM_US: u32 = 8_824;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    Motor(bool),
    Indicator(Rgb),
    Flash(Rgb, u32),
    ClearFlash,
    Show(String, String),
    Play(TonePattern),
    AllOff,
}

/// How the mock collector answers `CLOUD_CONNECT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collector {
    Accept,
    Refuse,
    Silent,
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub temperature: Result<f32, SensorError>,
    pub humidity: Result<f32, SensorError>,
    pub gas: Result<u16, SensorError>,
    pub echo: Result<Option<u32>, SensorError>,
    pub motion: Result<MotionReading, SensorError>,

    pub calls: Vec<ActuatorCall>,
    pub remote: VecDeque<RemoteFrame>,
    pub sent: Vec<String>,
    pub rx: VecDeque<u8>,
    pub collector: Collector,
    pub fail_writes: bool,
    pub advanced_to: u64,
    led: IndicatorEngine,
}

#[allow(dead_code)]
impl MockBoard {
    /// Comfortable conditions: no hazard holds.
    pub fn new() -> Self {
        Self {
            temperature: Ok(23.5),
            humidity: Ok(55.0),
            gas: Ok(120),
            echo: Ok(Some(ECHO_150_CM_US)),
            motion: Ok(MotionReading {
                accel_mps2: [0.0, 0.0, 9.81],
                gyro_z_rad_s: 0.0,
            }),
            calls: Vec::new(),
            remote: VecDeque::new(),
            sent: Vec::new(),
            rx: VecDeque::new(),
            collector: Collector::Accept,
            fail_writes: false,
            advanced_to: 0,
            led: IndicatorEngine::new(),
        }
    }

    pub fn with_collector(mut self, collector: Collector) -> Self {
        self.collector = collector;
        self
    }

    /// Queue raw bytes from the collector.
    pub fn inject(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    pub fn press(&mut self, code: u32) {
        self.remote.push_back(RemoteFrame { code, repeat: false });
    }

    pub fn hold(&mut self, code: u32) {
        self.remote.push_back(RemoteFrame { code, repeat: true });
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn motor_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Motor(on) => Some(*on),
                ActuatorCall::AllOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Colour the LED shows right now, flash layer included.
    pub fn lit(&self) -> Rgb {
        self.led.current()
    }

    /// Last steady indicator colour.
    pub fn indicator(&self) -> Option<Rgb> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Indicator(rgb) => Some(*rgb),
            _ => None,
        })
    }

    pub fn last_shown(&self) -> Option<(&str, &str)> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Show(top, bottom) => Some((top.as_str(), bottom.as_str())),
            _ => None,
        })
    }

    pub fn tones(&self) -> Vec<TonePattern> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                ActuatorCall::Play(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Lines written that are telemetry records rather than tokens.
    pub fn records(&self) -> Vec<&str> {
        self.sent
            .iter()
            .map(String::as_str)
            .filter(|l| l.contains(','))
            .collect()
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockBoard {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        self.temperature
    }

    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        self.humidity
    }

    fn read_gas(&mut self) -> Result<u16, SensorError> {
        self.gas
    }

    fn read_echo(&mut self) -> Result<Option<u32>, SensorError> {
        self.echo
    }

    fn read_motion(&mut self) -> Result<MotionReading, SensorError> {
        self.motion
    }
}

impl ActuatorPort for MockBoard {
    fn set_motor(&mut self, on: bool) {
        self.calls.push(ActuatorCall::Motor(on));
    }

    fn set_indicator(&mut self, colour: Rgb) {
        self.calls.push(ActuatorCall::Indicator(colour));
        self.led.set_steady(colour);
    }

    fn flash_indicator(&mut self, colour: Rgb, hold_ms: u32) {
        self.calls.push(ActuatorCall::Flash(colour, hold_ms));
        self.led.flash(colour, hold_ms);
    }

    fn clear_flash(&mut self) {
        self.calls.push(ActuatorCall::ClearFlash);
        self.led.clear_flash();
    }

    fn show(&mut self, lines: &DisplayLines) {
        self.calls
            .push(ActuatorCall::Show(lines.top.as_str().to_owned(), lines.bottom.as_str().to_owned()));
    }

    fn play(&mut self, pattern: TonePattern) {
        self.calls.push(ActuatorCall::Play(pattern));
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
        self.led.clear_all();
    }

    fn advance(&mut self, now_ms: u64) {
        self.advanced_to = now_ms;
        self.led.tick(now_ms);
    }
}

impl RemotePort for MockBoard {
    fn poll_remote(&mut self) -> Option<RemoteFrame> {
        self.remote.pop_front()
    }
}

impl SerialPort for MockBoard {
    fn write_line(&mut self, line: &str) -> Result<(), CommsError> {
        if self.fail_writes {
            return Err(CommsError::WriteFailed);
        }
        let line = line.trim_end_matches('\n');
        self.sent.push(line.to_owned());
        if line == "CLOUD_CONNECT" {
            match self.collector {
                Collector::Accept => self.inject(b"CLOUD_OK\n"),
                Collector::Refuse => self.inject(b"CLOUD_FAIL\n"),
                Collector::Silent => {}
            }
        }
        Ok(())
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

// ── Recording event sink ─────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn state_changes(&self) -> Vec<(reconuav::fsm::OperatingState, reconuav::fsm::OperatingState)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StateChanged { from, to } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
