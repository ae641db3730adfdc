//! Integration tests: AppService → FSM → dispatcher → ports, driven
//! directly without the control loop.

use reconuav::app::commands::AppCommand;
use reconuav::app::display::DisplayLines;
use reconuav::app::events::AppEvent;
use reconuav::app::ports::{ActuatorPort, EventSink, SensorPort, SerialPort};
use reconuav::app::service::AppService;
use reconuav::config::SystemConfig;
use reconuav::drivers::buzzer::TonePattern;
use reconuav::drivers::indicator::Rgb;
use reconuav::error::{CommsError, SensorError};
use reconuav::fsm::OperatingState;
use reconuav::hazard::Hazard;
use reconuav::sensors::imu::MotionReading;
use reconuav::telemetry::LinkStatus;

// ── Mock implementations ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum ActCall {
    Motor(bool),
    Indicator(Rgb),
    Flash(Rgb),
    ClearFlash,
    Show(String),
    Play(TonePattern),
    AllOff,
}

struct MockHw {
    gas: u16,
    pitch_accel_y: f32,
    calls: Vec<ActCall>,
    written: Vec<String>,
    rx: Vec<u8>,
}

impl MockHw {
    fn new() -> Self {
        Self {
            gas: 100,
            pitch_accel_y: 0.0,
            calls: Vec::new(),
            written: Vec::new(),
            rx: Vec::new(),
        }
    }
}

impl SensorPort for MockHw {
    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Ok(24.0)
    }
    fn read_humidity(&mut self) -> Result<f32, SensorError> {
        Ok(50.0)
    }
    fn read_gas(&mut self) -> Result<u16, SensorError> {
        Ok(self.gas)
    }
    fn read_echo(&mut self) -> Result<Option<u32>, SensorError> {
        Ok(None)
    }
    fn read_motion(&mut self) -> Result<MotionReading, SensorError> {
        Ok(MotionReading {
            accel_mps2: [0.0, self.pitch_accel_y, 9.81],
            gyro_z_rad_s: 0.0,
        })
    }
}

impl ActuatorPort for MockHw {
    fn set_motor(&mut self, on: bool) {
        self.calls.push(ActCall::Motor(on));
    }
    fn set_indicator(&mut self, colour: Rgb) {
        self.calls.push(ActCall::Indicator(colour));
    }
    fn flash_indicator(&mut self, colour: Rgb, _hold_ms: u32) {
        self.calls.push(ActCall::Flash(colour));
    }
    fn clear_flash(&mut self) {
        self.calls.push(ActCall::ClearFlash);
    }
    fn show(&mut self, lines: &DisplayLines) {
        self.calls.push(ActCall::Show(lines.top.as_str().to_owned()));
    }
    fn play(&mut self, pattern: TonePattern) {
        self.calls.push(ActCall::Play(pattern));
    }
    fn all_off(&mut self) {
        self.calls.push(ActCall::AllOff);
    }
}

impl SerialPort for MockHw {
    fn write_line(&mut self, line: &str) -> Result<(), CommsError> {
        self.written.push(line.trim_end().to_owned());
        Ok(())
    }
    fn read_byte(&mut self) -> Option<u8> {
        (!self.rx.is_empty()).then(|| self.rx.remove(0))
    }
}

struct LogSink {
    events: Vec<AppEvent>,
}
impl LogSink {
    fn new() -> Self {
        Self { events: Vec::new() }
    }
}
impl EventSink for LogSink {
    fn emit(&mut self, e: &AppEvent) {
        self.events.push(e.clone());
    }
}

fn make_app() -> (AppService, MockHw, LogSink) {
    let mut app = AppService::new(SystemConfig::default());
    let mut hw = MockHw::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    hw.calls.clear();
    (app, hw, sink)
}

/// Turn on, sample once, pass the warm-up.
fn make_active() -> (AppService, MockHw, LogSink) {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, 0, &mut hw, &mut sink);
    app.sensor_tick(1_000, &mut hw, &mut sink);
    assert!(app.poll_warmup(2_000, &mut hw, &mut sink));
    assert_eq!(app.state(), OperatingState::Active);
    hw.calls.clear();
    (app, hw, sink)
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn turn_on_actuates_idle_set_in_order() {
    let (mut app, mut hw, mut sink) = make_app();
    assert!(app.handle_command(AppCommand::TurnOn, 0, &mut hw, &mut sink));

    assert_eq!(
        hw.calls,
        vec![
            ActCall::Motor(true),
            ActCall::ClearFlash,
            ActCall::Indicator((128, 0, 128)),
            ActCall::Show("UAV ACTIVE".into()),
            ActCall::Play(TonePattern::StateChange),
        ]
    );
    assert_eq!(hw.written, vec!["CLOUD_CONNECT"]);
    assert_eq!(app.link_status(), LinkStatus::Pending);
}

#[test]
fn repeated_turn_on_does_not_restart_warmup() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, 0, &mut hw, &mut sink);
    hw.calls.clear();

    assert!(!app.handle_command(AppCommand::TurnOn, 1_500, &mut hw, &mut sink));
    assert!(hw.calls.is_empty());
    assert_eq!(hw.written.len(), 1, "no second handshake");

    // Deadline still counts from the first TurnOn.
    app.sensor_tick(1_600, &mut hw, &mut sink);
    assert!(app.poll_warmup(2_000, &mut hw, &mut sink));
}

#[test]
fn turn_off_while_off_is_a_no_op() {
    let (mut app, mut hw, mut sink) = make_app();
    assert!(!app.handle_command(AppCommand::TurnOff, 0, &mut hw, &mut sink));
    assert!(hw.calls.is_empty());
    assert!(sink.events.iter().all(|e| !matches!(e, AppEvent::StateChanged { .. })));
}

#[test]
fn turn_off_cancels_warmup_and_handshake() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, 0, &mut hw, &mut sink);
    app.handle_command(AppCommand::TurnOff, 500, &mut hw, &mut sink);

    assert_eq!(app.state(), OperatingState::Off);
    assert!(!app.warmup_pending());
    assert_eq!(app.link_status(), LinkStatus::Unknown);
    assert!(!app.poll_warmup(5_000, &mut hw, &mut sink));

    // A late token is still recorded.
    hw.rx.extend_from_slice(b"CLOUD_OK\n");
    app.drain_serial(&mut hw, &mut sink, 64);
    assert_eq!(app.link_status(), LinkStatus::Connected);
}

// ── Sampling ──────────────────────────────────────────────────

#[test]
fn warmup_holds_state_machine_even_with_gas() {
    let (mut app, mut hw, mut sink) = make_app();
    app.handle_command(AppCommand::TurnOn, 0, &mut hw, &mut sink);
    hw.gas = 800;

    let a = app.sensor_tick(1_000, &mut hw, &mut sink);
    assert!(a.gas_hazard);
    assert_eq!(app.state(), OperatingState::Idle);

    assert!(!app.poll_warmup(1_999, &mut hw, &mut sink));
    assert!(app.poll_warmup(2_000, &mut hw, &mut sink));
    assert_eq!(app.state(), OperatingState::Alert);
}

#[test]
fn tilt_advisory_uses_magenta_and_proximity_tone() {
    let (mut app, mut hw, mut sink) = make_active();
    // atan2(9.81, 9.81) is 45 degrees; a bit more tips it over.
    hw.pitch_accel_y = 10.5;

    let a = app.sensor_tick(3_000, &mut hw, &mut sink);
    assert_eq!(a.dominant, Hazard::Tilt);
    assert_eq!(
        hw.calls,
        vec![
            ActCall::Flash((255, 0, 255)),
            ActCall::Play(TonePattern::Proximity),
            ActCall::Show("TILT WARNING!".into()),
            ActCall::Indicator((0, 255, 0)),
        ]
    );
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::Hazard { dominant: Hazard::Tilt, .. })));
}

#[test]
fn every_sample_refreshes_latest() {
    let (mut app, mut hw, mut sink) = make_app();
    assert!(app.latest_sample().is_none());
    app.sensor_tick(0, &mut hw, &mut sink);
    hw.gas = 333;
    app.sensor_tick(2_000, &mut hw, &mut sink);

    let s = app.latest_sample().unwrap();
    assert_eq!(s.gas_level(), 333);
    assert_eq!(s.distance_cm(), -1, "no echo maps to -1");
    assert_eq!(app.tick_count(), 2);
}

// ── Telemetry / display ───────────────────────────────────────

#[test]
fn telemetry_needs_power_and_a_sample() {
    let (mut app, mut hw, mut sink) = make_app();
    assert!(!app.telemetry_tick(&mut hw, &mut sink), "off");

    app.handle_command(AppCommand::TurnOn, 0, &mut hw, &mut sink);
    assert!(!app.telemetry_tick(&mut hw, &mut sink), "no sample yet");

    app.sensor_tick(100, &mut hw, &mut sink);
    assert!(app.telemetry_tick(&mut hw, &mut sink));
    let line = hw.written.last().unwrap();
    assert!(line.starts_with("24.0,50.0,100,-1,1,"), "unexpected record: {line}");
}

#[test]
fn rotation_only_in_active() {
    let (mut app, mut hw, mut sink) = make_app();
    assert!(!app.rotate_display(&mut hw));

    let (mut app2, mut hw2, _) = make_active();
    assert!(app2.rotate_display(&mut hw2));
    assert_eq!(hw2.calls.len(), 1);

    app.handle_command(AppCommand::TurnOn, 0, &mut hw, &mut sink);
    assert!(!app.rotate_display(&mut hw), "idle keeps the warm-up page");
}

#[test]
fn drain_serial_respects_budget() {
    let (mut app, mut hw, mut sink) = make_app();
    hw.rx.extend_from_slice(b"1.0|2.0|3|4|2|0|0|0\n");
    assert_eq!(app.drain_serial(&mut hw, &mut sink, 5), 5);
    assert!(!app.echo().has_data());

    app.drain_serial(&mut hw, &mut sink, 128);
    assert!(app.echo().has_data());
    assert_eq!(app.echo().gas_level(), 3);
}
