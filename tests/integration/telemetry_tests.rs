//! Integration tests for the collector link: outbound records, echo
//! records coming back, and the cloud display page.

use crate::mock_hw::{ActuatorCall, MockBoard, RecordingSink};

use reconuav::app::control_loop::ControlLoop;
use reconuav::app::display::DisplayPage;
use reconuav::app::events::AppEvent;
use reconuav::config::SystemConfig;
use reconuav::fsm::OperatingState;

const POWER_KEY: u32 = 0xBA45_FF00;
const STEP_MS: u64 = 50;

fn run(control: &mut ControlLoop, hw: &mut MockBoard, sink: &mut RecordingSink, from: u64, to: u64) {
    let mut now = from;
    while now < to {
        now = (now + STEP_MS).min(to);
        control.iterate(now, hw, sink);
    }
}

fn powered() -> (ControlLoop, MockBoard, RecordingSink) {
    let mut control = ControlLoop::new(SystemConfig::default());
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    control.start(0, &mut hw, &mut sink);
    hw.press(POWER_KEY);
    run(&mut control, &mut hw, &mut sink, 0, 2_200);
    assert_eq!(control.service().state(), OperatingState::Active);
    (control, hw, sink)
}

#[test]
fn record_written_on_telemetry_interval() {
    let (mut control, mut hw, mut sink) = powered();
    run(&mut control, &mut hw, &mut sink, 2_200, 14_950);
    assert!(hw.records().is_empty());

    run(&mut control, &mut hw, &mut sink, 14_950, 15_000);
    let records = hw.records();
    assert_eq!(records.len(), 1);
    assert!(
        records[0].starts_with("23.5,55.0,120,150,2,"),
        "unexpected record: {}",
        records[0]
    );
    assert_eq!(records[0].split(',').count(), 8);
    assert_eq!(control.service().telemetry_sent(), 1);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 1);
}

#[test]
fn record_carries_alert_state_code() {
    let (mut control, mut hw, mut sink) = powered();
    hw.gas = Ok(512);
    run(&mut control, &mut hw, &mut sink, 2_200, 15_000);

    let records = hw.records();
    let fields: Vec<&str> = records[0].split(',').collect();
    assert_eq!(fields[2], "512");
    assert_eq!(fields[4], "3");
}

#[test]
fn no_records_while_off() {
    let mut control = ControlLoop::new(SystemConfig::default());
    let mut hw = MockBoard::new();
    let mut sink = RecordingSink::new();
    control.start(0, &mut hw, &mut sink);
    run(&mut control, &mut hw, &mut sink, 0, 31_000);

    assert!(hw.sent.is_empty());
    assert_eq!(control.service().telemetry_sent(), 0);
    // Sampling kept going regardless.
    assert_eq!(control.service().tick_count(), 15);
}

#[test]
fn write_failure_is_not_fatal() {
    let (mut control, mut hw, mut sink) = powered();
    hw.fail_writes = true;
    run(&mut control, &mut hw, &mut sink, 2_200, 15_000);
    assert_eq!(control.service().telemetry_sent(), 0);

    hw.fail_writes = false;
    run(&mut control, &mut hw, &mut sink, 15_000, 30_000);
    assert_eq!(control.service().telemetry_sent(), 1);
}

#[test]
fn echo_record_fills_cache() {
    let (mut control, mut hw, mut sink) = powered();
    hw.inject(b"23.5|55.0|120|150|2|1.2|-0.5|10.0\n");
    run(&mut control, &mut hw, &mut sink, 2_200, 2_250);

    let echo = control.service().echo();
    assert!(echo.has_data());
    assert_eq!(echo.gas_level(), 120);
    assert_eq!(echo.distance_cm(), 150);
    assert_eq!(echo.state_code(), 2);
    assert!((echo.roll_deg() + 0.5).abs() < 1e-6);
    assert!(sink.events.contains(&AppEvent::Echo { fields: 8 }));
}

#[test]
fn echo_never_touches_the_state_machine() {
    let (mut control, mut hw, mut sink) = powered();
    // Echoed gas far above threshold, echoed Alert state code.
    hw.inject(b"23.5|55.0|999|150|3|0.0|0.0|0.0\n");
    run(&mut control, &mut hw, &mut sink, 2_200, 6_000);

    assert_eq!(control.service().echo().gas_level(), 999);
    assert_eq!(control.service().state(), OperatingState::Active);
}

#[test]
fn oversized_line_is_dropped_and_link_recovers() {
    let (mut control, mut hw, mut sink) = powered();
    hw.inject(&[b'7'; 300]);
    hw.inject(b"\n21.0|40.0\n");
    run(&mut control, &mut hw, &mut sink, 2_200, 2_400);

    let echo = control.service().echo();
    assert!((echo.temperature_c() - 21.0).abs() < 1e-6);
    assert!((echo.humidity_pct() - 40.0).abs() < 1e-6);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::Echo { .. })), 1);
}

#[test]
fn cloud_page_joins_rotation_after_echo() {
    let (mut control, mut hw, mut sink) = powered();
    hw.inject(b"19.5|40.0|300|80|2|0.0|0.0|0.0\n");

    // Climate -> GasDistance -> Attitude -> Heading -> Cloud.
    run(&mut control, &mut hw, &mut sink, 2_200, 40_000);
    assert_eq!(control.service().page(), DisplayPage::Cloud);
    let cloud_shown = hw.calls.iter().any(|c| match c {
        ActuatorCall::Show(top, bottom) => top == "Cloud T:19.5" && bottom == "Gas:300 S:2",
        _ => false,
    });
    assert!(cloud_shown);
}

#[test]
fn rotation_skips_cloud_page_without_echo() {
    let (mut control, mut hw, mut sink) = powered();
    run(&mut control, &mut hw, &mut sink, 2_200, 50_000);
    // Five rotations from Climate without the cloud page wraps to GasDistance.
    assert_eq!(control.service().page(), DisplayPage::GasDistance);
}
