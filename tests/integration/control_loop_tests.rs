//! Integration tests for the remote → loop → FSM → actuators pipeline.
//!
//! These run on the host (x86_64) and drive [`ControlLoop::iterate`] with
//! a simulated clock, exactly the way the firmware main loop does.

use crate::mock_hw::{ActuatorCall, Collector, MockBoard, RecordingSink};

use reconuav::app::control_loop::ControlLoop;
use reconuav::app::events::AppEvent;
use reconuav::config::SystemConfig;
use reconuav::drivers::buzzer::TonePattern;
use reconuav::drivers::indicator::{
    COLOUR_ACTIVE, COLOUR_ALERT, COLOUR_ERROR, COLOUR_IDLE, COLOUR_OBSTACLE, COLOUR_OFF,
};
use reconuav::error::SensorError;
use reconuav::fsm::OperatingState;
use reconuav::hazard::Hazard;
use reconuav::scheduler::TimerId;
use reconuav::telemetry::LinkStatus;

const POWER_KEY: u32 = 0xBA45_FF00;
/// Main-loop period used by the simulated clock.
const STEP_MS: u64 = 50;

struct Rig {
    control: ControlLoop,
    hw: MockBoard,
    sink: RecordingSink,
    now: u64,
}

impl Rig {
    fn new(config: SystemConfig, hw: MockBoard) -> Self {
        let mut rig = Self {
            control: ControlLoop::new(config),
            hw,
            sink: RecordingSink::new(),
            now: 0,
        };
        rig.control.start(0, &mut rig.hw, &mut rig.sink);
        rig
    }

    fn with_defaults() -> Self {
        Self::new(SystemConfig::default(), MockBoard::new())
    }

    /// Iterate the loop until `until_ms` (inclusive).
    fn run_until(&mut self, until_ms: u64) {
        while self.now < until_ms {
            self.now = (self.now + STEP_MS).min(until_ms);
            self.control.iterate(self.now, &mut self.hw, &mut self.sink);
        }
    }

    fn press_power(&mut self) {
        self.hw.press(POWER_KEY);
        self.run_until(self.now + STEP_MS);
    }

    fn state(&self) -> OperatingState {
        self.control.service().state()
    }

    /// Power on and wait out the warm-up.
    fn powered_and_warm() -> Self {
        let mut rig = Self::with_defaults();
        rig.press_power();
        rig.run_until(2_200);
        assert_eq!(rig.state(), OperatingState::Active);
        rig
    }
}

// ── Power-on / warm-up ────────────────────────────────────────

#[test]
fn boot_puts_everything_in_safe_state() {
    let rig = Rig::with_defaults();

    assert_eq!(rig.state(), OperatingState::Off);
    assert_eq!(rig.hw.calls.first(), Some(&ActuatorCall::AllOff));
    assert_eq!(rig.hw.last_shown(), Some(("UAV OFF", "Standby Mode")));
    assert_eq!(rig.hw.tones(), vec![TonePattern::Startup]);
    assert!(matches!(rig.sink.events[0], AppEvent::Started(OperatingState::Off)));
}

#[test]
fn power_key_enters_idle_then_active_after_warmup() {
    let mut rig = Rig::with_defaults();
    rig.press_power();

    assert_eq!(rig.state(), OperatingState::Idle);
    assert!(rig.hw.motor_on());
    assert_eq!(rig.hw.indicator(), Some(COLOUR_IDLE));
    assert_eq!(rig.hw.last_shown(), Some(("UAV ACTIVE", "Warming up...")));
    assert!(rig.control.service().warmup_pending());

    // Sampling at 2 000 ms happens while the warm-up hold is still on.
    rig.run_until(2_000);
    assert_eq!(rig.state(), OperatingState::Idle);
    assert_eq!(rig.control.service().tick_count(), 1);

    rig.run_until(2_200);
    assert_eq!(rig.state(), OperatingState::Active);
    assert!(!rig.control.service().warmup_pending());
    assert_eq!(rig.hw.indicator(), Some(COLOUR_ACTIVE));
    assert_eq!(
        rig.sink.state_changes(),
        vec![
            (OperatingState::Off, OperatingState::Idle),
            (OperatingState::Idle, OperatingState::Active),
        ]
    );
}

#[test]
fn warmup_does_not_block_the_loop() {
    let mut rig = Rig::with_defaults();
    rig.press_power();
    let before = rig.control.iterations();
    rig.run_until(1_000);

    // Every 50 ms step still ran a full iteration.
    assert_eq!(rig.control.iterations() - before, (1_000 - STEP_MS) / STEP_MS);
    assert_eq!(rig.state(), OperatingState::Idle);
}

#[test]
fn second_power_press_turns_off() {
    let mut rig = Rig::powered_and_warm();
    rig.press_power();

    assert_eq!(rig.state(), OperatingState::Off);
    assert!(!rig.hw.motor_on());
    assert_eq!(rig.hw.last_shown(), Some(("UAV OFF", "Standby Mode")));
}

#[test]
fn remote_repeat_frames_are_ignored() {
    let mut rig = Rig::with_defaults();
    rig.hw.hold(POWER_KEY);
    rig.run_until(STEP_MS);

    assert_eq!(rig.state(), OperatingState::Off);
    assert!(rig.sink.state_changes().is_empty());
}

// ── Gas alert ─────────────────────────────────────────────────

#[test]
fn gas_at_threshold_raises_alert_and_clears_back_to_active() {
    let mut rig = Rig::powered_and_warm();

    rig.hw.gas = Ok(460);
    rig.run_until(4_000);
    assert_eq!(rig.state(), OperatingState::Alert);
    // The gas advisory flashes and beeps but leaves the Alert page up.
    assert_eq!(rig.hw.last_shown(), Some(("!!! ALERT !!!", "GAS DETECTED!")));
    assert!(rig.hw.calls.contains(&ActuatorCall::Flash(
        reconuav::drivers::indicator::COLOUR_GAS,
        TonePattern::Environmental.duration_ms()
    )));
    assert_eq!(rig.hw.indicator(), Some(COLOUR_ALERT));
    assert!(rig.hw.motor_on());
    assert!(rig.hw.tones().contains(&TonePattern::Environmental));

    rig.hw.gas = Ok(459);
    rig.run_until(6_000);
    assert_eq!(rig.state(), OperatingState::Active);
    assert_eq!(rig.hw.indicator(), Some(COLOUR_ACTIVE));
    assert!(
        rig.sink.events.contains(&AppEvent::HazardCleared),
        "clearing the gas hazard should be reported"
    );
}

#[test]
fn gas_during_warmup_goes_straight_to_alert() {
    let mut rig = Rig::with_defaults();
    rig.hw.gas = Ok(700);
    rig.press_power();
    rig.run_until(2_200);

    assert_eq!(rig.state(), OperatingState::Alert);
    assert_eq!(
        rig.sink.state_changes().last(),
        Some(&(OperatingState::Idle, OperatingState::Alert))
    );
}

// ── Dispatch ──────────────────────────────────────────────────

#[test]
fn steady_ticks_make_no_actuator_calls() {
    let mut rig = Rig::powered_and_warm();
    rig.hw.clear_calls();

    // Sampling at 4 000, 6 000 and 8 000 ms; rotation is not due yet.
    rig.run_until(9_000);
    assert_eq!(rig.control.service().tick_count(), 4);
    assert!(rig.hw.calls.is_empty(), "unexpected calls: {:?}", rig.hw.calls);
}

#[test]
fn obstacle_advisory_flashes_then_restores_state_colour() {
    let mut rig = Rig::powered_and_warm();
    rig.hw.clear_calls();

    rig.hw.echo = Ok(Some(176));
    rig.run_until(4_000);

    let hold = TonePattern::Proximity.duration_ms();
    assert_eq!(
        rig.hw.calls,
        vec![
            ActuatorCall::Flash(COLOUR_OBSTACLE, hold),
            ActuatorCall::Play(TonePattern::Proximity),
            ActuatorCall::Show("OBSTACLE!".into(), "Dist:2 cm".into()),
            ActuatorCall::Indicator(COLOUR_ACTIVE),
        ]
    );
    assert_eq!(rig.state(), OperatingState::Active, "only gas drives the state");

    rig.hw.echo = Ok(Some(crate::mock_hw::ECHO_150_CM_US));
    rig.hw.clear_calls();
    rig.run_until(6_000);
    assert_eq!(rig.hw.calls.len(), 1, "clearing re-shows the state page once");
    assert!(matches!(rig.hw.calls[0], ActuatorCall::Show(..)));
}

#[test]
fn power_off_during_obstacle_flash_goes_dark_at_once() {
    let mut rig = Rig::powered_and_warm();
    rig.hw.echo = Ok(Some(200));
    rig.run_until(4_000);
    assert_eq!(rig.hw.lit(), COLOUR_OBSTACLE, "flash still held");

    rig.press_power();
    assert_eq!(rig.state(), OperatingState::Off);
    assert_eq!(rig.hw.lit(), COLOUR_OFF);
    assert!(rig.hw.calls.contains(&ActuatorCall::ClearFlash));
}

#[test]
fn error_entry_cancels_running_flash() {
    let config = SystemConfig {
        error_on_critical_sensor_fault: true,
        ..SystemConfig::default()
    };
    let mut hw = MockBoard::new();
    climate_dead(&mut hw);
    hw.echo = Ok(Some(200));
    let mut rig = Rig::new(config, hw);
    rig.press_power();

    // Idle still advises; the warm-up ends 50 ms into the obstacle flash.
    rig.run_until(2_000);
    assert_eq!(rig.state(), OperatingState::Idle);
    assert_eq!(rig.hw.lit(), COLOUR_OBSTACLE);

    rig.run_until(2_050);
    assert_eq!(rig.state(), OperatingState::Error);
    assert_eq!(rig.hw.lit(), COLOUR_ERROR);
}

#[test]
fn advisories_are_suppressed_while_off() {
    let mut rig = Rig::with_defaults();
    rig.hw.temperature = Ok(35.0);
    rig.hw.clear_calls();
    rig.run_until(4_000);

    assert_eq!(rig.control.service().tick_count(), 2);
    assert_eq!(rig.control.service().last_assessment().map(|a| a.dominant), Some(Hazard::Fire));
    assert!(rig.hw.calls.is_empty());
}

#[test]
fn display_rotates_only_while_active() {
    let mut rig = Rig::powered_and_warm();
    rig.run_until(10_000);
    assert_eq!(rig.hw.last_shown().map(|(top, _)| top.starts_with("Gas:")), Some(true));

    rig.hw.gas = Ok(900);
    rig.run_until(12_000);
    assert_eq!(rig.state(), OperatingState::Alert);
    let shown = rig.hw.calls.len();
    // Rotation fires again at 20 000 but Alert keeps its page.
    rig.run_until(20_000);
    assert_eq!(rig.control.scheduler().due_ms(TimerId::DisplayRotation), 30_000);
    assert!(rig.hw.calls[shown..]
        .iter()
        .all(|c| !matches!(c, ActuatorCall::Show(top, _) if top.starts_with("Pitch"))));
}

// ── Error policy ──────────────────────────────────────────────

fn climate_dead(hw: &mut MockBoard) {
    hw.temperature = Err(SensorError::Timeout);
    hw.humidity = Err(SensorError::Timeout);
}

#[test]
fn critical_fault_is_ignored_when_policy_off() {
    let mut hw = MockBoard::new();
    climate_dead(&mut hw);
    let mut rig = Rig::new(SystemConfig::default(), hw);
    rig.press_power();
    rig.run_until(4_000);

    assert_eq!(rig.state(), OperatingState::Active);
    assert_ne!(rig.control.service().faulted_channels(), 0);
}

#[test]
fn critical_fault_enters_error_when_policy_on() {
    let config = SystemConfig {
        error_on_critical_sensor_fault: true,
        ..SystemConfig::default()
    };
    let mut hw = MockBoard::new();
    climate_dead(&mut hw);
    let mut rig = Rig::new(config, hw);
    rig.press_power();
    rig.run_until(2_200);

    assert_eq!(rig.state(), OperatingState::Error);
    assert!(!rig.hw.motor_on());
    assert_eq!(rig.hw.indicator(), Some(COLOUR_ERROR));

    // No automatic recovery.
    rig.hw.temperature = Ok(23.5);
    rig.hw.humidity = Ok(55.0);
    rig.run_until(6_000);
    assert_eq!(rig.state(), OperatingState::Error);

    rig.press_power();
    assert_eq!(rig.state(), OperatingState::Off);
}

// ── Cloud handshake ───────────────────────────────────────────

#[test]
fn handshake_accepted() {
    let mut rig = Rig::with_defaults();
    rig.press_power();
    assert_eq!(rig.hw.sent.first().map(String::as_str), Some("CLOUD_CONNECT"));

    rig.run_until(200);
    assert_eq!(rig.control.service().link_status(), LinkStatus::Connected);
    assert!(rig.sink.events.contains(&AppEvent::Cloud(LinkStatus::Connected)));
}

#[test]
fn handshake_refused() {
    let mut rig = Rig::new(SystemConfig::default(), MockBoard::new().with_collector(Collector::Refuse));
    rig.press_power();
    rig.run_until(200);
    assert_eq!(rig.control.service().link_status(), LinkStatus::NotConnected);
}

#[test]
fn silent_collector_times_out_without_stalling() {
    let mut rig = Rig::new(SystemConfig::default(), MockBoard::new().with_collector(Collector::Silent));
    rig.press_power();

    rig.run_until(5_000);
    assert_eq!(rig.control.service().link_status(), LinkStatus::Pending);
    // Warm-up finished long before the handshake deadline.
    assert_eq!(rig.state(), OperatingState::Active);

    rig.run_until(5_200);
    assert_eq!(rig.control.service().link_status(), LinkStatus::NotConnected);
    assert_eq!(
        rig.sink.count(|e| *e == AppEvent::Cloud(LinkStatus::NotConnected)),
        1
    );
}

#[test]
fn failed_handshake_write_reports_not_connected() {
    let mut hw = MockBoard::new();
    hw.fail_writes = true;
    let mut rig = Rig::new(SystemConfig::default(), hw);
    rig.press_power();

    assert_eq!(rig.state(), OperatingState::Idle);
    assert!(rig.sink.events.contains(&AppEvent::Cloud(LinkStatus::NotConnected)));
}
