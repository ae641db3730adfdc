//! Recon UAV Firmware: Main Entry Point
//!
//! Hexagonal architecture with a cooperative, non-blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter              LogEventSink    MonotonicClock   │
//! │  (Sensor+Actuator+Remote)     (EventSink)     (time base)      │
//! │  UartLink / SimCollector                                       │
//! │  (SerialPort)                                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Hub · Classifier · FSM · Dispatcher · CloudLink       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  ControlLoop: Scheduler (delegate-driven) · EventQueue         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ESP-IDF build (`--features espidf`) talks to the real board.  The
//! host build runs the same loop against simulated sensors and a
//! stdout collector, following a short scripted mission.

use std::time::Duration;

use anyhow::Result;
use log::info;

use reconuav::adapters::hardware::{ActuatorSet, HardwareAdapter, SensorSet};
use reconuav::adapters::log_sink::LogEventSink;
use reconuav::adapters::time::MonotonicClock;
use reconuav::app::control_loop::ControlLoop;
use reconuav::app::ports::SerialPort;
use reconuav::config::SystemConfig;
use reconuav::drivers::hw_init;

fn banner() {
    info!("╔══════════════════════════════════════╗");
    info!("║  Recon UAV v{:<25}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
}

/// Boot the hardware layer and build the loop.  Shared by both targets.
fn boot<S: SerialPort>(config: SystemConfig, serial: S) -> Result<(ControlLoop, HardwareAdapter<S>)> {
    // ── 2. Peripherals ─────────────────────────────────────────
    hw_init::init_peripherals()?;
    if let Err(e) = hw_init::init_isr_service() {
        log::error!("ISR service init failed: {}, continuing without remote", e);
    }

    // ── 3. Drivers + adapter ───────────────────────────────────
    let sensors = SensorSet::on_board(&config);
    let actuators = ActuatorSet::on_board();
    let hw = HardwareAdapter::new(sensors, actuators, serial);

    // ── 4. Application core ────────────────────────────────────
    Ok((ControlLoop::new(config), hw))
}

// ── ESP-IDF target ────────────────────────────────────────────

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use reconuav::adapters::serial::UartLink;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    banner();

    let config = SystemConfig::default();
    config.validate().map_err(|e| anyhow::anyhow!("config: {e}"))?;
    let delay = Duration::from_millis(u64::from(config.stability_delay_ms));

    let (mut control, mut hw) = boot(config, UartLink::new())?;
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    control.start(clock.now_ms(), &mut hw, &mut sink);

    // ── 5. Main loop ──────────────────────────────────────────
    info!("Entering main loop");
    loop {
        control.iterate(clock.now_ms(), &mut hw, &mut sink);
        std::thread::sleep(delay);
    }
}

// ── Host simulation ───────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use reconuav::adapters::serial::{HandshakeReply, SimCollector};

    // ── 1. Logger + config ────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    banner();

    let config = match std::env::var("RECON_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            let config = SystemConfig::from_json(&json).map_err(|e| anyhow::anyhow!("{path}: {e}"))?;
            info!("Config loaded from {}", path);
            config
        }
        Err(_) => {
            info!("RECON_CONFIG not set, using defaults");
            SystemConfig::default()
        }
    };
    let delay = Duration::from_millis(u64::from(config.stability_delay_ms));

    let (mut control, mut hw) = boot(config, SimCollector::new(HandshakeReply::Accept))?;
    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut mission = sim::Mission::new();
    control.start(clock.now_ms(), &mut hw, &mut sink);

    // ── 5. Main loop ──────────────────────────────────────────
    info!("Entering main loop (simulated mission, {} s)", sim::MISSION_END_MS / 1_000);
    loop {
        let now = clock.now_ms();
        if !mission.advance(now) {
            break;
        }
        control.iterate(now, &mut hw, &mut sink);
        std::thread::sleep(delay);
    }
    info!(
        "Mission complete: {} iterations, {} telemetry records",
        control.iterations(),
        control.service().telemetry_sent()
    );
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    //! Scripted environment for the host build.

    use log::info;

    use reconuav::drivers::remote::sim_press;
    use reconuav::sensors::climate::{sim_fail_climate, sim_set_climate};
    use reconuav::sensors::gas::sim_set_gas_adc;
    use reconuav::sensors::imu::{MotionReading, sim_fail_imu, sim_set_motion};
    use reconuav::sensors::rangefinder::sim_set_echo_us;

    /// NEC code of the power key on the stock remote.
    const POWER_KEY: u32 = 0xBA45_FF00;
    pub const MISSION_END_MS: u64 = 70_000;

    /// Level flight, accelerometer reading 1 g on z.
    fn level() -> MotionReading {
        MotionReading {
            accel_mps2: [0.0, 0.0, 9.81],
            gyro_z_rad_s: 0.0,
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum Step {
        PowerKey,
        Calm,
        GasLeak,
        GasClear,
        Obstacle,
        Bank,
        Heatwave,
        SensorDropout,
        SensorRestore,
    }

    const SCRIPT: [(u64, Step); 11] = [
        (0, Step::Calm),
        (1_000, Step::PowerKey),
        (16_000, Step::GasLeak),
        (26_000, Step::GasClear),
        (32_000, Step::Obstacle),
        (38_000, Step::Bank),
        (44_000, Step::Calm),
        (50_000, Step::Heatwave),
        (56_000, Step::SensorDropout),
        (60_000, Step::SensorRestore),
        (64_000, Step::PowerKey),
    ];

    pub struct Mission {
        next: usize,
    }

    impl Mission {
        pub fn new() -> Self {
            Self { next: 0 }
        }

        /// Apply every step that is due.  `false` once the mission is over.
        pub fn advance(&mut self, now_ms: u64) -> bool {
            while let Some(&(at, step)) = SCRIPT.get(self.next) {
                if now_ms < at {
                    break;
                }
                info!("sim: {:?} at {} ms", step, now_ms);
                apply(step);
                self.next += 1;
            }
            now_ms < MISSION_END_MS
        }
    }

    fn apply(step: Step) {
        match step {
            Step::PowerKey => sim_press(POWER_KEY),
            Step::Calm => {
                sim_set_climate(24.0, 55.0);
                sim_set_gas_adc(480);
                sim_set_echo_us(8_800);
                sim_set_motion(level());
            }
            // 2 400 raw counts is 600 on the 10-bit scale.
            Step::GasLeak => sim_set_gas_adc(2_400),
            Step::GasClear => sim_set_gas_adc(480),
            // 200 µs round trip is 3 cm.
            Step::Obstacle => sim_set_echo_us(200),
            Step::Bank => {
                sim_set_echo_us(8_800);
                sim_set_motion(MotionReading {
                    accel_mps2: [0.0, 7.5, 6.3],
                    gyro_z_rad_s: 0.2,
                });
            }
            Step::Heatwave => sim_set_climate(34.5, 30.0),
            // Climate and inertial reads fail; their channels go to sentinels.
            Step::SensorDropout => {
                sim_fail_climate(true);
                sim_fail_imu(true);
            }
            Step::SensorRestore => {
                sim_fail_climate(false);
                sim_fail_imu(false);
            }
        }
    }
}
