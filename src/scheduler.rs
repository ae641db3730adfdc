//! Periodic timer engine.
//!
//! Three fixed timers share one monotonic clock read per loop iteration.
//! The scheduler notifies a [`SchedulerDelegate`] when a timer fires; the
//! control loop implements the delegate to push events into its queue.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Timers (ms)                           │
//! │                                                              │
//! │  ┌────────────┐   ┌────────────┐   ┌──────────────────┐      │
//! │  │ SensorTick │   │ Telemetry  │   │ DisplayRotation  │      │
//! │  │   2 000    │   │   15 000   │   │      10 000      │      │
//! │  └─────┬──────┘   └─────┬──────┘   └────────┬─────────┘      │
//! │        ▼                ▼                   ▼                │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  │       (control loop pushes into EventQueue)            │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A timer fires at most once per poll, however late the poll is, and is
//! re-armed relative to the poll time.  Missed periods are not replayed.

use log::{debug, info};

use crate::app::ports::SchedulerDelegate;
use crate::config::SystemConfig;

// ═══════════════════════════════════════════════════════════════
//  Timer identity
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    SensorTick,
    Telemetry,
    DisplayRotation,
}

impl TimerId {
    pub const ALL: [Self; 3] = [Self::SensorTick, Self::Telemetry, Self::DisplayRotation];

    pub fn label(self) -> &'static str {
        match self {
            Self::SensorTick => "sensor-tick",
            Self::Telemetry => "telemetry",
            Self::DisplayRotation => "display-rotation",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PeriodicTimer {
    period_ms: u64,
    due_ms: u64,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// The scheduler engine.
///
/// Decoupled from the event system: when a timer fires it invokes the
/// [`SchedulerDelegate`] callback rather than pushing events itself.
pub struct Scheduler {
    timers: [PeriodicTimer; 3],
    fired_total: u64,
}

impl Scheduler {
    pub fn new(sensor_tick_ms: u64, telemetry_ms: u64, display_rotation_ms: u64) -> Self {
        let timer = |period_ms| PeriodicTimer {
            period_ms,
            due_ms: period_ms,
        };
        Self {
            timers: [timer(sensor_tick_ms), timer(telemetry_ms), timer(display_rotation_ms)],
            fired_total: 0,
        }
    }

    pub fn from_config(config: &SystemConfig) -> Self {
        Self::new(
            u64::from(config.sensor_tick_ms),
            u64::from(config.telemetry_interval_ms),
            u64::from(config.display_rotation_ms),
        )
    }

    /// Arm every timer one period after `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        for (id, t) in TimerId::ALL.into_iter().zip(self.timers.iter_mut()) {
            t.due_ms = now_ms.saturating_add(t.period_ms);
            info!("Scheduler: '{}' every {} ms", id.label(), t.period_ms);
        }
    }

    /// Fire every due timer once, in [`TimerId::ALL`] order.
    pub fn poll(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) -> usize {
        let mut fired = 0;
        for (id, t) in TimerId::ALL.into_iter().zip(self.timers.iter_mut()) {
            if now_ms < t.due_ms {
                continue;
            }
            debug!("Scheduler: '{}' fired at {} ms", id.label(), now_ms);
            t.due_ms = now_ms.saturating_add(t.period_ms);
            delegate.on_timer_fired(id);
            fired += 1;
        }
        self.fired_total += fired as u64;
        fired
    }

    /// Absolute time the timer next fires.
    pub fn due_ms(&self, id: TimerId) -> u64 {
        self.timers[id as usize].due_ms
    }

    pub fn period_ms(&self, id: TimerId) -> u64 {
        self.timers[id as usize].period_ms
    }

    /// Total fires since construction.
    pub fn fired_total(&self) -> u64 {
        self.fired_total
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
