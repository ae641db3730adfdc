//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (ESP-IDF logger on the board, env_logger on host).
//! A future radio adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::telemetry::LinkStatus;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::Hazard { dominant, flags } => {
                warn!("HAZARD | {} | flags=0b{:08b}", dominant, flags.bits());
            }
            AppEvent::HazardCleared => {
                info!("HAZARD | cleared");
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | state={} | T={:.1}\u{00b0}C H={:.1}% | gas={} dist={}cm | \
                     P={:.1} R={:.1} Y={:.1}",
                    t.state, t.temperature_c, t.humidity_pct, t.gas_level, t.distance_cm, t.pitch_deg, t.roll_deg, t.yaw_deg,
                );
            }
            AppEvent::Cloud(status @ LinkStatus::NotConnected) => {
                warn!("CLOUD | {}", status.name());
            }
            AppEvent::Cloud(status) => {
                info!("CLOUD | {}", status.name());
            }
            AppEvent::Echo { fields } => {
                info!("ECHO | {} fields updated", fields);
            }
        }
    }
}
