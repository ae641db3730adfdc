//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, forward to a
//! test recorder, etc.

use crate::fsm::OperatingState;
use crate::hazard::{Hazard, HazardFlags};
use crate::telemetry::{LinkStatus, TelemetryRecord};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(OperatingState),

    /// The state machine moved.  Exactly one per non-no-op transition.
    StateChanged { from: OperatingState, to: OperatingState },

    /// A sampling tick classified a hazard.  `flags` holds every
    /// condition that held, not just the dominant one.
    Hazard { dominant: Hazard, flags: HazardFlags },

    /// First hazard-free tick after one or more hazardous ticks.
    HazardCleared,

    /// A telemetry record was written to the collector link.
    Telemetry(TelemetryRecord),

    /// Collector link status changed.
    Cloud(LinkStatus),

    /// An echo record updated the display cache.
    Echo { fields: usize },
}
