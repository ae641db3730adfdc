//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` is the blackboard state handlers write to: the actuation
//! set of the state just entered, plus step counters.  The service reads
//! the set after a transition and hands it to the dispatcher.

use crate::app::display::DisplayPage;
use crate::drivers::buzzer::TonePattern;
use crate::drivers::indicator::{COLOUR_OFF, Rgb};

// ---------------------------------------------------------------------------
// Actuation set (written by on_enter; consumed by the dispatcher)
// ---------------------------------------------------------------------------

/// Everything a state asks of the actuators when it is entered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateActuation {
    pub motor_on: bool,
    /// Steady indicator colour for the state.
    pub indicator: Rgb,
    pub page: DisplayPage,
    pub tone: TonePattern,
}

impl Default for StateActuation {
    fn default() -> Self {
        Self::all_off()
    }
}

impl StateActuation {
    /// Motor stopped, indicator dark.
    pub fn all_off() -> Self {
        Self {
            motor_on: false,
            indicator: COLOUR_OFF,
            page: DisplayPage::Standby,
            tone: TonePattern::StateChange,
        }
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

pub struct FsmContext {
    /// Actuation set of the current state.
    pub commands: StateActuation,
}

impl FsmContext {
    pub fn new() -> Self {
        Self {
            commands: StateActuation::all_off(),
        }
    }
}

impl Default for FsmContext {
    fn default() -> Self {
        Self::new()
    }
}
