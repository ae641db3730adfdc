//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!   OFF ──[TurnOn]──▶ IDLE ──[warm-up elapsed]──▶ ACTIVE ◀──[gas clear]──┐
//!    ▲                  │                           │                   │
//!    │                  └──────[gas]──────┐      [gas]                  │
//!    │                                    ▼         ▼                   │
//!    │                                  ALERT ◀─────┘───────────────────┘
//!    │
//!    └──[TurnOff]── any state
//!
//!  IDLE / ACTIVE / ALERT ──[critical sensor fault, policy on]──▶ ERROR
//! ```
//!
//! Rules are pure: they read a [`TransitionInput`] and name the next
//! state.  Enter/exit handlers only write the actuation set into the
//! context; the dispatcher turns it into port calls.

use log::{info, warn};

use super::context::{FsmContext, StateActuation};
use super::{Command, OperatingState, StateDescriptor, StateRuleFn, TransitionInput};
use crate::app::display::DisplayPage;
use crate::drivers::buzzer::TonePattern;
use crate::drivers::indicator::{COLOUR_ACTIVE, COLOUR_ALERT, COLOUR_ERROR, COLOUR_IDLE};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; OperatingState::COUNT] {
    [
        // Index 0: Off
        StateDescriptor {
            id: OperatingState::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_exit: None,
            rule: off_rule,
        },
        // Index 1: Idle
        StateDescriptor {
            id: OperatingState::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            rule: powered_rule,
        },
        // Index 2: Active
        StateDescriptor {
            id: OperatingState::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: None,
            rule: powered_rule,
        },
        // Index 3: Alert
        StateDescriptor {
            id: OperatingState::Alert,
            name: "Alert",
            on_enter: Some(alert_enter),
            on_exit: Some(alert_exit),
            rule: powered_rule,
        },
        // Index 4: Error
        StateDescriptor {
            id: OperatingState::Error,
            name: "Error",
            on_enter: Some(error_enter),
            on_exit: None,
            rule: error_rule,
        },
    ]
}

/// Rule for `state`, without building the whole table.
pub fn rule_for(state: OperatingState) -> StateRuleFn {
    match state {
        OperatingState::Off => off_rule,
        OperatingState::Idle | OperatingState::Active | OperatingState::Alert => powered_rule,
        OperatingState::Error => error_rule,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF: motor stopped, standby page
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut FsmContext) {
    ctx.commands = StateActuation::all_off();
    info!("OFF: motor stopped, standby");
}

/// Only an explicit command leaves Off; sensors are ignored.
fn off_rule(input: &TransitionInput) -> Option<OperatingState> {
    match input.command {
        Some(Command::TurnOn) => Some(OperatingState::Idle),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE: motor spinning up, held for the warm-up delay
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut FsmContext) {
    ctx.commands = StateActuation {
        motor_on: true,
        indicator: COLOUR_IDLE,
        page: DisplayPage::WarmingUp,
        tone: TonePattern::StateChange,
    };
    info!("IDLE: motor on, warming up");
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE: collecting data, sensor pages rotating
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut FsmContext) {
    ctx.commands = StateActuation {
        motor_on: true,
        indicator: COLOUR_ACTIVE,
        page: DisplayPage::Climate,
        tone: TonePattern::StateChange,
    };
    info!("ACTIVE: collecting data");
}

// ═══════════════════════════════════════════════════════════════════════════
//  ALERT: hazardous gas level
// ═══════════════════════════════════════════════════════════════════════════

fn alert_enter(ctx: &mut FsmContext) {
    ctx.commands = StateActuation {
        motor_on: true,
        indicator: COLOUR_ALERT,
        page: DisplayPage::GasAlert,
        tone: TonePattern::Environmental,
    };
    warn!("ALERT: hazardous gas level");
}

fn alert_exit(_ctx: &mut FsmContext) {
    info!("ALERT: gas level back below threshold");
}

/// Shared by Idle, Active and Alert.  Hazard clearing always lands in
/// Active; returning `Active` from Active is a no-op in the engine.
fn powered_rule(input: &TransitionInput) -> Option<OperatingState> {
    match input.command {
        Some(Command::TurnOff) => return Some(OperatingState::Off),
        // Already on: a second TurnOn must not restart the warm-up.
        Some(Command::TurnOn) => return None,
        None => {}
    }
    if input.critical_fault {
        Some(OperatingState::Error)
    } else if input.gas_hazard {
        Some(OperatingState::Alert)
    } else {
        Some(OperatingState::Active)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ERROR: critical sensors down, motor stopped
// ═══════════════════════════════════════════════════════════════════════════

fn error_enter(ctx: &mut FsmContext) {
    ctx.commands = StateActuation {
        motor_on: false,
        indicator: COLOUR_ERROR,
        page: DisplayPage::SensorError,
        tone: TonePattern::StateChange,
    };
    warn!("ERROR: temperature and humidity both failed, motor stopped");
}

/// No automatic recovery; only an operator TurnOff leaves Error.
fn error_rule(input: &TransitionInput) -> Option<OperatingState> {
    match input.command {
        Some(Command::TurnOff) => Some(OperatingState::Off),
        _ => None,
    }
}
