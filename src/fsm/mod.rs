//! Function-pointer finite state machine engine.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  StateTable                                                 │
//! │  ┌────────┬───────────┬──────────┬───────────────────────┐  │
//! │  │ State  │ on_enter  │ on_exit  │ rule                  │  │
//! │  ├────────┼───────────┼──────────┼───────────────────────┤  │
//! │  │ Off    │ fn(ctx)   │ —        │ fn(input)->Option<>   │  │
//! │  │ Idle   │ fn(ctx)   │ —        │ fn(input)->Option<>   │  │
//! │  │ Active │ fn(ctx)   │ —        │ fn(input)->Option<>   │  │
//! │  │ Alert  │ fn(ctx)   │ fn(ctx)  │ fn(input)->Option<>   │  │
//! │  │ Error  │ fn(ctx)   │ —        │ fn(input)->Option<>   │  │
//! │  └────────┴───────────┴──────────┴───────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each step the engine evaluates the current state's pure `rule` against a
//! [`TransitionInput`].  If it names a different state, the engine runs
//! `on_exit` for the current state, then `on_enter` for the next, which
//! writes the new state's actuation set into [`FsmContext`].  A rule that
//! names the current state (or nothing) is a no-op: no handlers run and no
//! [`Transition`] is reported.
//!
//! The engine is the only place the current [`OperatingState`] lives.

pub mod context;
pub mod states;

use core::fmt;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all operating states.  The discriminant is the integer
/// carried in the telemetry record's state field.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperatingState {
    Off = 0,
    Idle = 1,
    Active = 2,
    Alert = 3,
    Error = 4,
}

impl OperatingState {
    /// Total number of states, used to size the table array.
    pub const COUNT: usize = 5;

    /// Convert a table index back to a state.  Panics on out-of-range in
    /// debug builds; returns `Error` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Off,
            1 => Self::Idle,
            2 => Self::Active,
            3 => Self::Alert,
            4 => Self::Error,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Error
            }
        }
    }

    /// Wire code, as emitted in telemetry.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Motor running / vehicle powered.
    pub fn is_on(self) -> bool {
        self != Self::Off
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "Off",
            Self::Idle => "Idle",
            Self::Active => "Active",
            Self::Alert => "Alert",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Explicit operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TurnOn,
    TurnOff,
}

/// Everything a transition rule may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionInput {
    pub command: Option<Command>,
    /// Gas at or above threshold in the current sample.
    pub gas_hazard: bool,
    /// Both critical sensors failed *and* the policy flag is enabled.
    pub critical_fault: bool,
}

impl TransitionInput {
    pub fn command(command: Command) -> Self {
        Self {
            command: Some(command),
            ..Self::default()
        }
    }

    pub fn sensors(gas_hazard: bool, critical_fault: bool) -> Self {
        Self {
            command: None,
            gas_hazard,
            critical_fault,
        }
    }
}

/// A non-no-op state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: OperatingState,
    pub to: OperatingState,
}

/// Pure transition function over the rule table, without policy faults.
pub fn transition(current: OperatingState, command: Option<Command>, gas_hazard: bool) -> OperatingState {
    transition_with(
        current,
        &TransitionInput {
            command,
            gas_hazard,
            critical_fault: false,
        },
    )
}

/// Pure transition function over the rule table.
pub fn transition_with(current: OperatingState, input: &TransitionInput) -> OperatingState {
    (states::rule_for(current))(input).unwrap_or(current)
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut FsmContext);

/// Signature for the pure transition rule.
/// Returns `Some(next)` to request a transition, or `None` to stay.
pub type StateRuleFn = fn(&TransitionInput) -> Option<OperatingState>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: OperatingState,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub rule: StateRuleFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `OperatingState as usize`.
    table: [StateDescriptor; OperatingState::COUNT],
    /// Index of the currently active state.
    current: usize,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; OperatingState::COUNT], initial: OperatingState) -> Self {
        Self {
            table,
            current: initial as usize,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `step()`.
    pub fn start(&mut self, ctx: &mut FsmContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Evaluate the current state's rule and apply the result.
    pub fn step(&mut self, input: &TransitionInput, ctx: &mut FsmContext) -> Option<Transition> {
        let next = (self.table[self.current].rule)(input)?;
        self.force_transition(next, ctx)
    }

    /// Jump straight to `next`, running exit/enter handlers unless it is
    /// already the current state.
    pub fn force_transition(&mut self, next: OperatingState, ctx: &mut FsmContext) -> Option<Transition> {
        if next as usize == self.current {
            return None;
        }
        let from = self.current_state();
        self.transition(next, ctx);
        Some(Transition { from, to: next })
    }

    /// The current state's identity.
    pub fn current_state(&self) -> OperatingState {
        OperatingState::from_index(self.current)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next: OperatingState, ctx: &mut FsmContext) {
        let next_idx = next as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
