//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (IR remote,
//! host console, test harness) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::fsm::{Command, OperatingState};

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Power on: Off → Idle, warm-up, then Active.  Ignored when already on.
    TurnOn,

    /// Power off from any state.
    TurnOff,

    /// Remote button: TurnOn while Off, TurnOff otherwise.
    Toggle,
}

impl AppCommand {
    /// Resolve to the state-machine command for the current state.
    pub fn resolve(self, current: OperatingState) -> Command {
        match self {
            Self::TurnOn => Command::TurnOn,
            Self::TurnOff => Command::TurnOff,
            Self::Toggle if current.is_on() => Command::TurnOff,
            Self::Toggle => Command::TurnOn,
        }
    }
}
