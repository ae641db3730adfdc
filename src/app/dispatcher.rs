//! Actuation dispatcher.
//!
//! Two independent layers drive the actuators:
//!
//! 1. **State set**: applied once per non-no-op transition.  Motor, steady
//!    indicator colour, state display page and a tone.  A hazard flash
//!    still in progress is cancelled so the new state's colour shows at
//!    once.
//! 2. **Hazard advisory**: applied on every sampling tick that classified
//!    a hazard.  Advisory colour flash, hazard tone, hazard text, then the
//!    steady colour of the current state is restored underneath.  A gas
//!    advisory in Alert leaves the text alone: the Alert page already says
//!    so.
//!
//! The dispatcher remembers only the last state it actuated.

use log::debug;

use super::display::{DisplayLines, DisplayPage, render_hazard};
use super::ports::ActuatorPort;
use crate::drivers::buzzer::TonePattern;
use crate::drivers::indicator::{
    COLOUR_BLIZZARD, COLOUR_FIRE, COLOUR_GAS, COLOUR_HURRICANE, COLOUR_OBSTACLE, COLOUR_OFF,
    COLOUR_TILT, Rgb,
};
use crate::fsm::OperatingState;
use crate::fsm::context::StateActuation;
use crate::hazard::Hazard;
use crate::sensors::Sample;

/// Advisory colour for `hazard`.
pub fn advisory_colour(hazard: Hazard) -> Rgb {
    match hazard {
        Hazard::None => COLOUR_OFF,
        Hazard::Fire => COLOUR_FIRE,
        Hazard::Blizzard => COLOUR_BLIZZARD,
        Hazard::Hurricane => COLOUR_HURRICANE,
        Hazard::Gas => COLOUR_GAS,
        Hazard::Obstacle => COLOUR_OBSTACLE,
        Hazard::Tilt => COLOUR_TILT,
    }
}

/// Environmental hazards get the slow beeps, proximity ones the bursts.
pub fn advisory_tone(hazard: Hazard) -> TonePattern {
    if hazard.is_environmental() {
        TonePattern::Environmental
    } else {
        TonePattern::Proximity
    }
}

pub struct ActuationDispatcher {
    last_actuated: Option<OperatingState>,
}

impl ActuationDispatcher {
    pub fn new() -> Self {
        Self { last_actuated: None }
    }

    pub fn last_actuated(&self) -> Option<OperatingState> {
        self.last_actuated
    }

    /// Boot-time actuation: everything off, standby text, startup tone.
    pub fn power_on_reset(&mut self, state: OperatingState, lines: &DisplayLines, hw: &mut impl ActuatorPort) {
        hw.all_off();
        hw.show(lines);
        hw.play(TonePattern::Startup);
        self.last_actuated = Some(state);
    }

    /// Apply the actuation set of `state`.  Returns `false` without
    /// touching any actuator if `state` is the one last actuated.
    pub fn apply_state(
        &mut self,
        state: OperatingState,
        set: &StateActuation,
        lines: &DisplayLines,
        hw: &mut impl ActuatorPort,
    ) -> bool {
        if self.last_actuated == Some(state) {
            return false;
        }
        debug!("dispatch: state set for {}", state);
        hw.set_motor(set.motor_on);
        hw.clear_flash();
        hw.set_indicator(set.indicator);
        hw.show(lines);
        hw.play(set.tone);
        self.last_actuated = Some(state);
        true
    }

    /// Apply the advisory for one tick's dominant hazard, then restore the
    /// steady colour of `current`.  No-op for [`Hazard::None`].
    pub fn apply_hazard(
        &self,
        hazard: Hazard,
        sample: &Sample,
        current: &StateActuation,
        hw: &mut impl ActuatorPort,
    ) -> bool {
        if hazard == Hazard::None {
            return false;
        }
        let tone = advisory_tone(hazard);
        hw.flash_indicator(advisory_colour(hazard), tone.duration_ms());
        hw.play(tone);
        if !(hazard == Hazard::Gas && current.page == DisplayPage::GasAlert) {
            hw.show(&render_hazard(hazard, sample));
        }
        hw.set_indicator(current.indicator);
        true
    }
}

impl Default for ActuationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
