//! Hazard classifier.
//!
//! Pure function of one [`Sample`]: strict descending priority, first
//! match wins.
//!
//! ```text
//!   Fire ▶ Blizzard ▶ Hurricane ▶ Gas ▶ Obstacle ▶ Tilt ▶ None
//! ```
//!
//! Alongside the dominant classification the classifier can report every
//! condition that is currently true as a [`HazardFlags`] bitmask (no
//! short-circuit).  Only [`HazardClassifier::is_hazardous_gas`] feeds the
//! state machine; every other hazard is advisory.
//!
//! Sentinel readings never raise a hazard.

use core::fmt;

use log::{info, warn};

use crate::config::SystemConfig;
use crate::sensors::Sample;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Hazard {
    #[default]
    None = 0,
    Fire = 1,
    Blizzard = 2,
    Hurricane = 3,
    Gas = 4,
    Obstacle = 5,
    Tilt = 6,
}

impl Hazard {
    /// Every real hazard, highest priority first.
    pub const PRIORITY: [Self; 6] = [
        Self::Fire,
        Self::Blizzard,
        Self::Hurricane,
        Self::Gas,
        Self::Obstacle,
        Self::Tilt,
    ];

    /// Bit position in [`HazardFlags`]; `None` has no bit.
    pub const fn mask(self) -> u8 {
        match self {
            Self::None => 0,
            other => 1 << (other as u8 - 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Fire => "fire",
            Self::Blizzard => "blizzard",
            Self::Hurricane => "hurricane",
            Self::Gas => "gas",
            Self::Obstacle => "obstacle",
            Self::Tilt => "tilt",
        }
    }

    /// Atmospheric hazards, as opposed to proximity / attitude ones.
    pub fn is_environmental(self) -> bool {
        matches!(self, Self::Fire | Self::Blizzard | Self::Hurricane | Self::Gas)
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Every hazard condition that holds for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HazardFlags(u8);

impl HazardFlags {
    pub const EMPTY: Self = Self(0);

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, hazard: Hazard) -> bool {
        hazard != Hazard::None && self.0 & hazard.mask() != 0
    }

    pub fn insert(&mut self, hazard: Hazard) {
        self.0 |= hazard.mask();
    }

    /// Highest-priority member, or `None` when empty.
    pub fn dominant(self) -> Hazard {
        Hazard::PRIORITY
            .into_iter()
            .find(|h| self.contains(*h))
            .unwrap_or(Hazard::None)
    }

    pub fn iter(self) -> impl Iterator<Item = Hazard> {
        Hazard::PRIORITY.into_iter().filter(move |h| self.contains(*h))
    }
}

/// Result of one evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assessment {
    pub dominant: Hazard,
    pub flags: HazardFlags,
    pub gas_hazard: bool,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct HazardClassifier {
    fire_c: f32,
    blizzard_c: f32,
    humidity_min: f32,
    humidity_max: f32,
    gas_threshold: i32,
    obstacle_cm: i32,
    tilt_deg: f32,
    /// Conditions active on the previous evaluation, for edge logging.
    active: HazardFlags,
}

impl HazardClassifier {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            fire_c: config.fire_temperature_c,
            blizzard_c: config.blizzard_temperature_c,
            humidity_min: config.hurricane_humidity_min_pct,
            humidity_max: config.hurricane_humidity_max_pct,
            gas_threshold: i32::from(config.gas_threshold),
            obstacle_cm: config.obstacle_distance_cm,
            tilt_deg: config.tilt_threshold_deg,
            active: HazardFlags::EMPTY,
        }
    }

    /// Dominant classification, first match wins.
    pub fn classify(&self, s: &Sample) -> Hazard {
        if self.is_fire(s) {
            Hazard::Fire
        } else if self.is_blizzard(s) {
            Hazard::Blizzard
        } else if self.is_hurricane(s) {
            Hazard::Hurricane
        } else if self.is_hazardous_gas(s.gas_level()) {
            Hazard::Gas
        } else if self.is_obstacle(s) {
            Hazard::Obstacle
        } else if self.is_tilted(s) {
            Hazard::Tilt
        } else {
            Hazard::None
        }
    }

    /// Every condition that holds, evaluated without short-circuit.
    pub fn conditions(&self, s: &Sample) -> HazardFlags {
        let mut flags = HazardFlags::EMPTY;
        let checks = [
            (Hazard::Fire, self.is_fire(s)),
            (Hazard::Blizzard, self.is_blizzard(s)),
            (Hazard::Hurricane, self.is_hurricane(s)),
            (Hazard::Gas, self.is_hazardous_gas(s.gas_level())),
            (Hazard::Obstacle, self.is_obstacle(s)),
            (Hazard::Tilt, self.is_tilted(s)),
        ];
        for (hazard, hit) in checks {
            if hit {
                flags.insert(hazard);
            }
        }
        flags
    }

    /// Gas at or above the threshold.  This alone drives the Alert state.
    pub fn is_hazardous_gas(&self, gas_level: i32) -> bool {
        gas_level >= 0 && gas_level >= self.gas_threshold
    }

    /// Classify and log onset / clearance of each condition.
    pub fn evaluate(&mut self, s: &Sample) -> Assessment {
        let flags = self.conditions(s);
        let dominant = self.classify(s);
        debug_assert_eq!(dominant, flags.dominant());

        let raised = HazardFlags(flags.0 & !self.active.0);
        let cleared = HazardFlags(self.active.0 & !flags.0);
        for hazard in raised.iter() {
            warn!("hazard: {} detected", hazard);
        }
        for hazard in cleared.iter() {
            info!("hazard: {} cleared", hazard);
        }
        self.active = flags;

        Assessment {
            dominant,
            flags,
            gas_hazard: self.is_hazardous_gas(s.gas_level()),
        }
    }

    // ── Predicates ────────────────────────────────────────────

    fn is_fire(&self, s: &Sample) -> bool {
        s.temperature_valid() && s.temperature_c() >= self.fire_c
    }

    fn is_blizzard(&self, s: &Sample) -> bool {
        // A failed read is -999, which is not a cold reading.
        s.temperature_valid() && s.temperature_c() <= self.blizzard_c
    }

    fn is_hurricane(&self, s: &Sample) -> bool {
        let h = s.humidity_pct();
        s.humidity_valid() && h >= self.humidity_min && h <= self.humidity_max
    }

    fn is_obstacle(&self, s: &Sample) -> bool {
        let d = s.distance_cm();
        d > 0 && d < self.obstacle_cm
    }

    fn is_tilted(&self, s: &Sample) -> bool {
        let o = s.orientation();
        o.is_valid() && (o.pitch_deg.abs() > self.tilt_deg || o.roll_deg.abs() > self.tilt_deg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::{CLIMATE_SENTINEL, GAS_SENTINEL, NO_ECHO_CM, Orientation};

    fn classifier() -> HazardClassifier {
        HazardClassifier::new(&SystemConfig::default())
    }

    /// Comfortable baseline: no condition holds.
    fn calm() -> Sample {
        Sample::new(25.0, 50.0, 100, 150, Orientation::default())
    }

    #[test]
    fn calm_sample_is_none() {
        assert_eq!(classifier().classify(&calm()), Hazard::None);
        assert!(classifier().conditions(&calm()).is_empty());
    }

    #[test]
    fn fire_at_threshold() {
        let c = classifier();
        assert_eq!(c.classify(&calm().with_temperature(30.0)), Hazard::Fire);
        assert_eq!(c.classify(&calm().with_temperature(29.9)), Hazard::None);
    }

    #[test]
    fn fire_beats_everything() {
        let s = Sample::new(
            35.0,
            110.0,
            900,
            2,
            Orientation {
                pitch_deg: 80.0,
                roll_deg: 80.0,
                yaw_deg: 0.0,
            },
        );
        let c = classifier();
        assert_eq!(c.classify(&s), Hazard::Fire);
        let flags = c.conditions(&s);
        for h in [Hazard::Fire, Hazard::Hurricane, Hazard::Gas, Hazard::Obstacle, Hazard::Tilt] {
            assert!(flags.contains(h), "{h} should be flagged");
        }
        assert!(!flags.contains(Hazard::Blizzard));
    }

    #[test]
    fn blizzard_at_threshold() {
        let c = classifier();
        assert_eq!(c.classify(&calm().with_temperature(20.0)), Hazard::Blizzard);
        assert_eq!(c.classify(&calm().with_temperature(20.1)), Hazard::None);
    }

    #[test]
    fn failed_temperature_read_is_not_blizzard() {
        let c = classifier();
        let s = calm().with_temperature(CLIMATE_SENTINEL);
        assert!(!c.conditions(&s).contains(Hazard::Blizzard));
        assert_eq!(c.classify(&s), Hazard::None);
    }

    #[test]
    fn hurricane_band_is_inclusive() {
        let c = classifier();
        assert_eq!(c.classify(&calm().with_humidity(99.0)), Hazard::Hurricane);
        assert_eq!(c.classify(&calm().with_humidity(120.0)), Hazard::Hurricane);
        assert_eq!(c.classify(&calm().with_humidity(98.9)), Hazard::None);
        assert_eq!(c.classify(&calm().with_humidity(120.1)), Hazard::None);
    }

    #[test]
    fn gas_triggers_at_460_not_459() {
        let c = classifier();
        assert_eq!(c.classify(&calm().with_gas(460)), Hazard::Gas);
        assert_eq!(c.classify(&calm().with_gas(459)), Hazard::None);
        assert!(c.is_hazardous_gas(460));
        assert!(!c.is_hazardous_gas(459));
    }

    #[test]
    fn obstacle_excludes_zero_and_no_echo() {
        let c = classifier();
        assert_eq!(c.classify(&calm().with_distance(4)), Hazard::Obstacle);
        assert_eq!(c.classify(&calm().with_distance(1)), Hazard::Obstacle);
        assert_eq!(c.classify(&calm().with_distance(5)), Hazard::None);
        assert_eq!(c.classify(&calm().with_distance(0)), Hazard::None);
        assert_eq!(c.classify(&calm().with_distance(NO_ECHO_CM)), Hazard::None);
    }

    #[test]
    fn tilt_on_either_axis() {
        let c = classifier();
        let pitched = Orientation {
            pitch_deg: -46.0,
            ..Orientation::default()
        };
        let rolled = Orientation {
            roll_deg: 45.5,
            ..Orientation::default()
        };
        let edge = Orientation {
            pitch_deg: 45.0,
            roll_deg: -45.0,
            yaw_deg: 0.0,
        };
        assert_eq!(c.classify(&calm().with_orientation(pitched)), Hazard::Tilt);
        assert_eq!(c.classify(&calm().with_orientation(rolled)), Hazard::Tilt);
        assert_eq!(c.classify(&calm().with_orientation(edge)), Hazard::None);
    }

    #[test]
    fn sentinels_never_raise_hazards() {
        let c = classifier();
        let failed = Sample::new(CLIMATE_SENTINEL, CLIMATE_SENTINEL, GAS_SENTINEL, NO_ECHO_CM, Orientation::FAILED);
        assert_eq!(c.classify(&failed), Hazard::None);
        assert!(c.conditions(&failed).is_empty());
    }

    #[test]
    fn evaluate_reports_gas_separately() {
        let mut c = classifier();
        let a = c.evaluate(&calm().with_temperature(35.0).with_gas(600));
        assert_eq!(a.dominant, Hazard::Fire);
        assert!(a.gas_hazard);
        assert!(a.flags.contains(Hazard::Gas));
    }

    #[test]
    fn flags_dominant_matches_priority() {
        let mut f = HazardFlags::EMPTY;
        f.insert(Hazard::Tilt);
        f.insert(Hazard::Hurricane);
        assert_eq!(f.dominant(), Hazard::Hurricane);
        assert_eq!(HazardFlags::EMPTY.dominant(), Hazard::None);
    }

    #[test]
    fn masks_are_distinct() {
        let mut seen = 0u8;
        for h in Hazard::PRIORITY {
            assert_eq!(seen & h.mask(), 0);
            seen |= h.mask();
        }
        assert_eq!(Hazard::None.mask(), 0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::sensors::Orientation;
    use proptest::prelude::*;

    fn arb_sample() -> impl Strategy<Value = Sample> {
        (
            -40.0f32..60.0,
            0.0f32..130.0,
            0i32..1024,
            -1i32..400,
            -90.0f32..90.0,
            -90.0f32..90.0,
        )
            .prop_map(|(t, h, g, d, p, r)| {
                Sample::new(
                    t,
                    h,
                    g,
                    d,
                    Orientation {
                        pitch_deg: p,
                        roll_deg: r,
                        yaw_deg: 0.0,
                    },
                )
            })
    }

    proptest! {
        #[test]
        fn dominant_is_highest_priority_flag(s in arb_sample()) {
            let c = HazardClassifier::new(&SystemConfig::default());
            prop_assert_eq!(c.classify(&s), c.conditions(&s).dominant());
        }

        #[test]
        fn hot_always_fire(t in 30.0f32..200.0, s in arb_sample()) {
            let c = HazardClassifier::new(&SystemConfig::default());
            prop_assert_eq!(c.classify(&s.with_temperature(t)), Hazard::Fire);
        }

        #[test]
        fn cold_always_blizzard(t in -100.0f32..=20.0, s in arb_sample()) {
            let c = HazardClassifier::new(&SystemConfig::default());
            prop_assert_eq!(c.classify(&s.with_temperature(t)), Hazard::Blizzard);
        }
    }
}
