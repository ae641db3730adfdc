//! Read-only display cache for echo records from the collector.
//!
//! Fields are positional, in outbound record order.  A record populates
//! only the tokens it carries: a short record (fewer than eight tokens)
//! updates the leading fields and leaves the trailing ones stale, and a
//! token that does not parse leaves its field stale too.  Tokens beyond
//! the eighth are ignored.

use super::decoder::ECHO_SEPARATOR;

pub const ECHO_FIELDS: usize = 8;

/// Field positions within an echo record.
pub mod field {
    pub const TEMPERATURE: usize = 0;
    pub const HUMIDITY: usize = 1;
    pub const GAS: usize = 2;
    pub const DISTANCE: usize = 3;
    pub const STATE: usize = 4;
    pub const PITCH: usize = 5;
    pub const ROLL: usize = 6;
    pub const YAW: usize = 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EchoCache {
    values: [f32; ECHO_FIELDS],
    /// Bit `i` set once field `i` has been populated at least once.
    populated: u8,
    records: u32,
}

impl EchoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record.  Returns how many fields were updated.
    pub fn apply(&mut self, record: &str) -> usize {
        let mut updated = 0;
        for (i, token) in record.split(ECHO_SEPARATOR).take(ECHO_FIELDS).enumerate() {
            if let Ok(v) = token.trim().parse::<f32>() {
                if v.is_finite() {
                    self.values[i] = v;
                    self.populated |= 1 << i;
                    updated += 1;
                }
            }
        }
        if updated > 0 {
            self.records = self.records.wrapping_add(1);
        }
        updated
    }

    /// True once any record has populated at least one field.
    pub fn has_data(&self) -> bool {
        self.populated != 0
    }

    pub fn is_populated(&self, idx: usize) -> bool {
        idx < ECHO_FIELDS && self.populated & (1 << idx) != 0
    }

    /// All eight values in record order (unpopulated fields read 0).
    pub fn values(&self) -> [f32; ECHO_FIELDS] {
        self.values
    }

    pub fn records_applied(&self) -> u32 {
        self.records
    }

    pub fn temperature_c(&self) -> f32 {
        self.values[field::TEMPERATURE]
    }

    pub fn humidity_pct(&self) -> f32 {
        self.values[field::HUMIDITY]
    }

    pub fn gas_level(&self) -> i32 {
        self.values[field::GAS] as i32
    }

    pub fn distance_cm(&self) -> i32 {
        self.values[field::DISTANCE] as i32
    }

    pub fn state_code(&self) -> i32 {
        self.values[field::STATE] as i32
    }

    pub fn pitch_deg(&self) -> f32 {
        self.values[field::PITCH]
    }

    pub fn roll_deg(&self) -> f32 {
        self.values[field::ROLL]
    }

    pub fn yaw_deg(&self) -> f32 {
        self.values[field::YAW]
    }
}
