//! Two-layer indicator colour engine.
//!
//! The main loop calls `tick()` each iteration and feeds the result to
//! [`RgbLed::set_colour`](super::status_led::RgbLed::set_colour).
//!
//! ## Layers (highest first)
//!
//! 1. **Hazard flash**: advisory colour held for a fixed time (the length
//!    of the accompanying tone), then dropped.
//! 2. **Steady**: the operating state's colour.
//!
//! Setting the steady colour while a flash is held only changes what shows
//! once the flash expires.

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

// ── Operating-state palette ───────────────────────────────────

pub const COLOUR_OFF: Rgb = (0, 0, 0);
pub const COLOUR_IDLE: Rgb = (128, 0, 128); // purple, warming up
pub const COLOUR_ACTIVE: Rgb = (0, 255, 0);
pub const COLOUR_ALERT: Rgb = (255, 0, 0);
pub const COLOUR_ERROR: Rgb = (255, 255, 0);

// ── Hazard advisory palette ───────────────────────────────────

pub const COLOUR_FIRE: Rgb = (255, 165, 0); // orange
pub const COLOUR_BLIZZARD: Rgb = (0, 255, 255); // cyan
pub const COLOUR_HURRICANE: Rgb = (0, 0, 139); // deep blue
pub const COLOUR_GAS: Rgb = (255, 255, 0); // yellow
pub const COLOUR_OBSTACLE: Rgb = (255, 0, 0);
pub const COLOUR_TILT: Rgb = (255, 0, 255); // magenta

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Flash {
    colour: Rgb,
    until_ms: u64,
}

/// Indicator engine. Stack-allocated, no heap.
pub struct IndicatorEngine {
    steady: Rgb,
    flash: Option<Flash>,
    now_ms: u64,
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self {
            steady: COLOUR_OFF,
            flash: None,
            now_ms: 0,
        }
    }

    /// Set the steady (state) layer.
    pub fn set_steady(&mut self, colour: Rgb) {
        self.steady = colour;
    }

    /// Overlay `colour` for `hold_ms` from the last tick time.  A new
    /// flash replaces one still in progress.
    pub fn flash(&mut self, colour: Rgb, hold_ms: u32) {
        self.flash = Some(Flash {
            colour,
            until_ms: self.now_ms + u64::from(hold_ms),
        });
    }

    /// Cancel a flash still in progress; the steady layer shows again.
    pub fn clear_flash(&mut self) {
        self.flash = None;
    }

    /// Drop both layers.
    pub fn clear_all(&mut self) {
        self.steady = COLOUR_OFF;
        self.flash = None;
    }

    /// Advance to `now_ms` and return the colour to display.
    pub fn tick(&mut self, now_ms: u64) -> Rgb {
        self.now_ms = now_ms;
        if self.flash.is_some_and(|f| now_ms >= f.until_ms) {
            self.flash = None;
        }
        self.current()
    }

    /// Colour as of the last tick.
    pub fn current(&self) -> Rgb {
        self.flash.map_or(self.steady, |f| f.colour)
    }

    pub fn steady(&self) -> Rgb {
        self.steady
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_some()
    }
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::new()
    }
}
