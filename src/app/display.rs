//! Display pages for the 16×2 character LCD.
//!
//! Pure rendering: a [`DisplayPage`] plus the latest sample and echo cache
//! become two fixed-width lines.  Nothing here touches the bus.
//!
//! | Page          | Top              | Bottom          |
//! |---------------|------------------|-----------------|
//! | Standby       | `UAV OFF`        | `Standby Mode`  |
//! | WarmingUp     | `UAV ACTIVE`     | `Warming up...` |
//! | Climate       | `T:23.5C H:55%`  | `Gas:120`       |
//! | GasDistance   | `Gas:120 (11%)`  | `Dist:150 cm`   |
//! | Attitude      | `Pitch:1.2`      | `Roll:-0.5`     |
//! | Heading       | `Yaw:10.0`       | `Heading`       |
//! | Cloud         | `Cloud T:23.5`   | `Gas:120 S:2`   |
//! | GasAlert      | `!!! ALERT !!!`  | `GAS DETECTED!` |
//! | SensorError   | `SENSOR ERROR`   | `Check wiring`  |

use core::fmt::Write;

use heapless::String;

use crate::drivers::display::LCD_COLS;
use crate::hazard::Hazard;
use crate::sensors::Sample;
use crate::sensors::gas::GAS_MAX;
use crate::telemetry::echo::EchoCache;

/// One LCD row.  Text longer than the panel is cut at the last column.
pub type DisplayLine = String<LCD_COLS>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DisplayLines {
    pub top: DisplayLine,
    pub bottom: DisplayLine,
}

impl DisplayLines {
    pub fn new(top: &str, bottom: &str) -> Self {
        Self {
            top: line(format_args!("{top}")),
            bottom: line(format_args!("{bottom}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayPage {
    #[default]
    Standby,
    WarmingUp,
    Climate,
    GasDistance,
    Attitude,
    Heading,
    Cloud,
    GasAlert,
    SensorError,
}

impl DisplayPage {
    /// Next page in the Active rotation.  The cloud page is skipped until
    /// an echo record has been cached.
    pub fn next(self, has_echo: bool) -> Self {
        match self {
            Self::Climate => Self::GasDistance,
            Self::GasDistance => Self::Attitude,
            Self::Attitude => Self::Heading,
            Self::Heading if has_echo => Self::Cloud,
            _ => Self::Climate,
        }
    }
}

/// Render `page`.  Sensor pages show dashes until the first sample.
pub fn render(page: DisplayPage, sample: Option<&Sample>, echo: &EchoCache) -> DisplayLines {
    match page {
        DisplayPage::Standby => DisplayLines::new("UAV OFF", "Standby Mode"),
        DisplayPage::WarmingUp => DisplayLines::new("UAV ACTIVE", "Warming up..."),
        DisplayPage::GasAlert => DisplayLines::new("!!! ALERT !!!", "GAS DETECTED!"),
        DisplayPage::SensorError => DisplayLines::new("SENSOR ERROR", "Check wiring"),
        DisplayPage::Cloud => DisplayLines {
            top: line(format_args!("Cloud T:{:.1}", echo.temperature_c())),
            bottom: line(format_args!("Gas:{} S:{}", echo.gas_level(), echo.state_code())),
        },
        _ => match sample {
            Some(s) => render_sensor_page(page, s),
            None => DisplayLines::new("Waiting for", "sensors..."),
        },
    }
}

fn render_sensor_page(page: DisplayPage, s: &Sample) -> DisplayLines {
    let o = s.orientation();
    match page {
        DisplayPage::Climate => DisplayLines {
            top: line(format_args!("T:{:.1}C H:{:.0}%", s.temperature_c(), s.humidity_pct())),
            bottom: line(format_args!("Gas:{}", s.gas_level())),
        },
        DisplayPage::GasDistance => DisplayLines {
            top: line(format_args!("Gas:{} ({}%)", s.gas_level(), gas_percent(s.gas_level()))),
            bottom: line(format_args!("Dist:{} cm", s.distance_cm())),
        },
        DisplayPage::Attitude => DisplayLines {
            top: line(format_args!("Pitch:{:.1}", o.pitch_deg)),
            bottom: line(format_args!("Roll:{:.1}", o.roll_deg)),
        },
        _ => DisplayLines {
            top: line(format_args!("Yaw:{:.1}", o.yaw_deg)),
            bottom: line(format_args!("Heading")),
        },
    }
}

/// Advisory text shown for one tick's dominant hazard.
pub fn render_hazard(hazard: Hazard, s: &Sample) -> DisplayLines {
    let o = s.orientation();
    match hazard {
        Hazard::None => DisplayLines::default(),
        Hazard::Fire => DisplayLines {
            top: line(format_args!("FIRE HAZARD!")),
            bottom: line(format_args!("Temp:{:.1}C", s.temperature_c())),
        },
        Hazard::Blizzard => DisplayLines {
            top: line(format_args!("BLIZZARD!")),
            bottom: line(format_args!("Temp:{:.1}C", s.temperature_c())),
        },
        Hazard::Hurricane => DisplayLines {
            top: line(format_args!("HURRICANE!")),
            bottom: line(format_args!("Humid:{:.0}%", s.humidity_pct())),
        },
        Hazard::Gas => DisplayLines {
            top: line(format_args!("GAS HAZARD!")),
            bottom: line(format_args!("Gas:{}", s.gas_level())),
        },
        Hazard::Obstacle => DisplayLines {
            top: line(format_args!("OBSTACLE!")),
            bottom: line(format_args!("Dist:{} cm", s.distance_cm())),
        },
        Hazard::Tilt => DisplayLines {
            top: line(format_args!("TILT WARNING!")),
            bottom: line(format_args!("P:{:.0} R:{:.0}", o.pitch_deg, o.roll_deg)),
        },
    }
}

fn gas_percent(level: i32) -> i32 {
    if level < 0 {
        return 0;
    }
    level * 100 / i32::from(GAS_MAX)
}

/// Format into a row, keeping whatever fits.
fn line(args: core::fmt::Arguments<'_>) -> DisplayLine {
    let mut out = Truncating(DisplayLine::new());
    // Truncating::write_str never fails.
    let _ = out.write_fmt(args);
    out.0
}

struct Truncating(DisplayLine);

impl Write for Truncating {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for ch in s.chars() {
            if self.0.push(ch).is_err() {
                break;
            }
        }
        Ok(())
    }
}
