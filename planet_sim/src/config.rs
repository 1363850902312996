//! Simulation constants and display settings
//!
//! Every constant the simulation depends on lives in [`SimConfig`] rather than
//! in literals scattered through the integrator. All fields have defaults
//! matching the classic inner-solar-system setup, and any subset can be
//! overridden from a scenario file:
//!
//! ```yaml
//! sim:
//!   timestep: 43200.0       # half a day per step
//!   trail_capacity: 2000
//!   update_order: synchronized
//! display:
//!   width: 800
//!   height: 800
//! ```

use serde::Deserialize;

/// Astronomical unit in meters
pub const AU: f64 = 149.6e6 * 1000.0;

/// Gravitational constant in m³ kg⁻¹ s⁻²
pub const G: f64 = 6.67428e-11;

/// One simulated day, in seconds
pub const SECONDS_PER_DAY: f64 = 60.0 * 60.0 * 24.0;

/// Positions kept per orbit trail unless configured otherwise
pub const DEFAULT_TRAIL_CAPACITY: usize = 1000;

/// How bodies observe each other's motion within a single step
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOrder {
    /// Every force is evaluated against the positions at the start of the step
    #[default]
    Synchronized,
    /// Bodies are advanced one after another in registry order, so later
    /// bodies feel the already-moved earlier ones (legacy behaviour)
    Sequential,
}

impl std::str::FromStr for UpdateOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "synchronized" => Ok(UpdateOrder::Synchronized),
            "sequential" => Ok(UpdateOrder::Sequential),
            other => Err(format!(
                "unknown update order '{other}' (expected synchronized or sequential)"
            )),
        }
    }
}

/// Physical constants and integration settings
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub au: f64,            // length of one astronomical unit, meters
    pub g: f64,             // gravitational constant
    pub pixels_per_au: f64, // display only, never touches physical state
    pub timestep: f64,      // simulated seconds advanced per step
    pub trail_capacity: usize,
    pub update_order: UpdateOrder,
}

impl SimConfig {
    /// Pixels per meter used when projecting positions onto the screen
    pub fn scale(&self) -> f64 {
        self.pixels_per_au / self.au
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            au: AU,
            g: G,
            pixels_per_au: 150.0,
            timestep: SECONDS_PER_DAY,
            trail_capacity: DEFAULT_TRAIL_CAPACITY,
            update_order: UpdateOrder::Synchronized,
        }
    }
}

/// Window settings for the frame driver
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32, // integrator steps per wall-clock second
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            fps: 60,
        }
    }
}
