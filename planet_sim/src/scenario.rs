//! Build ready-to-run simulations from configuration
//!
//! A [`ScenarioConfig`] is the YAML-facing description of a run: constants,
//! window settings and the initial state of every body. [`Scenario::build`]
//! turns it into the runtime bundle the frame driver owns.
//!
//! ```yaml
//! sim:
//!   pixels_per_au: 150.0
//! bodies:
//!   - name: Sun
//!     x: 0.0              # AU
//!     y: 0.0              # AU
//!     radius: 30.0        # pixels
//!     color: [255, 224, 46]
//!     mass: 1.98892e30    # kg
//!     y_velocity: 0.0     # m/s
//!     anchor: true
//!   - name: Earth
//!     x: -1.0
//!     y: 0.0
//!     radius: 16.0
//!     color: [140, 226, 255]
//!     mass: 5.9742e24
//!     y_velocity: 29783.0
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use glam::DVec2;
use serde::Deserialize;

use crate::body::{Appearance, Body};
use crate::config::{DisplayConfig, SimConfig};
use crate::error::SimResult;
use crate::gravity::GravityIntegrator;
use crate::registry::BodyRegistry;

/// Initial state of one body
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct BodyConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f64, // AU
    pub y: f64, // AU
    pub radius: f32, // pixels, display only
    pub color: [u8; 3],
    pub mass: f64, // kg
    pub y_velocity: f64, // m/s
    #[serde(default)]
    pub x_velocity: f64, // m/s
    #[serde(default)]
    pub anchor: bool,
}

impl BodyConfig {
    fn build(&self, sim: &SimConfig) -> SimResult<Body> {
        let position = DVec2::new(self.x, self.y) * sim.au;
        let velocity = DVec2::new(self.x_velocity, self.y_velocity);

        let mut body = Body::new(position, velocity, self.mass)?
            .anchored(self.anchor)
            .with_appearance(Appearance::new(self.radius, self.color))
            .with_trail_capacity(sim.trail_capacity);
        if let Some(name) = &self.name {
            body = body.with_name(name);
        }
        Ok(body)
    }
}

/// Top-level scenario file
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open scenario {}", path.display()))?;
        let reader = BufReader::new(file);
        let scenario: ScenarioConfig = serde_yaml::from_reader(reader)
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;

        log::info!(
            "loaded scenario {} with {} bodies",
            path.display(),
            scenario.bodies.len()
        );
        Ok(scenario)
    }

    /// Sun, Earth, Mars, Mercury and Venus on the x axis, each given its mean
    /// orbital speed along y
    pub fn inner_solar_system() -> Self {
        let planet =
            |name: &str, x: f64, radius: f32, color: [u8; 3], mass: f64, y_velocity: f64| {
                BodyConfig {
                    name: Some(name.to_string()),
                    x,
                    y: 0.0,
                    radius,
                    color,
                    mass,
                    y_velocity,
                    x_velocity: 0.0,
                    anchor: false,
                }
            };

        let mut sun = planet("Sun", 0.003, 30.0, [255, 224, 46], 1.98892e30, 0.0);
        sun.anchor = true;

        Self {
            sim: SimConfig::default(),
            display: DisplayConfig::default(),
            bodies: vec![
                sun,
                planet("Earth", -1.0, 16.0, [140, 226, 255], 5.9742e24, 29.783e3),
                planet("Mars", -1.524, 12.0, [212, 28, 28], 6.39e23, 24.077e3),
                planet("Mercury", 0.387, 8.0, [174, 155, 199], 0.330e24, -47.4e3),
                planet("Venus", 0.723, 14.0, [212, 255, 255], 4.8685e24, -35.02e3),
            ],
        }
    }
}

/// Runtime bundle owned by the frame driver for the duration of a run
#[derive(Debug, Clone)]
pub struct Scenario {
    pub sim: SimConfig,
    pub display: DisplayConfig,
    pub registry: BodyRegistry,
    pub integrator: GravityIntegrator,
}

impl Scenario {
    pub fn build(cfg: &ScenarioConfig) -> SimResult<Self> {
        let mut registry = BodyRegistry::with_trail_capacity(cfg.sim.trail_capacity);
        for body_cfg in &cfg.bodies {
            registry.insert(body_cfg.build(&cfg.sim)?)?;
        }

        Ok(Self {
            sim: cfg.sim.clone(),
            display: cfg.display.clone(),
            registry,
            integrator: GravityIntegrator::from_config(&cfg.sim),
        })
    }

    /// Simulated time elapsed so far, in days
    pub fn elapsed_days(&self) -> f64 {
        self.registry.steps_taken() as f64 * self.sim.timestep / crate::config::SECONDS_PER_DAY
    }
}
