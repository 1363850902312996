//! Planet Simulator
//!
//! A handful of massive bodies advanced under mutual Newtonian gravity, one
//! fixed timestep per displayed frame:
//!
//! - **Body registry**: ordered bodies with their physical state and orbit trails
//! - **Gravity integrator**: all-pairs forces from a frozen snapshot, then a
//!   semi-implicit Euler update
//! - **Scenarios**: YAML or built-in initial conditions
//! - **Projection**: meters to window pixels for the renderer

pub mod body;
pub mod config;
pub mod error;
pub mod gravity;
pub mod projection;
pub mod registry;
pub mod scenario;

pub use body::{Appearance, Body, BodyHandle, Trajectory};
pub use config::{DisplayConfig, SimConfig, UpdateOrder};
pub use error::{SimError, SimResult};
pub use gravity::GravityIntegrator;
pub use projection::Projection;
pub use registry::BodyRegistry;
pub use scenario::{BodyConfig, Scenario, ScenarioConfig};
