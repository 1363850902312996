//! Errors raised by the body registry and the gravity integrator

use std::fmt;

use glam::DVec2;

/// Result alias used throughout the simulation core
pub type SimResult<T> = Result<T, SimError>;

/// Conditions that make a body or a step physically meaningless.
///
/// None of these are transient: retrying without changing the offending state
/// reproduces the same failure, so callers should halt or skip instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimError {
    /// A body was given a mass that is zero, negative, or not finite
    InvalidMass { mass: f64 },
    /// A body was given a position or velocity that is not finite
    NonFiniteState { position: DVec2, velocity: DVec2 },
    /// A step drove a body's state out of the representable range
    Overflow { body: usize },
    /// Two distinct bodies share the exact same position at step time
    DegenerateGeometry { first: usize, second: usize },
    /// A second anchor body was requested while one is already registered
    DuplicateAnchor { existing: usize },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::InvalidMass { mass } => {
                write!(f, "invalid mass {mass}: bodies must have a finite, positive mass")
            }
            SimError::NonFiniteState { position, velocity } => write!(
                f,
                "non-finite initial state: position {position}, velocity {velocity}"
            ),
            SimError::Overflow { body } => write!(
                f,
                "step would leave body {body} with a non-finite position or velocity"
            ),
            SimError::DegenerateGeometry { first, second } => write!(
                f,
                "bodies {first} and {second} occupy the same position; \
                 gravitational force is undefined"
            ),
            SimError::DuplicateAnchor { existing } => {
                write!(f, "body {existing} is already the anchor; only one anchor is allowed")
            }
        }
    }
}

impl std::error::Error for SimError {}
