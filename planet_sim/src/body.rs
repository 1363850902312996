//! Bodies and their orbit trails

use std::collections::VecDeque;

use glam::DVec2;

use crate::config::DEFAULT_TRAIL_CAPACITY;
use crate::error::{SimError, SimResult};

/// Index of a body inside its registry, stable for the lifetime of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) usize);

impl BodyHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Display attributes carried through untouched for the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    /// Radius in pixels
    pub radius: f32,
    pub color: [u8; 3],
}

impl Appearance {
    pub fn new(radius: f32, color: [u8; 3]) -> Self {
        Self { radius, color }
    }

    /// Color as normalized RGBA for the GPU
    pub fn rgba(&self) -> [f32; 4] {
        [
            self.color[0] as f32 / 255.0,
            self.color[1] as f32 / 255.0,
            self.color[2] as f32 / 255.0,
            1.0,
        ]
    }
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            radius: 8.0,
            color: [255, 255, 255],
        }
    }
}

/// Bounded history of past positions, oldest first.
///
/// Once `capacity` entries are stored, each push drops the oldest one.
/// A capacity of zero records nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    points: VecDeque<DVec2>,
    capacity: usize,
}

impl Trajectory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            // the deque grows lazily; long trails should not be paid for up front
            points: VecDeque::with_capacity(capacity.min(256)),
            capacity,
        }
    }

    pub fn push(&mut self, point: DVec2) {
        if self.capacity == 0 {
            return;
        }
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &DVec2> + '_ {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<DVec2> {
        self.points.back().copied()
    }
}

/// A massive body: physical state in SI units plus its orbit trail
#[derive(Debug, Clone)]
pub struct Body {
    pub(crate) position: DVec2,
    pub(crate) velocity: DVec2,
    mass: f64,
    is_anchor: bool,
    pub(crate) distance_to_anchor: f64,
    pub(crate) trajectory: Trajectory,
    appearance: Appearance,
    name: Option<String>,
}

impl Body {
    /// Create a body at `position` (m) moving with `velocity` (m/s).
    ///
    /// Fails with [`SimError::InvalidMass`] unless `mass` is finite and positive,
    /// and with [`SimError::NonFiniteState`] if any coordinate is NaN or infinite.
    pub fn new(position: DVec2, velocity: DVec2, mass: f64) -> SimResult<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            log::warn!("rejecting body with mass {mass}");
            return Err(SimError::InvalidMass { mass });
        }
        if !(position.is_finite() && velocity.is_finite()) {
            log::warn!("rejecting body at {position} moving at {velocity}");
            return Err(SimError::NonFiniteState { position, velocity });
        }

        Ok(Self {
            position,
            velocity,
            mass,
            is_anchor: false,
            distance_to_anchor: 0.0,
            trajectory: Trajectory::with_capacity(DEFAULT_TRAIL_CAPACITY),
            appearance: Appearance::default(),
            name: None,
        })
    }

    pub fn anchored(mut self, is_anchor: bool) -> Self {
        self.is_anchor = is_anchor;
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_trail_capacity(mut self, capacity: usize) -> Self {
        self.trajectory = Trajectory::with_capacity(capacity);
        self
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn is_anchor(&self) -> bool {
        self.is_anchor
    }

    /// Distance to the anchor body as of the last completed step.
    /// Advisory only; the integrator never reads it.
    pub fn distance_to_anchor(&self) -> f64 {
        self.distance_to_anchor
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass * self.velocity.length_squared()
    }

    pub fn momentum(&self) -> DVec2 {
        self.velocity * self.mass
    }
}
