//! Ordered, fixed-size collection of bodies owned by the frame driver

use glam::DVec2;

use crate::body::{Body, BodyHandle};
use crate::config::DEFAULT_TRAIL_CAPACITY;
use crate::error::{SimError, SimResult};

/// Holds every body of a run in insertion order.
///
/// Besides [`create`](Self::create)/[`insert`](Self::insert) at setup time,
/// the only mutation comes from the gravity integrator.
#[derive(Debug, Clone)]
pub struct BodyRegistry {
    pub(crate) bodies: Vec<Body>,
    anchor: Option<usize>,
    trail_capacity: usize,
    pub(crate) steps_taken: u64,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::with_trail_capacity(DEFAULT_TRAIL_CAPACITY)
    }

    /// Registry whose [`create`](Self::create) calls keep `capacity` trail points per body
    pub fn with_trail_capacity(capacity: usize) -> Self {
        Self {
            bodies: Vec::new(),
            anchor: None,
            trail_capacity: capacity,
            steps_taken: 0,
        }
    }

    /// Construct and register a body from its initial state
    pub fn create(
        &mut self,
        position: DVec2,
        velocity: DVec2,
        mass: f64,
        is_anchor: bool,
    ) -> SimResult<BodyHandle> {
        let body = Body::new(position, velocity, mass)?
            .anchored(is_anchor)
            .with_trail_capacity(self.trail_capacity);
        self.insert(body)
    }

    /// Register an already-built body, keeping its own trail capacity and appearance
    pub fn insert(&mut self, body: Body) -> SimResult<BodyHandle> {
        let index = self.bodies.len();
        if body.is_anchor() {
            if let Some(existing) = self.anchor {
                return Err(SimError::DuplicateAnchor { existing });
            }
            self.anchor = Some(index);
        }

        log::debug!(
            "registered body {} ({}) at {:?}, mass {:e} kg",
            index,
            body.name().unwrap_or("unnamed"),
            body.position(),
            body.mass()
        );
        self.bodies.push(body);
        Ok(BodyHandle(index))
    }

    /// All bodies in insertion order
    pub fn all(&self) -> &[Body] {
        &self.bodies
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle.0)
    }

    pub fn anchor(&self) -> Option<&Body> {
        self.anchor.map(|i| &self.bodies[i])
    }

    pub fn anchor_handle(&self) -> Option<BodyHandle> {
        self.anchor.map(BodyHandle)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Number of integrator steps applied so far
    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    /// Recompute every non-anchor body's distance to the anchor
    pub(crate) fn refresh_anchor_distances(&mut self) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let anchor_position = self.bodies[anchor].position;

        for (i, body) in self.bodies.iter_mut().enumerate() {
            body.distance_to_anchor = if i == anchor {
                0.0
            } else {
                body.position.distance(anchor_position)
            };
        }
    }

    /// Mass-weighted mean position of all bodies
    pub fn center_of_mass(&self) -> DVec2 {
        let mut total_mass = 0.0;
        let mut com = DVec2::ZERO;

        for body in &self.bodies {
            com += body.position() * body.mass();
            total_mass += body.mass();
        }

        if total_mass > 0.0 {
            com / total_mass
        } else {
            DVec2::ZERO
        }
    }

    pub fn total_momentum(&self) -> DVec2 {
        self.bodies.iter().map(Body::momentum).sum()
    }

    /// Kinetic plus pairwise gravitational potential energy, in joules
    pub fn total_energy(&self, g: f64) -> f64 {
        let mut kinetic = 0.0;
        let mut potential = 0.0;

        for (i, body_i) in self.bodies.iter().enumerate() {
            kinetic += body_i.kinetic_energy();

            for body_j in self.bodies.iter().skip(i + 1) {
                let r = body_i.position().distance(body_j.position());
                if r > 0.0 {
                    potential -= g * body_i.mass() * body_j.mass() / r;
                }
            }
        }

        kinetic + potential
    }
}

impl Default for BodyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
