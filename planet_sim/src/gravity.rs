//! Newtonian gravity and the per-step integrator
//!
//! A step runs in two phases. First every net force is computed from a frozen
//! snapshot of the registry; only when that whole pass succeeds are velocities,
//! positions, and trails written back. A failing step therefore leaves the
//! registry exactly as it was.

use glam::DVec2;

use crate::body::Body;
use crate::config::{SimConfig, UpdateOrder};
use crate::error::{SimError, SimResult};
use crate::registry::BodyRegistry;

/// Position, velocity and mass of one body, detached from the registry
#[derive(Debug, Clone, Copy)]
struct State {
    position: DVec2,
    velocity: DVec2,
    mass: f64,
}

impl From<&Body> for State {
    fn from(body: &Body) -> Self {
        Self {
            position: body.position(),
            velocity: body.velocity(),
            mass: body.mass(),
        }
    }
}

/// Semi-implicit Euler integrator for pairwise Newtonian gravity.
///
/// Holds only the constants of the run; all mutable state lives in the
/// [`BodyRegistry`] passed to [`step`](Self::step).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityIntegrator {
    pub g: f64,
    pub timestep: f64,
    pub update_order: UpdateOrder,
}

impl GravityIntegrator {
    pub fn new(g: f64, timestep: f64) -> Self {
        Self {
            g,
            timestep,
            update_order: UpdateOrder::Synchronized,
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            g: config.g,
            timestep: config.timestep,
            update_order: config.update_order,
        }
    }

    pub fn with_update_order(mut self, update_order: UpdateOrder) -> Self {
        self.update_order = update_order;
        self
    }

    /// Force exerted on `body` by `other`, pointing from `body` toward `other`.
    ///
    /// Coincident bodies are reported as pair `(0, 1)`, i.e. by argument position,
    /// and a force too large to represent as [`SimError::Overflow`] on body `0`.
    pub fn attraction(&self, body: &Body, other: &Body) -> SimResult<DVec2> {
        let force = pair_force(self.g, &State::from(body), &State::from(other))
            .ok_or(SimError::DegenerateGeometry { first: 0, second: 1 })?;
        if !force.is_finite() {
            return Err(SimError::Overflow { body: 0 });
        }
        Ok(force)
    }

    /// Net force on every body, evaluated against the current positions only
    pub fn net_forces(&self, bodies: &[Body]) -> SimResult<Vec<DVec2>> {
        let states: Vec<State> = bodies.iter().map(State::from).collect();
        self.net_forces_of(&states)
    }

    fn net_forces_of(&self, states: &[State]) -> SimResult<Vec<DVec2>> {
        (0..states.len())
            .map(|i| self.net_force_on(i, states))
            .collect()
    }

    fn net_force_on(&self, i: usize, states: &[State]) -> SimResult<DVec2> {
        let mut total = DVec2::ZERO;
        for (j, other) in states.iter().enumerate() {
            if i == j {
                continue;
            }
            total += pair_force(self.g, &states[i], other).ok_or(SimError::DegenerateGeometry {
                first: i.min(j),
                second: i.max(j),
            })?;
        }
        Ok(total)
    }

    /// Advance every body by one timestep.
    ///
    /// On error nothing in `registry` has been modified. Besides coincident
    /// bodies, a step whose result would not be finite fails with
    /// [`SimError::Overflow`].
    pub fn step(&self, registry: &mut BodyRegistry) -> SimResult<()> {
        let mut states: Vec<State> = registry.all().iter().map(State::from).collect();

        match self.update_order {
            UpdateOrder::Synchronized => self.advance_synchronized(&mut states)?,
            UpdateOrder::Sequential => self.advance_sequential(&mut states)?,
        }
        if let Some(body) = states
            .iter()
            .position(|s| !(s.position.is_finite() && s.velocity.is_finite()))
        {
            return Err(SimError::Overflow { body });
        }

        for (body, state) in registry.bodies.iter_mut().zip(&states) {
            body.velocity = state.velocity;
            body.position = state.position;
            body.trajectory.push(state.position);
        }
        registry.refresh_anchor_distances();
        registry.steps_taken += 1;

        log::trace!(
            "step {} done for {} bodies",
            registry.steps_taken,
            registry.len()
        );
        Ok(())
    }

    fn advance_synchronized(&self, states: &mut [State]) -> SimResult<()> {
        let forces = self.net_forces_of(states)?;
        for (state, force) in states.iter_mut().zip(forces) {
            self.kick_drift(state, force);
        }
        Ok(())
    }

    // Body i sees the already-advanced positions of bodies 0..i.
    fn advance_sequential(&self, states: &mut [State]) -> SimResult<()> {
        for i in 0..states.len() {
            let force = self.net_force_on(i, states)?;
            self.kick_drift(&mut states[i], force);
        }
        Ok(())
    }

    fn kick_drift(&self, state: &mut State, force: DVec2) {
        let acceleration = force / state.mass;
        state.velocity += acceleration * self.timestep;
        state.position += state.velocity * self.timestep;
    }
}

/// Newtonian attraction of `a` toward `b`, or `None` when the two coincide.
///
/// Distinct positions closer than `length()` can resolve yield a non-finite
/// force; the step's finiteness check rejects that.
fn pair_force(g: f64, a: &State, b: &State) -> Option<DVec2> {
    if a.position == b.position {
        return None;
    }
    let d = b.position - a.position;
    let distance = d.length();

    let force = g * a.mass * b.mass / (distance * distance);
    let theta = d.y.atan2(d.x);
    Some(DVec2::new(theta.cos() * force, theta.sin() * force))
}
