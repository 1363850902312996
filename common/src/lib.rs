//! Common graphics plumbing for the simulators
//!
//! Window and GPU setup plus a pixel-space camera. Nothing in here knows about
//! physics; simulations hand over already-projected screen coordinates.

pub mod graphics;
pub mod screen;

pub use graphics::*;
pub use screen::*;
