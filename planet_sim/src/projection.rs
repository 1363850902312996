//! Mapping from simulation meters to window pixels

use glam::{DVec2, Vec2};

use crate::config::{DisplayConfig, SimConfig};

/// Screen projection centred on the origin, y pointing down like window coordinates.
///
/// Purely a read-side transform: nothing here feeds back into body state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub scale: f64, // pixels per meter
    pub width: f64,
    pub height: f64,
}

impl Projection {
    pub fn new(scale: f64, width: u32, height: u32) -> Self {
        Self {
            scale,
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn from_config(sim: &SimConfig, display: &DisplayConfig) -> Self {
        Self::new(sim.scale(), display.width, display.height)
    }

    pub fn to_screen(&self, position: DVec2) -> Vec2 {
        let screen = position * self.scale + DVec2::new(self.width / 2.0, self.height / 2.0);
        screen.as_vec2()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width as f64;
        self.height = height as f64;
    }

    /// Multiply the scale by `factor`; values `<= 0` are ignored
    pub fn zoom(&mut self, factor: f64) {
        if factor > 0.0 {
            self.scale *= factor;
        }
    }
}
