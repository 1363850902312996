//! Pixel-space camera for 2D overlays

use glam::Mat4;

/// Orthographic camera whose units are window pixels.
///
/// `(0, 0)` is the top-left corner and y grows downward, so coordinates
/// produced by a screen projection can be sent to the GPU unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ScreenCamera {
    pub width: f32,
    pub height: f32,
}

impl ScreenCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1) as f32,
            height: height.max(1) as f32,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        Mat4::orthographic_rh(0.0, self.width, self.height, 0.0, -1.0, 1.0)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1) as f32;
        self.height = height.max(1) as f32;
    }
}

/// Camera uniform data for shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ScreenUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl ScreenUniform {
    pub fn from_camera(camera: &ScreenCamera) -> Self {
        Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
        }
    }
}
