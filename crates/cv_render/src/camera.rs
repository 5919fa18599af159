use glam::{Mat4, Vec2};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
}

/// Fixed logical screen in pixels: origin top-left, +y down. The surface is
/// stretched to fit, so scene coordinates never depend on the window size.
pub struct ScreenCamera {
    pub logical_size: Vec2,
}

impl ScreenCamera {
    pub fn new(logical_width: u32, logical_height: u32) -> Self {
        Self {
            logical_size: Vec2::new(logical_width as f32, logical_height as f32),
        }
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            0.0,
            self.logical_size.x,
            self.logical_size.y,
            0.0,
            -1.0,
            1.0,
        )
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.projection().to_cols_array_2d(),
        }
    }
}
