//! CPU-side quad construction for the sprite mesh.
//!
//! A `Quad` describes one blit in screen pixels: which part of the texture to
//! sample, where it lands, and an optional rotation around a pivot given
//! relative to the destination's top-left corner. Positive angles turn
//! clockwise on screen because +y points down.

use cv_core::animation::Rect;
use glam::Vec2;

use crate::vertex::SpriteVertex;

/// Index pattern for one quad built by `build_quad`, relative to its first vertex.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad {
    /// Pixel rectangle on the texture; `None` samples the whole texture.
    pub source: Option<Rect>,
    pub dest: Rect,
    pub rotation_deg: f32,
    pub pivot: Vec2,
    pub color: [f32; 4],
}

impl Quad {
    pub fn new(dest: Rect) -> Self {
        Self {
            source: None,
            dest,
            rotation_deg: 0.0,
            pivot: Vec2::new(dest.w * 0.5, dest.h * 0.5),
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn with_source(mut self, source: Rect) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_rotation(mut self, rotation_deg: f32, pivot: Vec2) -> Self {
        self.rotation_deg = rotation_deg;
        self.pivot = pivot;
        self
    }
}

/// Build the four corners (top-left, top-right, bottom-right, bottom-left).
pub fn build_quad(quad: &Quad, texture_size: (u32, u32)) -> [SpriteVertex; 4] {
    let [u0, v0, u1, v1] = source_uv(quad.source, texture_size);
    let d = quad.dest;

    let mut corners = [
        Vec2::new(d.x, d.y),
        Vec2::new(d.x + d.w, d.y),
        Vec2::new(d.x + d.w, d.y + d.h),
        Vec2::new(d.x, d.y + d.h),
    ];

    if quad.rotation_deg != 0.0 {
        let origin = Vec2::new(d.x, d.y) + quad.pivot;
        let rotation = Vec2::from_angle(quad.rotation_deg.to_radians());
        for corner in &mut corners {
            *corner = origin + rotation.rotate(*corner - origin);
        }
    }

    let uvs = [[u0, v0], [u1, v0], [u1, v1], [u0, v1]];
    let mut out = [SpriteVertex {
        position: [0.0, 0.0],
        tex_coords: [0.0, 0.0],
        color: quad.color,
    }; 4];
    for (vertex, (corner, uv)) in out.iter_mut().zip(corners.iter().zip(uvs)) {
        vertex.position = [corner.x, corner.y];
        vertex.tex_coords = uv;
    }
    out
}

fn source_uv(source: Option<Rect>, texture_size: (u32, u32)) -> [f32; 4] {
    let Some(src) = source else {
        return [0.0, 0.0, 1.0, 1.0];
    };
    let tw = texture_size.0.max(1) as f32;
    let th = texture_size.1.max(1) as f32;
    [src.x / tw, src.y / th, (src.x + src.w) / tw, (src.y + src.h) / th]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-3 && (a[1] - b[1]).abs() < 1e-3
    }

    #[test]
    fn whole_texture_quad_spans_unit_uv() {
        let quad = Quad::new(Rect::new(10.0, 20.0, 30.0, 40.0));
        let v = build_quad(&quad, (64, 64));
        assert_eq!(v[0].position, [10.0, 20.0]);
        assert_eq!(v[2].position, [40.0, 60.0]);
        assert_eq!(v[0].tex_coords, [0.0, 0.0]);
        assert_eq!(v[2].tex_coords, [1.0, 1.0]);
    }

    #[test]
    fn source_rect_maps_to_sheet_uv() {
        let quad = Quad::new(Rect::new(0.0, 0.0, 356.0, 356.0))
            .with_source(Rect::new(1000.0, 0.0, 1000.0, 1000.0));
        let v = build_quad(&quad, (3000, 1000));
        assert!(approx(v[0].tex_coords, [1.0 / 3.0, 0.0]));
        assert!(approx(v[2].tex_coords, [2.0 / 3.0, 1.0]));
    }

    #[test]
    fn rotation_turns_clockwise_around_pivot() {
        let quad = Quad::new(Rect::new(0.0, 0.0, 2.0, 2.0))
            .with_rotation(90.0, Vec2::new(1.0, 1.0));
        let v = build_quad(&quad, (1, 1));
        // Top-left corner swings to the top-right on a y-down screen.
        assert!(approx(v[0].position, [2.0, 0.0]));
        assert!(approx(v[2].position, [0.0, 2.0]));
    }

    #[test]
    fn color_is_copied_to_every_vertex() {
        let color = [0.0, 1.0, 0.0, 1.0];
        let quad = Quad::new(Rect::new(0.0, 0.0, 1.0, 1.0)).with_color(color);
        for vertex in build_quad(&quad, (1, 1)) {
            assert_eq!(vertex.color, color);
        }
    }
}
