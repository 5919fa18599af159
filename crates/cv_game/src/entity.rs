use cv_core::animation::Rect;
use glam::Vec2;

/// Axis-aligned box placed once at startup. Entities never move and never
/// push the player; they only show up in the debug overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entity {
    pub position: Vec2,
    pub half_dim: Vec2,
}

impl Entity {
    pub fn new(position: Vec2, half_dim: Vec2) -> Self {
        Self { position, half_dim }
    }

    pub fn bounds(&self) -> Rect {
        let min = self.position - self.half_dim;
        let size = self.half_dim * 2.0;
        Rect::new(min.x, min.y, size.x, size.y)
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: Vec2) -> bool {
        let d = (point - self.position).abs();
        d.x <= self.half_dim.x && d.y <= self.half_dim.y
    }
}

/// Top, right, bottom, left bars tracing the inside of `rect`.
pub fn outline_rects(rect: Rect, thickness: f32) -> [Rect; 4] {
    let t = thickness.min(rect.w * 0.5).min(rect.h * 0.5).max(0.0);
    [
        Rect::new(rect.x, rect.y, rect.w, t),
        Rect::new(rect.x + rect.w - t, rect.y, t, rect.h),
        Rect::new(rect.x, rect.y + rect.h - t, rect.w, t),
        Rect::new(rect.x, rect.y, t, rect.h),
    ]
}
