//! Sprite-sheet animation: grid-addressed frames played at a fixed cadence.
//!
//! A clip is an ordered list of grid coordinates into one sprite sheet. Every
//! frame is shown for the same `frame_duration`, so a longer clip simply plays
//! longer. Elapsed time is accumulated in seconds (`f64`) from the frame
//! clock's wall-clock delta.
//!
//! When the accumulated time reaches the frame duration the clip
//! steps one frame forward, wrapping to 0 after the last frame, and the
//! accumulator resets to zero. Leftover time is dropped rather than carried.

use glam::Vec2;
use serde::Deserialize;
use thiserror::Error;

/// Location of a frame on a sprite-sheet grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GridCoord {
    pub col: u32,
    pub row: u32,
}

impl GridCoord {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// What an animated object does when its active clip wraps around.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipEnd {
    /// Keep looping the same clip.
    #[default]
    Hold,
    /// Switch the owning object to another clip by index.
    AdvanceToNext(usize),
}

/// Axis-aligned rectangle in pixels, top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AnimationError {
    #[error("animation has no frames")]
    NoFrames,
    #[error("frame duration must be positive and finite, got {0}")]
    BadDuration(f64),
}

#[derive(Debug, Clone)]
pub struct Animation {
    frames: Vec<GridCoord>,
    frame_duration: f64,
    elapsed: f64,
    current_frame: usize,
    wrapped: bool,
    pub on_end: ClipEnd,
}

impl Animation {
    pub fn new(frames: Vec<GridCoord>, frame_duration: f64) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames);
        }
        if !(frame_duration.is_finite() && frame_duration > 0.0) {
            return Err(AnimationError::BadDuration(frame_duration));
        }
        Ok(Self {
            frames,
            frame_duration,
            elapsed: 0.0,
            current_frame: 0,
            wrapped: false,
            on_end: ClipEnd::Hold,
        })
    }

    pub fn with_end(mut self, on_end: ClipEnd) -> Self {
        self.on_end = on_end;
        self
    }

    /// Accumulate `dt` seconds. Returns true when the frame advanced.
    pub fn advance(&mut self, dt: f64) -> bool {
        self.wrapped = false;
        self.elapsed += dt;

        if self.elapsed >= self.frame_duration {
            self.current_frame += 1;
            if self.current_frame >= self.frames.len() {
                self.current_frame = 0;
                self.wrapped = true;
            }
            self.elapsed = 0.0;
            return true;
        }
        false
    }

    /// True when the most recent `advance` wrapped back to the first frame.
    pub fn wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.current_frame = 0;
        self.wrapped = false;
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame_duration(&self) -> f64 {
        self.frame_duration
    }

    pub fn current_coord(&self) -> GridCoord {
        self.frames[self.current_frame]
    }
}

/// Source rectangle of a grid cell on a sheet whose frames are `frame_dims` pixels.
pub fn frame_source_rect(coord: GridCoord, frame_dims: Vec2) -> Rect {
    Rect::new(
        frame_dims.x * coord.col as f32,
        frame_dims.y * coord.row as f32,
        frame_dims.x,
        frame_dims.y,
    )
}

/// Rectangle of size `dims` centered on `position`.
pub fn centered_rect(position: Vec2, dims: Vec2) -> Rect {
    Rect::new(
        position.x - dims.x * 0.5,
        position.y - dims.y * 0.5,
        dims.x,
        dims.y,
    )
}

/// A set of clips sharing one sprite sheet, drawn at a world position.
#[derive(Debug, Clone)]
pub struct AnimatedObject {
    pub animations: Vec<Animation>,
    active: usize,
    pub position: Vec2,
    /// Pixel size of one frame on the sheet.
    pub frame_dims: Vec2,
    /// On-screen size the frame is scaled to.
    pub display_dims: Vec2,
    /// Texture key (asset path) of the sprite sheet.
    pub texture: String,
}

impl AnimatedObject {
    /// Build an object with `active` clamped into range. Returns `None` when
    /// `animations` is empty.
    pub fn new(
        animations: Vec<Animation>,
        active: usize,
        position: Vec2,
        frame_dims: Vec2,
        display_dims: Vec2,
        texture: impl Into<String>,
    ) -> Option<Self> {
        if animations.is_empty() {
            return None;
        }
        let active = active.min(animations.len() - 1);
        Some(Self {
            animations,
            active,
            position,
            frame_dims,
            display_dims,
            texture: texture.into(),
        })
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Animation {
        &self.animations[self.active]
    }

    pub fn set_active(&mut self, index: usize) {
        if index >= self.animations.len() {
            log::warn!(
                "Ignoring switch to clip {} ({} clips on '{}')",
                index,
                self.animations.len(),
                self.texture
            );
            return;
        }
        self.active = index;
        self.animations[index].reset();
    }

    /// Advance the active clip by `dt`. Returns whether its frame advanced.
    pub fn update(&mut self, dt: f64) -> bool {
        let animation = &mut self.animations[self.active];
        let advanced = animation.advance(dt);
        let (wrapped, on_end) = (animation.wrapped(), animation.on_end);
        if let (true, ClipEnd::AdvanceToNext(next)) = (wrapped, on_end) {
            self.set_active(next.min(self.animations.len() - 1));
        }
        advanced
    }

    pub fn source_rect(&self) -> Rect {
        frame_source_rect(self.active().current_coord(), self.frame_dims)
    }

    pub fn dest_rect(&self) -> Rect {
        centered_rect(self.position, self.display_dims)
    }
}
