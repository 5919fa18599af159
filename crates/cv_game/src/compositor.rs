//! Back-to-front draw list for one frame.
//!
//! The compositor is pure: it reads the simulation and the config, asks a
//! `TextureSizes` for the native size of each sheet, and emits `DrawCmd`s.
//! A texture that failed to load is drawn as a flat placeholder (or skipped
//! for pure decoration), so a broken asset folder still produces a frame.

use crate::config::GameConfig;
use crate::entity::outline_rects;
use crate::sim::SimState;
use cv_core::animation::{centered_rect, AnimatedObject, Rect};
use cv_render::Quad;
use glam::Vec2;
use rand::Rng;

const MAGENTA: [f32; 4] = [1.0, 0.0, 1.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BELT_BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const OUTLINE_RED: [f32; 4] = [1.0, 0.2, 0.2, 1.0];

/// One quad. `texture: None` is a flat rect in `quad.color`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCmd {
    pub texture: Option<String>,
    pub quad: Quad,
}

impl DrawCmd {
    pub fn textured(texture: &str, quad: Quad) -> Self {
        Self {
            texture: Some(texture.to_string()),
            quad,
        }
    }

    pub fn flat(dest: Rect, color: [f32; 4]) -> Self {
        Self {
            texture: None,
            quad: Quad::new(dest).with_color(color),
        }
    }
}

pub trait TextureSizes {
    /// Native pixel size, or `None` when the texture is not loaded.
    fn size_of(&self, key: &str) -> Option<(u32, u32)>;
}

/// Source of the per-frame rattle on wheel and dot centers.
pub trait Jitter {
    /// A value in `[-1, 1]`.
    fn sample(&mut self) -> f32;
}

pub struct RandJitter<R: Rng> {
    rng: R,
}

impl<R: Rng> RandJitter<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Jitter for RandJitter<R> {
    fn sample(&mut self) -> f32 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

pub struct NoJitter;

impl Jitter for NoJitter {
    fn sample(&mut self) -> f32 {
        0.0
    }
}

pub fn compose_scene(
    sim: &SimState,
    config: &GameConfig,
    textures: &impl TextureSizes,
    jitter: &mut impl Jitter,
) -> Vec<DrawCmd> {
    let mut out = Vec::new();
    let screen = config.screen_size();
    let tex = &config.textures;
    let conveyor = &config.conveyor;

    let screen_rect = Rect::new(0.0, 0.0, screen.x, screen.y);
    match textures.size_of(&tex.background) {
        Some(_) => out.push(DrawCmd::textured(&tex.background, Quad::new(screen_rect))),
        None => out.push(DrawCmd::flat(screen_rect, MAGENTA)),
    }

    if textures.size_of(&sim.cat_body.texture).is_some() {
        out.push(sheet_frame(&sim.cat_body));
    } else {
        let size = Vec2::splat(config.player.placeholder_half_size * 2.0);
        out.push(DrawCmd::flat(centered_rect(sim.player.position, size), GREEN));
    }
    for overlay in [&sim.cat_tail, &sim.cat_face] {
        if textures.size_of(&overlay.texture).is_some() {
            out.push(sheet_frame(overlay));
        }
    }

    let interior_placeholder = Rect::new(
        conveyor.interior_placeholder_origin.x,
        conveyor.interior_placeholder_origin.y,
        conveyor.interior_placeholder_size.x,
        conveyor.interior_placeholder_size.y,
    );
    for key in [&tex.interior, &tex.spawn_strip] {
        out.push(native_or_placeholder(textures, key, interior_placeholder, MAGENTA));
    }

    // Each layer rattles as one piece: a single center per frame.
    if let Some((w, h)) = textures.size_of(&tex.wheel) {
        let size = Vec2::new(w as f32, h as f32);
        let center = rattled_center(size, conveyor.jitter, jitter);
        for &x in &conveyor.wheel_xs {
            let dest = Rect::new(x - center.x, conveyor.wheel_y - center.y, size.x, size.y);
            out.push(DrawCmd::textured(
                &tex.wheel,
                Quad::new(dest).with_rotation(sim.wheel_angle, center),
            ));
        }
    }

    if let Some((w, h)) = textures.size_of(&tex.dot) {
        let size = Vec2::new(w as f32, h as f32);
        let center = rattled_center(size, conveyor.jitter, jitter);
        let [top_y, bottom_y] = conveyor.dot_rows;
        let spacing = conveyor.dot_spacing;
        // Top row scrolls left, bottom row right, one spacing behind.
        let rows = [(top_y, -sim.dot_shift), (bottom_y, sim.dot_shift - spacing)];
        for (row_y, shift) in rows {
            for i in 0..conveyor.dot_count {
                let x = i as f32 * spacing + shift - center.x;
                let dest = Rect::new(x, row_y - center.y, size.x, size.y);
                out.push(DrawCmd::textured(&tex.dot, Quad::new(dest)));
            }
        }
    }

    let belt_placeholder = Rect::new(
        conveyor.belt_placeholder_origin.x,
        conveyor.belt_placeholder_origin.y,
        conveyor.belt_placeholder_size.x,
        conveyor.belt_placeholder_size.y,
    );
    out.push(native_or_placeholder(textures, &tex.belt, belt_placeholder, BELT_BLUE));

    if sim.show_collision_boxes {
        for entity in &sim.entities {
            for bar in outline_rects(entity.bounds(), config.debug.outline_thickness) {
                out.push(DrawCmd::flat(bar, OUTLINE_RED));
            }
        }
    }

    out
}

fn sheet_frame(object: &AnimatedObject) -> DrawCmd {
    DrawCmd::textured(
        &object.texture,
        Quad::new(object.dest_rect()).with_source(object.source_rect()),
    )
}

/// Full-layer art is authored at screen size and drawn from (0, 0).
fn native_or_placeholder(
    textures: &impl TextureSizes,
    key: &str,
    placeholder: Rect,
    color: [f32; 4],
) -> DrawCmd {
    match textures.size_of(key) {
        Some((w, h)) => DrawCmd::textured(key, Quad::new(Rect::new(0.0, 0.0, w as f32, h as f32))),
        None => DrawCmd::flat(placeholder, color),
    }
}

fn rattled_center(size: Vec2, amplitude: f32, jitter: &mut impl Jitter) -> Vec2 {
    let rattle = Vec2::new(jitter.sample(), jitter.sample()) * amplitude;
    size * 0.5 + rattle
}
