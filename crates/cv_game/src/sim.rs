use crate::config::{GameConfig, SheetConfig};
use crate::entity::Entity;
use crate::movement::PlayerMotion;
use cv_core::animation::AnimatedObject;
use cv_core::input::{InputState, Key};
use glam::Vec2;

/// All mutable per-frame state of the scene.
#[derive(Debug, Clone)]
pub struct SimState {
    pub player: PlayerMotion,
    pub entities: Vec<Entity>,
    pub cat_body: AnimatedObject,
    pub cat_tail: AnimatedObject,
    pub cat_face: AnimatedObject,
    /// Degrees, decreasing over time (counter-clockwise on screen).
    pub wheel_angle: f32,
    pub dot_shift: f32,
    pub show_collision_boxes: bool,
}

impl SimState {
    pub fn from_config(config: &GameConfig) -> Result<Self, String> {
        let start = config.player.start;
        let entities = config
            .entities
            .iter()
            .map(|e| Entity::new(start + e.offset, e.half_dim))
            .collect();

        let cat_body = build_sheet("body", &config.cat.body, config, start)?;
        let cat_tail = build_sheet("tail", &config.cat.tail, config, start)?;
        let cat_face = build_sheet("face", &config.cat.face, config, start)?;

        log::info!("Num anis: {}", cat_body.animations.len());
        for (i, clip) in cat_body.animations.iter().enumerate() {
            log::info!("animation {}: num of frames {}", i, clip.num_frames());
        }

        Ok(Self {
            player: PlayerMotion::new(start, config.player.grounded),
            entities,
            cat_body,
            cat_tail,
            cat_face,
            wheel_angle: 0.0,
            dot_shift: 0.0,
            show_collision_boxes: config.debug.collision_boxes,
        })
    }

    pub fn update(&mut self, input: &InputState, dt: f64, config: &GameConfig) {
        let dt_f32 = dt as f32;

        self.player
            .step(input.direction(), dt_f32, &config.movement);
        self.cat_body.position = self.player.position;
        self.cat_body.update(dt);

        let conveyor = &config.conveyor;
        self.wheel_angle = (self.wheel_angle - conveyor.wheel_spin_deg_per_sec * dt_f32) % 360.0;
        self.dot_shift += conveyor.dot_speed * dt_f32;
        if self.dot_shift > conveyor.dot_spacing {
            self.dot_shift = 0.0;
        }

        if input.is_pressed(Key::F4) {
            self.show_collision_boxes = !self.show_collision_boxes;
            log::info!(
                "Collision boxes {}",
                if self.show_collision_boxes { "on" } else { "off" }
            );
        }
    }

    /// How many entity boxes hold the player's position (edges count).
    pub fn entities_under_player(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.contains(self.player.position))
            .count()
    }
}

fn build_sheet(
    name: &str,
    sheet: &SheetConfig,
    config: &GameConfig,
    position: Vec2,
) -> Result<AnimatedObject, String> {
    let clips = sheet
        .clips
        .iter()
        .enumerate()
        .map(|(i, clip)| {
            clip.build()
                .map_err(|e| format!("cat.{name} clip {i}: {e}"))
        })
        .collect::<Result<Vec<_>, String>>()?;

    AnimatedObject::new(
        clips,
        sheet.active,
        position,
        config.cat.frame_dims,
        config.cat.display_dims,
        sheet.texture.as_str(),
    )
    .ok_or_else(|| format!("cat.{name} has no clips"))
}
