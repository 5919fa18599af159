use crate::movement::MovementConfig;
use cv_core::animation::{Animation, AnimationError, ClipEnd, GridCoord};
use glam::Vec2;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub const DEFAULT_CONFIG_PATH: &str = "assets/config/conveyor.json";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    pub window: WindowConfig,
    pub movement: MovementConfig,
    pub player: PlayerConfig,
    pub cat: CatConfig,
    pub entities: Vec<EntityConfig>,
    pub textures: TextureConfig,
    pub sounds: SoundConfig,
    pub conveyor: ConveyorConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PlayerConfig {
    pub start: Vec2,
    pub grounded: bool,
    /// Half-size of the flat square drawn when the body sheet is missing.
    pub placeholder_half_size: f32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatConfig {
    pub frame_dims: Vec2,
    pub display_dims: Vec2,
    pub body: SheetConfig,
    pub tail: SheetConfig,
    pub face: SheetConfig,
}

/// One sprite sheet and the clips cut from it.
#[derive(Debug, Deserialize, Clone)]
pub struct SheetConfig {
    pub texture: String,
    #[serde(default)]
    pub active: usize,
    pub clips: Vec<ClipConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClipConfig {
    pub frames: Vec<GridCoord>,
    pub frame_duration: f64,
    #[serde(default)]
    pub on_end: ClipEnd,
}

impl ClipConfig {
    pub fn build(&self) -> Result<Animation, AnimationError> {
        Ok(Animation::new(self.frames.clone(), self.frame_duration)?.with_end(self.on_end))
    }
}

/// Entities sit at `player.start + offset`.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct EntityConfig {
    pub offset: Vec2,
    pub half_dim: Vec2,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TextureConfig {
    pub background: String,
    pub interior: String,
    pub spawn_strip: String,
    pub belt: String,
    pub wheel: String,
    pub dot: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SoundConfig {
    pub music: Option<String>,
    pub effect: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConveyorConfig {
    pub wheel_xs: Vec<f32>,
    pub wheel_y: f32,
    pub wheel_spin_deg_per_sec: f32,
    pub dot_count: usize,
    pub dot_spacing: f32,
    pub dot_speed: f32,
    pub dot_rows: [f32; 2],
    /// Max rattle, in pixels, applied to wheel and dot centers.
    pub jitter: f32,
    /// Loaded interior, spawn-strip and belt art is drawn at (0, 0) at native
    /// size. These place the flat blocks drawn when that art is missing.
    pub interior_placeholder_origin: Vec2,
    pub interior_placeholder_size: Vec2,
    pub belt_placeholder_origin: Vec2,
    pub belt_placeholder_size: Vec2,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DebugConfig {
    pub collision_boxes: bool,
    pub outline_thickness: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            window: WindowConfig::default(),
            movement: MovementConfig::default(),
            player: PlayerConfig::default(),
            cat: CatConfig::default(),
            entities: vec![
                EntityConfig {
                    offset: Vec2::new(600.0, 0.0),
                    half_dim: Vec2::new(50.0, 100.0),
                },
                EntityConfig {
                    offset: Vec2::new(900.0, 0.0),
                    half_dim: Vec2::new(70.0, 120.0),
                },
            ],
            textures: TextureConfig::default(),
            sounds: SoundConfig::default(),
            conveyor: ConveyorConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Conveyor Cat".to_string(),
            width: 1920,
            height: 1080,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            start: Vec2::new(180.0, 780.0),
            grounded: true,
            placeholder_half_size: 25.0,
        }
    }
}

fn strip_clip(frame_count: u32, frame_duration: f64) -> ClipConfig {
    ClipConfig {
        frames: (0..frame_count).map(|col| GridCoord { col, row: 0 }).collect(),
        frame_duration,
        on_end: ClipEnd::Hold,
    }
}

impl Default for CatConfig {
    fn default() -> Self {
        Self {
            frame_dims: Vec2::splat(1000.0),
            display_dims: Vec2::splat(356.0),
            body: SheetConfig {
                texture: "res/cat_animation_body.png".to_string(),
                active: 1,
                clips: vec![strip_clip(1, 0.6), strip_clip(3, 0.6)],
            },
            tail: SheetConfig {
                texture: "res/cat_animation_tail.png".to_string(),
                active: 0,
                clips: vec![strip_clip(3, 0.6)],
            },
            face: SheetConfig {
                texture: "res/cat_animation_face.png".to_string(),
                active: 0,
                clips: vec![strip_clip(3, 0.6)],
            },
        }
    }
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            background: "res/background_nolight1.png".to_string(),
            interior: "res/conveyorbelt_interior.png".to_string(),
            spawn_strip: "res/conveyorbelt_static1.png".to_string(),
            belt: "res/conveyorbelt_frontwheel1.png".to_string(),
            wheel: "res/conveyorbelt_circle1.png".to_string(),
            dot: "res/conveyorbelt_dot1.png".to_string(),
        }
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            music: Some("res/music.wav".to_string()),
            effect: Some("res/effect.wav".to_string()),
        }
    }
}

impl Default for ConveyorConfig {
    fn default() -> Self {
        Self {
            wheel_xs: vec![98.0, 300.0, 490.0, 664.0, 827.0, 1026.0, 1219.0, 1432.0],
            wheel_y: 990.0,
            wheel_spin_deg_per_sec: 290.0,
            dot_count: 17,
            dot_spacing: 100.0,
            dot_speed: 100.0,
            dot_rows: [944.0, 1032.0],
            jitter: 1.0,
            interior_placeholder_origin: Vec2::new(0.0, 890.0),
            interior_placeholder_size: Vec2::new(400.0, 400.0),
            belt_placeholder_origin: Vec2::new(0.0, 890.0),
            belt_placeholder_size: Vec2::new(1920.0, 205.0),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            collision_boxes: false,
            outline_thickness: 3.0,
        }
    }
}

impl GameConfig {
    /// Every texture path the scene can draw, in load order.
    pub fn texture_paths(&self) -> Vec<&str> {
        vec![
            self.textures.background.as_str(),
            self.cat.body.texture.as_str(),
            self.cat.tail.texture.as_str(),
            self.cat.face.texture.as_str(),
            self.textures.interior.as_str(),
            self.textures.spawn_strip.as_str(),
            self.textures.wheel.as_str(),
            self.textures.dot.as_str(),
            self.textures.belt.as_str(),
        ]
    }

    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.window.width as f32, self.window.height as f32)
    }

    /// Hot-reload merge: tuning sections come from `reloaded`, while the
    /// window, assets, clips and placement stay as they were at startup.
    pub fn with_tuning_from(&self, reloaded: GameConfig) -> GameConfig {
        GameConfig {
            movement: reloaded.movement,
            conveyor: reloaded.conveyor,
            debug: reloaded.debug,
            ..self.clone()
        }
    }
}

/// Polls a config file's mtime so edits can be picked up between frames.
pub struct ConfigWatcher {
    config_path: PathBuf,
    last_seen_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(config_path: PathBuf) -> Self {
        let last_seen_modified = modified_time(&config_path);
        Self {
            config_path,
            last_seen_modified,
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn should_reload(&mut self) -> bool {
        let current = modified_time(&self.config_path);
        match (self.last_seen_modified, current) {
            (Some(old), Some(now)) if now > old => {
                self.last_seen_modified = Some(now);
                true
            }
            (None, Some(now)) => {
                self.last_seen_modified = Some(now);
                true
            }
            _ => false,
        }
    }
}

pub fn load_config_from_path(config_path: &Path) -> Result<GameConfig, String> {
    let raw = fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read config file {}: {e}", config_path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", config_path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Startup load: a missing file means built-in defaults, a broken one is
/// reported and also falls back to defaults.
pub fn load_or_default(config_path: &Path) -> GameConfig {
    if !config_path.exists() {
        log::info!(
            "No config at {}, using built-in defaults",
            config_path.display()
        );
        return GameConfig::default();
    }
    match load_config_from_path(config_path) {
        Ok(config) => {
            log::info!("Loaded config {}", config_path.display());
            config
        }
        Err(e) => {
            log::error!("{e}. Using built-in defaults.");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.window.width == 0 || config.window.height == 0 {
        return Err("Config validation failed: window size must be non-zero".to_string());
    }
    if config.movement.max_speed <= 0.0 {
        return Err("Config validation failed: movement.max_speed must be > 0".to_string());
    }
    if config.conveyor.dot_spacing <= 0.0 {
        return Err("Config validation failed: conveyor.dot_spacing must be > 0".to_string());
    }

    for (name, sheet) in [
        ("body", &config.cat.body),
        ("tail", &config.cat.tail),
        ("face", &config.cat.face),
    ] {
        if sheet.clips.is_empty() {
            return Err(format!(
                "Config validation failed: cat.{name} has no clips"
            ));
        }
        if sheet.active >= sheet.clips.len() {
            return Err(format!(
                "Config validation failed: cat.{name}.active = {} but only {} clips",
                sheet.active,
                sheet.clips.len()
            ));
        }
        for (i, clip) in sheet.clips.iter().enumerate() {
            clip.build()
                .map_err(|e| format!("Config validation failed: cat.{name} clip {i}: {e}"))?;
            if let ClipEnd::AdvanceToNext(next) = clip.on_end {
                if next >= sheet.clips.len() {
                    return Err(format!(
                        "Config validation failed: cat.{name} clip {i} chains to missing clip {next}"
                    ));
                }
            }
        }
    }

    Ok(())
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).ok()?.modified().ok()
}
