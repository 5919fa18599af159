//! Conveyor Cat: main loop and application entry point.
//!
//! winit drives the event loop via `ApplicationHandler`. Each `RedrawRequested`
//! runs exactly one variable-step frame:
//!
//!   1. `FrameClock::begin_frame()` measures the elapsed time (0 on the first frame)
//!   2. config hot reload at the frame boundary, then F3 / M / Space hotkeys
//!   3. `SimState::update` moves the player, advances the cat clip, spins the belt
//!   4. the looping music is topped up
//!   5. `compose_scene` emits the back-to-front draw list, flattened into one mesh
//!   6. sprite pass, egui overlay pass, vsync-gated present
//!
//! Key events arriving between redraws only touch the input table; its edge
//! flags are cleared after the frame that consumed them.

mod assets;
mod compositor;
mod config;
mod entity;
mod mesh;
mod movement;
#[cfg(test)]
mod replay;
mod scene_renderer;
mod sim;
mod sound;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rand::rngs::ThreadRng;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use assets::TextureStore;
use compositor::{compose_scene, RandJitter};
use config::{load_config_from_path, load_or_default, ConfigWatcher, GameConfig, DEFAULT_CONFIG_PATH};
use cv_audio::DeviceSink;
use cv_core::input::{InputState, Key};
use cv_core::time::FrameClock;
use cv_devtools::{DebugOverlay, OverlayStats};
use cv_platform::window::PlatformConfig;
use cv_render::{GpuContext, ScreenCamera};
use scene_renderer::SceneRenderer;
use sim::SimState;
use sound::GameAudio;

/// Failures that stop the game before the first frame.
#[derive(Debug, Error)]
enum InitError {
    #[error("could not create event loop: {0}")]
    EventLoop(String),
    #[error("could not create window: {0}")]
    Window(String),
    #[error("could not initialize GPU: {0}")]
    Gpu(String),
    #[error("scene config is unusable: {0}")]
    Config(String),
}

/// Everything that exists once the window and GPU surface are up.
struct GameState {
    window: Arc<Window>,
    gpu: GpuContext,
    clock: FrameClock,
    input: InputState,
    scene: SceneRenderer,
    debug_overlay: DebugOverlay,
    textures: TextureStore,
    audio: GameAudio<DeviceSink>,
    jitter: RandJitter<ThreadRng>,

    config: GameConfig,
    config_watcher: ConfigWatcher,
    sim: SimState,
}

impl GameState {
    fn new(window: Arc<Window>, config: GameConfig, config_path: PathBuf) -> Result<Self, InitError> {
        let gpu = GpuContext::new(window.clone()).map_err(InitError::Gpu)?;
        let camera = ScreenCamera::new(config.window.width, config.window.height);
        let scene = SceneRenderer::new(&gpu.device, gpu.surface_format, &camera);
        let debug_overlay = DebugOverlay::new(&gpu.device, gpu.surface_format, &window);
        let sim = SimState::from_config(&config).map_err(InitError::Config)?;

        let mut textures = TextureStore::new(&gpu.device, &gpu.queue, scene.pipeline());
        textures.load_all(
            &gpu.device,
            &gpu.queue,
            scene.pipeline(),
            config.texture_paths(),
        );
        log::info!(
            "Textures: {} loaded, {} missing",
            textures.loaded_count(),
            textures.missing_count()
        );

        let audio = GameAudio::open(&config.sounds);

        Ok(Self {
            window,
            gpu,
            clock: FrameClock::new(),
            input: InputState::new(),
            scene,
            debug_overlay,
            textures,
            audio,
            jitter: RandJitter::new(rand::thread_rng()),
            config,
            config_watcher: ConfigWatcher::new(config_path),
            sim,
        })
    }

    fn poll_config_reload(&mut self) {
        if !self.config_watcher.should_reload() {
            return;
        }
        match load_config_from_path(self.config_watcher.path()) {
            Ok(reloaded) => {
                if reloaded.debug.collision_boxes != self.config.debug.collision_boxes {
                    self.sim.show_collision_boxes = reloaded.debug.collision_boxes;
                }
                self.config = self.config.with_tuning_from(reloaded);
                log::info!(
                    "Reloaded {} (window and asset changes apply on next start)",
                    self.config_watcher.path().display()
                );
            }
            Err(err) => log::error!("Config reload failed, keeping previous values: {err}"),
        }
    }

    fn handle_hotkeys(&mut self) {
        if self.input.is_pressed(Key::F3) {
            self.debug_overlay.toggle();
        }
        if self.input.is_pressed(Key::M) {
            self.audio.toggle_music();
        }
        if self.input.is_pressed(Key::Space) {
            self.audio.play_effect();
        }
    }

    fn compose(&mut self) {
        let cmds = compose_scene(&self.sim, &self.config, &self.textures, &mut self.jitter);
        self.scene
            .upload(&self.gpu.device, &self.gpu.queue, &cmds, &self.textures);
    }

    fn overlay_stats(&self) -> OverlayStats {
        let body = &self.sim.cat_body;
        OverlayStats {
            player_position: self.sim.player.position.into(),
            player_velocity: self.sim.player.velocity.into(),
            grounded: self.sim.player.grounded,
            entities_under_player: self.sim.entities_under_player() as u32,
            clip_frame: (body.active_index(), body.active().current_frame()),
            draw_commands: self.scene.command_count() as u32,
            textures_loaded: self.textures.loaded_count() as u32,
            textures_missing: self.textures.missing_count() as u32,
            audio_label: self.audio.label(),
            collision_boxes: self.sim.show_collision_boxes,
        }
    }

    fn render(&mut self) {
        let Some((output, view)) = self.gpu.begin_frame() else {
            return;
        };

        let stats = self.overlay_stats();
        let overlay = self
            .debug_overlay
            .prepare(&self.window, self.gpu.size, &self.clock, &stats);
        if overlay.actions.toggle_music {
            self.audio.toggle_music();
        }
        if overlay.actions.toggle_collision_boxes {
            self.sim.show_collision_boxes = !self.sim.show_collision_boxes;
        }

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });
        self.scene.draw(&mut encoder, &view, &self.textures);
        self.debug_overlay.draw(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &view,
            &overlay,
        );

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

struct App {
    platform: PlatformConfig,
    config_path: PathBuf,
    config: GameConfig,
    state: Option<GameState>,
    init_error: Option<InitError>,
}

impl App {
    fn new(config_path: PathBuf, config: GameConfig) -> Self {
        Self {
            platform: PlatformConfig {
                title: config.window.title.clone(),
                width: config.window.width,
                height: config.window.height,
            },
            config_path,
            config,
            state: None,
            init_error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<GameState, InitError> {
        let window = cv_platform::window::create_window(event_loop, &self.platform)
            .map_err(InitError::Window)?;
        GameState::new(window, self.config.clone(), self.config_path.clone())
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.init_error.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(state) => self.state = Some(state),
            Err(err) => {
                self.init_error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        let egui_consumed = state
            .debug_overlay
            .handle_window_event(&state.window, &event);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting.");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let w = physical_size.width;
                let h = physical_size.height;
                if w > 0 && h > 0 {
                    state.gpu.resize(w, h);
                    log::info!("Resized to {}x{}", w, h);
                }
            }

            WindowEvent::KeyboardInput { event, .. } if !egui_consumed => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    if let Some(game_key) = map_key(key_code) {
                        match event.state {
                            ElementState::Pressed => state.input.key_down(game_key),
                            ElementState::Released => state.input.key_up(game_key),
                        }
                    }
                }
                if state.input.quit_requested() {
                    log::info!("Escape pressed, exiting.");
                    event_loop.exit();
                }
            }

            WindowEvent::RedrawRequested => {
                if state.gpu.size.0 == 0 || state.gpu.size.1 == 0 {
                    return;
                }

                let dt = state.clock.begin_frame();
                state.poll_config_reload();
                state.handle_hotkeys();

                state.sim.update(&state.input, dt, &state.config);
                state.audio.tick();

                state.compose();
                state.render();

                state.input.end_frame();
            }

            _ => {}
        }
    }
}

fn map_key(key_code: KeyCode) -> Option<Key> {
    match key_code {
        KeyCode::ArrowLeft => Some(Key::Left),
        KeyCode::ArrowRight => Some(Key::Right),
        KeyCode::ArrowUp => Some(Key::Up),
        KeyCode::ArrowDown => Some(Key::Down),
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Space => Some(Key::Space),
        KeyCode::Escape => Some(Key::Escape),
        KeyCode::KeyM => Some(Key::M),
        KeyCode::F3 => Some(Key::F3),
        KeyCode::F4 => Some(Key::F4),
        _ => None,
    }
}

fn run(config_path: PathBuf, config: GameConfig) -> Result<(), InitError> {
    let event_loop = EventLoop::new().map_err(|e| InitError::EventLoop(e.to_string()))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config_path, config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| InitError::EventLoop(e.to_string()))?;

    match app.init_error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Conveyor Cat starting...");

    // Only the first argument is read; anything after it is ignored.
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let config = load_or_default(&config_path);

    match run(config_path, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_game_key_has_a_binding() {
        let bound: Vec<Key> = [
            KeyCode::ArrowLeft,
            KeyCode::ArrowRight,
            KeyCode::ArrowUp,
            KeyCode::ArrowDown,
            KeyCode::KeyW,
            KeyCode::KeyA,
            KeyCode::KeyS,
            KeyCode::KeyD,
            KeyCode::Space,
            KeyCode::Escape,
            KeyCode::KeyM,
            KeyCode::F3,
            KeyCode::F4,
        ]
        .into_iter()
        .filter_map(map_key)
        .collect();
        assert_eq!(bound, Key::ALL.to_vec());
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn init_errors_name_their_stage() {
        let err = InitError::Gpu("no adapter".to_string());
        assert_eq!(err.to_string(), "could not initialize GPU: no adapter");
        assert!(InitError::Window("x".into()).to_string().starts_with("could not create window"));
    }
}
