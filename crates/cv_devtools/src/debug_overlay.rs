//! egui debug window drawn over the finished scene.
//!
//! A frame is two calls. `prepare()` runs the UI and tessellates it into an
//! [`OverlayFrame`]; the caller reads the clicked actions off that frame,
//! records its own passes, then hands the frame to `draw()`, which uploads
//! egui's buffers and paints into a second pass that loads the scene.
//!
//! The window only shows while `visible` (F3), but winit events are always
//! forwarded so egui keeps its pointer state current.

use cv_core::time::FrameClock;
use winit::window::Window;

#[derive(Debug, Clone, Default)]
pub struct OverlayStats {
    pub player_position: (f32, f32),
    pub player_velocity: (f32, f32),
    pub grounded: bool,
    /// Entity boxes the player currently stands inside.
    pub entities_under_player: u32,
    /// Active clip index and its current frame, e.g. (1, 2).
    pub clip_frame: (usize, usize),
    pub draw_commands: u32,
    pub textures_loaded: u32,
    pub textures_missing: u32,
    pub audio_label: String,
    pub collision_boxes: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayActions {
    pub toggle_music: bool,
    pub toggle_collision_boxes: bool,
}

/// Tessellated UI for one frame, plus whatever the user clicked.
pub struct OverlayFrame {
    pub actions: OverlayActions,
    primitives: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
    screen: egui_wgpu::ScreenDescriptor,
}

pub struct DebugOverlay {
    ctx: egui::Context,
    winit_state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pub visible: bool,
}

impl DebugOverlay {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, window: &Window) -> Self {
        let ctx = egui::Context::default();
        let winit_state =
            egui_winit::State::new(ctx.clone(), ctx.viewport_id(), window, None, None, None);
        let renderer = egui_wgpu::Renderer::new(device, surface_format, None, 1, false);
        Self {
            ctx,
            winit_state,
            renderer,
            visible: false,
        }
    }

    /// Returns true when egui consumed the event.
    pub fn handle_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.winit_state.on_window_event(window, event).consumed
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::info!("Debug overlay: {}", if self.visible { "ON" } else { "OFF" });
    }

    pub fn prepare(
        &mut self,
        window: &Window,
        size_in_pixels: (u32, u32),
        clock: &FrameClock,
        stats: &OverlayStats,
    ) -> OverlayFrame {
        let mut actions = OverlayActions::default();
        let visible = self.visible;
        let input = self.winit_state.take_egui_input(window);
        let output = self.ctx.run(input, |ctx| {
            if visible {
                egui::Window::new("Debug")
                    .default_pos([10.0, 10.0])
                    .show(ctx, |ui| stats_panel(ui, clock, stats, &mut actions));
            }
        });
        self.winit_state
            .handle_platform_output(window, output.platform_output);

        OverlayFrame {
            actions,
            primitives: self.ctx.tessellate(output.shapes, output.pixels_per_point),
            textures_delta: output.textures_delta,
            screen: egui_wgpu::ScreenDescriptor {
                size_in_pixels: [size_in_pixels.0, size_in_pixels.1],
                pixels_per_point: window.scale_factor() as f32,
            },
        }
    }

    /// Upload, paint on top of `view` and release textures egui dropped.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        frame: &OverlayFrame,
    ) {
        for (id, delta) in &frame.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }
        self.renderer
            .update_buffers(device, queue, encoder, &frame.primitives, &frame.screen);

        {
            // egui_wgpu wants a 'static pass; the encoder borrow ends with this block.
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Overlay Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.renderer
                .render(&mut pass, &frame.primitives, &frame.screen);
        }

        for id in &frame.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }
}

fn stats_panel(
    ui: &mut egui::Ui,
    clock: &FrameClock,
    stats: &OverlayStats,
    actions: &mut OverlayActions,
) {
    ui.label(format!("FPS: {:.1}", clock.smoothed_fps()));
    ui.label(format!("Frame time: {:.2} ms", clock.smoothed_frame_time_ms()));
    ui.label(format!("Frame: {}", clock.frame_count));

    ui.separator();
    for line in player_lines(stats) {
        ui.label(line);
    }

    ui.separator();
    ui.label(format!("Draw commands: {}", stats.draw_commands));
    ui.label(format!(
        "Textures: {} loaded, {} missing",
        stats.textures_loaded, stats.textures_missing
    ));

    ui.separator();
    ui.horizontal(|ui| {
        ui.label(&stats.audio_label);
        if ui.button("Toggle").clicked() {
            actions.toggle_music = true;
        }
    });
    if ui.button(boxes_button_label(stats.collision_boxes)).clicked() {
        actions.toggle_collision_boxes = true;
    }
}

fn player_lines(stats: &OverlayStats) -> [String; 5] {
    let (px, py) = stats.player_position;
    let (vx, vy) = stats.player_velocity;
    [
        format!("Player: ({px:.1}, {py:.1})"),
        format!("Velocity: ({vx:.1}, {vy:.1})"),
        format!("Grounded: {}", stats.grounded),
        format!("Inside boxes: {}", stats.entities_under_player),
        format!("Clip {} / frame {}", stats.clip_frame.0, stats.clip_frame.1),
    ]
}

fn boxes_button_label(showing: bool) -> &'static str {
    if showing {
        "Hide boxes"
    } else {
        "Show boxes"
    }
}
