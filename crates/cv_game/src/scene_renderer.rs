//! GPU half of the scene. Each frame's mesh is rebuilt on the CPU, streamed
//! into buffers that only ever grow, and replayed as one indexed draw per
//! texture run.

use crate::assets::TextureStore;
use crate::compositor::DrawCmd;
use crate::mesh::{build_mesh, DrawCall};
use cv_render::{ScreenCamera, SpritePipeline};
use wgpu::util::DeviceExt;

/// Byte capacity a stream buffer must grow to for `needed` bytes, or `None`
/// when `current` already fits. Growth is power-of-two and never shrinks.
pub fn grown_capacity(current: u64, needed: u64) -> Option<u64> {
    let needed = needed.max(wgpu::COPY_BUFFER_ALIGNMENT);
    (needed > current).then(|| needed.next_power_of_two())
}

struct StreamBuffer {
    label: &'static str,
    usage: wgpu::BufferUsages,
    buffer: wgpu::Buffer,
    capacity: u64,
}

impl StreamBuffer {
    fn new(device: &wgpu::Device, label: &'static str, usage: wgpu::BufferUsages) -> Self {
        let usage = usage | wgpu::BufferUsages::COPY_DST;
        let capacity = wgpu::COPY_BUFFER_ALIGNMENT;
        Self {
            label,
            usage,
            buffer: Self::allocate(device, label, usage, capacity),
            capacity,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        label: &'static str,
        usage: wgpu::BufferUsages,
        size: u64,
    ) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage,
            mapped_at_creation: false,
        })
    }

    fn write(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, bytes: &[u8]) {
        if let Some(capacity) = grown_capacity(self.capacity, bytes.len() as u64) {
            log::debug!("{} grows {} -> {} bytes", self.label, self.capacity, capacity);
            self.buffer = Self::allocate(device, self.label, self.usage, capacity);
            self.capacity = capacity;
        }
        if !bytes.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytes);
        }
    }
}

pub struct SceneRenderer {
    pipeline: SpritePipeline,
    camera_bind_group: wgpu::BindGroup,
    // The uniform is only written at creation; the bind group keeps it alive.
    _camera_buffer: wgpu::Buffer,
    vertices: StreamBuffer,
    indices: StreamBuffer,
    draw_calls: Vec<DrawCall>,
    command_count: usize,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        camera: &ScreenCamera,
    ) -> Self {
        let pipeline = SpritePipeline::new(device, surface_format);
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Screen Camera"),
            contents: bytemuck::cast_slice(&[camera.build_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let camera_bind_group = pipeline.create_camera_bind_group(device, &camera_buffer);

        Self {
            vertices: StreamBuffer::new(device, "Scene Vertices", wgpu::BufferUsages::VERTEX),
            indices: StreamBuffer::new(device, "Scene Indices", wgpu::BufferUsages::INDEX),
            pipeline,
            camera_bind_group,
            _camera_buffer: camera_buffer,
            draw_calls: Vec::new(),
            command_count: 0,
        }
    }

    pub fn pipeline(&self) -> &SpritePipeline {
        &self.pipeline
    }

    /// Draw commands in the most recent upload, before merging.
    pub fn command_count(&self) -> usize {
        self.command_count
    }

    pub fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        cmds: &[DrawCmd],
        textures: &TextureStore,
    ) {
        let mesh = build_mesh(cmds, textures);
        self.vertices
            .write(device, queue, bytemuck::cast_slice(&mesh.vertices));
        self.indices
            .write(device, queue, bytemuck::cast_slice(&mesh.indices));
        self.draw_calls = mesh.draw_calls;
        self.command_count = cmds.len();
    }

    /// Clear `view` to black and draw the last uploaded mesh.
    pub fn draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        textures: &TextureStore,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            ..Default::default()
        });

        pass.set_pipeline(&self.pipeline.render_pipeline);
        pass.set_bind_group(0, &self.camera_bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertices.buffer.slice(..));
        pass.set_index_buffer(self.indices.buffer.slice(..), wgpu::IndexFormat::Uint32);

        // build_mesh already merged adjacent runs, so every call rebinds.
        for call in &self.draw_calls {
            let Some(texture) = textures.get(&call.texture_key) else {
                continue;
            };
            pass.set_bind_group(1, &texture.bind_group, &[]);
            let end = call.index_start + call.index_count;
            pass.draw_indexed(call.index_start..end, 0, 0..1);
        }
    }
}
