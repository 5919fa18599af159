use crate::compositor::TextureSizes;
use cv_render::{SpritePipeline, Texture};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Key of the built-in 1x1 white texture that flat rects sample.
pub const WHITE_TEXTURE: &str = "__white";

pub struct GpuSpriteTexture {
    pub texture: Texture,
    pub bind_group: wgpu::BindGroup,
}

/// GPU textures keyed by asset path. Dropping the store releases them.
pub struct TextureStore {
    textures: HashMap<Arc<str>, GpuSpriteTexture>,
    missing: Vec<String>,
}

impl TextureStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, pipeline: &SpritePipeline) -> Self {
        let white = Texture::from_rgba8(device, queue, &[255, 255, 255, 255], 1, 1, WHITE_TEXTURE);
        let bind_group = pipeline.create_texture_bind_group(device, &white);
        let mut textures = HashMap::new();
        textures.insert(
            Arc::from(WHITE_TEXTURE),
            GpuSpriteTexture {
                texture: white,
                bind_group,
            },
        );
        Self {
            textures,
            missing: Vec::new(),
        }
    }

    /// Load every path not already resident. Failures are logged and left
    /// out of the store so the compositor draws placeholders instead.
    pub fn load_all<'a>(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pipeline: &SpritePipeline,
        paths: impl IntoIterator<Item = &'a str>,
    ) {
        for path in paths {
            if self.textures.contains_key(path) || self.missing.iter().any(|m| m == path) {
                continue;
            }
            match Texture::from_path(device, queue, Path::new(path)) {
                Ok(texture) => {
                    log::info!(
                        "Loaded texture {} ({}x{})",
                        path,
                        texture.size.0,
                        texture.size.1
                    );
                    let bind_group = pipeline.create_texture_bind_group(device, &texture);
                    self.textures.insert(
                        Arc::from(path),
                        GpuSpriteTexture {
                            texture,
                            bind_group,
                        },
                    );
                }
                Err(err) => {
                    log::warn!("{path} not loaded: {err}");
                    self.missing.push(path.to_string());
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&GpuSpriteTexture> {
        self.textures.get(key)
    }

    /// Loaded textures, not counting the built-in white.
    pub fn loaded_count(&self) -> usize {
        self.textures.len() - 1
    }

    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }
}

impl TextureSizes for TextureStore {
    fn size_of(&self, key: &str) -> Option<(u32, u32)> {
        self.textures.get(key).map(|t| t.texture.size)
    }
}
