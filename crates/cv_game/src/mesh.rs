use crate::assets::WHITE_TEXTURE;
use crate::compositor::{DrawCmd, TextureSizes};
use cv_render::{build_quad, SpriteVertex, QUAD_INDICES};
use std::sync::Arc;

/// A contiguous run of indices that share the same texture binding.
/// Consecutive quads on the same texture merge into one `draw_indexed`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub texture_key: Arc<str>,
    pub index_start: u32,
    pub index_count: u32,
}

#[derive(Debug, Default)]
pub struct SceneMesh {
    pub vertices: Vec<SpriteVertex>,
    pub indices: Vec<u32>,
    pub draw_calls: Vec<DrawCall>,
}

/// Flatten the draw list into one vertex/index stream, in draw order.
/// Commands whose texture is unknown to `textures` are dropped; the
/// compositor already substituted placeholders for them.
pub fn build_mesh(cmds: &[DrawCmd], textures: &impl TextureSizes) -> SceneMesh {
    let mut mesh = SceneMesh {
        vertices: Vec::with_capacity(cmds.len() * 4),
        indices: Vec::with_capacity(cmds.len() * 6),
        draw_calls: Vec::new(),
    };

    for cmd in cmds {
        let key = cmd.texture.as_deref().unwrap_or(WHITE_TEXTURE);
        let size = match cmd.texture.as_deref() {
            Some(path) => match textures.size_of(path) {
                Some(size) => size,
                None => continue,
            },
            None => (1, 1),
        };

        let base_index = mesh.vertices.len() as u32;
        mesh.vertices.extend_from_slice(&build_quad(&cmd.quad, size));

        let draw_start = mesh.indices.len() as u32;
        mesh.indices
            .extend(QUAD_INDICES.iter().map(|i| base_index + i));
        push_draw_call(
            &mut mesh.draw_calls,
            key,
            draw_start,
            QUAD_INDICES.len() as u32,
        );
    }

    mesh
}

fn push_draw_call(draw_calls: &mut Vec<DrawCall>, texture_key: &str, index_start: u32, index_count: u32) {
    if let Some(last) = draw_calls.last_mut() {
        let contiguous = last.index_start + last.index_count == index_start;
        if &*last.texture_key == texture_key && contiguous {
            last.index_count += index_count;
            return;
        }
    }
    draw_calls.push(DrawCall {
        texture_key: Arc::from(texture_key),
        index_start,
        index_count,
    });
}
