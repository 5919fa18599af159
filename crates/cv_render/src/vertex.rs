/// One corner of a screen-space sprite quad. `position` is in logical
/// pixels (origin top-left, +y down); `color` tints the sampled texel.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];

impl SpriteVertex {
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_offsets_match_struct_layout() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 32);
        assert_eq!(ATTRIBUTES[0].offset, std::mem::offset_of!(SpriteVertex, position) as u64);
        assert_eq!(ATTRIBUTES[1].offset, std::mem::offset_of!(SpriteVertex, tex_coords) as u64);
        assert_eq!(ATTRIBUTES[2].offset, std::mem::offset_of!(SpriteVertex, color) as u64);
    }
}
