use crate::{
    data_structures::texture::Texture,
    pipelines::{BLEND_OVER, PipelineState, mk_pipeline_layout, mk_render_pipeline},
};

/// World-space corner of a camera-facing sprite quad.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl SpriteVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Label sprites: textured, blended, depth tested without writing depth.
pub fn mk_sprite_pipeline(
    device: &wgpu::Device,
    camera_layout: &wgpu::BindGroupLayout,
    object_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Sprite Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
    });
    let layout = mk_pipeline_layout(
        device,
        "Sprite Pipeline Layout",
        &[camera_layout, object_layout, texture_layout],
    );
    mk_render_pipeline(
        device,
        "Sprite Pipeline",
        &layout,
        color_format,
        PipelineState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            blend: Some(BLEND_OVER),
            depth: Some((Texture::DEPTH_FORMAT, false)),
        },
        &[SpriteVertex::desc()],
        &shader,
    )
}
