//! Lines and meshes.
//!
//! One shader, six pipeline variants: lines or triangles, opaque or blended,
//! and for triangles back-face culled or double sided. Blended variants test
//! but do not write depth.

use std::collections::HashMap;

use crate::{
    data_structures::{
        geometry::{Topology, Vertex},
        scene_graph::Material,
        texture::Texture,
    },
    pipelines::{BLEND_OVER, PipelineState, mk_pipeline_layout, mk_render_pipeline},
};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneKey {
    pub lines: bool,
    pub transparent: bool,
    pub double_sided: bool,
}

impl SceneKey {
    /// Point clouds are drawn as triangles.
    pub fn of(topology: Topology, material: &Material) -> Self {
        let lines = topology == Topology::LineList;
        Self {
            lines,
            transparent: material.transparent,
            // culling is meaningless for lines and camera-facing quads
            double_sided: lines || topology == Topology::PointList || material.double_sided,
        }
    }
}

pub struct ScenePipelines {
    pipelines: HashMap<SceneKey, wgpu::RenderPipeline>,
}

impl ScenePipelines {
    pub fn new(
        device: &wgpu::Device,
        camera_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        color_format: wgpu::TextureFormat,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });
        let layout = mk_pipeline_layout(
            device,
            "Scene Pipeline Layout",
            &[camera_layout, object_layout],
        );

        let mut pipelines = HashMap::new();
        for lines in [true, false] {
            for transparent in [false, true] {
                for double_sided in [false, true] {
                    if lines && !double_sided {
                        continue;
                    }
                    let key = SceneKey {
                        lines,
                        transparent,
                        double_sided,
                    };
                    let state = PipelineState {
                        topology: if lines {
                            wgpu::PrimitiveTopology::LineList
                        } else {
                            wgpu::PrimitiveTopology::TriangleList
                        },
                        cull_mode: if double_sided {
                            None
                        } else {
                            Some(wgpu::Face::Back)
                        },
                        blend: Some(if transparent {
                            BLEND_OVER
                        } else {
                            wgpu::BlendState::REPLACE
                        }),
                        depth: Some((Texture::DEPTH_FORMAT, !transparent)),
                    };
                    let pipeline = mk_render_pipeline(
                        device,
                        "Scene Pipeline",
                        &layout,
                        color_format,
                        state,
                        &[Vertex::desc()],
                        &shader,
                    );
                    pipelines.insert(key, pipeline);
                }
            }
        }
        Self { pipelines }
    }

    pub fn get(&self, key: SceneKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&key)
    }
}
