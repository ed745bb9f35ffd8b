//! Places the visuals' off-screen targets on the window surface.
//!
//! The page is flattened into [`Layer`]s: a rectangle in window pixels, an
//! opacity and either a visual's surface or the flat splash overlay. Layers
//! are drawn in order over the page background.

use std::iter;

use wgpu::util::DeviceExt;

use crate::{
    data_structures::texture::{Texture, create_clamped_sampler},
    gpu::renderer::{Targets, WgpuRendererFactory},
    host::Rect,
    pipelines::{
        composite::{QuadVertex, mk_composite_pipeline},
        mk_texture_bind_group,
    },
    render::{Layer, LayerSource},
};

/// Two triangles covering `rect` in normalized device coordinates.
pub fn quad(rect: Rect, viewport: (u32, u32), opacity: f32) -> [QuadVertex; 6] {
    let (width, height) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
    let left = rect.x / width * 2.0 - 1.0;
    let right = (rect.x + rect.width) / width * 2.0 - 1.0;
    let top = 1.0 - rect.y / height * 2.0;
    let bottom = 1.0 - (rect.y + rect.height) / height * 2.0;
    let vertex = |x: f32, y: f32, u: f32, v: f32| QuadVertex {
        position: [x, y],
        tex_coords: [u, v],
        opacity,
    };
    let top_left = vertex(left, top, 0.0, 0.0);
    let top_right = vertex(right, top, 1.0, 0.0);
    let bottom_left = vertex(left, bottom, 0.0, 1.0);
    let bottom_right = vertex(right, bottom, 1.0, 1.0);
    [
        top_left,
        bottom_left,
        bottom_right,
        top_left,
        bottom_right,
        top_right,
    ]
}

/// Whether any part of `rect` lies inside the viewport.
pub fn is_visible(rect: &Rect, viewport: (u32, u32)) -> bool {
    rect.width > 0.0
        && rect.height > 0.0
        && rect.x < viewport.0 as f32
        && rect.y < viewport.1 as f32
        && rect.x + rect.width > 0.0
        && rect.y + rect.height > 0.0
}

pub struct Compositor {
    pipeline: wgpu::RenderPipeline,
    targets: Targets,
    _overlay: Texture,
    overlay_bind_group: wgpu::BindGroup,
    vertices: Option<(wgpu::Buffer, u64)>,
}

impl Compositor {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        renderers: &WgpuRendererFactory,
        surface_format: wgpu::TextureFormat,
        overlay_color: [u8; 4],
    ) -> anyhow::Result<Self> {
        let pipeline = mk_composite_pipeline(device, renderers.texture_layout(), surface_format);
        let overlay = Texture::solid(device, queue, overlay_color, "splash overlay")?;
        let sampler = create_clamped_sampler(device);
        let overlay_bind_group = mk_texture_bind_group(
            device,
            renderers.texture_layout(),
            &overlay,
            &sampler,
            "overlay_bind_group",
        );
        Ok(Self {
            pipeline,
            targets: renderers.targets(),
            _overlay: overlay,
            overlay_bind_group,
            vertices: None,
        })
    }

    /// Clears `view` to `clear` and draws `layers` in order. Layers outside
    /// the viewport and surfaces without a target are skipped.
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        viewport: (u32, u32),
        clear: wgpu::Color,
        layers: &[Layer],
    ) {
        let targets = self.targets.borrow();
        let visible: Vec<&Layer> = layers
            .iter()
            .filter(|layer| is_visible(&layer.rect, viewport) && layer.opacity > 0.0)
            .filter(|layer| match layer.source {
                LayerSource::Surface(surface) => targets.contains_key(&surface),
                LayerSource::Overlay => true,
            })
            .collect();
        let vertices: Vec<QuadVertex> = visible
            .iter()
            .flat_map(|layer| quad(layer.rect, viewport, layer.opacity.min(1.0)))
            .collect();
        let bytes: &[u8] = bytemuck::cast_slice(&vertices);

        if !bytes.is_empty() {
            let len = bytes.len() as u64;
            if let Some((buffer, _)) = self.vertices.as_ref().filter(|(_, capacity)| *capacity >= len) {
                queue.write_buffer(buffer, 0, bytes);
            } else {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("Composite Vertex Buffer"),
                    contents: bytes,
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                self.vertices = Some((buffer, len));
            }
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Composite Encoder"),
        });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Composite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            if let Some((buffer, _)) = self.vertices.as_ref().filter(|_| !visible.is_empty()) {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                for (i, layer) in visible.iter().enumerate() {
                    let bind_group = match layer.source {
                        LayerSource::Surface(surface) => match targets.get(&surface) {
                            Some(target) => &target.bind_group,
                            None => continue,
                        },
                        LayerSource::Overlay => &self.overlay_bind_group,
                    };
                    let first = i as u32 * 6;
                    render_pass.set_bind_group(0, bind_group, &[]);
                    render_pass.draw(first..first + 6, 0..1);
                }
            }
        }
        queue.submit(iter::once(encoder.finish()));
    }
}
