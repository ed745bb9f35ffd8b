//! [`Renderer`] on top of wgpu.
//!
//! Every renderer draws into its own colour and depth target, registered in
//! the factory's [`Targets`] under the renderer's [`SurfaceId`]. GPU copies
//! of geometry, per-node uniforms and label textures are cached by the
//! scene graph's [`ResourceId`]s and dropped when the graph releases them.
//!
//! Point clouds and sprites are expanded into camera-facing quads on the CPU
//! every frame, since their corners depend on the camera.

use std::{cell::RefCell, collections::HashMap, iter, rc::Rc};

use cgmath::{InnerSpace, Matrix4, SquareMatrix, Vector3, Vector4};
use wgpu::util::DeviceExt;

use crate::{
    camera::{Camera, CameraUniform},
    data_structures::{
        geometry::{Geometry, Topology, Vertex},
        scene_graph::{DrawItem, NodeKind, ResourceId, SceneGraph},
        texture::{Texture, create_clamped_sampler},
    },
    host::SurfaceId,
    pipelines::{
        mk_camera_bind_group_layout, mk_object_bind_group_layout, mk_texture_bind_group,
        mk_texture_bind_group_layout,
        scene::{ObjectUniform, SceneKey, ScenePipelines},
        sprite::{SpriteVertex, mk_sprite_pipeline},
    },
    render::{Batches, RenderStats, Renderer, RendererFactory, buffer_size},
};

/// Off-screen output of one visual.
pub struct RenderTarget {
    pub color: Texture,
    pub depth: Texture,
    /// Samples `color`, laid out for the compositor.
    pub bind_group: wgpu::BindGroup,
    /// Physical pixels.
    pub size: (u32, u32),
}

pub type Targets = Rc<RefCell<HashMap<SurfaceId, RenderTarget>>>;

struct Shared {
    device: wgpu::Device,
    queue: wgpu::Queue,
    scene: ScenePipelines,
    sprite: wgpu::RenderPipeline,
    camera_layout: wgpu::BindGroupLayout,
    object_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    targets: Targets,
}

impl Shared {
    fn create_target(&self, surface: SurfaceId, size: (u32, u32)) -> RenderTarget {
        let label = format!("surface {} target", surface.0);
        let color = Texture::create_render_target(&self.device, [size.0, size.1], &label);
        let depth = Texture::create_depth_texture(&self.device, [size.0, size.1], &label);
        let bind_group = mk_texture_bind_group(
            &self.device,
            &self.texture_layout,
            &color,
            &self.sampler,
            &label,
        );
        RenderTarget {
            color,
            depth,
            bind_group,
            size,
        }
    }
}

/// Pipelines and layouts are built once and shared by every renderer the
/// factory creates.
#[derive(Clone)]
pub struct WgpuRendererFactory {
    shared: Rc<Shared>,
}

impl WgpuRendererFactory {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let camera_layout = mk_camera_bind_group_layout(device);
        let object_layout = mk_object_bind_group_layout(device);
        let texture_layout = mk_texture_bind_group_layout(device);
        let scene = ScenePipelines::new(
            device,
            &camera_layout,
            &object_layout,
            Texture::TARGET_FORMAT,
        );
        let sprite = mk_sprite_pipeline(
            device,
            &camera_layout,
            &object_layout,
            &texture_layout,
            Texture::TARGET_FORMAT,
        );
        Self {
            shared: Rc::new(Shared {
                device: device.clone(),
                queue: queue.clone(),
                scene,
                sprite,
                camera_layout,
                object_layout,
                texture_layout,
                sampler: create_clamped_sampler(device),
                targets: Rc::default(),
            }),
        }
    }

    /// Every live render target, by surface.
    pub fn targets(&self) -> Targets {
        self.shared.targets.clone()
    }

    /// Layout of [`RenderTarget::bind_group`].
    pub fn texture_layout(&self) -> &wgpu::BindGroupLayout {
        &self.shared.texture_layout
    }

    /// Copies a surface's colour target back to the CPU. `None` if the
    /// surface has no target.
    #[cfg(feature = "integration-tests")]
    pub async fn read_target(
        &self,
        surface: SurfaceId,
    ) -> anyhow::Result<Option<image::RgbaImage>> {
        let device = &self.shared.device;
        let targets = self.shared.targets.borrow();
        let Some(target) = targets.get(&surface) else {
            return Ok(None);
        };
        let (width, height) = target.size;
        let unpadded = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Target Readback Buffer"),
            size: (padded * height) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &target.color.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &output_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.shared.queue.submit(iter::once(encoder.finish()));
        drop(targets);

        // map first, then poll, or the wait never finishes
        let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
        let buffer_slice = output_buffer.slice(..);
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            if tx.send(result).is_err() {
                log::warn!("readback of surface {:?} finished after its receiver closed", surface);
            }
        });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        rx.receive()
            .await
            .ok_or_else(|| anyhow::anyhow!("readback channel closed before the buffer was mapped"))??;

        let data = buffer_slice.get_mapped_range();
        let pixels: Vec<u8> = data
            .chunks(padded as usize)
            .flat_map(|row| &row[..unpadded as usize])
            .copied()
            .collect();
        drop(data);
        output_buffer.unmap();
        Ok(image::RgbaImage::from_raw(width, height, pixels))
    }
}

impl RendererFactory for WgpuRendererFactory {
    fn create(
        &mut self,
        surface: SurfaceId,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Box<dyn Renderer> {
        Box::new(WgpuRenderer::new(
            self.shared.clone(),
            surface,
            width,
            height,
            pixel_ratio,
        ))
    }
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    count: u32,
    version: Option<u64>,
}

impl GpuBuffer {
    fn new(device: &wgpu::Device, bytes: &[u8], count: usize, version: Option<u64>) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        Self {
            buffer,
            capacity: bytes.len() as u64,
            count: count as u32,
            version,
        }
    }

    /// Rewrites in place, growing the buffer only when the data outgrew it.
    fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        count: usize,
        version: Option<u64>,
    ) {
        if bytes.len() as u64 > self.capacity {
            *self = Self::new(device, bytes, count, version);
            return;
        }
        queue.write_buffer(&self.buffer, 0, bytes);
        self.count = count as u32;
        self.version = version;
    }
}

struct GpuObject {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuLabel {
    _texture: Texture,
    bind_group: wgpu::BindGroup,
}

#[derive(Clone, Copy)]
enum Pass {
    Scene(SceneKey),
    Sprite(ResourceId),
}

struct Draw {
    pass: Pass,
    mesh: ResourceId,
    object: ResourceId,
}

pub struct WgpuRenderer {
    shared: Rc<Shared>,
    surface: SurfaceId,
    size: (u32, u32),
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    // keyed by geometry, material and texture id respectively
    meshes: HashMap<ResourceId, GpuBuffer>,
    objects: HashMap<ResourceId, GpuObject>,
    labels: HashMap<ResourceId, GpuLabel>,
    stats: RenderStats,
}

impl WgpuRenderer {
    fn new(
        shared: Rc<Shared>,
        surface: SurfaceId,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Self {
        let camera_buffer = shared
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[CameraUniform::new()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let camera_bind_group = shared
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &shared.camera_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                }],
                label: Some("camera_bind_group"),
            });
        let mut renderer = Self {
            shared,
            surface,
            size: (width, height),
            camera_buffer,
            camera_bind_group,
            meshes: HashMap::new(),
            objects: HashMap::new(),
            labels: HashMap::new(),
            stats: RenderStats {
                buffer_size: buffer_size(width, height, pixel_ratio),
                pixel_ratio,
                ..Default::default()
            },
        };
        renderer.ensure_target();
        log::debug!(
            "wgpu renderer for {:?} at {:?} physical pixels",
            surface,
            renderer.stats.buffer_size
        );
        renderer
    }

    /// (Re)creates the render target if its size no longer matches.
    fn ensure_target(&mut self) {
        let size = self.stats.buffer_size;
        let mut targets = self.shared.targets.borrow_mut();
        if targets.get(&self.surface).is_some_and(|t| t.size == size) {
            return;
        }
        targets.insert(self.surface, self.shared.create_target(self.surface, size));
    }

    fn upload(&mut self, id: ResourceId, bytes: &[u8], count: usize, version: Option<u64>) {
        let shared = &self.shared;
        match self.meshes.get_mut(&id) {
            Some(mesh) if version.is_some() && mesh.version == version => {}
            Some(mesh) => mesh.write(&shared.device, &shared.queue, bytes, count, version),
            None => {
                self.meshes
                    .insert(id, GpuBuffer::new(&shared.device, bytes, count, version));
            }
        }
    }

    fn write_object(&mut self, id: ResourceId, model: Matrix4<f32>, tint: [f32; 4]) {
        let uniform = ObjectUniform {
            model: model.into(),
            tint,
        };
        if let Some(object) = self.objects.get(&id) {
            self.shared
                .queue
                .write_buffer(&object.buffer, 0, bytemuck::cast_slice(&[uniform]));
            return;
        }
        let device = &self.shared.device;
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Object Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.shared.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("object_bind_group"),
        });
        self.objects.insert(id, GpuObject { buffer, bind_group });
    }

    fn ensure_label(&mut self, item: &DrawItem) -> Option<ResourceId> {
        let id = item.drawable.texture_id?;
        if self.labels.contains_key(&id) {
            return Some(id);
        }
        let map = item.drawable.material.map.as_ref()?;
        let shared = &self.shared;
        match Texture::from_image(&shared.device, &shared.queue, map, Some("label")) {
            Ok(texture) => {
                let bind_group = mk_texture_bind_group(
                    &shared.device,
                    &shared.texture_layout,
                    &texture,
                    &shared.sampler,
                    "label_bind_group",
                );
                self.labels.insert(
                    id,
                    GpuLabel {
                        _texture: texture,
                        bind_group,
                    },
                );
                Some(id)
            }
            Err(e) => {
                log::warn!("skipping label texture: {}", e);
                None
            }
        }
    }

    fn prepare(&mut self, item: &DrawItem, axes: (Vector3<f32>, Vector3<f32>)) -> Option<Draw> {
        let drawable = item.drawable;
        let material = &drawable.material;
        let (right, up) = axes;
        let (pass, model) = match item.kind {
            NodeKind::Sprite => {
                let label = self.ensure_label(item)?;
                let quad = sprite_quad(&drawable.geometry, item.world, right, up);
                self.upload(
                    drawable.geometry_id,
                    bytemuck::cast_slice(&quad),
                    quad.len(),
                    None,
                );
                (Pass::Sprite(label), Matrix4::identity())
            }
            _ if drawable.geometry.topology == Topology::PointList => {
                let quads =
                    billboard_points(&drawable.geometry, item.world, right, up, material.point_size);
                self.upload(
                    drawable.geometry_id,
                    bytemuck::cast_slice(&quads),
                    quads.len(),
                    None,
                );
                let key = SceneKey::of(Topology::PointList, material);
                (Pass::Scene(key), Matrix4::identity())
            }
            _ => {
                let geometry = &drawable.geometry;
                self.upload(
                    drawable.geometry_id,
                    bytemuck::cast_slice(&geometry.vertices),
                    geometry.vertices.len(),
                    Some(drawable.version),
                );
                let key = SceneKey::of(geometry.topology, material);
                (Pass::Scene(key), item.world)
            }
        };
        self.write_object(drawable.material_id, model, material.tint());
        Some(Draw {
            pass,
            mesh: drawable.geometry_id,
            object: drawable.material_id,
        })
    }
}

impl Renderer for WgpuRenderer {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if self.stats.disposed {
            return;
        }
        self.size = (width, height);
        self.stats.resizes += 1;
        self.stats.buffer_size = buffer_size(width, height, self.stats.pixel_ratio);
        self.ensure_target();
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        if self.stats.disposed {
            return;
        }
        self.stats.pixel_ratio = ratio;
        self.stats.buffer_size = buffer_size(self.size.0, self.size.1, ratio);
        self.ensure_target();
    }

    fn render(&mut self, graph: &SceneGraph, camera: &Camera) {
        if self.stats.disposed {
            log::warn!("render called on disposed surface {:?}", self.surface);
            return;
        }
        let batches = Batches::collect(graph);
        self.stats.record(&batches);

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(camera);
        self.shared
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let axes = camera.billboard_axes();
        let draws: Vec<Draw> = batches
            .iter()
            .filter_map(|item| self.prepare(item, axes))
            .collect();

        let targets = self.shared.targets.borrow();
        let Some(target) = targets.get(&self.surface) else {
            log::warn!("no render target for {:?}", self.surface);
            return;
        };
        let mut encoder = self
            .shared
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
                multiview_mask: None,
            });

            for draw in &draws {
                let (Some(mesh), Some(object)) =
                    (self.meshes.get(&draw.mesh), self.objects.get(&draw.object))
                else {
                    continue;
                };
                match draw.pass {
                    Pass::Scene(key) => {
                        let Some(pipeline) = self.shared.scene.get(key) else {
                            continue;
                        };
                        render_pass.set_pipeline(pipeline);
                    }
                    Pass::Sprite(label) => {
                        let Some(label) = self.labels.get(&label) else {
                            continue;
                        };
                        render_pass.set_pipeline(&self.shared.sprite);
                        render_pass.set_bind_group(2, &label.bind_group, &[]);
                    }
                }
                render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
                render_pass.set_bind_group(1, &object.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.buffer.slice(..));
                render_pass.draw(0..mesh.count, 0..1);
            }
        }
        self.shared.queue.submit(iter::once(encoder.finish()));
    }

    fn release(&mut self, resources: &[ResourceId]) {
        for id in resources {
            self.meshes.remove(id);
            self.objects.remove(id);
            self.labels.remove(id);
        }
        self.stats.released += resources.len();
    }

    fn dispose(&mut self) {
        if self.stats.disposed {
            return;
        }
        self.meshes.clear();
        self.objects.clear();
        self.labels.clear();
        self.shared.targets.borrow_mut().remove(&self.surface);
        self.stats.disposed = true;
        log::debug!("wgpu renderer for {:?} disposed", self.surface);
    }

    fn is_disposed(&self) -> bool {
        self.stats.disposed
    }

    fn stats(&self) -> RenderStats {
        self.stats.clone()
    }
}

fn transform_point(world: Matrix4<f32>, p: [f32; 3]) -> Vector3<f32> {
    (world * Vector4::new(p[0], p[1], p[2], 1.0)).truncate()
}

/// Expands every point into a `size` x `size` quad facing the camera, in
/// world space. Colours are carried over per point.
pub fn billboard_points(
    geometry: &Geometry,
    world: Matrix4<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    size: f32,
) -> Vec<Vertex> {
    let half = size / 2.0;
    let (right, up) = (right * half, up * half);
    let mut vertices = Vec::with_capacity(geometry.vertices.len() * 6);
    for vertex in &geometry.vertices {
        let center = transform_point(world, vertex.position);
        let a = center - right - up;
        let b = center + right - up;
        let c = center + right + up;
        let d = center - right + up;
        for corner in [a, b, d, b, c, d] {
            vertices.push(Vertex {
                position: corner.into(),
                color: vertex.color,
            });
        }
    }
    vertices
}

/// Places a sprite's plane at the node's world position, facing the camera
/// and scaled by the node's world scale. Texture v runs top to bottom.
pub fn sprite_quad(
    geometry: &Geometry,
    world: Matrix4<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
) -> Vec<SpriteVertex> {
    let center = transform_point(world, [0.0, 0.0, 0.0]);
    let scale_x = world.x.truncate().magnitude();
    let scale_y = world.y.truncate().magnitude();
    geometry
        .vertices
        .iter()
        .map(|vertex| {
            let [x, y, _] = vertex.position;
            SpriteVertex {
                position: (center + right * (x * scale_x) + up * (y * scale_y)).into(),
                tex_coords: [x + 0.5, 0.5 - y],
            }
        })
        .collect()
}
