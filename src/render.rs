//! Renderer abstraction and draw batching.
//!
//! A visual owns exactly one [`Renderer`], created through the context's
//! [`RendererFactory`]. The scene graph is split into [`Batches`] per
//! pipeline (opaque, transparent, sprites) before drawing, so the GPU
//! renderer binds each pipeline once per frame.
//!
//! [`HeadlessRenderer`] performs the same batching without a GPU and records
//! what it would have drawn. It backs the tests and any environment without
//! an adapter.

use std::{cell::RefCell, rc::Rc};

use crate::{
    camera::Camera,
    data_structures::{
        geometry::Topology,
        scene_graph::{DrawItem, NodeKind, ResourceId, SceneGraph},
    },
    host::{Rect, SurfaceId},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayerSource {
    Surface(SurfaceId),
    Overlay,
}

/// One rectangle of the flattened page, drawn by a compositor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layer {
    pub source: LayerSource,
    /// Window pixels (CSS pixels, not physical).
    pub rect: Rect,
    pub opacity: f32,
}

/// Draw items sorted by the pipeline that draws them.
#[derive(Default)]
pub struct Batches<'a> {
    pub opaque: Vec<DrawItem<'a>>,
    /// Blended items, in scene order.
    pub transparent: Vec<DrawItem<'a>>,
    pub sprites: Vec<DrawItem<'a>>,
}

impl<'a> Batches<'a> {
    pub fn collect(graph: &'a SceneGraph) -> Self {
        let mut batches = Batches::default();
        for item in graph.draw_items() {
            if item.drawable.geometry.vertices.is_empty() {
                continue;
            }
            match item.kind {
                NodeKind::Sprite => batches.sprites.push(item),
                _ if item.drawable.material.transparent => batches.transparent.push(item),
                _ => batches.opaque.push(item),
            }
        }
        batches
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.transparent.len() + self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &DrawItem<'a>> {
        self.opaque
            .iter()
            .chain(self.transparent.iter())
            .chain(self.sprites.iter())
    }
}

/// What a renderer has done so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderStats {
    pub frames: u64,
    pub resizes: u64,
    /// Output buffer size in physical pixels.
    pub buffer_size: (u32, u32),
    pub pixel_ratio: f32,
    pub released: usize,
    pub disposed: bool,
    /// Draw calls issued for the most recent frame.
    pub draw_calls: usize,
    pub line_segments: usize,
    pub points: usize,
    pub triangles: usize,
    pub sprites: usize,
}

impl RenderStats {
    pub(crate) fn record(&mut self, batches: &Batches) {
        self.frames += 1;
        self.draw_calls = batches.len();
        self.line_segments = 0;
        self.points = 0;
        self.triangles = 0;
        self.sprites = batches.sprites.len();
        for item in batches.opaque.iter().chain(batches.transparent.iter()) {
            let geometry = &item.drawable.geometry;
            match geometry.topology {
                Topology::LineList => self.line_segments += geometry.primitive_count(),
                Topology::PointList => self.points += geometry.primitive_count(),
                Topology::TriangleList => self.triangles += geometry.primitive_count(),
            }
        }
    }
}

/// Output side of a visual.
pub trait Renderer {
    fn surface(&self) -> SurfaceId;

    /// Sets the size in CSS pixels. The buffer is `size * pixel_ratio`.
    fn set_size(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    fn set_pixel_ratio(&mut self, ratio: f32);

    fn render(&mut self, graph: &SceneGraph, camera: &Camera);

    /// Drops cached GPU objects for resources removed from the scene.
    fn release(&mut self, resources: &[ResourceId]);

    /// Frees everything. Later calls to any method are no-ops.
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;

    fn stats(&self) -> RenderStats;
}

pub trait RendererFactory {
    fn create(
        &mut self,
        surface: SurfaceId,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Box<dyn Renderer>;
}

pub(crate) fn buffer_size(width: u32, height: u32, pixel_ratio: f32) -> (u32, u32) {
    (
        (width as f32 * pixel_ratio).round() as u32,
        (height as f32 * pixel_ratio).round() as u32,
    )
}

pub struct HeadlessRenderer {
    surface: SurfaceId,
    size: (u32, u32),
    stats: Rc<RefCell<RenderStats>>,
}

impl HeadlessRenderer {
    pub fn new(surface: SurfaceId, width: u32, height: u32, pixel_ratio: f32) -> Self {
        let stats = RenderStats {
            buffer_size: buffer_size(width, height, pixel_ratio),
            pixel_ratio,
            ..Default::default()
        };
        Self {
            surface,
            size: (width, height),
            stats: Rc::new(RefCell::new(stats)),
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn surface(&self) -> SurfaceId {
        self.surface
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if self.is_disposed() {
            return;
        }
        self.size = (width, height);
        let mut stats = self.stats.borrow_mut();
        stats.resizes += 1;
        stats.buffer_size = buffer_size(width, height, stats.pixel_ratio);
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        let mut stats = self.stats.borrow_mut();
        stats.pixel_ratio = ratio;
        stats.buffer_size = buffer_size(self.size.0, self.size.1, ratio);
    }

    fn render(&mut self, graph: &SceneGraph, _camera: &Camera) {
        if self.is_disposed() {
            log::warn!("render called on disposed surface {:?}", self.surface);
            return;
        }
        let batches = Batches::collect(graph);
        self.stats.borrow_mut().record(&batches);
    }

    fn release(&mut self, resources: &[ResourceId]) {
        self.stats.borrow_mut().released += resources.len();
    }

    fn dispose(&mut self) {
        self.stats.borrow_mut().disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.stats.borrow().disposed
    }

    fn stats(&self) -> RenderStats {
        self.stats.borrow().clone()
    }
}

/// Creates [`HeadlessRenderer`]s. Clones share the record of every renderer
/// created, so stats stay readable after a visual dropped its renderer.
#[derive(Clone, Default)]
pub struct HeadlessRendererFactory {
    created: Rc<RefCell<Vec<(SurfaceId, Rc<RefCell<RenderStats>>)>>>,
}

impl HeadlessRendererFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created.borrow().len()
    }

    pub fn stats(&self, surface: SurfaceId) -> Option<RenderStats> {
        self.created
            .borrow()
            .iter()
            .find(|(id, _)| *id == surface)
            .map(|(_, stats)| stats.borrow().clone())
    }

    pub fn all_stats(&self) -> Vec<RenderStats> {
        self.created
            .borrow()
            .iter()
            .map(|(_, stats)| stats.borrow().clone())
            .collect()
    }
}

impl RendererFactory for HeadlessRendererFactory {
    fn create(
        &mut self,
        surface: SurfaceId,
        width: u32,
        height: u32,
        pixel_ratio: f32,
    ) -> Box<dyn Renderer> {
        let renderer = HeadlessRenderer::new(surface, width, height, pixel_ratio);
        self.created
            .borrow_mut()
            .push((surface, renderer.stats.clone()));
        Box::new(renderer)
    }
}
