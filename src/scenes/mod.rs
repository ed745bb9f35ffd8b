//! The decorative scenes.
//!
//! Each scene is a [`SceneBuilder`]: it picks a camera, populates a scene
//! graph from fixed parameters and advances its own procedural state once
//! per frame. Everything else (renderer, listeners, disposal) is handled by
//! [`crate::lifecycle::SceneManager`].

pub mod floor_plan;
pub mod grid;
pub mod particles;
pub mod wireframe;

use crate::{
    camera::Camera,
    data_structures::scene_graph::{NodeId, Released, SceneGraph},
};

/// Pointer offset from the centre of the window, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerOffset {
    pub x: f32,
    pub y: f32,
}

/// Exponential approach: `current += (target - current) * factor` per step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothed {
    pub current: f32,
    pub target: f32,
    pub factor: f32,
}

impl Smoothed {
    pub fn new(factor: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            factor,
        }
    }

    pub fn step(&mut self) -> f32 {
        self.current = approach(self.current, self.target, self.factor);
        self.current
    }
}

pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// The nodes a builder added, so exactly those can be torn down again.
#[derive(Debug, Default)]
pub struct Built {
    nodes: Vec<NodeId>,
}

impl Built {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, node: Option<NodeId>) -> Option<NodeId> {
        if let Some(id) = node {
            self.nodes.push(id);
        }
        node
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Removes the tracked nodes from `graph`. A second call does nothing.
    pub fn dispose(&mut self, graph: &mut SceneGraph) -> Released {
        let mut released = Released::default();
        for id in self.nodes.drain(..) {
            released += graph.remove(id);
        }
        released
    }
}

pub trait SceneBuilder {
    fn name(&self) -> &'static str;

    /// Camera for a container of the given size.
    fn camera(&self, width: u32, height: u32) -> Camera;

    /// Populates `graph` below `root`.
    fn build(&mut self, graph: &mut SceneGraph, root: NodeId) -> Built;

    /// Advances procedural state by one frame.
    fn update(&mut self, graph: &mut SceneGraph, camera: &mut Camera);

    /// Whether the scene reacts to pointer movement.
    fn tracks_pointer(&self) -> bool {
        false
    }

    /// Records a new pointer target. Scene state only moves towards it in
    /// [`SceneBuilder::update`].
    fn pointer_moved(&mut self, _offset: PointerOffset) {}
}

/// Selector for the decorative visual to mount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisualKind {
    #[default]
    Wireframe,
    ArchitectureGrid,
    Particles,
    FloorPlan,
}

impl VisualKind {
    pub fn name(&self) -> &'static str {
        match self {
            VisualKind::Wireframe => "wireframe",
            VisualKind::ArchitectureGrid => "architecture-grid",
            VisualKind::Particles => "particles",
            VisualKind::FloorPlan => "floor-plan",
        }
    }
}

impl std::str::FromStr for VisualKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wireframe" => Ok(VisualKind::Wireframe),
            "architecture-grid" | "grid" | "hero" => Ok(VisualKind::ArchitectureGrid),
            "particles" => Ok(VisualKind::Particles),
            "floor-plan" | "floorplan" | "interior" => Ok(VisualKind::FloorPlan),
            other => Err(anyhow::anyhow!("unknown visual type '{}'", other)),
        }
    }
}
