//! Architecture grid for the hero section: a large floor grid with a few
//! box-outline building blocks and a faint floor plane. The whole scene tilts
//! towards the pointer.

use std::f32::consts::FRAC_PI_2;

use crate::{
    camera::{Camera, Projection},
    data_structures::{
        geometry::{BLACK, Geometry, WHITE, hex},
        scene_graph::{Material, NodeId, NodeKind, SceneGraph},
        transform::Transform,
    },
    scenes::{Built, PointerOffset, SceneBuilder, Smoothed},
};

#[derive(Clone, Debug, PartialEq)]
pub struct ArchitectureGridConfig {
    pub fov: f32,
    pub camera_position: [f32; 3],
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub grid_opacity: f32,
    pub plane_opacity: f32,
    /// Pointer x offset to Y rotation.
    pub yaw_factor: f32,
    /// Pointer y offset to X rotation.
    pub pitch_factor: f32,
    pub blend: f32,
    pub grid_spin: f32,
}

impl Default for ArchitectureGridConfig {
    fn default() -> Self {
        Self {
            fov: 40.0,
            camera_position: [8.0, 6.0, 8.0],
            grid_size: 20.0,
            grid_divisions: 20,
            grid_opacity: 0.15,
            plane_opacity: 0.05,
            yaw_factor: 0.0005,
            pitch_factor: 0.0003,
            blend: 0.05,
            grid_spin: 0.001,
        }
    }
}

/// (width, height, depth) and position of each building block.
const BLOCKS: [([f32; 3], [f32; 3]); 4] = [
    ([2.0, 5.0, 2.0], [0.0, 2.5, 0.0]),
    ([4.0, 1.5, 1.5], [3.0, 0.75, 0.0]),
    ([1.5, 1.5, 4.0], [0.0, 0.75, 3.0]),
    ([1.0, 2.0, 1.0], [-2.0, 1.0, -2.0]),
];

pub struct ArchitectureGrid {
    config: ArchitectureGridConfig,
    rotation_x: Smoothed,
    rotation_y: Smoothed,
    grid: Option<NodeId>,
    root: Option<NodeId>,
}

impl ArchitectureGrid {
    pub fn new(config: ArchitectureGridConfig) -> Self {
        let blend = config.blend;
        Self {
            config,
            rotation_x: Smoothed::new(blend),
            rotation_y: Smoothed::new(blend),
            grid: None,
            root: None,
        }
    }

    /// Current (x, y) scene rotation.
    pub fn rotation(&self) -> (f32, f32) {
        (self.rotation_x.current, self.rotation_y.current)
    }

    pub fn target_rotation(&self) -> (f32, f32) {
        (self.rotation_x.target, self.rotation_y.target)
    }
}

impl Default for ArchitectureGrid {
    fn default() -> Self {
        Self::new(ArchitectureGridConfig::default())
    }
}

impl SceneBuilder for ArchitectureGrid {
    fn name(&self) -> &'static str {
        "architecture-grid"
    }

    fn camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(
            self.config.camera_position,
            Projection::perspective(self.config.fov, width, height, 0.1, 1000.0),
        );
        camera.look_at([0.0, 0.0, 0.0]);
        camera
    }

    fn build(&mut self, graph: &mut SceneGraph, root: NodeId) -> Built {
        let mut built = Built::new();
        self.root = Some(root);

        self.grid = built.track(graph.add_drawable(
            root,
            "grid",
            NodeKind::Lines,
            Geometry::grid(
                self.config.grid_size,
                self.config.grid_divisions,
                hex(0x000000),
                hex(0x222222),
            ),
            Material::translucent(WHITE, self.config.grid_opacity),
            Transform::default(),
        ));

        for (i, (size, position)) in BLOCKS.iter().enumerate() {
            built.track(graph.add_drawable(
                root,
                &format!("block-{}", i + 1),
                NodeKind::Lines,
                Geometry::box_edges(size[0], size[1], size[2]),
                Material::basic(BLACK),
                Transform::at(position[0], position[1], position[2]),
            ));
        }

        built.track(graph.add_drawable(
            root,
            "floor",
            NodeKind::Mesh,
            Geometry::plane(8.0, 8.0),
            Material::translucent(BLACK, self.config.plane_opacity).double_sided(),
            Transform::at(0.0, -0.01, 0.0).with_rotation(FRAC_PI_2, 0.0, 0.0),
        ));
        built
    }

    fn update(&mut self, graph: &mut SceneGraph, _camera: &mut Camera) {
        let x = self.rotation_x.step();
        let y = self.rotation_y.step();
        if let Some(transform) = self.root.and_then(|id| graph.transform_mut(id)) {
            transform.rotation.x = x;
            transform.rotation.y = y;
        }
        if let Some(transform) = self.grid.and_then(|id| graph.transform_mut(id)) {
            transform.rotation.y += self.config.grid_spin;
        }
    }

    fn tracks_pointer(&self) -> bool {
        true
    }

    fn pointer_moved(&mut self, offset: PointerOffset) {
        self.rotation_y.target = offset.x * self.config.yaw_factor;
        self.rotation_x.target = offset.y * self.config.pitch_factor;
    }
}
