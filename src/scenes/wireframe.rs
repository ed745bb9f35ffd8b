//! Wireframe building: a base slab, four towers joined by four beams, and a
//! grid underneath. Structures and grid spin about Y at independent constant
//! rates.

use std::f32::consts::FRAC_PI_2;

use crate::{
    camera::{Camera, Projection},
    data_structures::{
        geometry::{BLACK, Geometry, WHITE, hex},
        scene_graph::{Material, NodeId, NodeKind, SceneGraph},
        transform::Transform,
    },
    scenes::{Built, SceneBuilder},
};

#[derive(Clone, Debug, PartialEq)]
pub struct WireframeConfig {
    pub fov: f32,
    pub camera_position: [f32; 3],
    /// Radians added to every structure's Y rotation each frame.
    pub structure_spin: f32,
    pub grid_spin: f32,
    pub grid_opacity: f32,
    pub base_opacity: f32,
}

impl Default for WireframeConfig {
    fn default() -> Self {
        Self {
            fov: 30.0,
            camera_position: [4.0, 3.0, 4.0],
            structure_spin: 0.003,
            grid_spin: 0.001,
            grid_opacity: 0.2,
            base_opacity: 0.5,
        }
    }
}

#[derive(Debug, Default)]
pub struct Wireframe {
    config: WireframeConfig,
    structures: Vec<NodeId>,
    grid: Option<NodeId>,
}

impl Wireframe {
    pub fn new(config: WireframeConfig) -> Self {
        Self {
            config,
            structures: Vec::new(),
            grid: None,
        }
    }

    pub fn structures(&self) -> &[NodeId] {
        &self.structures
    }

    pub fn grid(&self) -> Option<NodeId> {
        self.grid
    }
}

impl SceneBuilder for Wireframe {
    fn name(&self) -> &'static str {
        "wireframe"
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
        let mut structure = |graph: &mut SceneGraph,
                             name: &str,
                             geometry: &Geometry,
                             material: Material,
                             transform: Transform| {
            built.track(graph.add_drawable(
                root,
                name,
                NodeKind::Lines,
                geometry.wireframe(),
                material,
                transform,
            ))
        };

        let mut structures = Vec::new();
        structures.push(structure(
            graph,
            "base",
            &Geometry::cuboid(3.0, 0.1, 3.0),
            Material::translucent(BLACK, self.config.base_opacity),
            Transform::at(0.0, -0.5, 0.0),
        ));

        let tower = Geometry::cuboid(0.8, 2.0, 0.8);
        for (i, (x, z)) in [(0.8, 0.8), (-0.8, 0.8), (0.8, -0.8), (-0.8, -0.8)]
            .into_iter()
            .enumerate()
        {
            structures.push(structure(
                graph,
                &format!("tower-{}", i + 1),
                &tower,
                Material::basic(BLACK),
                Transform::at(x, 0.5, z),
            ));
        }

        let beam = Geometry::cuboid(1.6, 0.05, 0.05);
        let beams = [
            ("beam-1-2", Transform::at(0.0, 1.0, 0.8)),
            ("beam-3-4", Transform::at(0.0, 1.0, -0.8)),
            ("beam-1-3", Transform::at(0.8, 1.0, 0.0).with_rotation(0.0, FRAC_PI_2, 0.0)),
            ("beam-2-4", Transform::at(-0.8, 1.0, 0.0).with_rotation(0.0, FRAC_PI_2, 0.0)),
        ];
        for (name, transform) in beams {
            structures.push(structure(
                graph,
                name,
                &beam,
                Material::basic(BLACK),
                transform,
            ));
        }
        self.structures = structures.into_iter().flatten().collect();

        self.grid = built.track(graph.add_drawable(
            root,
            "grid",
            NodeKind::Lines,
            Geometry::grid(4.0, 10, hex(0x444444), hex(0x888888)),
            Material::translucent(WHITE, self.config.grid_opacity),
            Transform::at(0.0, -0.5, 0.0),
        ));
        built
    }

    fn update(&mut self, graph: &mut SceneGraph, _camera: &mut Camera) {
        for id in &self.structures {
            if let Some(transform) = graph.transform_mut(*id) {
                transform.rotation.y += self.config.structure_spin;
            }
        }
        if let Some(transform) = self.grid.and_then(|id| graph.transform_mut(id)) {
            transform.rotation.y += self.config.grid_spin;
        }
    }
}
