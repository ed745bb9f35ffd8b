//! Top-down floor plan: floor, walls, furniture outlines and room labels,
//! seen through an orthographic camera. The plan turns about Y following
//! the pointer.

use std::f32::consts::FRAC_PI_2;

use cgmath::Vector3;

use crate::{
    camera::{Camera, Projection},
    data_structures::{
        geometry::{BLACK, Geometry, WHITE, hex},
        scene_graph::{Material, NodeId, NodeKind, SceneGraph},
        transform::Transform,
    },
    labels::{LabelPainter, LabelStyle},
    scenes::{Built, PointerOffset, SceneBuilder, Smoothed},
};

#[derive(Clone, Debug, PartialEq)]
pub struct FloorPlanConfig {
    /// Orthographic extents are `±size / pixels_per_unit`.
    pub pixels_per_unit: f32,
    pub camera_height: f32,
    pub floor_opacity: f32,
    pub furniture_opacity: f32,
    pub pointer_factor: f32,
    pub blend: f32,
    pub label_style: LabelStyle,
}

impl Default for FloorPlanConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: 200.0,
            camera_height: 5.0,
            floor_opacity: 0.1,
            furniture_opacity: 0.7,
            pointer_factor: 0.001,
            blend: 0.05,
            label_style: LabelStyle::default(),
        }
    }
}

type Outline = &'static [[f32; 2]];

const WALLS: [(&str, Outline); 3] = [
    (
        "outer-walls",
        &[[-2.0, -2.0], [2.0, -2.0], [2.0, 2.0], [-2.0, 2.0], [-2.0, -2.0]],
    ),
    ("inner-wall-1", &[[-2.0, 0.0], [0.0, 0.0], [0.0, 2.0]]),
    ("inner-wall-2", &[[0.0, 0.0], [0.0, -1.0], [2.0, -1.0]]),
];

const FURNITURE: [(&str, Outline); 2] = [
    (
        "sofa",
        &[[-1.8, 1.5], [-0.8, 1.5], [-0.8, 0.8], [-1.8, 0.8], [-1.8, 1.5]],
    ),
    (
        "table",
        &[[1.0, 0.5], [1.8, 0.5], [1.8, 1.5], [1.0, 1.5], [1.0, 0.5]],
    ),
];

pub const ROOM_LABELS: [(&str, [f32; 3]); 3] = [
    ("Living Room", [1.4, 0.5, 1.0]),
    ("Kitchen", [-1.3, 0.5, -1.0]),
    ("Bedroom", [-1.0, 0.5, 1.3]),
];

/// Polyline on the floor (XZ plane) from `(x, z)` pairs.
fn outline(points: Outline) -> Geometry {
    let points: Vec<Vector3<f32>> = points
        .iter()
        .map(|[x, z]| Vector3::new(*x, 0.0, *z))
        .collect();
    Geometry::polyline(&points)
}

pub struct FloorPlan {
    config: FloorPlanConfig,
    labels: Vec<(&'static str, [f32; 3], image::RgbaImage)>,
    rotation_y: Smoothed,
    group: Option<NodeId>,
}

impl FloorPlan {
    /// Label canvases are painted up front so building the scene does not
    /// touch fonts.
    pub fn new(config: FloorPlanConfig, painter: &LabelPainter) -> Self {
        let labels = ROOM_LABELS
            .iter()
            .map(|(text, position)| (*text, *position, painter.paint(text, &config.label_style)))
            .collect();
        let blend = config.blend;
        Self {
            config,
            labels,
            rotation_y: Smoothed::new(blend),
            group: None,
        }
    }

    pub fn group(&self) -> Option<NodeId> {
        self.group
    }

    pub fn rotation(&self) -> f32 {
        self.rotation_y.current
    }

    pub fn target_rotation(&self) -> f32 {
        self.rotation_y.target
    }
}

impl SceneBuilder for FloorPlan {
    fn name(&self) -> &'static str {
        "floor-plan"
    }

    fn camera(&self, width: u32, height: u32) -> Camera {
        let mut camera = Camera::new(
            [0.0, self.config.camera_height, 0.0],
            Projection::orthographic(width, height, self.config.pixels_per_unit, 0.1, 1000.0),
        );
        camera.look_at([0.0, 0.0, 0.0]);
        camera
    }

    fn build(&mut self, graph: &mut SceneGraph, root: NodeId) -> Built {
        let mut built = Built::new();
        let Some(group) = built.track(graph.add_group(root, "floor-plan", Transform::default()))
        else {
            return built;
        };
        self.group = Some(group);

        // children go with the group when it is removed, so only the group
        // itself is tracked
        graph.add_drawable(
            group,
            "floor",
            NodeKind::Mesh,
            Geometry::plane(5.0, 5.0),
            Material::translucent(WHITE, self.config.floor_opacity).double_sided(),
            Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0),
        );

        for (name, points) in WALLS {
            graph.add_drawable(
                group,
                name,
                NodeKind::Lines,
                outline(points),
                Material::basic(BLACK),
                Transform::at(0.0, 0.01, 0.0),
            );
        }

        for (name, points) in FURNITURE {
            graph.add_drawable(
                group,
                name,
                NodeKind::Lines,
                outline(points),
                Material::translucent(hex(0x666666), self.config.furniture_opacity),
                Transform::at(0.0, 0.02, 0.0),
            );
        }

        for (text, [x, y, z], canvas) in &self.labels {
            graph.add_drawable(
                group,
                text,
                NodeKind::Sprite,
                Geometry::plane(1.0, 1.0),
                Material::sprite(canvas.clone()),
                Transform::at(*x, *y, *z).with_scale(1.0, 0.5, 1.0),
            );
        }
        built
    }

    fn update(&mut self, graph: &mut SceneGraph, _camera: &mut Camera) {
        let rotation = self.rotation_y.step();
        if let Some(transform) = self.group.and_then(|id| graph.transform_mut(id)) {
            transform.rotation.y = rotation;
        }
    }

    fn tracks_pointer(&self) -> bool {
        true
    }

    fn pointer_moved(&mut self, offset: PointerOffset) {
        self.rotation_y.target = offset.x * self.config.pointer_factor;
    }
}
