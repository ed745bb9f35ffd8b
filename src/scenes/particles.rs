//! Drifting particle field with proximity connections.
//!
//! Particles move at constant velocity inside a cube of half-size `bound`
//! and bounce off its walls. Every frame each pair closer than
//! `connection_distance` is joined by a segment whose opacity fades with
//! distance. The pair scan is O(n²); at the default 150 particles that is
//! about 11k distance checks per frame. Larger fields would want a uniform
//! grid bucketing pass instead.

use cgmath::{InnerSpace, Point3, Vector3};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    camera::{Camera, Projection},
    data_structures::{
        geometry::{BLACK, Geometry, Topology, Vertex},
        scene_graph::{Material, NodeId, NodeKind, SceneGraph},
        transform::Transform,
    },
    scenes::{Built, PointerOffset, SceneBuilder, approach},
};

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleFieldConfig {
    pub count: usize,
    /// Half extent of the cube particles live in.
    pub bound: f32,
    pub connection_distance: f32,
    pub max_line_opacity: f32,
    /// Initial velocity components are drawn from `±velocity_spread / 2`.
    pub velocity_spread: f32,
    pub point_size: f32,
    pub fov: f32,
    pub camera_distance: f32,
    pub pointer_factor: f32,
    pub blend: f32,
    /// Fixed seed for reproducible fields, random otherwise.
    pub seed: Option<u64>,
}

impl Default for ParticleFieldConfig {
    fn default() -> Self {
        Self {
            count: 150,
            bound: 5.0,
            connection_distance: 1.5,
            max_line_opacity: 0.2,
            velocity_spread: 0.01,
            point_size: 0.05,
            fov: 75.0,
            camera_distance: 5.0,
            pointer_factor: 0.001,
            blend: 0.05,
            seed: None,
        }
    }
}

/// Index-aligned positions and velocities. The length never changes.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleSet {
    positions: Vec<Vector3<f32>>,
    velocities: Vec<Vector3<f32>>,
    bound: f32,
}

impl ParticleSet {
    pub fn random(count: usize, bound: f32, velocity_spread: f32, rng: &mut impl Rng) -> Self {
        let mut component = |scale: f32| rng.gen_range(-0.5f32..0.5) * scale;
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(Vector3::new(
                component(bound * 2.0),
                component(bound * 2.0),
                component(bound * 2.0),
            ));
            velocities.push(Vector3::new(
                component(velocity_spread),
                component(velocity_spread),
                component(velocity_spread),
            ));
        }
        Self {
            positions,
            velocities,
            bound,
        }
    }

    /// Builds a set from explicit state. Extra entries of the longer vector
    /// are dropped so both stay index-aligned.
    pub fn from_parts(
        mut positions: Vec<Vector3<f32>>,
        mut velocities: Vec<Vector3<f32>>,
        bound: f32,
    ) -> Self {
        let len = positions.len().min(velocities.len());
        positions.truncate(len);
        velocities.truncate(len);
        Self {
            positions,
            velocities,
            bound,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn bound(&self) -> f32 {
        self.bound
    }

    pub fn positions(&self) -> &[Vector3<f32>] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Vector3<f32>] {
        &self.velocities
    }

    /// Integrates one frame. Any coordinate that leaves `[-bound, bound]` is
    /// mirrored back across the wall it crossed and that velocity component
    /// flips sign.
    pub fn step(&mut self) {
        let bound = self.bound;
        for (position, velocity) in self.positions.iter_mut().zip(&mut self.velocities) {
            *position += *velocity;
            for axis in 0..3 {
                reflect(&mut position[axis], &mut velocity[axis], bound);
            }
        }
    }
}

/// Folds `position` back into `[-bound, bound]` as if it had bounced between
/// the walls. Motion repeats every `4 * bound`; an odd number of wall hits
/// leaves the velocity reversed. Non-finite state parks the particle at rest
/// in the centre.
fn reflect(position: &mut f32, velocity: &mut f32, bound: f32) {
    if !(bound > 0.0 && bound.is_finite()) || !position.is_finite() || !velocity.is_finite() {
        *position = 0.0;
        *velocity = 0.0;
        return;
    }
    if position.abs() <= bound {
        return;
    }
    let span = 2.0 * bound;
    let phase = (*position + bound).rem_euclid(2.0 * span);
    if phase <= span {
        *position = phase - bound;
    } else {
        *position = (2.0 * span - phase - bound).max(-bound);
        *velocity = -*velocity;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance: f32,
    pub opacity: f32,
}

/// Segment opacity for two particles `distance` apart: `max_opacity` at
/// zero distance, falling linearly to 0 at `threshold`.
pub fn connection_opacity(distance: f32, threshold: f32, max_opacity: f32) -> f32 {
    (1.0 - distance / threshold).clamp(0.0, 1.0) * max_opacity
}

/// Every unordered pair strictly closer than `threshold`, with `a < b`.
pub fn connections(positions: &[Vector3<f32>], threshold: f32, max_opacity: f32) -> Vec<Connection> {
    let mut found = Vec::new();
    let threshold2 = threshold * threshold;
    for (a, p) in positions.iter().enumerate() {
        for (offset, q) in positions[a + 1..].iter().enumerate() {
            let d2 = (*p - *q).magnitude2();
            if d2 < threshold2 {
                let distance = d2.sqrt();
                found.push(Connection {
                    a,
                    b: a + 1 + offset,
                    distance,
                    opacity: connection_opacity(distance, threshold, max_opacity),
                });
            }
        }
    }
    found
}

pub struct ParticleField {
    config: ParticleFieldConfig,
    particles: ParticleSet,
    connections: Vec<Connection>,
    points: Option<NodeId>,
    lines: Option<NodeId>,
    mouse: PointerOffset,
}

impl ParticleField {
    pub fn new(config: ParticleFieldConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let particles =
            ParticleSet::random(config.count, config.bound, config.velocity_spread, &mut rng);
        Self {
            config,
            particles,
            connections: Vec::new(),
            points: None,
            lines: None,
            mouse: PointerOffset::default(),
        }
    }

    /// Field with explicit initial particles instead of random ones.
    pub fn with_particles(config: ParticleFieldConfig, particles: ParticleSet) -> Self {
        Self {
            config,
            particles,
            connections: Vec::new(),
            points: None,
            lines: None,
            mouse: PointerOffset::default(),
        }
    }

    pub fn config(&self) -> &ParticleFieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &ParticleSet {
        &self.particles
    }

    /// Connections of the most recent frame.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn connection_vertices(&self) -> Vec<Vertex> {
        let positions = self.particles.positions();
        self.connections
            .iter()
            .flat_map(|c| {
                [
                    Vertex::coloured(positions[c.a].into(), BLACK, c.opacity),
                    Vertex::coloured(positions[c.b].into(), BLACK, c.opacity),
                ]
            })
            .collect()
    }
}

impl Default for ParticleField {
    fn default() -> Self {
        Self::new(ParticleFieldConfig::default())
    }
}

impl SceneBuilder for ParticleField {
    fn name(&self) -> &'static str {
        "particles"
    }

    fn camera(&self, width: u32, height: u32) -> Camera {
        Camera::new(
            [0.0, 0.0, self.config.camera_distance],
            Projection::perspective(self.config.fov, width, height, 0.1, 1000.0),
        )
    }

    fn build(&mut self, graph: &mut SceneGraph, root: NodeId) -> Built {
        let mut built = Built::new();
        self.points = built.track(graph.add_drawable(
            root,
            "particles",
            NodeKind::Points,
            Geometry::points(self.particles.positions()),
            Material::basic(BLACK).with_point_size(self.config.point_size),
            Transform::default(),
        ));
        // one line geometry, rewritten in place every frame
        self.lines = built.track(graph.add_drawable(
            root,
            "connections",
            NodeKind::Lines,
            Geometry::empty_lines(),
            Material::translucent(BLACK, 1.0),
            Transform::default(),
        ));
        built
    }

    fn update(&mut self, graph: &mut SceneGraph, camera: &mut Camera) {
        self.particles.step();
        if let Some(points) = self.points {
            let positions = self.particles.positions();
            graph.update_geometry(points, |geometry| {
                geometry.vertices.clear();
                geometry
                    .vertices
                    .extend(positions.iter().map(|p| Vertex::new((*p).into())));
            });
        }

        self.connections = connections(
            self.particles.positions(),
            self.config.connection_distance,
            self.config.max_line_opacity,
        );
        if let Some(lines) = self.lines {
            let vertices = self.connection_vertices();
            graph.update_geometry(lines, |geometry| {
                geometry.topology = Topology::LineList;
                geometry.vertices = vertices;
            });
        }

        let blend = self.config.blend;
        camera.position.x = approach(camera.position.x, self.mouse.x, blend);
        camera.position.y = approach(camera.position.y, -self.mouse.y, blend);
        camera.look_at(Point3::new(0.0, 0.0, 0.0));
    }

    fn tracks_pointer(&self) -> bool {
        true
    }

    fn pointer_moved(&mut self, offset: PointerOffset) {
        self.mouse = PointerOffset {
            x: offset.x * self.config.pointer_factor,
            y: offset.y * self.config.pointer_factor,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflection_folds_back_inside() {
        let mut p = 5.3;
        let mut v = 0.4;
        reflect(&mut p, &mut v, 5.0);
        assert!((p - 4.7).abs() < 1e-5);
        assert_eq!(v, -0.4);
    }

    #[test]
    fn reflection_counts_every_wall_hit() {
        // +5 wall, then the -5 wall, then 0.01 further
        let mut p = 15.01;
        let mut v = 1.0;
        reflect(&mut p, &mut v, 5.0);
        assert!((p + 4.99).abs() < 1e-4);
        assert_eq!(v, 1.0);

        let mut p = -5.25;
        let mut v = -0.5;
        reflect(&mut p, &mut v, 5.0);
        assert!((p + 4.75).abs() < 1e-5);
        assert_eq!(v, 0.5);
    }

    #[test]
    fn reflection_parks_non_finite_state() {
        let mut p = f32::NAN;
        let mut v = 0.1;
        reflect(&mut p, &mut v, 5.0);
        assert_eq!((p, v), (0.0, 0.0));

        let mut p = 1.0;
        let mut v = f32::INFINITY;
        reflect(&mut p, &mut v, 5.0);
        assert_eq!((p, v), (0.0, 0.0));
    }

    #[test]
    fn opacity_is_zero_at_threshold() {
        assert_eq!(connection_opacity(1.5, 1.5, 0.2), 0.0);
        assert!((connection_opacity(0.0, 1.5, 0.2) - 0.2).abs() < 1e-6);
    }
}
