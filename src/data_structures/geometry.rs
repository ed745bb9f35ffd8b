//! Primitive geometry synthesis.
//!
//! All scenes are assembled from a handful of primitives: boxes (drawn as
//! edges or as triangle wireframes), grids, planes, polylines and point
//! clouds. Geometry is kept non-indexed and in local space; the renderer
//! applies node transforms.

use std::collections::HashSet;

use cgmath::Vector3;

pub type Rgb = [f32; 3];

pub const WHITE: Rgb = [1.0, 1.0, 1.0];
pub const BLACK: Rgb = [0.0, 0.0, 0.0];

/// Converts `0xRRGGBB` into linear-ish float components.
pub fn hex(rgb: u32) -> Rgb {
    [
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    ]
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            position,
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }

    pub fn coloured(position: [f32; 3], rgb: Rgb, alpha: f32) -> Self {
        Self {
            position,
            color: [rgb[0], rgb[1], rgb[2], alpha],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
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
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    LineList,
    PointList,
    TriangleList,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    pub topology: Topology,
    pub vertices: Vec<Vertex>,
}

impl Geometry {
    pub fn new(topology: Topology, vertices: Vec<Vertex>) -> Self {
        Self { topology, vertices }
    }

    pub fn empty_lines() -> Self {
        Self::new(Topology::LineList, Vec::new())
    }

    /// Axis aligned box centred on the origin as a triangle list, two
    /// triangles per face.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
        let corner = |x: f32, y: f32, z: f32| [x * hw, y * hh, z * hd];
        // each face listed counter-clockwise seen from outside
        let faces = [
            [corner(-1., -1., 1.), corner(1., -1., 1.), corner(1., 1., 1.), corner(-1., 1., 1.)],
            [corner(1., -1., -1.), corner(-1., -1., -1.), corner(-1., 1., -1.), corner(1., 1., -1.)],
            [corner(-1., 1., 1.), corner(1., 1., 1.), corner(1., 1., -1.), corner(-1., 1., -1.)],
            [corner(-1., -1., -1.), corner(1., -1., -1.), corner(1., -1., 1.), corner(-1., -1., 1.)],
            [corner(1., -1., 1.), corner(1., -1., -1.), corner(1., 1., -1.), corner(1., 1., 1.)],
            [corner(-1., -1., -1.), corner(-1., -1., 1.), corner(-1., 1., 1.), corner(-1., 1., -1.)],
        ];
        let vertices = faces
            .iter()
            .flat_map(|[a, b, c, d]| [*a, *b, *d, *b, *c, *d])
            .map(Vertex::new)
            .collect();
        Self::new(Topology::TriangleList, vertices)
    }

    /// The twelve outline edges of a box.
    pub fn box_edges(width: f32, height: f32, depth: f32) -> Self {
        let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
        let mut vertices = Vec::with_capacity(24);
        for &y in &[-hh, hh] {
            let ring = [[-hw, y, -hd], [hw, y, -hd], [hw, y, hd], [-hw, y, hd]];
            for i in 0..4 {
                vertices.push(Vertex::new(ring[i]));
                vertices.push(Vertex::new(ring[(i + 1) % 4]));
            }
        }
        for &(x, z) in &[(-hw, -hd), (hw, -hd), (hw, hd), (-hw, hd)] {
            vertices.push(Vertex::new([x, -hh, z]));
            vertices.push(Vertex::new([x, hh, z]));
        }
        Self::new(Topology::LineList, vertices)
    }

    /// Every distinct triangle edge of a triangle list, as lines. A box
    /// therefore shows its face diagonals as well as its outline.
    pub fn wireframe(&self) -> Self {
        if self.topology != Topology::TriangleList {
            return self.clone();
        }
        let key = |v: &Vertex| v.position.map(|c| (c * 10_000.0).round() as i64);
        let mut seen = HashSet::new();
        let mut vertices = Vec::new();
        for tri in self.vertices.chunks_exact(3) {
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                let (ka, kb) = (key(&tri[a]), key(&tri[b]));
                let edge = if ka <= kb { (ka, kb) } else { (kb, ka) };
                if seen.insert(edge) {
                    vertices.push(tri[a]);
                    vertices.push(tri[b]);
                }
            }
        }
        Self::new(Topology::LineList, vertices)
    }

    /// Square grid in the XZ plane. The two centre lines use `center_color`,
    /// the rest `grid_color`.
    pub fn grid(size: f32, divisions: u32, center_color: Rgb, grid_color: Rgb) -> Self {
        let divisions = divisions.max(1);
        let half = size / 2.0;
        let step = size / divisions as f32;
        let center = divisions / 2;
        let mut vertices = Vec::with_capacity((divisions as usize + 1) * 4);
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let color = if i == center { center_color } else { grid_color };
            vertices.push(Vertex::coloured([-half, 0.0, k], color, 1.0));
            vertices.push(Vertex::coloured([half, 0.0, k], color, 1.0));
            vertices.push(Vertex::coloured([k, 0.0, -half], color, 1.0));
            vertices.push(Vertex::coloured([k, 0.0, half], color, 1.0));
        }
        Self::new(Topology::LineList, vertices)
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let (a, b, c, d) = (
            [-hw, -hh, 0.0],
            [hw, -hh, 0.0],
            [hw, hh, 0.0],
            [-hw, hh, 0.0],
        );
        let vertices = [a, b, d, b, c, d].into_iter().map(Vertex::new).collect();
        Self::new(Topology::TriangleList, vertices)
    }

    /// Connected line through `points` (a strip, expanded to segments).
    pub fn polyline(points: &[Vector3<f32>]) -> Self {
        let vertices = points
            .windows(2)
            .flat_map(|pair| [Vertex::new(pair[0].into()), Vertex::new(pair[1].into())])
            .collect();
        Self::new(Topology::LineList, vertices)
    }

    pub fn points(positions: &[Vector3<f32>]) -> Self {
        let vertices = positions.iter().map(|p| Vertex::new((*p).into())).collect();
        Self::new(Topology::PointList, vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of primitives (segments, points or triangles).
    pub fn primitive_count(&self) -> usize {
        match self.topology {
            Topology::LineList => self.vertices.len() / 2,
            Topology::PointList => self.vertices.len(),
            Topology::TriangleList => self.vertices.len() / 3,
        }
    }
}
