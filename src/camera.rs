//! Cameras for the decorative scenes.
//!
//! Every scene uses either a perspective camera (aspect driven by the
//! container) or an orthographic one whose extents are derived from the
//! container size in pixels. Resizing is the only external mutation of the
//! projection; position changes come from the scenes' own smoothing.

use cgmath::{Deg, EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Vector3};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projection {
    Perspective {
        fovy: Deg<f32>,
        aspect: f32,
        znear: f32,
        zfar: f32,
    },
    /// Extents are `±width / pixels_per_unit` and `±height / pixels_per_unit`.
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        znear: f32,
        zfar: f32,
        pixels_per_unit: f32,
    },
}

impl Projection {
    pub fn perspective(fovy: f32, width: u32, height: u32, znear: f32, zfar: f32) -> Self {
        Projection::Perspective {
            fovy: Deg(fovy),
            aspect: aspect_of(width, height),
            znear,
            zfar,
        }
    }

    pub fn orthographic(
        width: u32,
        height: u32,
        pixels_per_unit: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let mut projection = Projection::Orthographic {
            left: 0.0,
            right: 0.0,
            top: 0.0,
            bottom: 0.0,
            znear,
            zfar,
            pixels_per_unit,
        };
        projection.resize(width, height);
        projection
    }

    /// Recomputes aspect (perspective) or extents (orthographic). Calling it
    /// twice with the same size is the same as calling it once.
    pub fn resize(&mut self, width: u32, height: u32) {
        match self {
            Projection::Perspective { aspect, .. } => *aspect = aspect_of(width, height),
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                pixels_per_unit,
                ..
            } => {
                let half_w = width as f32 / *pixels_per_unit;
                let half_h = height as f32 / *pixels_per_unit;
                *left = -half_w;
                *right = half_w;
                *top = half_h;
                *bottom = -half_h;
            }
        }
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        match *self {
            Projection::Perspective {
                fovy,
                aspect,
                znear,
                zfar,
            } => cgmath::perspective(fovy, aspect, znear, zfar),
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                znear,
                zfar,
                ..
            } => cgmath::ortho(left, right, bottom, top, znear, zfar),
        }
    }

    pub fn aspect(&self) -> f32 {
        match *self {
            Projection::Perspective { aspect, .. } => aspect,
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                ..
            } => (right - left) / (top - bottom),
        }
    }
}

// A zero height container must not poison the projection with NaN/inf.
fn aspect_of(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub projection: Projection,
}

impl Camera {
    pub fn new(position: impl Into<Point3<f32>>, projection: Projection) -> Self {
        Self {
            position: position.into(),
            target: Point3::origin(),
            up: Vector3::unit_y(),
            projection,
        }
    }

    pub fn look_at(&mut self, target: impl Into<Point3<f32>>) {
        self.target = target.into();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection.resize(width, height);
    }

    /// View matrix. Looking straight along the up axis (top-down floor plan)
    /// would make the basis degenerate, so -Z becomes "up" in that case.
    pub fn view_matrix(&self) -> Matrix4<f32> {
        let forward = self.target - self.position;
        let up = if forward.magnitude2() > 0.0 && forward.normalize().cross(self.up).magnitude2() < 1e-8
        {
            -Vector3::unit_z()
        } else {
            self.up
        };
        Matrix4::look_at_rh(self.position, self.target, up)
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection.matrix() * self.view_matrix()
    }

    /// Camera-space right and up axes in world coordinates, used to face
    /// sprites towards the viewer.
    pub fn billboard_axes(&self) -> (Vector3<f32>, Vector3<f32>) {
        let view = self.view_matrix();
        let inverse = view.invert().unwrap_or_else(Matrix4::identity);
        (inverse.x.truncate(), inverse.y.truncate())
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera) {
        self.view_proj = camera.view_proj().into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}
