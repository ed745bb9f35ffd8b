//! Scene data: transforms, primitive geometry, the scene graph and GPU
//! textures.
//!
//! - `transform` positions, rotates and scales nodes
//! - `geometry` synthesizes boxes, grids, planes, polylines and point clouds
//! - `scene_graph` is the per-visual node tree with resource tracking
//! - `texture` wraps wgpu textures for labels and render targets

pub mod geometry;
pub mod scene_graph;
pub mod texture;
pub mod transform;
