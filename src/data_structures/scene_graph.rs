//! Scene graph and hierarchical scene organization.
//!
//! A [`SceneGraph`] is a tree of nodes rooted at a single scene node. Nodes
//! are either plain groups or drawables (lines, points, meshes, sprites) that
//! own their geometry and material. Every geometry, material and texture is
//! registered as a live resource when its node is added and released when the
//! node is removed, so that a disposed scene can be checked for leftovers.

use std::collections::HashSet;

use cgmath::{Matrix4, SquareMatrix};
use slotmap::{SlotMap, new_key_type};

use crate::data_structures::{
    geometry::{Geometry, Rgb, Topology, WHITE},
    transform::Transform,
};

new_key_type! {
    pub struct NodeId;
}

/// GPU-side caches are keyed by this id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    /// Point size in world units, only used by point clouds.
    pub point_size: f32,
    /// Texture for sprites.
    pub map: Option<image::RgbaImage>,
}

impl Material {
    pub fn basic(color: Rgb) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            point_size: 1.0,
            map: None,
        }
    }

    pub fn translucent(color: Rgb, opacity: f32) -> Self {
        Self {
            opacity,
            transparent: true,
            ..Self::basic(color)
        }
    }

    pub fn sprite(map: image::RgbaImage) -> Self {
        Self {
            transparent: true,
            map: Some(map),
            ..Self::basic(WHITE)
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn with_point_size(mut self, size: f32) -> Self {
        self.point_size = size;
        self
    }

    /// Opacity only applies to transparent materials.
    pub fn alpha(&self) -> f32 {
        if self.transparent { self.opacity } else { 1.0 }
    }

    pub fn tint(&self) -> [f32; 4] {
        [self.color[0], self.color[1], self.color[2], self.alpha()]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Lines,
    Points,
    Mesh,
    Sprite,
}

#[derive(Clone, Debug)]
pub struct Drawable {
    pub geometry: Geometry,
    pub material: Material,
    pub geometry_id: ResourceId,
    pub material_id: ResourceId,
    pub texture_id: Option<ResourceId>,
    /// Bumped whenever the geometry is replaced so caches know to re-upload.
    pub version: u64,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    drawable: Option<Drawable>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn drawable(&self) -> Option<&Drawable> {
        self.drawable.as_ref()
    }
}

/// Outcome of removing nodes from the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Released {
    pub nodes: usize,
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl Released {
    pub fn resources(&self) -> usize {
        self.geometries + self.materials + self.textures
    }
}

impl std::ops::AddAssign for Released {
    fn add_assign(&mut self, rhs: Self) {
        self.nodes += rhs.nodes;
        self.geometries += rhs.geometries;
        self.materials += rhs.materials;
        self.textures += rhs.textures;
    }
}

/// A drawable node together with its world transform, as handed to renderers.
pub struct DrawItem<'a> {
    pub node: NodeId,
    pub kind: NodeKind,
    pub drawable: &'a Drawable,
    pub world: Matrix4<f32>,
}

pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
    next_resource: u64,
    live: HashSet<ResourceId>,
    // released since the last `take_released`, drained by renderers
    released: Vec<ResourceId>,
    added: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node {
            name: "scene".to_string(),
            kind: NodeKind::Group,
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
            drawable: None,
        });
        Self {
            nodes,
            root,
            next_resource: 0,
            live: HashSet::new(),
            released: Vec::new(),
            added: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn add_group(
        &mut self,
        parent: NodeId,
        name: &str,
        transform: Transform,
    ) -> Option<NodeId> {
        self.insert(parent, name, NodeKind::Group, transform, None)
    }

    /// Adds a drawable below `parent`. Returns `None` (and adds nothing) if
    /// `parent` is not part of the graph.
    pub fn add_drawable(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
        geometry: Geometry,
        material: Material,
        transform: Transform,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            log::warn!("cannot add '{}': parent node is not in the scene", name);
            return None;
        }
        let texture_id = material.map.as_ref().map(|_| self.allocate());
        let drawable = Drawable {
            geometry,
            material,
            geometry_id: self.allocate(),
            material_id: self.allocate(),
            texture_id,
            version: 0,
        };
        self.insert(parent, name, kind, transform, Some(drawable))
    }

    fn allocate(&mut self) -> ResourceId {
        let id = ResourceId(self.next_resource);
        self.next_resource += 1;
        self.live.insert(id);
        id
    }

    fn insert(
        &mut self,
        parent: NodeId,
        name: &str,
        kind: NodeKind,
        transform: Transform,
        drawable: Option<Drawable>,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            log::warn!("cannot add '{}': parent node is not in the scene", name);
            return None;
        }
        let id = self.nodes.insert(Node {
            name: name.to_string(),
            kind,
            transform,
            visible: true,
            parent: Some(parent),
            children: Vec::new(),
            drawable,
        });
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
        }
        self.added += 1;
        Some(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(id).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id).map(|n| &mut n.transform)
    }

    /// Rewrites the vertices of a drawable without reallocating the geometry.
    pub fn update_geometry(&mut self, id: NodeId, update: impl FnOnce(&mut Geometry)) -> bool {
        match self.nodes.get_mut(id).and_then(|n| n.drawable.as_mut()) {
            Some(drawable) => {
                update(&mut drawable.geometry);
                drawable.version += 1;
                true
            }
            None => false,
        }
    }

    /// Removes `id` and its whole subtree. The root cannot be removed, use
    /// [`SceneGraph::clear`] instead.
    pub fn remove(&mut self, id: NodeId) -> Released {
        if id == self.root || !self.nodes.contains_key(id) {
            return Released::default();
        }
        if let Some(parent) = self.nodes[id].parent {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|c| *c != id);
            }
        }
        let mut released = Released::default();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.remove(current) else {
                continue;
            };
            released.nodes += 1;
            stack.extend(node.children);
            if let Some(drawable) = node.drawable {
                if self.release(drawable.geometry_id) {
                    released.geometries += 1;
                }
                if self.release(drawable.material_id) {
                    released.materials += 1;
                }
                if let Some(texture) = drawable.texture_id {
                    if self.release(texture) {
                        released.textures += 1;
                    }
                }
            }
        }
        released
    }

    fn release(&mut self, id: ResourceId) -> bool {
        if self.live.remove(&id) {
            self.released.push(id);
            true
        } else {
            false
        }
    }

    /// Removes every node below the root and releases their resources.
    /// Clearing an empty scene is a no-op.
    pub fn clear(&mut self) -> Released {
        let children = self.nodes[self.root].children.clone();
        let mut released = Released::default();
        for child in children {
            released += self.remove(child);
        }
        self.nodes[self.root].transform = Transform::default();
        released
    }

    /// Resource ids released since the previous call.
    pub fn take_released(&mut self) -> Vec<ResourceId> {
        std::mem::take(&mut self.released)
    }

    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Number of nodes ever added below the root.
    pub fn added(&self) -> usize {
        self.added
    }

    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        if !self.nodes.contains_key(id) {
            return None;
        }
        while let Some(node_id) = current {
            let node = self.nodes.get(node_id)?;
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent;
        }
        Some(matrix)
    }

    /// Visible drawables in depth-first order with their world transforms.
    /// Invisible nodes hide their subtree.
    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        let mut items = Vec::new();
        let mut stack = vec![(self.root, Matrix4::identity())];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            let world = parent_world * node.transform.to_matrix();
            if let Some(drawable) = &node.drawable {
                items.push(DrawItem {
                    node: id,
                    kind: node.kind,
                    drawable,
                    world,
                });
            }
            for child in node.children.iter().rev() {
                stack.push((*child, world));
            }
        }
        items
    }

    pub fn count_by_topology(&self, topology: Topology) -> usize {
        self.nodes
            .values()
            .filter_map(|n| n.drawable.as_ref())
            .filter(|d| d.geometry.topology == topology)
            .count()
    }

    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
