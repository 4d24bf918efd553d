use glam::Affine3A;
use smallvec::SmallVec;
use stagehand_core::{BoundingBox, NodeHandle};

use crate::transform::Transform;

/// Geometry summary of a mesh node: enough to measure it, nothing to draw it.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: Option<String>,
    /// Union of all primitive bounds, in the node's local space.
    pub local_bounds: BoundingBox,
    pub primitive_count: usize,
    pub morph_target_count: usize,
    pub skinned: bool,
}

/// What a node is, beyond its place in the hierarchy.
#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    /// Pure transform node.
    #[default]
    Group,
    Mesh(MeshData),
    Camera,
    Light,
    /// Skeleton joint referenced by a skin.
    Joint,
}

impl NodeKind {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::Mesh(_) => "Mesh",
            NodeKind::Camera => "Camera",
            NodeKind::Light => "Light",
            NodeKind::Joint => "Joint",
        }
    }
}

/// Anything with measurable geometry.
pub trait Drawable {
    /// Local-space bounds, or `None` when the item draws nothing.
    fn geometry_bounds(&self) -> Option<BoundingBox>;
}

impl Drawable for NodeKind {
    fn geometry_bounds(&self) -> Option<BoundingBox> {
        match self {
            NodeKind::Mesh(mesh) if !mesh.local_bounds.is_empty() => Some(mesh.local_bounds),
            _ => None,
        }
    }
}

/// A scene node.
///
/// Hierarchy links are kept in sync by [`Scene`](crate::Scene); use its `attach`
/// and `add_to_parent` rather than editing `parent`/`children` directly.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    /// Visibility flag for rendering; bounds are measured regardless.
    pub visible: bool,

    /// Current morph target weights written by animation.
    pub morph_weights: SmallVec<[f32; 8]>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: NodeKind::Group,
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            morph_weights: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_kind(name: &str, kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::new(name)
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// World matrix as of the last transform propagation.
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &Affine3A {
        &self.transform.world_matrix
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
