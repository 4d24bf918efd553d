use glam::{Quat, Vec3};
use slotmap::SlotMap;
use stagehand_animation::{AnimationTarget, NodePose};
use stagehand_core::{BoundingBox, NodeHandle};

use crate::node::{Drawable, Node, NodeKind};
use crate::transform_system;

/// Node arena plus the list of top-level nodes.
///
/// Every node lives in one [`SlotMap`]; hierarchy links are handles, so removing a
/// subtree never invalidates handles held elsewhere (they simply stop resolving).
#[derive(Debug, Default, Clone)]
pub struct Scene {
    pub name: String,
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub(crate) root_nodes: Vec<NodeHandle>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building a node.
    pub fn build_node(&'_ mut self, name: &str) -> NodeBuilder<'_> {
        NodeBuilder::new(self, name)
    }

    /// Inserts a node at the top level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Inserts a node as the last child of `parent`.
    ///
    /// Falls back to the top level if `parent` does not exist.
    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let handle = self.nodes.insert(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(handle);
            if let Some(c) = self.nodes.get_mut(handle) {
                c.parent = Some(parent);
            }
        } else {
            log::warn!("add_to_parent: parent node not found, inserting at top level");
            self.root_nodes.push(handle);
        }

        handle
    }

    /// Removes a node and its whole subtree.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };

        self.detach(handle, node.parent);

        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            if let Some(node) = self.nodes.remove(h) {
                stack.extend(node.children);
            }
        }
    }

    /// Re-parents `child` under `parent`.
    ///
    /// Refuses to create cycles: attaching a node to itself or to one of its own
    /// descendants is a no-op.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent || self.is_ancestor(child, parent) {
            log::warn!("Cannot attach node under itself or its own descendant");
            return;
        }
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found during attach");
            return;
        }
        let Some(old_parent) = self.nodes.get(child).map(|n| n.parent) else {
            return;
        };

        self.detach(child, old_parent);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
            c.transform.mark_dirty();
        }
    }

    fn detach(&mut self, child: NodeHandle, parent: Option<NodeHandle>) {
        if let Some(p) = parent {
            if let Some(node) = self.nodes.get_mut(p)
                && let Some(i) = node.children.iter().position(|&x| x == child)
            {
                node.children.remove(i);
            }
        } else if let Some(i) = self.root_nodes.iter().position(|&x| x == child) {
            self.root_nodes.remove(i);
        }
    }

    /// Whether `ancestor` appears on the parent chain of `node`.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth-first, pre-order walk of the subtree under `root`.
    pub fn traverse(&self, root: NodeHandle, mut visit: impl FnMut(NodeHandle, &Node)) {
        let mut stack = vec![root];
        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get(h) else {
                continue;
            };
            visit(h, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// First node named `name` under `root`, in pre-order.
    #[must_use]
    pub fn find_node_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(h) = stack.pop() {
            let Some(node) = self.nodes.get(h) else {
                continue;
            };
            if node.name == name {
                return Some(h);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    // ========================================================================
    // World matrix pipeline
    // ========================================================================

    /// Updates world matrices for the whole scene.
    pub fn update_matrix_world(&mut self) {
        transform_system::update_hierarchy(&mut self.nodes, &self.root_nodes);
    }

    /// Forces a world-matrix refresh of one subtree, ancestors included.
    pub fn update_subtree(&mut self, root: NodeHandle) {
        transform_system::update_subtree(&mut self.nodes, root);
    }

    /// World-space bounds of every drawable under `root`, `root` included.
    ///
    /// World matrices of the subtree are refreshed first, so the result reflects
    /// the transforms as they are now. Returns [`BoundingBox::EMPTY`] when the
    /// subtree contains no geometry.
    pub fn compute_world_bounds(&mut self, root: NodeHandle) -> BoundingBox {
        self.update_subtree(root);

        let mut bounds = BoundingBox::EMPTY;
        self.traverse(root, |_, node| {
            if let Some(local) = node.kind.geometry_bounds() {
                bounds = bounds.union(&local.transform(node.world_matrix()));
            }
        });
        bounds
    }

    /// Counts nodes under `root` by kind: `(meshes, joints, cameras, lights)`.
    #[must_use]
    pub fn count_kinds(&self, root: NodeHandle) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        self.traverse(root, |_, node| match node.kind {
            NodeKind::Mesh(_) => counts.0 += 1,
            NodeKind::Joint => counts.1 += 1,
            NodeKind::Camera => counts.2 += 1,
            NodeKind::Light => counts.3 += 1,
            NodeKind::Group => {}
        });
        counts
    }
}

impl AnimationTarget for Scene {
    fn find_node(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.find_node_by_name(root, name)
    }

    fn pose(&self, node: NodeHandle) -> Option<NodePose> {
        let n = self.nodes.get(node)?;
        Some(NodePose {
            translation: n.transform.position,
            rotation: n.transform.rotation,
            scale: n.transform.scale,
            morph_weights: n.morph_weights.to_vec(),
        })
    }

    fn set_translation(&mut self, node: NodeHandle, value: Vec3) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.transform.position = value;
        }
    }

    fn set_rotation(&mut self, node: NodeHandle, value: Quat) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.transform.rotation = value;
        }
    }

    fn set_scale(&mut self, node: NodeHandle, value: Vec3) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.transform.scale = value;
        }
    }

    fn set_morph_weights(&mut self, node: NodeHandle, weights: &[f32]) {
        if let Some(n) = self.nodes.get_mut(node) {
            let count = match &n.kind {
                NodeKind::Mesh(mesh) if mesh.morph_target_count > 0 => {
                    mesh.morph_target_count.min(weights.len())
                }
                _ => weights.len(),
            };
            n.morph_weights.clear();
            n.morph_weights.extend_from_slice(&weights[..count]);
        }
    }
}

pub struct NodeBuilder<'a> {
    scene: &'a mut Scene,
    node: Node,
    parent: Option<NodeHandle>,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(scene: &'a mut Scene, name: &str) -> Self {
        Self {
            scene,
            node: Node::new(name),
            parent: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.node.transform.position = Vec3::new(x, y, z);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, s: f32) -> Self {
        self.node.transform.scale = Vec3::splat(s);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.node.transform.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.node.kind = kind;
        self
    }

    /// Inserts the node and returns its handle.
    pub fn build(self) -> NodeHandle {
        match self.parent {
            Some(parent) => self.scene.add_to_parent(self.node, parent),
            None => self.scene.add_node(self.node),
        }
    }
}
