//! Transform System
//!
//! Propagates local transforms into world matrices. Kept apart from [`Scene`] so that
//! it only borrows the node map, never the whole scene.
//!
//! [`Scene`]: crate::Scene

use glam::Affine3A;
use slotmap::SlotMap;
use stagehand_core::NodeHandle;

use crate::node::Node;

/// Updates the world matrices of every subtree in `roots`.
///
/// Uses an explicit stack instead of recursion so deep hierarchies (long bone
/// chains) cannot overflow. A node's world matrix is recomputed when its local
/// transform changed or any ancestor's world matrix did.
pub fn update_hierarchy(nodes: &mut SlotMap<NodeHandle, Node>, roots: &[NodeHandle]) {
    let mut stack: Vec<(NodeHandle, Affine3A, bool)> = Vec::with_capacity(64);

    for &root in roots.iter().rev() {
        stack.push((root, Affine3A::IDENTITY, false));
    }

    propagate(nodes, stack);
}

/// Forces a full world-matrix refresh of the subtree under `root`.
///
/// The parent chain above `root` is composed from the ancestors' current TRS values
/// rather than their cached matrices, so a stale ancestor cannot leak into the
/// result.
pub fn update_subtree(nodes: &mut SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let Some(node) = nodes.get(root) else {
        return;
    };

    let parent_world = node
        .parent
        .map_or(Affine3A::IDENTITY, |parent| ancestor_world(nodes, parent));

    propagate(nodes, vec![(root, parent_world, true)]);
}

/// World matrix of `handle` computed from the TRS values up the parent chain.
fn ancestor_world(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Affine3A {
    let mut world = Affine3A::IDENTITY;
    let mut current = Some(handle);

    while let Some(h) = current {
        let Some(node) = nodes.get(h) else {
            break;
        };
        world = node.transform.compose() * world;
        current = node.parent;
    }

    world
}

fn propagate(nodes: &mut SlotMap<NodeHandle, Node>, mut stack: Vec<(NodeHandle, Affine3A, bool)>) {
    while let Some((handle, parent_world, parent_changed)) = stack.pop() {
        let Some(node) = nodes.get_mut(handle) else {
            continue;
        };

        let local_changed = node.transform.update_local_matrix();
        let world_changed = local_changed || parent_changed;

        if world_changed {
            let world = parent_world * *node.transform.local_matrix();
            node.transform.set_world_matrix(world);
        }

        let world = node.transform.world_matrix;
        for &child in node.children.iter().rev() {
            stack.push((child, world, world_changed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn link(nodes: &mut SlotMap<NodeHandle, Node>, parent: NodeHandle, child: NodeHandle) {
        nodes[parent].children.push(child);
        nodes[child].parent = Some(parent);
    }

    #[test]
    fn hierarchy_update_composes_parent() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();

        let mut parent = Node::new("parent");
        parent.transform.position = Vec3::new(1.0, 0.0, 0.0);
        let parent_handle = nodes.insert(parent);

        let mut child = Node::new("child");
        child.transform.position = Vec3::new(0.0, 1.0, 0.0);
        let child_handle = nodes.insert(child);
        link(&mut nodes, parent_handle, child_handle);

        update_hierarchy(&mut nodes, &[parent_handle]);

        let pos = nodes[child_handle].transform.world_matrix.translation;
        assert!((pos.x - 1.0).abs() < 1e-5);
        assert!((pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn subtree_update_ignores_stale_ancestor_cache() {
        let mut nodes: SlotMap<NodeHandle, Node> = SlotMap::with_key();
        let parent_handle = nodes.insert(Node::new("parent"));
        let child_handle = nodes.insert(Node::new("child"));
        link(&mut nodes, parent_handle, child_handle);
        update_hierarchy(&mut nodes, &[parent_handle]);

        // Parent moves but nobody propagates it before the subtree refresh.
        nodes[parent_handle].transform.scale = Vec3::splat(2.0);
        nodes[child_handle].transform.position = Vec3::new(0.0, 3.0, 0.0);
        update_subtree(&mut nodes, child_handle);

        let pos = nodes[child_handle].transform.world_matrix.translation;
        assert!((pos.y - 6.0).abs() < 1e-5);
    }
}
