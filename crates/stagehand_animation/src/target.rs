use glam::{Quat, Vec3};
use stagehand_core::NodeHandle;

/// Animatable state of one node, as read back from the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePose {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub morph_weights: Vec<f32>,
}

/// Capability a scene graph exposes so clips can be bound to it and posed.
///
/// The animation crate never sees the concrete scene type; each scene-graph backend
/// implements this trait.
pub trait AnimationTarget {
    /// Finds the first node named `name` in the subtree rooted at `root`.
    fn find_node(&self, root: NodeHandle, name: &str) -> Option<NodeHandle>;

    /// Current animatable state of `node`, or `None` if it does not exist.
    fn pose(&self, node: NodeHandle) -> Option<NodePose>;

    fn set_translation(&mut self, node: NodeHandle, value: Vec3);

    fn set_rotation(&mut self, node: NodeHandle, value: Quat);

    fn set_scale(&mut self, node: NodeHandle, value: Vec3);

    fn set_morph_weights(&mut self, node: NodeHandle, weights: &[f32]);
}
