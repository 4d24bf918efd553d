use rustc_hash::FxHashMap;
use stagehand_core::NodeHandle;

use crate::binding::PropertyBinding;
use crate::clip::AnimationClip;
use crate::target::AnimationTarget;

pub struct Binder;

impl Binder {
    /// Resolves every track of `clip` against the subtree under `root`.
    ///
    /// Tracks whose node is missing are left unbound; they simply do not animate.
    /// Each node name is looked up once per clip.
    pub fn bind(
        target: &dyn AnimationTarget,
        root: NodeHandle,
        clip: &AnimationClip,
    ) -> Vec<PropertyBinding> {
        let mut bindings = Vec::with_capacity(clip.tracks.len());
        let mut resolved: FxHashMap<&str, Option<NodeHandle>> = FxHashMap::default();

        for (track_index, track) in clip.tracks.iter().enumerate() {
            let name = track.meta.node_name.as_str();
            let node = *resolved
                .entry(name)
                .or_insert_with(|| target.find_node(root, name));

            if let Some(node) = node {
                bindings.push(PropertyBinding {
                    track_index,
                    node,
                    target: track.meta.target,
                });
            }
        }

        let unbound = clip.tracks.len() - bindings.len();
        if unbound > 0 {
            log::debug!(
                "Clip '{}': {} of {} tracks have no matching node",
                clip.name,
                unbound,
                clip.tracks.len()
            );
        }

        bindings
    }
}
