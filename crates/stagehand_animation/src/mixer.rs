use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use stagehand_core::NodeHandle;

use crate::action::AnimationAction;
use crate::binder::Binder;
use crate::binding::TargetPath;
use crate::clip::{AnimationClip, TrackData};
use crate::target::{AnimationTarget, NodePose};

/// Per-model evaluator: owns one action per clip and writes sampled poses onto the
/// scene graph it was bound to.
///
/// A controller drives it through the [`Evaluator`] trait; the trait exists so that
/// other scene backends can supply their own evaluator.
pub trait Evaluator: Send {
    /// Root of the scene subtree this evaluator was bound to.
    fn root(&self) -> NodeHandle;

    fn actions(&self) -> &[AnimationAction];

    fn actions_mut(&mut self) -> &mut [AnimationAction];

    /// Advances every running action by `dt` seconds and applies the result.
    fn advance(&mut self, dt: f32, target: &mut dyn AnimationTarget);

    fn action(&self, index: usize) -> Option<&AnimationAction> {
        self.actions().get(index)
    }

    fn action_mut(&mut self, index: usize) -> Option<&mut AnimationAction> {
        self.actions_mut().get_mut(index)
    }

    /// Writes the bind-time pose back onto every node this evaluator animates.
    fn restore_rest_pose(&mut self, target: &mut dyn AnimationTarget);

    /// Stops and disables every action.
    fn stop_all(&mut self) {
        for action in self.actions_mut() {
            action.stop();
        }
    }
}

/// The default [`Evaluator`].
///
/// A property that stops being driven (its action was stopped, or playback
/// switched to a clip that does not animate it) returns to its rest pose on the
/// next [`advance`](Evaluator::advance).
pub struct AnimationMixer {
    root: NodeHandle,
    actions: Vec<AnimationAction>,
    /// Pose of every bound node when its clip was bound.
    rest_poses: FxHashMap<NodeHandle, NodePose>,
    /// Properties written by the previous `apply`.
    driven: FxHashSet<(NodeHandle, TargetPath)>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            actions: Vec::new(),
            rest_poses: FxHashMap::default(),
            driven: FxHashSet::default(),
        }
    }

    /// Creates a mixer with one stopped action per clip, each bound under `root`.
    pub fn with_clips(
        target: &dyn AnimationTarget,
        root: NodeHandle,
        clips: impl IntoIterator<Item = Arc<AnimationClip>>,
    ) -> Self {
        let mut mixer = Self::new(root);
        for clip in clips {
            let bindings = Binder::bind(target, root, &clip);
            let mut action = AnimationAction::new(clip);
            action.bindings = bindings;
            mixer.add_action(action, target);
        }
        mixer
    }

    /// Adds an already bound action, recording the rest pose of the nodes it drives.
    pub fn add_action(&mut self, action: AnimationAction, target: &dyn AnimationTarget) {
        for binding in &action.bindings {
            if !self.rest_poses.contains_key(&binding.node)
                && let Some(pose) = target.pose(binding.node)
            {
                self.rest_poses.insert(binding.node, pose);
            }
        }
        self.actions.push(action);
    }

    /// Rest pose recorded for `node`, if any clip animates it.
    #[must_use]
    pub fn rest_pose(&self, node: NodeHandle) -> Option<&NodePose> {
        self.rest_poses.get(&node)
    }

    fn restore_property(&self, target: &mut dyn AnimationTarget, node: NodeHandle, path: TargetPath) {
        let Some(rest) = self.rest_poses.get(&node) else {
            return;
        };
        match path {
            TargetPath::Translation => target.set_translation(node, rest.translation),
            TargetPath::Rotation => target.set_rotation(node, rest.rotation),
            TargetPath::Scale => target.set_scale(node, rest.scale),
            TargetPath::Weights => target.set_morph_weights(node, &rest.morph_weights),
        }
    }

    /// Writes the pose of every enabled action; paused actions hold their pose.
    /// Properties driven last time but not now go back to rest.
    fn apply(&mut self, target: &mut dyn AnimationTarget) {
        let previous = std::mem::take(&mut self.driven);

        for action in &mut self.actions {
            if !action.enabled || action.weight <= 0.0 {
                continue;
            }

            let time = action.time;
            let clip = Arc::clone(action.clip());

            for binding in &action.bindings {
                let Some(track) = clip.tracks.get(binding.track_index) else {
                    continue;
                };
                let Some(cursor) = action.track_cursors.get_mut(binding.track_index) else {
                    continue;
                };
                self.driven.insert((binding.node, binding.target));

                match (&track.data, binding.target) {
                    (TrackData::Vector3(t), TargetPath::Translation) => {
                        if let Some(v) = t.sample_with_cursor(time, cursor) {
                            target.set_translation(binding.node, v);
                        }
                    }
                    (TrackData::Vector3(t), TargetPath::Scale) => {
                        if let Some(v) = t.sample_with_cursor(time, cursor) {
                            target.set_scale(binding.node, v);
                        }
                    }
                    (TrackData::Quaternion(t), TargetPath::Rotation) => {
                        if let Some(v) = t.sample_with_cursor(time, cursor) {
                            target.set_rotation(binding.node, v);
                        }
                    }
                    (TrackData::MorphWeights(t), TargetPath::Weights) => {
                        if let Some(v) = t.sample_with_cursor(time, cursor) {
                            target.set_morph_weights(binding.node, &v.weights);
                        }
                    }
                    _ => {}
                }
            }
        }

        for &(node, path) in previous.difference(&self.driven) {
            self.restore_property(target, node, path);
        }
    }
}

impl Evaluator for AnimationMixer {
    fn root(&self) -> NodeHandle {
        self.root
    }

    fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    fn actions_mut(&mut self) -> &mut [AnimationAction] {
        &mut self.actions
    }

    fn advance(&mut self, dt: f32, target: &mut dyn AnimationTarget) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for action in &mut self.actions {
            action.update(dt);
        }

        self.apply(target);
    }

    fn restore_rest_pose(&mut self, target: &mut dyn AnimationTarget) {
        for (&node, rest) in &self.rest_poses {
            target.set_translation(node, rest.translation);
            target.set_rotation(node, rest.rotation);
            target.set_scale(node, rest.scale);
            target.set_morph_weights(node, &rest.morph_weights);
        }
        self.driven.clear();
    }
}
