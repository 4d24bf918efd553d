use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stagehand_animation::{AnimationAction, AnimationClip, AnimationMixer, AnimationTarget, Evaluator};
use stagehand_core::NodeHandle;

/// Dense index of a clip inside one [`ClipRegistry`].
///
/// Ids are only meaningful for the registry that issued them; a new model or an
/// external animation file starts numbering from zero again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClipId(pub usize);

impl ClipId {
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display data of a registered clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    pub id: ClipId,
    pub name: String,
    pub duration: f32,
}

/// The playable clips of the displayed model together with the evaluator bound
/// to them.
pub struct ClipRegistry {
    clips: Vec<ClipInfo>,
    evaluator: Box<dyn Evaluator>,
}

impl ClipRegistry {
    /// Binds `clips` to the subtree under `root` through a fresh [`AnimationMixer`].
    ///
    /// Unnamed clips are called `Animation 1`, `Animation 2`, ... by position.
    pub fn bind(
        target: &dyn AnimationTarget,
        root: NodeHandle,
        clips: impl IntoIterator<Item = AnimationClip>,
    ) -> Self {
        let clips: Vec<Arc<AnimationClip>> = clips
            .into_iter()
            .enumerate()
            .map(|(i, mut clip)| {
                if clip.name.trim().is_empty() {
                    clip.name = format!("Animation {}", i + 1);
                }
                Arc::new(clip)
            })
            .collect();

        let mixer = AnimationMixer::with_clips(target, root, clips);
        Self::from_evaluator(Box::new(mixer))
    }

    /// Wraps an already bound evaluator; clip infos are read from its actions.
    #[must_use]
    pub fn from_evaluator(evaluator: Box<dyn Evaluator>) -> Self {
        let clips = evaluator
            .actions()
            .iter()
            .enumerate()
            .map(|(i, action)| ClipInfo {
                id: ClipId(i),
                name: action.clip().name.clone(),
                duration: action.duration(),
            })
            .collect();

        Self { clips, evaluator }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    #[must_use]
    pub fn clips(&self) -> &[ClipInfo] {
        &self.clips
    }

    #[must_use]
    pub fn get(&self, id: ClipId) -> Option<&ClipInfo> {
        self.clips.get(id.0)
    }

    #[must_use]
    pub fn contains(&self, id: ClipId) -> bool {
        id.0 < self.clips.len()
    }

    /// First clip called `name`.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<ClipId> {
        self.clips.iter().find(|c| c.name == name).map(|c| c.id)
    }

    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.clips.iter().map(|c| c.name.clone()).collect()
    }

    #[must_use]
    pub fn root(&self) -> NodeHandle {
        self.evaluator.root()
    }

    #[must_use]
    pub fn action(&self, id: ClipId) -> Option<&AnimationAction> {
        self.evaluator.action(id.0)
    }

    pub fn action_mut(&mut self, id: ClipId) -> Option<&mut AnimationAction> {
        self.evaluator.action_mut(id.0)
    }

    pub fn evaluator_mut(&mut self) -> &mut dyn Evaluator {
        self.evaluator.as_mut()
    }

    /// Stops and disables every action.
    pub fn stop_all(&mut self) {
        self.evaluator.stop_all();
    }

    /// Puts every animated node back into the pose it had when the clips were bound.
    pub fn restore_rest_pose(&mut self, target: &mut dyn AnimationTarget) {
        self.evaluator.restore_rest_pose(target);
    }

    /// Stops and disables every action except `keep`.
    pub fn stop_others(&mut self, keep: ClipId) {
        for (i, action) in self.evaluator.actions_mut().iter_mut().enumerate() {
            if i != keep.0 {
                action.stop();
            }
        }
    }
}

impl fmt::Debug for ClipRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClipRegistry")
            .field("clips", &self.clips)
            .field("root", &self.evaluator.root())
            .finish_non_exhaustive()
    }
}
