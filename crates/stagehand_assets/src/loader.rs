use std::path::Path;

use stagehand_animation::AnimationClip;
use stagehand_core::{NodeHandle, Result};
use stagehand_scene::Scene;

use crate::info::ModelInfo;

/// A fully decoded model: its own scene graph, the root every node hangs under,
/// the embedded clips and the file's metadata.
#[derive(Debug)]
pub struct LoadedModel {
    pub scene: Scene,
    pub root: NodeHandle,
    pub clips: Vec<AnimationClip>,
    pub info: ModelInfo,
}

/// Decodes model containers into scene graphs and animation clips.
///
/// Implementations must be shareable across threads: animation-only files are
/// parsed on a blocking worker while the frame loop keeps running.
pub trait SceneLoader: Send + Sync {
    /// Decodes a complete model.
    fn load_model(&self, bytes: &[u8]) -> Result<LoadedModel>;

    /// Decodes only the animation clips of a file.
    ///
    /// Parse failures are reported as `MalformedClipFile`; a file that parses but
    /// has no animations yields an empty list.
    fn load_clips(&self, bytes: &[u8]) -> Result<Vec<AnimationClip>>;

    /// Reads and decodes a model file from disk.
    fn load_model_path(&self, path: &Path) -> Result<LoadedModel> {
        let bytes = std::fs::read(path)?;
        self.load_model(&bytes)
    }
}
