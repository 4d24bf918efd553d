//! Animation clips from a second, animation-only file.
//!
//! The flow is split so the parse can run off the frame path while the host keeps
//! rendering:
//!
//! ```rust,ignore
//! let request = external.begin(&controller, bytes)?;   // captures the generation
//! let parsed = request.resolve().await?;              // parse, no controller borrow
//! controller.commit_external(parsed, &mut scene);      // staleness check + install
//! ```

use std::fmt;
use std::sync::Arc;

use stagehand_animation::AnimationClip;
use stagehand_assets::SceneLoader;
use stagehand_core::{Error, NodeHandle, Result};

use crate::controller::AnimationController;

/// What happened to a parsed external file at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalClipOutcome {
    /// The clips now drive the displayed model.
    Applied { clip_count: usize },
    /// The model changed while parsing; nothing was modified.
    Discarded,
}

/// Clips parsed from an external file, tagged with the generation they were
/// requested under.
#[derive(Debug)]
pub struct ParsedExternalClips {
    pub generation: u64,
    pub root: NodeHandle,
    pub clips: Vec<AnimationClip>,
}

/// Starts external clip loads against the displayed model.
#[derive(Clone)]
pub struct ExternalClipLoader {
    loader: Arc<dyn SceneLoader>,
}

impl ExternalClipLoader {
    #[must_use]
    pub fn new(loader: Arc<dyn SceneLoader>) -> Self {
        Self { loader }
    }

    /// Captures the current generation and model root for a load of `bytes`.
    ///
    /// Fails with `NoModelLoaded` when nothing is displayed.
    pub fn begin(
        &self,
        controller: &AnimationController,
        bytes: Vec<u8>,
    ) -> Result<ExternalClipRequest> {
        let root = controller.root().ok_or(Error::NoModelLoaded)?;
        let generation = controller.generation();

        log::debug!(
            "External clip load started: {} bytes, generation {generation}",
            bytes.len()
        );

        Ok(ExternalClipRequest {
            generation,
            root,
            bytes,
            loader: Arc::clone(&self.loader),
        })
    }
}

impl fmt::Debug for ExternalClipLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalClipLoader").finish_non_exhaustive()
    }
}

/// A pending external load. Holds no borrow of the controller.
pub struct ExternalClipRequest {
    generation: u64,
    root: NodeHandle,
    bytes: Vec<u8>,
    loader: Arc<dyn SceneLoader>,
}

impl ExternalClipRequest {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Parses the file into clips.
    ///
    /// Fails with `MalformedClipFile` when the file cannot be parsed and with
    /// `NoAnimationData` when it has no clips.
    pub async fn resolve(self) -> Result<ParsedExternalClips> {
        let Self {
            generation,
            root,
            bytes,
            loader,
        } = self;

        let clips = parse_clips(loader, bytes).await?;
        if clips.is_empty() {
            return Err(Error::NoAnimationData);
        }

        Ok(ParsedExternalClips {
            generation,
            root,
            clips,
        })
    }
}

impl fmt::Debug for ExternalClipRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExternalClipRequest")
            .field("generation", &self.generation)
            .field("root", &self.root)
            .field("bytes", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Offloads parsing to the blocking pool when a tokio runtime is running.
#[cfg(not(target_arch = "wasm32"))]
async fn parse_clips(loader: Arc<dyn SceneLoader>, bytes: Vec<u8>) -> Result<Vec<AnimationClip>> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle
            .spawn_blocking(move || loader.load_clips(&bytes))
            .await
            .map_err(|e| Error::TaskJoin(e.to_string()))?,
        Err(_) => loader.load_clips(&bytes),
    }
}

#[cfg(target_arch = "wasm32")]
async fn parse_clips(loader: Arc<dyn SceneLoader>, bytes: Vec<u8>) -> Result<Vec<AnimationClip>> {
    loader.load_clips(&bytes)
}
