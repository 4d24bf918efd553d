//! # Stagehand
//!
//! Core of a 3D model viewer: model normalization and animation playback.
//!
//! - [`placement`]: centers, grounds and auto-scales a model and frames a camera
//! - [`controller`]: the playback state machine over a [`ClipRegistry`]
//! - [`external`]: retargets clips from a second, animation-only file
//! - [`viewer`]: composes the above into `load → normalize → bind → play`
//!
//! ```rust,ignore
//! use stagehand::prelude::*;
//!
//! let mut viewer = Viewer::gltf(ViewerSettings::default());
//! let placement = viewer.load_model_path("models/fox.glb")?;
//! loop {
//!     if let Some(snapshot) = viewer.update(1.0 / 60.0) {
//!         println!("{} {:.2}s", snapshot.current_clip.unwrap_or_default(), snapshot.time);
//!     }
//! }
//! ```

pub mod controller;
pub mod external;
pub mod placement;
pub mod registry;
pub mod settings;
pub mod snapshot;
pub mod viewer;

pub use stagehand_animation as animation;
pub use stagehand_assets as assets;
pub use stagehand_scene as scene;

pub use controller::{AnimationController, AnimationState};
pub use external::{ExternalClipLoader, ExternalClipOutcome, ExternalClipRequest, ParsedExternalClips};
pub use placement::{ModelNormalizer, Placement, ScaleTier, auto_scale};
pub use registry::{ClipId, ClipInfo, ClipRegistry};
pub use settings::{NormalizerSettings, PlaybackSettings, ViewerSettings};
pub use snapshot::{AnimationSnapshot, AnimationStatus};
pub use stagehand_core::{BoundingBox, Error, FrameThrottle, NodeHandle, Result, Timer};
pub use viewer::Viewer;

pub mod prelude {
    pub use crate::{
        AnimationSnapshot, AnimationStatus, ClipId, Error, ExternalClipOutcome, Placement,
        Result, Viewer, ViewerSettings,
    };
    pub use stagehand_assets::{GltfLoader, SceneLoader};
}
