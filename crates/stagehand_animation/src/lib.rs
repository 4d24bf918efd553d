//! Keyframe animation for the Stagehand viewer.
//!
//! - [`KeyframeTrack`]: sampled keyframes with linear, step and cubic interpolation
//! - [`AnimationClip`]: named set of tracks addressing nodes by name
//! - [`AnimationAction`]: looping playhead and speed of one clip
//! - [`AnimationMixer`]: the per-model [`Evaluator`] that poses an [`AnimationTarget`]

pub mod action;
pub mod binder;
pub mod binding;
pub mod clip;
pub mod mixer;
pub mod target;
pub mod tracks;
pub mod values;

pub use action::AnimationAction;
pub use binder::Binder;
pub use binding::{PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use mixer::{AnimationMixer, Evaluator};
pub use target::{AnimationTarget, NodePose};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::{Interpolatable, MAX_MORPH_TARGETS, MorphWeightData};
