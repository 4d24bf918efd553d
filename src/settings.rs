//! Viewer configuration.
//!
//! Plain data with sensible defaults; construct with struct-update syntax:
//!
//! ```rust,ignore
//! let settings = ViewerSettings {
//!     playback: PlaybackSettings { snapshot_rate_hz: 60.0, ..Default::default() },
//!     ..Default::default()
//! };
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    pub normalizer: NormalizerSettings,
    pub playback: PlaybackSettings,
}

/// Parameters of model placement and camera framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    /// Vertical field of view of the framing camera, in degrees.
    pub fov_y_degrees: f32,

    /// Extra room around the model when framing.
    ///
    /// `1.0` fits the largest dimension exactly into the view height.
    pub framing_margin: f32,

    /// Lower bound for the camera distance from the model center.
    pub min_camera_distance: f32,

    /// Viewing direction from the model center towards the camera. Normalized on use.
    pub camera_direction: Vec3,

    /// Camera pose used when a model has no measurable geometry.
    pub fallback_camera_position: Vec3,
    pub fallback_camera_target: Vec3,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            framing_margin: 1.8,
            min_camera_distance: 0.1,
            camera_direction: Vec3::new(0.8, 0.6, 0.8),
            fallback_camera_position: Vec3::new(5.0, 5.0, 5.0),
            fallback_camera_target: Vec3::ZERO,
        }
    }
}

/// Parameters of animation playback and UI publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often the visible playhead is republished, in Hz of accumulated frame time.
    ///
    /// `0` or less publishes on every frame.
    pub snapshot_rate_hz: f32,

    /// Speed applied to a freshly loaded model.
    pub default_speed: f32,

    /// Start the first clip as soon as a model or animation file is loaded.
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            snapshot_rate_hz: 30.0,
            default_speed: 1.0,
            autoplay: true,
        }
    }
}

impl PlaybackSettings {
    /// `default_speed` if usable, `1.0` otherwise.
    #[must_use]
    pub fn effective_default_speed(&self) -> f32 {
        if self.default_speed.is_finite() && self.default_speed > 0.0 {
            self.default_speed
        } else {
            1.0
        }
    }
}
