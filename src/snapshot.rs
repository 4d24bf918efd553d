use serde::{Deserialize, Serialize};

/// Lifecycle status of animation playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationStatus {
    /// No clips to play.
    #[default]
    Idle,
    /// A clip is selected but has not been started.
    Ready,
    Playing,
    Paused,
    Stopped,
}

impl AnimationStatus {
    #[must_use]
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// Read-only view of playback for UI panels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    pub clip_names: Vec<String>,
    pub current_clip: Option<String>,
    pub status: AnimationStatus,
    /// Playhead in seconds, as of the last throttled sample or command.
    pub time: f32,
    /// Duration of the current clip, zero without one.
    pub duration: f32,
    pub speed: f32,
    pub generation: u64,
}

impl AnimationSnapshot {
    /// Playhead as a fraction of the clip, for progress bars.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            (self.time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
