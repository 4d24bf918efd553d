use std::sync::Arc;

use crate::binding::PropertyBinding;
use crate::clip::AnimationClip;
use crate::tracks::KeyframeCursor;

/// Runtime binding of one clip to one evaluator: its own playhead, speed and weight.
/// Playback always loops.
///
/// An action is *running* when it is enabled and not paused. A paused action keeps
/// its pose applied; a disabled (stopped) action contributes nothing.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    /// Creates a stopped action with one cursor per track.
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 0.0,
            paused: false,
            enabled: false,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.clip.duration
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.enabled && !self.paused
    }

    /// Enables the action at full weight and unpauses it. The playhead is kept.
    pub fn play(&mut self) {
        self.enabled = true;
        self.paused = false;
        self.weight = 1.0;
    }

    /// Disables the action and rewinds it.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.paused = false;
        self.weight = 0.0;
        self.rewind();
    }

    /// Rewinds to the start and clears the paused flag without enabling.
    pub fn reset(&mut self) {
        self.paused = false;
        self.rewind();
    }

    /// Moves the playhead, clamped to `[0, duration]`. Running state is untouched.
    pub fn set_time(&mut self, time: f32) {
        let time = if time.is_finite() { time } else { 0.0 };
        self.time = time.clamp(0.0, self.clip.duration.max(0.0));
    }

    fn rewind(&mut self) {
        self.time = 0.0;
        for cursor in &mut self.track_cursors {
            cursor.last_index = 0;
        }
    }

    /// Advances the playhead by `dt` scaled by `time_scale`.
    pub fn update(&mut self, dt: f32) {
        if !self.is_running() {
            return;
        }

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        // Landing exactly on the end keeps the final pose for this frame; wrapping
        // happens once the playhead moves past it.
        if self.time > duration || self.time < 0.0 {
            self.time = self.time.rem_euclid(duration);
        }
    }
}
