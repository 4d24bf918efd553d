//! Animation playback state machine.
//!
//! ```text
//!   load ──► Idle (no clips)
//!   load ──► Ready (autoplay off) ── resume ──► Playing
//!   load ──► Playing ◄──► Paused
//!              │  ▲          │
//!         stop ▼  │ resume   ▼ stop
//!             Stopped ◄──────┘
//!   reset ──► Idle
//! ```
//!
//! The controller owns the active [`ClipRegistry`] and the generation counter.
//! Every model load and every reset bumps the generation; asynchronous work
//! started against an older generation is discarded when it tries to commit.

use stagehand_animation::{AnimationAction, AnimationTarget};
use stagehand_core::{Error, FrameThrottle, NodeHandle, Result};

use crate::external::{ExternalClipOutcome, ParsedExternalClips};
use crate::registry::{ClipId, ClipInfo, ClipRegistry};
use crate::settings::PlaybackSettings;
use crate::snapshot::{AnimationSnapshot, AnimationStatus};

/// Playback state of the displayed model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub status: AnimationStatus,
    pub current_clip: Option<ClipId>,
    /// Visible playhead in seconds.
    pub time: f32,
    pub speed: f32,
    pub generation: u64,
}

impl AnimationState {
    fn initial(speed: f32, generation: u64) -> Self {
        Self {
            status: AnimationStatus::Idle,
            current_clip: None,
            time: 0.0,
            speed,
            generation,
        }
    }
}

#[derive(Debug)]
pub struct AnimationController {
    settings: PlaybackSettings,
    state: AnimationState,
    registry: Option<ClipRegistry>,
    root: Option<NodeHandle>,
    throttle: FrameThrottle,
    /// A command changed the visible state since the last `update`.
    dirty: bool,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new(PlaybackSettings::default())
    }
}

impl AnimationController {
    #[must_use]
    pub fn new(settings: PlaybackSettings) -> Self {
        let state = AnimationState::initial(settings.effective_default_speed(), 0);
        let throttle = FrameThrottle::new(settings.snapshot_rate_hz);
        Self {
            settings,
            state,
            registry: None,
            root: None,
            throttle,
            dirty: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> AnimationStatus {
        self.state.status
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    /// Root of the displayed model, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeHandle> {
        self.root
    }

    #[must_use]
    pub fn registry(&self) -> Option<&ClipRegistry> {
        self.registry.as_ref()
    }

    #[must_use]
    pub fn clips(&self) -> &[ClipInfo] {
        self.registry
            .as_ref()
            .map(ClipRegistry::clips)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn current_clip(&self) -> Option<&ClipInfo> {
        let id = self.state.current_clip?;
        self.registry.as_ref()?.get(id)
    }

    #[must_use]
    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Installs the clips of a newly displayed model rooted at `root`.
    ///
    /// The previous model's playback is torn down first and the generation is
    /// bumped, which invalidates any external load still in flight.
    pub fn load(&mut self, root: NodeHandle, registry: ClipRegistry) {
        self.teardown();
        self.root = Some(root);
        log::info!(
            "Animation generation {}: {} clip(s)",
            self.state.generation,
            registry.len()
        );
        self.install(registry, self.settings.autoplay);
    }

    /// Forgets the displayed model and returns to `Idle`.
    pub fn reset(&mut self) {
        self.teardown();
        self.root = None;
    }

    fn teardown(&mut self) {
        if let Some(mut old) = self.registry.take() {
            old.stop_all();
        }
        self.state = AnimationState::initial(
            self.settings.effective_default_speed(),
            self.state.generation + 1,
        );
        self.dirty = true;
    }

    /// Makes `registry` the active one and selects its first clip.
    ///
    /// The clip starts right away when `autoplay` is set; otherwise the controller
    /// waits in `Ready`.
    fn install(&mut self, registry: ClipRegistry, autoplay: bool) {
        let empty = registry.is_empty();
        self.registry = Some(registry);
        self.state.time = 0.0;
        self.dirty = true;

        if empty {
            self.state.status = AnimationStatus::Idle;
            self.state.current_clip = None;
            return;
        }

        let first = ClipId(0);
        self.state.current_clip = Some(first);
        if autoplay {
            self.start(first);
        } else {
            self.state.status = AnimationStatus::Ready;
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Plays `clip`, or the current selection when `None`, from the start.
    ///
    /// Every other clip is stopped. Fails with `ClipNotFound` and changes nothing
    /// if the clip does not exist.
    pub fn play(&mut self, clip: Option<ClipId>) -> Result<()> {
        let registry = self.registry.as_ref().ok_or(Error::NoModelLoaded)?;

        let Some(id) = clip.or(self.state.current_clip) else {
            return Err(Error::ClipNotFound("no clip selected".to_string()));
        };
        if !registry.contains(id) {
            return Err(Error::ClipNotFound(id.to_string()));
        }

        self.start(id);
        Ok(())
    }

    /// Plays the clip called `name`, or the current selection when `None`.
    pub fn play_by_name(&mut self, name: Option<&str>) -> Result<()> {
        let Some(name) = name else {
            return self.play(None);
        };

        let registry = self.registry.as_ref().ok_or(Error::NoModelLoaded)?;
        let id = registry
            .find_by_name(name)
            .ok_or_else(|| Error::ClipNotFound(name.to_string()))?;
        self.play(Some(id))
    }

    /// `id` must exist in the active registry.
    fn start(&mut self, id: ClipId) {
        let speed = self.state.speed;
        let Some(registry) = self.registry.as_mut() else {
            return;
        };

        registry.stop_others(id);
        if let Some(action) = registry.action_mut(id) {
            action.reset();
            action.time_scale = speed;
            action.play();
        }

        self.state.current_clip = Some(id);
        self.state.status = AnimationStatus::Playing;
        self.state.time = 0.0;
        self.dirty = true;
    }

    /// Freezes the playhead. Only a playing clip can be paused.
    pub fn pause(&mut self) {
        if self.state.status != AnimationStatus::Playing {
            return;
        }
        let Some(action) = self.current_action_mut() else {
            return;
        };

        action.paused = true;
        let time = action.time;

        self.state.time = time;
        self.state.status = AnimationStatus::Paused;
        self.dirty = true;
    }

    /// Continues a paused clip; restarts a stopped or not yet started one.
    pub fn resume(&mut self) {
        let Some(id) = self.state.current_clip else {
            return;
        };

        match self.state.status {
            AnimationStatus::Paused => {
                if let Some(action) = self.current_action_mut() {
                    action.paused = false;
                }
                self.state.status = AnimationStatus::Playing;
                self.dirty = true;
            }
            AnimationStatus::Stopped | AnimationStatus::Ready => self.start(id),
            AnimationStatus::Playing | AnimationStatus::Idle => {}
        }
    }

    /// Stops the current clip and rewinds it.
    pub fn stop(&mut self) {
        let Some(action) = self.current_action_mut() else {
            return;
        };

        action.stop();

        self.state.time = 0.0;
        self.state.status = AnimationStatus::Stopped;
        self.dirty = true;
    }

    /// Moves the playhead of the current clip, clamped to `[0, duration]`.
    ///
    /// Playing and paused state are preserved. A stopped or not yet started clip
    /// shows the rest pose and always restarts from zero, so scrubbing it is a
    /// no-op.
    pub fn scrub(&mut self, time: f32) {
        if !matches!(
            self.state.status,
            AnimationStatus::Playing | AnimationStatus::Paused
        ) {
            return;
        }
        let Some(action) = self.current_action_mut() else {
            return;
        };

        action.set_time(time);
        let time = action.time;

        self.state.time = time;
        self.dirty = true;
    }

    /// Sets the playback rate of the current clip and of every clip started later.
    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(Error::InvalidPlaybackSpeed(speed));
        }

        self.state.speed = speed;
        if let Some(action) = self.current_action_mut() {
            action.time_scale = speed;
        }
        self.dirty = true;
        Ok(())
    }

    fn current_action_mut(&mut self) -> Option<&mut AnimationAction> {
        let id = self.state.current_clip?;
        self.registry.as_mut()?.action_mut(id)
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advances the evaluator by `dt` seconds and writes the pose into `target`.
    ///
    /// The visible playhead is only resampled at the snapshot cadence. Returns
    /// `true` when the visible state changed since the previous call, either
    /// through resampling or through a command.
    pub fn update(&mut self, dt: f32, target: &mut dyn AnimationTarget) -> bool {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        if let Some(registry) = self.registry.as_mut() {
            registry.evaluator_mut().advance(dt, target);
        }

        let sampled = self.throttle.tick(dt);
        if sampled
            && let Some(id) = self.state.current_clip
            && let Some(action) = self.registry.as_ref().and_then(|r| r.action(id))
        {
            self.state.time = action.time;
        }

        std::mem::take(&mut self.dirty) || sampled
    }

    // ========================================================================
    // External clips
    // ========================================================================

    /// Installs clips parsed from a separate animation file onto the displayed
    /// model.
    ///
    /// A result started under an older generation, or for a model that is no
    /// longer displayed, is discarded without touching any state. Otherwise the
    /// model is put back into its rest pose before the new clips are bound.
    pub fn commit_external(
        &mut self,
        parsed: ParsedExternalClips,
        target: &mut dyn AnimationTarget,
    ) -> ExternalClipOutcome {
        if parsed.generation != self.state.generation || self.root != Some(parsed.root) {
            log::warn!(
                "Discarding external clips from generation {} (current {})",
                parsed.generation,
                self.state.generation
            );
            return ExternalClipOutcome::Discarded;
        }

        if let Some(mut old) = self.registry.take() {
            old.stop_all();
            old.restore_rest_pose(target);
        }

        let registry = ClipRegistry::bind(&*target, parsed.root, parsed.clips);
        let clip_count = registry.len();
        log::info!("Applied {clip_count} external clip(s) to the displayed model");

        // A dropped animation file always starts playing, whatever the load policy.
        self.install(registry, true);
        ExternalClipOutcome::Applied { clip_count }
    }

    // ========================================================================
    // Snapshot
    // ========================================================================

    #[must_use]
    pub fn snapshot(&self) -> AnimationSnapshot {
        let current = self.current_clip();
        AnimationSnapshot {
            clip_names: self.registry.as_ref().map(ClipRegistry::names).unwrap_or_default(),
            current_clip: current.map(|c| c.name.clone()),
            status: self.state.status,
            time: self.state.time,
            duration: current.map_or(0.0, |c| c.duration),
            speed: self.state.speed,
            generation: self.state.generation,
        }
    }
}
