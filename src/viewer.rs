use std::path::Path;
use std::sync::Arc;

use stagehand_assets::{GltfLoader, LoadedModel, ModelInfo, SceneLoader};
use stagehand_core::{NodeHandle, Result};
use stagehand_scene::Scene;

use crate::controller::AnimationController;
use crate::external::{
    ExternalClipLoader, ExternalClipOutcome, ExternalClipRequest, ParsedExternalClips,
};
use crate::placement::{ModelNormalizer, Placement};
use crate::registry::ClipRegistry;
use crate::settings::ViewerSettings;
use crate::snapshot::AnimationSnapshot;

/// What the viewer remembers about the displayed model besides its scene.
#[derive(Debug, Clone)]
struct DisplayedModel {
    root: NodeHandle,
    info: ModelInfo,
    placement: Placement,
}

/// Composition root of the viewer core.
///
/// Owns the displayed scene, its placement and the playback controller. The host
/// calls [`update`](Self::update) once per rendered frame and forwards UI commands.
pub struct Viewer {
    settings: ViewerSettings,
    loader: Arc<dyn SceneLoader>,
    normalizer: ModelNormalizer,
    controller: AnimationController,
    external: ExternalClipLoader,

    scene: Scene,
    model: Option<DisplayedModel>,
}

impl Viewer {
    #[must_use]
    pub fn new(settings: ViewerSettings, loader: Arc<dyn SceneLoader>) -> Self {
        Self {
            normalizer: ModelNormalizer::new(settings.normalizer.clone()),
            controller: AnimationController::new(settings.playback.clone()),
            external: ExternalClipLoader::new(Arc::clone(&loader)),
            settings,
            loader,
            scene: Scene::new(),
            model: None,
        }
    }

    /// A viewer reading glTF and GLB files.
    #[must_use]
    pub fn gltf(settings: ViewerSettings) -> Self {
        Self::new(settings, Arc::new(GltfLoader::new()))
    }

    // ========================================================================
    // Model lifecycle
    // ========================================================================

    /// Decodes and displays a model, replacing the current one.
    ///
    /// On a decode error the current model stays displayed.
    pub fn load_model_bytes(&mut self, bytes: &[u8]) -> Result<Placement> {
        let model = self.loader.load_model(bytes)?;
        Ok(self.display(model))
    }

    /// Like [`load_model_bytes`](Self::load_model_bytes), resolving external
    /// buffers next to `path`.
    pub fn load_model_path(&mut self, path: impl AsRef<Path>) -> Result<Placement> {
        let model = self.loader.load_model_path(path.as_ref())?;
        Ok(self.display(model))
    }

    /// Displays an already decoded model: normalize, bind clips, start playback.
    pub fn display(&mut self, model: LoadedModel) -> Placement {
        let LoadedModel {
            mut scene,
            root,
            clips,
            info,
        } = model;

        let placement = self.normalizer.normalize(&mut scene, root);
        scene.update_matrix_world();

        let registry = ClipRegistry::bind(&scene, root, clips);
        self.controller.load(root, registry);

        self.scene = scene;
        self.model = Some(DisplayedModel {
            root,
            info,
            placement,
        });

        placement
    }

    /// Removes the displayed model and stops playback.
    pub fn close_model(&mut self) {
        self.controller.reset();
        self.scene = Scene::new();
        self.model = None;
    }

    // ========================================================================
    // Playback commands
    // ========================================================================

    /// Plays the clip called `name`, or the current selection.
    pub fn play(&mut self, name: Option<&str>) -> Result<()> {
        self.controller.play_by_name(name)
    }

    pub fn pause(&mut self) {
        self.controller.pause();
    }

    pub fn resume(&mut self) {
        self.controller.resume();
    }

    pub fn stop(&mut self) {
        self.controller.stop();
    }

    pub fn scrub(&mut self, time: f32) {
        self.controller.scrub(time);
    }

    pub fn set_speed(&mut self, speed: f32) -> Result<()> {
        self.controller.set_speed(speed)
    }

    // ========================================================================
    // External clips
    // ========================================================================

    /// Starts an external clip load for asynchronous hosts.
    ///
    /// Await [`ExternalClipRequest::resolve`] and hand the result to
    /// [`commit_external`](Self::commit_external).
    pub fn begin_external_clip(&self, bytes: Vec<u8>) -> Result<ExternalClipRequest> {
        self.external.begin(&self.controller, bytes)
    }

    /// Installs parsed external clips unless the model changed meanwhile.
    pub fn commit_external(&mut self, parsed: ParsedExternalClips) -> ExternalClipOutcome {
        self.controller.commit_external(parsed, &mut self.scene)
    }

    /// Loads clips from an animation-only file onto the displayed model, blocking
    /// the calling thread until the file is parsed.
    pub fn load_external_clip(&mut self, bytes: Vec<u8>) -> Result<ExternalClipOutcome> {
        let request = self.begin_external_clip(bytes)?;
        let parsed = pollster::block_on(request.resolve())?;
        Ok(self.commit_external(parsed))
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Advances animation by `dt` seconds and refreshes world matrices.
    ///
    /// Returns a snapshot when the UI should redraw: at the configured snapshot
    /// rate, or right after a command changed playback.
    pub fn update(&mut self, dt: f32) -> Option<AnimationSnapshot> {
        let changed = self.controller.update(dt, &mut self.scene);
        if self.model.is_some() {
            self.scene.update_matrix_world();
        }
        changed.then(|| self.controller.snapshot())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn snapshot(&self) -> AnimationSnapshot {
        self.controller.snapshot()
    }

    #[must_use]
    pub fn placement(&self) -> Option<&Placement> {
        self.model.as_ref().map(|m| &m.placement)
    }

    #[must_use]
    pub fn model_info(&self) -> Option<&ModelInfo> {
        self.model.as_ref().map(|m| &m.info)
    }

    #[must_use]
    pub fn model_root(&self) -> Option<NodeHandle> {
        self.model.as_ref().map(|m| m.root)
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[must_use]
    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    #[must_use]
    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("model", &self.model)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}
