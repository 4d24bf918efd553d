//! Model normalization.
//!
//! Source files have no agreed unit or origin, so every model is brought into a
//! canonical pose before display: centered horizontally on the origin, resting on
//! the ground plane (`y = 0`), scaled into a comfortable size range, and framed by a
//! suggested camera.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use stagehand_core::{BoundingBox, NodeHandle};
use stagehand_scene::Scene;

use crate::settings::NormalizerSettings;

const MIN_SCALE: f32 = 1e-4;
const MAX_SCALE: f32 = 1e4;
const MIN_NEAR: f32 = 1e-3;

/// Size class of a model's largest dimension, in source units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleTier {
    /// Zero, negative or non-finite size: left alone.
    Degenerate,
    /// Below one unit: scaled up to one unit.
    Tiny,
    /// One to ten units: kept as is.
    Comfortable,
    /// Ten to twenty units: scaled down to ten.
    Large,
    /// Twenty to a hundred units: target shrinks linearly from ten to five.
    Huge,
    /// Above a hundred units: scaled down to five.
    Enormous,
}

impl ScaleTier {
    #[must_use]
    pub fn classify(max_size: f32) -> Self {
        if !max_size.is_finite() || max_size <= 0.0 {
            Self::Degenerate
        } else if max_size < 1.0 {
            Self::Tiny
        } else if max_size <= 10.0 {
            Self::Comfortable
        } else if max_size <= 20.0 {
            Self::Large
        } else if max_size <= 100.0 {
            Self::Huge
        } else {
            Self::Enormous
        }
    }

    /// Displayed size of the largest dimension for a model of `max_size`.
    fn target_size(self, max_size: f32) -> f32 {
        match self {
            Self::Degenerate | Self::Comfortable => max_size,
            Self::Tiny => 1.0,
            Self::Large => 10.0,
            Self::Huge => 10.0 - 5.0 * (max_size - 20.0) / 80.0,
            Self::Enormous => 5.0,
        }
    }
}

/// Uniform scale for a model whose largest dimension is `max_size`.
///
/// Continuous and monotonically non-increasing in `max_size`, clamped to
/// `[1e-4, 1e4]`. Degenerate sizes map to `1.0`.
#[must_use]
pub fn auto_scale(max_size: f32) -> f32 {
    let tier = ScaleTier::classify(max_size);
    if tier == ScaleTier::Degenerate {
        return 1.0;
    }
    (tier.target_size(max_size) / max_size).clamp(MIN_SCALE, MAX_SCALE)
}

/// Where a model ends up and how to look at it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Translation applied before scaling: world position is `scale * (p + offset)`.
    pub offset: Vec3,
    pub scale: f32,

    pub camera_position: Vec3,
    pub camera_target: Vec3,
    pub camera_near: f32,
    pub camera_far: f32,

    /// World-space bounds after the placement was applied.
    pub bounds: BoundingBox,

    /// The model had no measurable geometry and got the default pose.
    pub fallback: bool,
}

impl Placement {
    /// TRS translation of the model root that realizes this placement.
    #[inline]
    #[must_use]
    pub fn root_translation(&self) -> Vec3 {
        self.offset * self.scale
    }

    #[must_use]
    pub fn camera_distance(&self) -> f32 {
        self.camera_position.distance(self.camera_target)
    }
}

/// Computes and applies [`Placement`]s.
#[derive(Debug, Clone, Default)]
pub struct ModelNormalizer {
    settings: NormalizerSettings,
}

impl ModelNormalizer {
    #[must_use]
    pub fn new(settings: NormalizerSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &NormalizerSettings {
        &self.settings
    }

    /// Places the subtree under `root` and suggests a camera for it.
    ///
    /// The root transform is reset before measuring, so normalizing the same model
    /// twice yields the same placement.
    pub fn normalize(&self, scene: &mut Scene, root: NodeHandle) -> Placement {
        if let Some(node) = scene.get_node_mut(root) {
            node.transform.reset();
        }

        let bounds = scene.compute_world_bounds(root);
        if bounds.is_empty() {
            log::info!("Model has no measurable geometry; using default placement");
            return self.fallback_placement();
        }

        let center = bounds.center();
        let offset = Vec3::new(-center.x, -bounds.min.y, -center.z);

        let max_size = bounds.max_dimension();
        let scale = auto_scale(max_size);
        log::debug!(
            "Model size {max_size:.4} classified as {:?}, scale {scale:.4}",
            ScaleTier::classify(max_size)
        );

        if let Some(node) = scene.get_node_mut(root) {
            node.transform.position = offset * scale;
            node.transform.scale = Vec3::splat(scale);
        }

        let placed = scene.compute_world_bounds(root);
        let (camera_position, camera_target, camera_near, camera_far) = self.frame(&placed);

        log::info!(
            "Placed model: offset {offset}, scale {scale:.4}, camera distance {:.3}",
            camera_position.distance(camera_target)
        );

        Placement {
            offset,
            scale,
            camera_position,
            camera_target,
            camera_near,
            camera_far,
            bounds: placed,
            fallback: false,
        }
    }

    /// Camera position, target and clip planes framing `bounds`.
    fn frame(&self, bounds: &BoundingBox) -> (Vec3, Vec3, f32, f32) {
        let center = bounds.center();
        let max_size = bounds.max_dimension();

        let half_fov = (self.settings.fov_y_degrees.to_radians() * 0.5).clamp(1e-3, 1.5);
        let fit = max_size / (2.0 * half_fov.tan()) * self.settings.framing_margin;
        let distance = fit.max(self.settings.min_camera_distance).max(MIN_NEAR);

        let direction = self
            .settings
            .camera_direction
            .try_normalize()
            .unwrap_or(Vec3::new(0.8, 0.6, 0.8).normalize());

        let (near, far) = clip_planes(distance);
        (center + direction * distance, center, near, far)
    }

    fn fallback_placement(&self) -> Placement {
        let camera_position = self.settings.fallback_camera_position;
        let camera_target = self.settings.fallback_camera_target;
        let (camera_near, camera_far) =
            clip_planes(camera_position.distance(camera_target).max(MIN_NEAR));

        Placement {
            offset: Vec3::ZERO,
            scale: 1.0,
            camera_position,
            camera_target,
            camera_near,
            camera_far,
            bounds: BoundingBox::EMPTY,
            fallback: true,
        }
    }
}

fn clip_planes(distance: f32) -> (f32, f32) {
    ((distance / 100.0).max(MIN_NEAR), distance * 100.0)
}
