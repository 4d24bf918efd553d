//! glTF 2.0 / GLB loader.
//!
//! Builds a [`Scene`] holding the node hierarchy, TRS transforms and per-mesh
//! local bounds, and converts animation channels into [`AnimationClip`]s. Images,
//! materials and vertex streams beyond positions are never decoded.

use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::animation::{Interpolation, Property};
use gltf::{Gltf, Semantic};
use stagehand_animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, MorphWeightData, TargetPath, Track,
    TrackData, TrackMeta,
};
use stagehand_core::{BoundingBox, Error, NodeHandle, Result};
use stagehand_scene::{MeshData, Node, NodeKind, Scene};

use crate::info::{ElementCounts, ModelInfo};
use crate::io;
use crate::loader::{LoadedModel, SceneLoader};

/// Name of the synthetic node every loaded scene hangs under.
pub const ROOT_NODE_NAME: &str = "gltf_root";

/// Scene loader for `.gltf` and `.glb` files.
#[derive(Debug, Clone, Default)]
pub struct GltfLoader {
    base_path: Option<PathBuf>,
}

impl GltfLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves external buffer URIs relative to `base_path`.
    #[must_use]
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: Some(base_path.into()),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    fn parse(bytes: &[u8]) -> Result<Gltf> {
        Gltf::from_slice(bytes).map_err(|e| Error::ModelDecode(e.to_string()))
    }

    fn load_buffers(&self, gltf: &Gltf) -> Result<Vec<Vec<u8>>> {
        let mut buffer_data = Vec::with_capacity(gltf.buffers().count());
        for buffer in gltf.buffers() {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .as_deref()
                    .map(<[u8]>::to_vec)
                    .ok_or_else(|| Error::ModelDecode("missing GLB binary chunk".to_string()))?,
                gltf::buffer::Source::Uri(uri) => io::resolve_uri(uri, self.base_path())?,
            };

            if data.len() < buffer.length() {
                return Err(Error::ModelDecode(format!(
                    "buffer {} holds {} bytes, {} declared",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                )));
            }
            buffer_data.push(data);
        }
        Ok(buffer_data)
    }
}

impl SceneLoader for GltfLoader {
    fn load_model(&self, bytes: &[u8]) -> Result<LoadedModel> {
        let gltf = Self::parse(bytes)?;
        let buffers = self.load_buffers(&gltf)?;

        let info = model_info(&gltf);
        if !info.extensions_required.is_empty() {
            log::warn!(
                "glTF file requires extensions {:?}; display may be incomplete",
                info.extensions_required
            );
        }

        let mut scene = Scene::new();
        let root = scene.add_node(Node::new(ROOT_NODE_NAME));

        let joints: Vec<usize> = gltf
            .skins()
            .flat_map(|skin| skin.joints().map(|j| j.index()).collect::<Vec<_>>())
            .collect();

        // Step 1: every node, flat.
        let mut node_mapping: Vec<NodeHandle> = Vec::with_capacity(gltf.nodes().count());
        for node in gltf.nodes() {
            let handle = create_node_shallow(&mut scene, &node, &buffers, &joints);
            node_mapping.push(handle);
        }

        // Step 2: hierarchy.
        for node in gltf.nodes() {
            let parent = node_mapping[node.index()];
            for child in node.children() {
                scene.attach(node_mapping[child.index()], parent);
            }
        }

        // Step 3: scene roots under the synthetic root.
        if let Some(default_scene) = gltf.default_scene().or_else(|| gltf.scenes().next()) {
            for node in default_scene.nodes() {
                scene.attach(node_mapping[node.index()], root);
            }
        } else {
            for &handle in &node_mapping {
                if scene.get_node(handle).is_some_and(|n| n.parent().is_none()) {
                    scene.attach(handle, root);
                }
            }
        }

        let orphans = node_mapping
            .iter()
            .filter(|&&h| !scene.is_ancestor(root, h))
            .count();
        if orphans > 0 {
            log::debug!("{orphans} node(s) are not part of the displayed scene");
        }

        let clips = load_animations(&gltf, &buffers);

        log::info!(
            "Loaded glTF: {} nodes, {} meshes, {} animations",
            info.counts.nodes,
            info.counts.meshes,
            clips.len()
        );

        Ok(LoadedModel {
            scene,
            root,
            clips,
            info,
        })
    }

    fn load_clips(&self, bytes: &[u8]) -> Result<Vec<AnimationClip>> {
        let to_malformed = |e: Error| Error::MalformedClipFile(e.to_string());

        let gltf = Self::parse(bytes).map_err(to_malformed)?;
        let buffers = self.load_buffers(&gltf).map_err(to_malformed)?;

        Ok(load_animations(&gltf, &buffers))
    }

    fn load_model_path(&self, path: &Path) -> Result<LoadedModel> {
        let bytes = std::fs::read(path)?;
        match (&self.base_path, path.parent()) {
            (None, Some(parent)) => Self::with_base_path(parent).load_model(&bytes),
            _ => self.load_model(&bytes),
        }
    }
}

fn model_info(gltf: &Gltf) -> ModelInfo {
    let asset = &gltf.as_json().asset;
    ModelInfo {
        generator: asset.generator.clone(),
        version: asset.version.clone(),
        copyright: asset.copyright.clone(),
        counts: ElementCounts {
            scenes: gltf.scenes().count(),
            nodes: gltf.nodes().count(),
            meshes: gltf.meshes().count(),
            materials: gltf.materials().count(),
            textures: gltf.textures().count(),
            images: gltf.images().count(),
            animations: gltf.animations().count(),
            skins: gltf.skins().count(),
            cameras: gltf.cameras().count(),
        },
        extensions_used: gltf.extensions_used().map(str::to_string).collect(),
        extensions_required: gltf.extensions_required().map(str::to_string).collect(),
    }
}

/// Creates the node with its transform and kind; hierarchy is linked later.
fn create_node_shallow(
    scene: &mut Scene,
    node: &gltf::Node,
    buffers: &[Vec<u8>],
    joints: &[usize],
) -> NodeHandle {
    let name = node_name(node);

    let kind = if let Some(mesh) = node.mesh() {
        let mut data = mesh_data(&mesh, buffers);
        data.skinned = node.skin().is_some();
        NodeKind::Mesh(data)
    } else if node.camera().is_some() {
        NodeKind::Camera
    } else if node
        .extensions()
        .is_some_and(|ext| ext.contains_key("KHR_lights_punctual"))
    {
        NodeKind::Light
    } else if joints.contains(&node.index()) {
        NodeKind::Joint
    } else {
        NodeKind::Group
    };

    let mut engine_node = Node::with_kind(&name, kind);
    let (t, r, s) = node.transform().decomposed();
    engine_node.transform.position = Vec3::from_array(t);
    engine_node.transform.rotation = Quat::from_array(r);
    engine_node.transform.scale = Vec3::from_array(s);

    if let Some(weights) = node.weights().or_else(|| node.mesh().and_then(|m| m.weights())) {
        engine_node.morph_weights.extend_from_slice(weights);
    }

    scene.add_node(engine_node)
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn mesh_data(mesh: &gltf::Mesh, buffers: &[Vec<u8>]) -> MeshData {
    let mut local_bounds = BoundingBox::EMPTY;
    let mut morph_target_count = 0;
    let mut primitive_count = 0;

    for primitive in mesh.primitives() {
        primitive_count += 1;
        morph_target_count = morph_target_count.max(primitive.morph_targets().count());

        match primitive_bounds(&primitive, buffers) {
            Some(bounds) => local_bounds = local_bounds.union(&bounds),
            None => log::debug!(
                "Mesh '{}' primitive {} has no measurable positions",
                mesh.name().unwrap_or("unnamed"),
                primitive.index()
            ),
        }
    }

    MeshData {
        name: mesh.name().map(str::to_string),
        local_bounds,
        primitive_count,
        morph_target_count,
        skinned: false,
    }
}

/// Bounds of a primitive's POSITION attribute.
///
/// Uses the accessor's declared `min`/`max` when present and float-typed, falling
/// back to reading every position.
fn primitive_bounds(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Option<BoundingBox> {
    let accessor = primitive.get(&Semantic::Positions)?;

    if accessor.data_type() == gltf::accessor::DataType::F32
        && let (Some(min), Some(max)) = (
            accessor.min().as_ref().and_then(json_vec3),
            accessor.max().as_ref().and_then(json_vec3),
        )
    {
        return Some(BoundingBox::new(min, max));
    }

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let bounds = BoundingBox::from_points(reader.read_positions()?.map(Vec3::from_array));
    (!bounds.is_empty()).then_some(bounds)
}

fn json_vec3(value: &gltf::json::Value) -> Option<Vec3> {
    let array = value.as_array()?;
    if array.len() != 3 {
        return None;
    }
    let mut out = [0.0_f32; 3];
    for (slot, v) in out.iter_mut().zip(array) {
        *slot = v.as_f64()? as f32;
    }
    let v = Vec3::from_array(out);
    v.is_finite().then_some(v)
}

/// Converts every animation of the document; channels that cannot be read are
/// skipped with a warning rather than failing the whole file.
fn load_animations(gltf: &Gltf, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    let mut animations = Vec::with_capacity(gltf.animations().count());

    for anim in gltf.animations() {
        let mut tracks = Vec::new();

        for (channel_index, channel) in anim.channels().enumerate() {
            match load_channel(&channel, buffers) {
                Some(track) => tracks.push(track),
                None => log::warn!(
                    "Animation {}: skipped unreadable channel {}",
                    anim.index(),
                    channel_index
                ),
            }
        }

        // Unnamed clips get their display name from the registry.
        let name = anim.name().unwrap_or_default().to_string();
        animations.push(AnimationClip::new(name, tracks));
    }

    animations
}

fn load_channel(channel: &gltf::animation::Channel, buffers: &[Vec<u8>]) -> Option<Track> {
    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
    let target = channel.target();
    let gltf_node = target.node();
    let node_name = node_name(&gltf_node);

    let times: Vec<f32> = reader.read_inputs()?.collect();

    let interpolation = match channel.sampler().interpolation() {
        Interpolation::Linear => InterpolationMode::Linear,
        Interpolation::Step => InterpolationMode::Step,
        Interpolation::CubicSpline => InterpolationMode::CubicSpline,
    };

    let (target_path, data) = match (target.property(), reader.read_outputs()?) {
        (Property::Translation, ReadOutputs::Translations(iter)) => (
            TargetPath::Translation,
            TrackData::Vector3(KeyframeTrack::new(
                times,
                iter.map(Vec3::from_array).collect(),
                interpolation,
            )),
        ),
        (Property::Rotation, ReadOutputs::Rotations(iter)) => (
            TargetPath::Rotation,
            TrackData::Quaternion(KeyframeTrack::new(
                times,
                iter.into_f32().map(Quat::from_array).collect(),
                interpolation,
            )),
        ),
        (Property::Scale, ReadOutputs::Scales(iter)) => (
            TargetPath::Scale,
            TrackData::Vector3(KeyframeTrack::new(
                times,
                iter.map(Vec3::from_array).collect(),
                interpolation,
            )),
        ),
        (Property::MorphTargetWeights, ReadOutputs::MorphTargetWeights(iter)) => {
            let outputs: Vec<f32> = iter.into_f32().collect();
            let values = morph_frames(&gltf_node, &times, &outputs, interpolation)?;
            (
                TargetPath::Weights,
                TrackData::MorphWeights(KeyframeTrack::new(times, values, interpolation)),
            )
        }
        _ => return None,
    };

    Some(Track {
        meta: TrackMeta {
            node_name,
            target: target_path,
        },
        data,
    })
}

/// Splits a flat weight stream into one [`MorphWeightData`] per output value.
fn morph_frames(
    node: &gltf::Node,
    times: &[f32],
    outputs: &[f32],
    interpolation: InterpolationMode,
) -> Option<Vec<MorphWeightData>> {
    let stride = match interpolation {
        InterpolationMode::CubicSpline => 3,
        _ => 1,
    };

    let declared = node
        .mesh()
        .and_then(|m| m.primitives().next())
        .map_or(0, |p| p.morph_targets().count());

    let targets = if declared > 0 {
        declared
    } else if times.is_empty() {
        0
    } else {
        outputs.len() / (times.len() * stride)
    };

    if targets == 0 || outputs.len() % targets != 0 {
        return None;
    }

    Some(
        outputs
            .chunks_exact(targets)
            .map(MorphWeightData::from_slice)
            .collect(),
    )
}
