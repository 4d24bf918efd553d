//! Shared fixtures: small hand-built scenes, clips and glTF documents.

#![allow(dead_code)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use glam::Vec3;
use serde_json::{Value, json};

use stagehand::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use stagehand::scene::{MeshData, NodeKind, Scene};
use stagehand::{BoundingBox, NodeHandle};

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Scene fixtures
// ============================================================================

pub fn mesh_kind(min: Vec3, max: Vec3) -> NodeKind {
    NodeKind::Mesh(MeshData {
        local_bounds: BoundingBox::new(min, max),
        primitive_count: 1,
        ..MeshData::default()
    })
}

/// `Root` with a `Body` mesh spanning `min..max` and an empty `Arm` node.
pub fn rig_scene(min: Vec3, max: Vec3) -> (Scene, NodeHandle) {
    let mut scene = Scene::new();
    let root = scene.build_node("Root").build();
    scene
        .build_node("Body")
        .with_parent(root)
        .with_kind(mesh_kind(min, max))
        .build();
    scene.build_node("Arm").with_parent(root).build();
    (scene, root)
}

/// A clip of `duration` seconds moving `Arm` from the origin to +Y.
pub fn arm_clip(name: &str, duration: f32) -> AnimationClip {
    translation_clip(name, "Arm", duration)
}

/// A clip of `duration` seconds moving `node_name` from the origin to +Y.
pub fn translation_clip(name: &str, node_name: &str, duration: f32) -> AnimationClip {
    AnimationClip::new(
        name.to_string(),
        vec![Track {
            meta: TrackMeta {
                node_name: node_name.to_string(),
                target: TargetPath::Translation,
            },
            data: TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, duration],
                vec![Vec3::ZERO, Vec3::Y],
                InterpolationMode::Linear,
            )),
        }],
    )
}

/// Moves `name` under `root` to `position`, as a model's authored rest pose.
pub fn set_rest_position(scene: &mut Scene, root: NodeHandle, name: &str, position: Vec3) {
    let node = scene.find_node_by_name(root, name).unwrap();
    scene.get_node_mut(node).unwrap().transform.position = position;
}

// ============================================================================
// glTF fixtures
// ============================================================================

/// Builds a JSON glTF document with an embedded base64 buffer.
///
/// Layout: node 0 `Root` with children `Body` (optional box mesh) and `Arm`.
/// Each requested clip animates `Arm`'s translation from the origin to +Y.
#[derive(Debug, Clone)]
pub struct GltfFixture {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub body_translation: [f32; 3],
    pub include_mesh: bool,
    /// `(name, duration)` per clip; `None` names leave the clip unnamed.
    pub clips: Vec<(Option<String>, f32)>,
    pub generator: Option<String>,
}

impl Default for GltfFixture {
    fn default() -> Self {
        Self {
            min: [-1.0, 0.0, -1.0],
            max: [1.0, 2.0, 1.0],
            body_translation: [0.0, 0.0, 0.0],
            include_mesh: true,
            clips: vec![(Some("Wave".to_string()), 2.0)],
            generator: Some("stagehand fixtures".to_string()),
        }
    }
}

#[derive(Default)]
struct BinWriter {
    bytes: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl BinWriter {
    fn accessor(&mut self, data: &[f32], ty: &str, components: usize) -> usize {
        let offset = self.bytes.len();
        for v in data {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        let view = self.views.len();
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": data.len() * 4,
        }));

        let count = data.len() / components;
        let mut min = vec![f32::INFINITY; components];
        let mut max = vec![f32::NEG_INFINITY; components];
        for chunk in data.chunks_exact(components) {
            for (i, v) in chunk.iter().enumerate() {
                min[i] = min[i].min(*v);
                max[i] = max[i].max(*v);
            }
        }

        let index = self.accessors.len();
        self.accessors.push(json!({
            "bufferView": view,
            "componentType": 5126,
            "count": count,
            "type": ty,
            "min": min,
            "max": max,
        }));
        index
    }
}

impl GltfFixture {
    /// A file holding only clips for the `Arm` node.
    pub fn animation_only(clips: Vec<(Option<String>, f32)>) -> Self {
        Self {
            include_mesh: false,
            clips,
            ..Self::default()
        }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut bin = BinWriter::default();

        let mut meshes = Vec::new();
        let mut body = json!({ "name": "Body", "translation": self.body_translation });
        if self.include_mesh {
            let positions: Vec<f32> = self.min.iter().chain(self.max.iter()).copied().collect();
            let position_accessor = bin.accessor(&positions, "VEC3", 3);
            meshes.push(json!({
                "name": "BodyMesh",
                "primitives": [{ "attributes": { "POSITION": position_accessor } }],
            }));
            body["mesh"] = json!(0);
        }

        let mut animations = Vec::new();
        for (name, duration) in &self.clips {
            let input = bin.accessor(&[0.0, *duration], "SCALAR", 1);
            let output = bin.accessor(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0], "VEC3", 3);
            let mut animation = json!({
                "samplers": [{ "input": input, "output": output, "interpolation": "LINEAR" }],
                "channels": [{ "sampler": 0, "target": { "node": 2, "path": "translation" } }],
            });
            if let Some(name) = name {
                animation["name"] = json!(name);
            }
            animations.push(animation);
        }

        let mut asset = json!({ "version": "2.0" });
        if let Some(generator) = &self.generator {
            asset["generator"] = json!(generator);
        }

        let mut doc = json!({
            "asset": asset,
            "scene": 0,
            "scenes": [{ "nodes": [0] }],
            "nodes": [
                { "name": "Root", "children": [1, 2] },
                body,
                { "name": "Arm" },
            ],
        });

        if !meshes.is_empty() {
            doc["meshes"] = json!(meshes);
        }
        if !animations.is_empty() {
            doc["animations"] = json!(animations);
        }
        if !bin.bytes.is_empty() {
            doc["buffers"] = json!([{
                "byteLength": bin.bytes.len(),
                "uri": format!(
                    "data:application/octet-stream;base64,{}",
                    STANDARD.encode(&bin.bytes)
                ),
            }]);
            doc["bufferViews"] = json!(bin.views);
            doc["accessors"] = json!(bin.accessors);
        }

        serde_json::to_vec(&doc).expect("fixture serializes")
    }
}
