use glam::{Quat, Vec3};

use crate::binding::TargetPath;
use crate::tracks::KeyframeTrack;
use crate::values::MorphWeightData;

/// Identifies which node and property a track animates.
///
/// Nodes are addressed by name rather than by index so that a clip parsed from one
/// file can be bound onto a skeleton that came from another.
#[derive(Debug, Clone)]
pub struct TrackMeta {
    pub node_name: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
    MorphWeights(KeyframeTrack<MorphWeightData>),
}

impl TrackData {
    #[must_use]
    pub fn end_time(&self) -> f32 {
        match self {
            TrackData::Vector3(track) => track.end_time(),
            TrackData::Quaternion(track) => track.end_time(),
            TrackData::MorphWeights(track) => track.end_time(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            TrackData::Vector3(track) => track.is_valid(),
            TrackData::Quaternion(track) => track.is_valid(),
            TrackData::MorphWeights(track) => track.is_valid(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest keyframe over all tracks.
    ///
    /// Tracks that cannot be sampled are dropped here so that playback never has to
    /// deal with them.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let total = tracks.len();
        let tracks: Vec<Track> = tracks.into_iter().filter(|t| t.data.is_valid()).collect();
        if tracks.len() != total {
            log::warn!(
                "Clip '{}': dropped {} malformed track(s)",
                name,
                total - tracks.len()
            );
        }

        let duration = tracks
            .iter()
            .map(|t| t.data.end_time())
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }
}
