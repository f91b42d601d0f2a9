use glam::{Quat, Vec3};

use crate::animation::values::Interpolatable;
use crate::scene::NodeHandle;

/// One sampled TRS pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub time: f32,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Keyframe {
    #[must_use]
    pub fn new(time: f32) -> Self {
        Self {
            time,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Keyframes bound to one node. `N` is a [`NodeHandle`] once the track lives
/// in a scene, or a staging index before that.
#[derive(Debug, Clone, PartialEq)]
pub struct Track<N = NodeHandle> {
    pub node: N,
    /// Strictly increasing in time.
    pub keyframes: Vec<Keyframe>,
}

impl<N> Track<N> {
    #[must_use]
    pub fn new(node: N) -> Self {
        Self {
            node,
            keyframes: Vec::new(),
        }
    }

    pub fn add_keyframe(&mut self, keyframe: Keyframe) {
        self.keyframes.push(keyframe);
    }

    /// Time of the last keyframe, 0 for an empty track.
    #[must_use]
    pub fn length(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Blends the pose at `time`: lerp for position/scale, slerp for rotation,
    /// clamped to the first/last keyframe.
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<Keyframe> {
        let first = *self.keyframes.first()?;
        let last = *self.keyframes.last()?;
        if time <= first.time {
            return Some(Keyframe { time, ..first });
        }
        if time >= last.time {
            return Some(Keyframe { time, ..last });
        }

        // partition_point gives the first keyframe after `time`.
        let next = self.keyframes.partition_point(|k| k.time <= time);
        let (a, b) = (self.keyframes[next - 1], self.keyframes[next]);
        let dt = b.time - a.time;
        let t = if dt > 1e-6 { ((time - a.time) / dt).clamp(0.0, 1.0) } else { 0.0 };

        Some(Keyframe {
            time,
            position: Vec3::interpolate_linear(a.position, b.position, t),
            rotation: Quat::interpolate_linear(a.rotation, b.rotation, t),
            scale: Vec3::interpolate_linear(a.scale, b.scale, t),
        })
    }

    /// Rebinds the track to another node key.
    pub fn map_node<M>(self, f: impl FnOnce(N) -> M) -> Track<M> {
        Track {
            node: f(self.node),
            keyframes: self.keyframes,
        }
    }
}

/// All tracks produced by one import.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    pub tracks: Vec<Track>,
    /// Seconds.
    pub length: f32,
    pub speed: f32,
}

impl Animation {
    #[must_use]
    pub fn new(speed: f32) -> Self {
        Self {
            tracks: Vec::new(),
            length: 0.0,
            speed,
        }
    }

    pub fn add_track(&mut self, track: Track) {
        self.tracks.push(track);
    }

    /// Shrinks or grows `length` to the longest track.
    pub fn clamp_length(&mut self) {
        self.length = self.tracks.iter().map(Track::length).fold(0.0_f32, f32::max);
    }

    #[must_use]
    pub fn track_for(&self, node: NodeHandle) -> Option<&Track> {
        self.tracks.iter().find(|t| t.node == node)
    }
}
