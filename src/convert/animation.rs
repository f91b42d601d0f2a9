//! Animation conversion: curve-node classification and keyframe sampling at
//! the union of all key times.

use glam::Vec3;

use crate::animation::{Keyframe, Track};
use crate::document::{AnimationCurve, CurveNodeKind, Document, Model};
use crate::scene::transform::quat_from_euler_degrees;

/// X, Y, Z curves of one classified curve node. A missing axis keeps its
/// default value.
pub type AxisCurves<'a> = [Option<&'a AnimationCurve>; 3];

/// At most one translation, rotation and scale curve triple of a model.
#[derive(Debug, Clone, Default)]
pub struct TrsCurves<'a> {
    pub translation: Option<AxisCurves<'a>>,
    pub rotation: Option<AxisCurves<'a>>,
    pub scale: Option<AxisCurves<'a>>,
}

impl<'a> TrsCurves<'a> {
    /// Sorts the model's curve nodes by kind. Repeated kinds keep the first
    /// node; unknown kinds are left out. Nodes without exactly three curves
    /// are logged and used axis by axis.
    #[must_use]
    pub fn classify(document: &'a Document, model: &Model) -> Self {
        let mut curves = Self::default();

        for &id in &model.curve_nodes {
            let Some(node) = document.curve_node(id) else {
                continue;
            };

            let slot = match node.kind {
                CurveNodeKind::Translation => &mut curves.translation,
                CurveNodeKind::Rotation => &mut curves.rotation,
                CurveNodeKind::Scale => &mut curves.scale,
                CurveNodeKind::Unknown => {
                    log::warn!("FBX: model '{}': curve node {id} has an unknown type", model.name);
                    continue;
                }
            };
            if slot.is_some() {
                log::warn!(
                    "FBX: model '{}': duplicate {:?} curve node {id} ignored",
                    model.name,
                    node.kind
                );
                continue;
            }

            let resolved: Vec<&AnimationCurve> = node.curves.iter().filter_map(|&c| document.curve(c)).collect();
            if resolved.len() != 3 {
                log::warn!(
                    "FBX: model '{}': {:?} curve node {id} has {} curve(s), expected 3",
                    model.name,
                    node.kind,
                    resolved.len()
                );
            }
            *slot = Some([0, 1, 2].map(|axis| resolved.get(axis).copied()));
        }

        curves
    }

    fn all(&self) -> impl Iterator<Item = &'a AnimationCurve> {
        [self.translation, self.rotation, self.scale]
            .into_iter()
            .flatten()
            .flatten()
            .flatten()
    }

    /// Time 0, then every distinct key time after it, ascending.
    #[must_use]
    pub fn sample_times(&self) -> Vec<f32> {
        let mut times: Vec<f32> = self
            .all()
            .flat_map(|curve| curve.keys.iter().map(|k| k.time))
            .filter(|&t| t > 0.0)
            .collect();
        times.sort_by(f32::total_cmp);
        times.dedup();
        times.insert(0, 0.0);
        times
    }

    /// Pose at `time`; missing triples and axes fall back to the identity pose.
    #[must_use]
    pub fn evaluate(&self, time: f32) -> Keyframe {
        let axes = |curves: AxisCurves<'_>, default: Vec3| {
            let axis = |i: usize| curves[i].map_or(default[i], |c| c.evaluate(time));
            Vec3::new(axis(0), axis(1), axis(2))
        };

        let mut keyframe = Keyframe::new(time);
        if let Some(curves) = self.translation {
            keyframe.position = axes(curves, Vec3::ZERO);
        }
        if let Some(curves) = self.rotation {
            keyframe.rotation = quat_from_euler_degrees(axes(curves, Vec3::ZERO));
        }
        if let Some(curves) = self.scale {
            keyframe.scale = axes(curves, Vec3::ONE);
        }
        keyframe
    }
}

/// Samples a model's curves into a track bound to `node`.
#[must_use]
pub fn sample_track<N>(curves: &TrsCurves<'_>, node: N) -> Track<N> {
    let mut track = Track::new(node);
    for time in curves.sample_times() {
        track.add_keyframe(curves.evaluate(time));
    }
    track
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CurveKey;

    fn curve(keys: &[(f32, f32)]) -> AnimationCurve {
        AnimationCurve {
            keys: keys.iter().map(|&(time, value)| CurveKey { time, value }).collect(),
        }
    }

    #[test]
    fn times_are_the_sorted_union_from_zero() {
        let a = curve(&[(0.0, 1.0), (0.5, 2.0), (1.0, 3.0)]);
        let b = curve(&[(0.25, 0.0), (0.5, 0.0)]);
        let c = curve(&[(2.0, 0.0)]);
        let curves = TrsCurves {
            translation: Some([Some(&a), Some(&b), None]),
            scale: Some([None, None, Some(&c)]),
            ..Default::default()
        };
        assert_eq!(curves.sample_times(), vec![0.0, 0.25, 0.5, 1.0, 2.0]);
    }

    #[test]
    fn missing_axes_keep_defaults() {
        let x = curve(&[(0.0, 4.0)]);
        let curves = TrsCurves {
            translation: Some([Some(&x), None, None]),
            scale: Some([None, Some(&x), None]),
            ..Default::default()
        };
        let track = sample_track(&curves, 0_usize);
        assert_eq!(track.keyframes.len(), 1);
        let key = track.keyframes[0];
        assert_eq!(key.position, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(key.rotation, glam::Quat::IDENTITY);
        assert_eq!(key.scale, Vec3::new(1.0, 4.0, 1.0));
    }
}
