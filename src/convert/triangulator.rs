//! Ear-clipping triangulation of planar (or nearly planar) 3D polygons.
//!
//! The polygon is projected onto the plane of its Newell normal, which keeps
//! the winding counter-clockwise in the projected basis, and ears are clipped
//! until three vertices remain.

use glam::{Vec2, Vec3};
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TriangulationError {
    #[error("polygon has {0} vertices, at least 3 are required")]
    TooFewVertices(usize),
    #[error("polygon has zero area")]
    ZeroArea,
    #[error("no ear could be clipped, polygon is not simple")]
    NotSimple,
}

/// Newell's method; the length is twice the polygon area.
#[must_use]
pub fn newell_normal(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Appends triangles (indices into `points`) to `out`.
///
/// On failure `out` is left as it was.
pub fn triangulate(points: &[Vec3], out: &mut Vec<[usize; 3]>) -> Result<(), TriangulationError> {
    let n = points.len();
    if n < 3 {
        return Err(TriangulationError::TooFewVertices(n));
    }

    let normal = newell_normal(points);
    if normal.length_squared() <= f32::EPSILON * f32::EPSILON {
        return Err(TriangulationError::ZeroArea);
    }
    if n == 3 {
        out.push([0, 1, 2]);
        return Ok(());
    }

    let normal = normal.normalize();
    let u = normal.any_orthonormal_vector();
    let v = normal.cross(u);
    let projected: SmallVec<[Vec2; 16]> = points.iter().map(|p| Vec2::new(p.dot(u), p.dot(v))).collect();

    let start = out.len();
    let mut remaining: SmallVec<[usize; 16]> = (0..n).collect();

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let a = remaining[(i + m - 1) % m];
            let b = remaining[i];
            let c = remaining[(i + 1) % m];
            is_ear(&projected, &remaining, a, b, c)
        });

        let Some(i) = ear else {
            out.truncate(start);
            return Err(TriangulationError::NotSimple);
        };
        out.push([remaining[(i + m - 1) % m], remaining[i], remaining[(i + 1) % m]]);
        remaining.remove(i);
    }

    out.push([remaining[0], remaining[1], remaining[2]]);
    Ok(())
}

fn cross(o: Vec2, a: Vec2, b: Vec2) -> f32 {
    (a - o).perp_dot(b - o)
}

fn is_ear(points: &[Vec2], remaining: &[usize], a: usize, b: usize, c: usize) -> bool {
    let (pa, pb, pc) = (points[a], points[b], points[c]);
    if cross(pa, pb, pc) <= 0.0 {
        return false;
    }

    !remaining.iter().any(|&p| {
        if p == a || p == b || p == c {
            return false;
        }
        let q = points[p];
        if q == pa || q == pb || q == pc {
            return false;
        }
        cross(pa, pb, q) > 0.0 && cross(pb, pc, q) > 0.0 && cross(pc, pa, q) > 0.0
    })
}
