//! Geometry conversion: polygon walking, triangulation, attribute mapping
//! resolution and welding into per-material surfaces.

use glam::{Mat4, Quat, Vec2, Vec3};
use smallvec::SmallVec;

use crate::convert::triangulator::triangulate;
use crate::document::{GeometricTransform, Geometry, LayerElement, Mapping, Reference};
use crate::errors::{FbxError, Result};
use crate::scene::mesh::{SurfaceData, Vertex};
use crate::scene::transform::quat_from_euler_degrees;
use crate::settings::ImportSettings;

/// Restores a sign-encoded polygon terminator (`!index`). Non-negative
/// indices pass through, so applying it twice is harmless.
#[inline]
#[must_use]
pub fn fix_index(index: i32) -> i32 {
    if index < 0 { !index } else { index }
}

/// One polygon of the raw index stream.
#[derive(Debug, Clone, Copy)]
pub struct Polygon<'a> {
    /// Offset of the first index in `PolygonVertexIndex`.
    pub start: usize,
    /// Raw indices, terminator still negated.
    pub raw: &'a [i32],
}

impl Polygon<'_> {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Restored vertex index of corner `corner`.
    #[inline]
    #[must_use]
    pub fn vertex(&self, corner: usize) -> i32 {
        fix_index(self.raw[corner])
    }
}

/// Splits a raw index stream at its negative terminators. A trailing run
/// without terminator is yielded as a last polygon.
#[derive(Debug, Clone)]
pub struct Polygons<'a> {
    indices: &'a [i32],
    pos: usize,
}

impl<'a> Iterator for Polygons<'a> {
    type Item = Polygon<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.indices.get(self.pos..).filter(|r| !r.is_empty())?;
        let len = rest.iter().position(|&i| i < 0).map_or(rest.len(), |end| end + 1);
        let polygon = Polygon {
            start: self.pos,
            raw: &rest[..len],
        };
        self.pos += len;
        Some(polygon)
    }
}

#[must_use]
pub fn polygons(indices: &[i32]) -> Polygons<'_> {
    Polygons { indices, pos: 0 }
}

/// A model's geometric transform, composed once and applied to every vertex.
#[derive(Debug, Clone, Copy)]
pub struct GeometricBake {
    pub matrix: Mat4,
    /// Rotation-only part applied to normals.
    pub normal_rotation: Quat,
}

impl GeometricBake {
    #[must_use]
    pub fn new(geometric: &GeometricTransform) -> Self {
        let rotation = quat_from_euler_degrees(geometric.rotation);
        Self {
            matrix: Mat4::from_scale_rotation_translation(geometric.scale, rotation, geometric.translation),
            normal_rotation: rotation,
        }
    }
}

impl Default for GeometricBake {
    fn default() -> Self {
        Self::new(&GeometricTransform::default())
    }
}

/// Counters reported by [`convert_geometry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryStats {
    pub polygons: usize,
    pub triangles: usize,
    pub skipped: usize,
}

fn unsupported<T>(attribute: &'static str, layer: &LayerElement<T>) -> FbxError {
    FbxError::UnsupportedMapping {
        attribute,
        mapping: layer.mapping.name().to_owned(),
        reference: layer.reference.name().to_owned(),
    }
}

/// Fails fast on layer modes the converter does not handle, before any
/// polygon is emitted.
fn check_mappings(geometry: &Geometry) -> Result<()> {
    let normals = &geometry.normals;
    if normals.is_present() && !matches!(normals.mapping, Mapping::ByPolygonVertex | Mapping::ByVertex) {
        return Err(unsupported("normal", normals));
    }

    let uvs = &geometry.uvs;
    if !matches!(uvs.mapping, Mapping::Unknown | Mapping::ByPolygonVertex) {
        return Err(unsupported("uv", uvs));
    }

    let materials = &geometry.materials;
    if materials.is_present() && !matches!(materials.mapping, Mapping::AllSame | Mapping::ByPolygon) {
        return Err(unsupported("material", materials));
    }
    Ok(())
}

/// Reads `layer` at `slot`, going through the index array for
/// [`Reference::IndexToDirect`].
fn lookup<T: Copy>(layer: &LayerElement<T>, slot: usize, what: &str) -> Result<T> {
    let slot = match layer.reference {
        Reference::Direct => slot,
        Reference::IndexToDirect => {
            let index = *layer.index.get(slot).ok_or_else(|| FbxError::ShapeMismatch {
                context: format!("{what} index"),
                index: slot,
                len: layer.index.len(),
            })?;
            usize::try_from(index).map_err(|_| FbxError::ShapeMismatch {
                context: format!("{what} index"),
                index: slot,
                len: layer.index.len(),
            })?
        }
    };

    layer.data.get(slot).copied().ok_or_else(|| FbxError::ShapeMismatch {
        context: format!("{what} data"),
        index: slot,
        len: layer.data.len(),
    })
}

fn surface_index(geometry: &Geometry, polygon: usize, surfaces: usize) -> Result<usize> {
    let materials = &geometry.materials;
    if !materials.is_present() {
        return Ok(0);
    }

    let material = match materials.mapping {
        Mapping::ByPolygon => lookup(materials, polygon, "material")?,
        _ => materials.data[0],
    };

    match usize::try_from(material) {
        Ok(index) if index < surfaces => Ok(index),
        _ => {
            log::warn!("FBX: material index {material} out of range ({surfaces} surface(s)), using surface 0");
            Ok(0)
        }
    }
}

fn degenerate(start: usize, reason: impl Into<String>) -> FbxError {
    FbxError::DegeneratePolygon {
        start,
        reason: reason.into(),
    }
}

/// Resolves the polygon's vertex indices and triangles, or explains why the
/// polygon has to be skipped.
fn triangulate_polygon(
    geometry: &Geometry,
    polygon: &Polygon<'_>,
    settings: &ImportSettings,
    corners: &mut SmallVec<[usize; 8]>,
    triangles: &mut Vec<[usize; 3]>,
) -> Result<()> {
    let count = polygon.len();
    if count < 3 {
        return Err(degenerate(polygon.start, format!("{count} vertices")));
    }
    if count > settings.max_polygon_vertices {
        return Err(degenerate(
            polygon.start,
            format!("{count} vertices exceed the limit of {}", settings.max_polygon_vertices),
        ));
    }

    corners.clear();
    for corner in 0..count {
        let vertex = polygon.vertex(corner);
        match usize::try_from(vertex) {
            Ok(v) if v < geometry.vertices.len() => corners.push(v),
            _ => {
                return Err(degenerate(
                    polygon.start,
                    format!("vertex index {vertex} out of range ({} vertices)", geometry.vertices.len()),
                ));
            }
        }
    }

    triangles.clear();
    if count == 3 {
        triangles.push([0, 1, 2]);
        return Ok(());
    }

    let points: Vec<Vec3> = corners.iter().map(|&v| geometry.vertices[v]).collect();
    triangulate(&points, triangles).map_err(|err| degenerate(polygon.start, err.to_string()))
}

/// Appends the triangles of `geometry` to `surfaces`, one surface per
/// material slot (or a single one when the model has no materials).
///
/// Vertices are welded per surface. Degenerate polygons are skipped; invalid
/// layer modes and out-of-range attribute indices abort.
pub fn convert_geometry(
    geometry: &Geometry,
    bake: &GeometricBake,
    surfaces: &mut [SurfaceData],
    settings: &ImportSettings,
) -> Result<GeometryStats> {
    check_mappings(geometry)?;
    if surfaces.is_empty() {
        return Err(FbxError::malformed("geometry converted without a destination surface"));
    }

    let mut stats = GeometryStats::default();
    let mut corners: SmallVec<[usize; 8]> = SmallVec::new();
    let mut triangles = Vec::new();

    for (polygon_index, polygon) in polygons(&geometry.indices).enumerate() {
        stats.polygons += 1;

        if let Err(err) = triangulate_polygon(geometry, &polygon, settings, &mut corners, &mut triangles) {
            err.recover()?;
            stats.skipped += 1;
            continue;
        }

        // `ByPolygon` material entries are indexed by stream position, skipped polygons included.
        let target = surface_index(geometry, polygon_index, surfaces.len())?;
        let surface = &mut surfaces[target];

        for triangle in &triangles {
            for &corner in triangle {
                let vertex = corners[corner];
                let polygon_vertex = polygon.start + corner;
                let position = bake.matrix.transform_point3(geometry.vertices[vertex]);

                let normal = if geometry.normals.is_present() {
                    let slot = match geometry.normals.mapping {
                        Mapping::ByVertex => vertex,
                        _ => polygon_vertex,
                    };
                    lookup(&geometry.normals, slot, "normal")?
                } else {
                    Vec3::Y
                };

                let tex_coord = if geometry.uvs.mapping == Mapping::ByPolygonVertex {
                    let uv = lookup(&geometry.uvs, polygon_vertex, "uv")?;
                    Vec2::new(uv.x, -uv.y)
                } else {
                    Vec2::ZERO
                };

                surface.insert_vertex(Vertex {
                    position,
                    normal: bake.normal_rotation * normal,
                    tex_coord,
                });
            }
        }
        stats.triangles += triangles.len();
    }

    Ok(stats)
}
