//! Geometry Conversion Tests
//!
//! Tests for:
//! - Polygon index restoration and polygon walking
//! - Triangles, quads and concave polygons
//! - Normal, UV and material mapping resolution
//! - Vertex welding per surface
//! - Skipped polygons vs. fatal mapping errors
//! - Geometric transform baking

use glam::{Vec2, Vec3};

use fbx_importer::ImportSettings;
use fbx_importer::convert::geometry::{GeometricBake, GeometryStats, convert_geometry, fix_index, polygons};
use fbx_importer::convert::triangulator::{TriangulationError, newell_normal, triangulate};
use fbx_importer::document::{GeometricTransform, Geometry, LayerElement, Mapping, Reference};
use fbx_importer::errors::{ErrorKind, FbxError};
use fbx_importer::scene::SurfaceData;

const EPSILON: f32 = 1e-5;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn square() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    ]
}

fn geometry(vertices: Vec<Vec3>, indices: Vec<i32>) -> Geometry {
    Geometry {
        vertices,
        indices,
        ..Default::default()
    }
}

fn layer<T>(data: Vec<T>, mapping: Mapping) -> LayerElement<T> {
    LayerElement {
        data,
        index: Vec::new(),
        mapping,
        reference: Reference::Direct,
    }
}

fn convert(geometry: &Geometry, surfaces: usize) -> (Vec<SurfaceData>, GeometryStats) {
    let mut out = vec![SurfaceData::new(); surfaces];
    let stats = convert_geometry(geometry, &GeometricBake::default(), &mut out, &ImportSettings::default()).unwrap();
    (out, stats)
}

fn convert_err(geometry: &Geometry) -> FbxError {
    let mut out = vec![SurfaceData::new(); 2];
    convert_geometry(geometry, &GeometricBake::default(), &mut out, &ImportSettings::default()).unwrap_err()
}

// ============================================================================
// Polygon walking
// ============================================================================

#[test]
fn fix_index_is_stable_and_total() {
    for raw in -1000..1000 {
        let fixed = fix_index(raw);
        assert!(fixed >= 0);
        assert_eq!(fix_index(fixed), fixed);
        if raw < 0 {
            assert_eq!(fixed, -raw - 1);
        }
    }
}

#[test]
fn every_polygon_ends_with_a_negative_index() {
    let indices = [0, 1, -3, 1, 2, 3, -1, 4, 5, -7];
    let all: Vec<_> = polygons(&indices).collect();
    assert_eq!(all.len(), 3);
    for polygon in &all {
        assert!(*polygon.raw.last().unwrap() < 0);
        assert!(polygon.vertex(polygon.len() - 1) >= 0);
    }
    assert_eq!(all[1].start, 3);
    assert_eq!(all[1].vertex(3), 0);
}

// ============================================================================
// Triangulation
// ============================================================================

#[test]
fn triangle_scenario_gives_three_vertices() {
    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.normals = layer(vec![Vec3::Z; 3], Mapping::ByVertex);

    let (surfaces, stats) = convert(&g, 1);
    assert_eq!(stats.triangles, 1);
    assert_eq!(surfaces[0].vertices.len(), 3);
    assert_eq!(surfaces[0].indices, vec![0, 1, 2]);
    assert!(surfaces[0].vertices.iter().all(|v| v.normal == Vec3::Z));
}

#[test]
fn quad_gives_two_triangles() {
    let g = geometry(square(), vec![0, 1, 2, -4]);
    let (surfaces, stats) = convert(&g, 1);

    assert_eq!(stats.triangles, 2);
    assert_eq!(surfaces[0].indices.len(), 6);
    assert!(surfaces[0].vertices.len() <= 4);
    assert!(surfaces[0].indices.iter().all(|&i| (i as usize) < surfaces[0].vertices.len()));
}

#[test]
fn concave_polygon_is_triangulated() {
    // L shape: 6 corners, 4 triangles.
    let l = vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(2.0, 1.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::new(1.0, 2.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
    ];
    let g = geometry(l, vec![0, 1, 2, 3, 4, -6]);
    let (surfaces, stats) = convert(&g, 1);
    assert_eq!(stats.triangles, 4);
    assert_eq!(surfaces[0].vertices.len(), 6);
}

#[test]
fn triangulator_reports_failures() {
    let mut out = Vec::new();
    assert_eq!(triangulate(&[Vec3::ZERO; 2], &mut out), Err(TriangulationError::TooFewVertices(2)));
    assert_eq!(triangulate(&[Vec3::ZERO; 4], &mut out), Err(TriangulationError::ZeroArea));
    assert!(out.is_empty());
    assert!(approx_vec3(newell_normal(&square()), Vec3::new(0.0, 0.0, 2.0)));
}

// ============================================================================
// Welding
// ============================================================================

#[test]
fn shared_corners_are_welded() {
    let g = geometry(square(), vec![0, 1, -3, 0, 2, -4]);
    let (surfaces, _) = convert(&g, 1);
    assert_eq!(surfaces[0].vertices.len(), 4);
    assert_eq!(surfaces[0].indices, vec![0, 1, 2, 0, 2, 3]);
}

#[test]
fn differing_normals_are_not_welded() {
    let mut g = geometry(square(), vec![0, 1, -3, 0, 2, -4]);
    g.normals = layer(
        vec![Vec3::Z, Vec3::Z, Vec3::Z, Vec3::NEG_Z, Vec3::NEG_Z, Vec3::NEG_Z],
        Mapping::ByPolygonVertex,
    );
    let (surfaces, _) = convert(&g, 1);
    assert_eq!(surfaces[0].vertices.len(), 6);
}

#[test]
fn missing_normals_default_to_up() {
    let g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    let (surfaces, _) = convert(&g, 1);
    assert!(surfaces[0].vertices.iter().all(|v| v.normal == Vec3::Y));
}

// ============================================================================
// Attribute mapping
// ============================================================================

#[test]
fn indexed_normals_by_vertex() {
    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.normals = LayerElement {
        data: vec![Vec3::X, Vec3::Z],
        index: vec![1, 1, 0],
        mapping: Mapping::ByVertex,
        reference: Reference::IndexToDirect,
    };
    let (surfaces, _) = convert(&g, 1);
    let normals: Vec<Vec3> = surfaces[0].vertices.iter().map(|v| v.normal).collect();
    assert_eq!(normals, vec![Vec3::Z, Vec3::Z, Vec3::X]);
}

#[test]
fn uvs_are_indexed_and_flipped() {
    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.uvs = LayerElement {
        data: vec![Vec2::new(0.0, 0.25), Vec2::new(1.0, 0.5)],
        index: vec![0, 1, 1],
        mapping: Mapping::ByPolygonVertex,
        reference: Reference::IndexToDirect,
    };
    let (surfaces, _) = convert(&g, 1);
    let uvs: Vec<Vec2> = surfaces[0].vertices.iter().map(|v| v.tex_coord).collect();
    assert_eq!(uvs, vec![Vec2::new(0.0, -0.25), Vec2::new(1.0, -0.5), Vec2::new(1.0, -0.5)]);
}

#[test]
fn unknown_uv_mapping_means_no_uvs() {
    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.uvs = layer(vec![Vec2::ONE; 3], Mapping::Unknown);
    let (surfaces, _) = convert(&g, 1);
    assert!(surfaces[0].vertices.iter().all(|v| v.tex_coord == Vec2::ZERO));
}

#[test]
fn materials_by_polygon_split_surfaces() {
    let mut g = geometry(square(), vec![0, 1, -3, 0, 2, -4]);
    g.materials = layer(vec![1, 0], Mapping::ByPolygon);
    let (surfaces, _) = convert(&g, 2);

    assert_eq!(surfaces[0].triangle_count(), 1);
    assert_eq!(surfaces[1].triangle_count(), 1);
    let first: Vec<Vec3> = surfaces[1].vertices.iter().map(|v| v.position).collect();
    assert_eq!(first, vec![Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0)]);
}

#[test]
fn material_entries_stay_aligned_after_skipped_polygon() {
    // The two-corner polygon is skipped but still owns material entry 0.
    let mut g = geometry(square(), vec![0, -2, 0, 1, -3]);
    g.materials = layer(vec![0, 1], Mapping::ByPolygon);
    let (surfaces, stats) = convert(&g, 2);

    assert_eq!(stats.skipped, 1);
    assert!(surfaces[0].is_empty());
    assert_eq!(surfaces[1].triangle_count(), 1);
}

#[test]
fn materials_all_same_use_first_entry() {
    let mut g = geometry(square(), vec![0, 1, -3, 0, 2, -4]);
    g.materials = layer(vec![1], Mapping::AllSame);
    let (surfaces, _) = convert(&g, 2);
    assert!(surfaces[0].is_empty());
    assert_eq!(surfaces[1].triangle_count(), 2);
}

#[test]
fn unsupported_mappings_are_fatal() {
    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.uvs = layer(vec![Vec2::ONE; 3], Mapping::ByVertex);
    let err = convert_err(&g);
    assert!(matches!(err, FbxError::UnsupportedMapping { attribute: "uv", .. }), "{err}");

    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.normals = layer(vec![Vec3::Z], Mapping::AllSame);
    let err = convert_err(&g);
    assert!(matches!(err, FbxError::UnsupportedMapping { attribute: "normal", .. }), "{err}");

    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.materials = layer(vec![0], Mapping::ByEdge);
    let err = convert_err(&g);
    assert_eq!(err.kind(), ErrorKind::UnsupportedMapping);
}

#[test]
fn short_attribute_arrays_are_fatal() {
    let mut g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -3]);
    g.normals = layer(vec![Vec3::Z], Mapping::ByPolygonVertex);
    let err = convert_err(&g);
    assert!(matches!(err, FbxError::ShapeMismatch { index: 1, len: 1, .. }), "{err}");
}

// ============================================================================
// Skipped polygons
// ============================================================================

#[test]
fn out_of_range_vertex_skips_only_that_polygon() {
    let g = geometry(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, -6, 0, 1, -3]);
    let (surfaces, stats) = convert(&g, 1);
    assert_eq!(stats.polygons, 2);
    assert_eq!(stats.skipped, 1);
    assert_eq!(surfaces[0].indices.len(), 3);
}

#[test]
fn short_and_oversized_polygons_are_skipped() {
    let pentagon: Vec<Vec3> = (0..5)
        .map(|i| {
            let a = i as f32 * std::f32::consts::TAU / 5.0;
            Vec3::new(a.cos(), a.sin(), 0.0)
        })
        .collect();
    let g = geometry(pentagon, vec![0, -2, 0, 1, 2, 3, -5]);

    let settings = ImportSettings {
        max_polygon_vertices: 4,
        ..Default::default()
    };
    let mut out = vec![SurfaceData::new()];
    let stats = convert_geometry(&g, &GeometricBake::default(), &mut out, &settings).unwrap();
    assert_eq!(stats.skipped, 2);
    assert!(out[0].is_empty());

    let (surfaces, stats) = convert(&g, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(surfaces[0].triangle_count(), 3);
}

#[test]
fn collinear_polygon_is_skipped() {
    let line = vec![Vec3::ZERO, Vec3::X, Vec3::X * 2.0, Vec3::X * 3.0];
    let g = geometry(line, vec![0, 1, 2, -4]);
    let (surfaces, stats) = convert(&g, 1);
    assert_eq!(stats.skipped, 1);
    assert!(surfaces[0].is_empty());
}

// ============================================================================
// Geometric transform
// ============================================================================

#[test]
fn geometric_transform_is_baked() {
    let mut g = geometry(vec![Vec3::X, Vec3::Y, Vec3::ZERO], vec![0, 1, -3]);
    g.normals = layer(vec![Vec3::X; 3], Mapping::ByVertex);

    let bake = GeometricBake::new(&GeometricTransform {
        translation: Vec3::new(0.0, 0.0, 5.0),
        rotation: Vec3::new(0.0, 0.0, 90.0),
        scale: Vec3::splat(2.0),
    });
    let mut out = vec![SurfaceData::new()];
    convert_geometry(&g, &bake, &mut out, &ImportSettings::default()).unwrap();

    let v = &out[0].vertices;
    assert!(approx_vec3(v[0].position, Vec3::new(0.0, 2.0, 5.0)));
    assert!(approx_vec3(v[1].position, Vec3::new(-2.0, 0.0, 5.0)));
    assert!(approx_vec3(v[0].normal, Vec3::Y), "normals ignore scale and translation");
}
