//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: create nodes, attach/detach hierarchy, cycle refusal
//! - Node query: names, kinds, root_nodes, subtree search
//! - World matrices through the FBX transform chain
//! - Prefab instantiation: components, textures, animation registration

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Quat, Vec3, Vec4};

use fbx_importer::animation::{Keyframe, Track};
use fbx_importer::assets::{Prefab, PrefabMesh, PrefabNode, PrefabSurface};
use fbx_importer::scene::{IMPORT_ROOT_NAME, Light, NodeKind, Scene, SurfaceData, Transform, Vertex};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn triangle() -> SurfaceData {
    let mut data = SurfaceData::new();
    for position in [Vec3::ZERO, Vec3::X, Vec3::Y] {
        data.insert_vertex(Vertex {
            position,
            normal: Vec3::Z,
            ..Default::default()
        });
    }
    data
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn scene_create_node_is_a_root() {
    let mut scene = Scene::new();
    let handle = scene.create_node("TestNode");
    assert_eq!(scene.get_node(handle).unwrap().name, "TestNode");
    assert_eq!(scene.root_nodes, vec![handle]);
    assert_eq!(scene.node_kind(handle), Some(NodeKind::Base));
}

#[test]
fn scene_attach_moves_between_parents() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let child = scene.create_node("child");

    assert!(scene.attach(child, a));
    assert_eq!(scene.get_node(a).unwrap().children(), &[child]);
    assert!(!scene.root_nodes.contains(&child));

    assert!(scene.attach(child, b));
    assert!(scene.get_node(a).unwrap().children().is_empty());
    assert_eq!(scene.get_node(b).unwrap().children(), &[child]);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(b));
}

#[test]
fn scene_attach_refuses_descendants() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let c = scene.create_node("c");
    scene.attach(b, a);
    scene.attach(c, b);

    assert!(!scene.attach(a, c));
    assert!(!scene.attach(c, c));
    assert!(scene.is_ancestor(a, c));
    assert!(!scene.is_ancestor(c, a));
    assert_eq!(scene.root_nodes, vec![a]);
}

#[test]
fn scene_find_by_name_searches_subtree_only() {
    let mut scene = Scene::new();
    let a = scene.create_node("a");
    let b = scene.create_node("b");
    let target = scene.create_node("target");
    let other = scene.create_node("target");
    scene.attach(b, a);
    scene.attach(target, b);

    assert_eq!(scene.find_by_name(a, "target"), Some(target));
    assert_eq!(scene.find_by_name(other, "target"), Some(other));
    assert_eq!(scene.find_by_name(b, "a"), None);
}

// ============================================================================
// Transforms
// ============================================================================

#[test]
fn world_matrix_composes_parents() {
    let mut scene = Scene::new();
    let parent = scene.create_node("parent");
    let child = scene.create_node("child");
    scene.attach(child, parent);

    scene.get_node_mut(parent).unwrap().transform =
        Transform::from_trs(Vec3::new(0.0, 1.0, 0.0), Quat::from_rotation_z(FRAC_PI_2), Vec3::ONE);
    scene.get_node_mut(child).unwrap().transform.position = Vec3::X;

    let world = scene.world_matrix(child).unwrap();
    assert!(vec3_approx(world.transform_point3(Vec3::ZERO), Vec3::new(0.0, 2.0, 0.0)));
}

#[test]
fn pre_rotation_applies_before_local_rotation() {
    let mut transform = Transform::new();
    transform.pre_rotation = Quat::from_rotation_x(FRAC_PI_2);
    transform.set_rotation_euler_degrees(Vec3::new(0.0, 0.0, 90.0));

    let expected = Mat4::from_quat(Quat::from_rotation_x(FRAC_PI_2) * Quat::from_rotation_z(FRAC_PI_2));
    assert!(transform.local_matrix().abs_diff_eq(expected, EPSILON));
}

#[test]
fn scaling_pivot_keeps_pivot_fixed() {
    let mut transform = Transform::new();
    transform.scale = Vec3::splat(3.0);
    transform.scaling_pivot = Vec3::new(0.0, 2.0, 0.0);
    let pivot = transform.local_matrix().transform_point3(Vec3::new(0.0, 2.0, 0.0));
    assert!(vec3_approx(pivot, Vec3::new(0.0, 2.0, 0.0)));
}

// ============================================================================
// Prefab instantiation
// ============================================================================

fn prefab() -> Prefab {
    let mut prefab = Prefab::new(0.25);

    let mut body = PrefabNode::new("body");
    body.children_indices = vec![1];
    body.mesh = Some(PrefabMesh {
        surfaces: vec![
            PrefabSurface {
                data: triangle(),
                texture: Some("tex/skin.png".into()),
            },
            PrefabSurface {
                data: triangle(),
                texture: Some("tex/skin.png".into()),
            },
        ],
    });
    prefab.nodes.push(body);

    let mut lamp = PrefabNode::new("lamp");
    lamp.light = Some(Light::point(Vec4::new(1.0, 0.0, 0.0, 1.0), 4.0));
    lamp.mesh = Some(PrefabMesh::default());
    prefab.nodes.push(lamp);

    prefab.nodes.push(PrefabNode::new("empty"));

    let mut track = Track::new(1);
    track.add_keyframe(Keyframe::new(0.0));
    track.add_keyframe(Keyframe::new(2.0));
    prefab.tracks.push(track);
    prefab
}

#[test]
fn instantiate_builds_hierarchy_under_new_root() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&prefab());

    assert_eq!(scene.root_nodes, vec![root]);
    assert_eq!(scene.get_node(root).unwrap().name, IMPORT_ROOT_NAME);
    assert_eq!(scene.nodes.len(), 4);

    let body = scene.find_by_name(root, "body").unwrap();
    let lamp = scene.find_by_name(root, "lamp").unwrap();
    let empty = scene.find_by_name(root, "empty").unwrap();
    assert_eq!(scene.get_node(root).unwrap().children(), &[body, empty]);
    assert_eq!(scene.get_node(lamp).unwrap().parent(), Some(body));
}

#[test]
fn instantiate_registers_components() {
    let mut scene = Scene::new();
    let root = scene.instantiate(&prefab());

    let body = scene.find_by_name(root, "body").unwrap();
    let lamp = scene.find_by_name(root, "lamp").unwrap();
    assert_eq!(scene.node_kind(body), Some(NodeKind::Mesh));
    assert_eq!(scene.node_kind(lamp), Some(NodeKind::Light));

    let mesh = &scene.meshes[scene.get_node(body).unwrap().mesh.unwrap()];
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.index_count(), 6);
    assert_eq!(mesh.surfaces[0].texture, mesh.surfaces[1].texture);
    assert_eq!(scene.textures.len(), 1);

    let light = scene.lights[scene.get_node(lamp).unwrap().light.unwrap()];
    assert_eq!(light.radius(), 4.0);
}

#[test]
fn instantiate_registers_animation_per_root() {
    let mut scene = Scene::new();
    let first = scene.instantiate(&prefab());
    let second = scene.instantiate(&prefab());

    assert_eq!(scene.animations.len(), 2);
    let animation = scene.animation(second).unwrap();
    assert_eq!(animation.speed, 0.25);
    assert_eq!(animation.length, 2.0);

    let lamp = scene.find_by_name(second, "lamp").unwrap();
    assert!(animation.track_for(lamp).is_some());
    assert!(scene.animation(first).unwrap().track_for(lamp).is_none());
}
