//! Scene assembly
//!
//! Turns a wired [`Document`] into a detached [`Prefab`]: one staged node per
//! model (ascending identity order), meshes with per-material surfaces,
//! point lights, and one sampled track per animated model. Nothing here
//! touches a live [`Scene`](crate::scene::Scene).

pub mod animation;
pub mod geometry;
pub mod triangulator;

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::assets::prefab::{Prefab, PrefabMesh, PrefabNode, PrefabSurface};
use crate::document::{Document, Model, ModelTransform, ObjectId};
use crate::errors::Result;
use crate::scene::light::Light;
use crate::scene::mesh::SurfaceData;
use crate::scene::transform::{Transform, quat_from_euler_degrees};
use crate::settings::ImportSettings;

use self::animation::{TrsCurves, sample_track};
use self::geometry::{GeometricBake, convert_geometry};

/// Converts the model's decomposition into a scene transform.
#[must_use]
pub fn convert_transform(source: &ModelTransform) -> Transform {
    Transform {
        position: source.translation,
        rotation: quat_from_euler_degrees(source.rotation),
        scale: source.scale,
        pre_rotation: quat_from_euler_degrees(source.pre_rotation),
        post_rotation: quat_from_euler_degrees(source.post_rotation),
        rotation_offset: source.rotation_offset,
        rotation_pivot: source.rotation_pivot,
        scaling_offset: source.scaling_offset,
        scaling_pivot: source.scaling_pivot,
    }
}

/// Texture request path of each of the model's materials, in material order.
fn material_textures(document: &Document, model: &Model, settings: &ImportSettings) -> Vec<Option<PathBuf>> {
    model
        .materials
        .iter()
        .map(|&id| {
            let material = document.material(id)?;
            let texture = document.texture(material.diffuse_texture?)?;
            Some(settings.texture_directory.join(&texture.filename))
        })
        .collect()
}

/// Builds the model's mesh. Each geometry gets its own run of surfaces:
/// one per material, or a single untextured one.
pub fn convert_mesh(document: &Document, model: &Model, settings: &ImportSettings) -> Result<PrefabMesh> {
    let bake = GeometricBake::new(&model.geometric);
    let textures = material_textures(document, model, settings);
    let slots = textures.len().max(1);

    let mut mesh = PrefabMesh::default();
    for &id in &model.geometries {
        let Some(geometry) = document.geometry(id) else {
            continue;
        };

        let mut surfaces = vec![SurfaceData::new(); slots];
        let stats = convert_geometry(geometry, &bake, &mut surfaces, settings)?;
        log::debug!(
            "FBX: model '{}': geometry {id}: {} polygon(s), {} triangle(s), {} skipped",
            model.name,
            stats.polygons,
            stats.triangles,
            stats.skipped
        );

        mesh.surfaces.extend(surfaces.into_iter().enumerate().map(|(slot, data)| PrefabSurface {
            data,
            texture: textures.get(slot).cloned().flatten(),
        }));
    }

    log::debug!(
        "FBX: model '{}': {} surface(s), {} vertices, {} indices",
        model.name,
        mesh.surfaces.len(),
        mesh.surfaces.iter().map(|s| s.data.vertices.len()).sum::<usize>(),
        mesh.surfaces.iter().map(|s| s.data.indices.len()).sum::<usize>()
    );
    Ok(mesh)
}

fn convert_node(document: &Document, model: &Model, settings: &ImportSettings) -> Result<PrefabNode> {
    let mut node = PrefabNode::new(model.name.as_str());
    node.transform = convert_transform(&model.transform);

    if let Some(light) = model.light.and_then(|id| document.light(id)) {
        node.light = Some(Light::point(light.color, light.radius));
        if !model.geometries.is_empty() {
            log::debug!("FBX: model '{}' carries a light, its geometry is ignored", model.name);
        }
    } else if !model.geometries.is_empty() {
        node.mesh = Some(convert_mesh(document, model, settings)?);
    }

    Ok(node)
}

/// Assembles the whole document. Any fatal error aborts before a single
/// scene node exists.
pub fn assemble(document: &Document, settings: &ImportSettings) -> Result<Prefab> {
    let mut prefab = Prefab::new(settings.animation_speed);
    let mut staged: FxHashMap<ObjectId, usize> = FxHashMap::default();

    for (id, model) in document.models() {
        let index = prefab.nodes.len();
        prefab.nodes.push(convert_node(document, model, settings)?);
        staged.insert(id, index);

        if !model.curve_nodes.is_empty() {
            let track = sample_track(&TrsCurves::classify(document, model), index);
            log::debug!("FBX: model '{}': {} keyframe(s)", model.name, track.keyframes.len());
            prefab.tracks.push(track);
        }
    }

    // Hierarchy is applied only once every model has a staged node.
    for (id, model) in document.models() {
        let Some(&parent) = staged.get(&id) else {
            continue;
        };
        let children: Vec<usize> = model.children.iter().filter_map(|child| staged.get(child).copied()).collect();
        prefab.nodes[parent].children_indices.extend(children);
    }

    Ok(prefab)
}
