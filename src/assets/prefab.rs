use std::path::PathBuf;

use crate::animation::Track;
use crate::scene::light::Light;
use crate::scene::mesh::SurfaceData;
use crate::scene::transform::Transform;

/// A staged surface; the texture is still a path, not a scene resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefabSurface {
    pub data: SurfaceData,
    pub texture: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrefabMesh {
    pub surfaces: Vec<PrefabSurface>,
}

/// Prefab node: plain data, children referenced by index.
#[derive(Debug, Clone, Default)]
pub struct PrefabNode {
    pub name: String,
    pub transform: Transform,
    /// Indices into [`Prefab::nodes`].
    pub children_indices: Vec<usize>,
    pub mesh: Option<PrefabMesh>,
    pub light: Option<Light>,
}

impl PrefabNode {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Detached result of one import.
///
/// Holds no [`NodeHandle`](crate::scene::NodeHandle) and no scene reference;
/// [`Scene::instantiate`](crate::scene::Scene::instantiate) turns it into live
/// nodes in one step.
#[derive(Debug, Clone, Default)]
pub struct Prefab {
    /// One node per model, in ascending identity order.
    pub nodes: Vec<PrefabNode>,
    /// Tracks addressed by node index.
    pub tracks: Vec<Track<usize>>,
    pub animation_speed: f32,
}

impl Prefab {
    #[must_use]
    pub fn new(animation_speed: f32) -> Self {
        Self {
            nodes: Vec::new(),
            tracks: Vec::new(),
            animation_speed,
        }
    }
}
