//! Scene graph
//!
//! The runtime the importer populates:
//! - [`Node`]: named hierarchy entry with a [`Transform`] and optional components
//! - [`Transform`]: FBX nine-part local transform
//! - [`Mesh`]: render surfaces built from welded vertices
//! - [`Light`]: point light
//! - [`Texture`]: path-addressed texture request
//! - [`Scene`]: slotmap-backed container plus per-import animations

pub mod light;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod texture;
pub mod transform;

pub use light::Light;
pub use mesh::{Mesh, Surface, SurfaceData, Vertex};
pub use node::{Node, NodeKind};
pub use scene::{IMPORT_ROOT_NAME, Scene};
pub use texture::Texture;
pub use transform::{Transform, quat_from_euler_degrees};

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
    pub struct LightKey;
    pub struct TextureKey;
}
