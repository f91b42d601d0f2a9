pub mod loader;
pub mod prefab;

pub use loader::FbxLoader;
pub use prefab::{Prefab, PrefabMesh, PrefabNode, PrefabSurface};
