//! Import Settings
//!
//! Knobs that the loader exposes to callers. Every field has a default, so
//! most callers simply use [`ImportSettings::default`].
//!
//! ```rust,ignore
//! use fbx_importer::{FbxLoader, ImportSettings};
//!
//! let settings = ImportSettings {
//!     texture_directory: "assets/textures".into(),
//!     ..Default::default()
//! };
//! let root = FbxLoader::with_settings(settings).load("level.fbx", &mut scene)?;
//! ```

use std::path::PathBuf;

/// Lowest document version the importer accepts.
pub const DEFAULT_MIN_VERSION: i32 = 7100;

/// Largest polygon the triangulator will accept.
pub const DEFAULT_MAX_POLYGON_VERTICES: usize = 8192;

/// Static playback speed applied to every imported animation.
pub const DEFAULT_ANIMATION_SPEED: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    /// Directory prefix joined with a texture's bare filename to build the
    /// path handed to [`Scene::request_texture`](crate::scene::Scene::request_texture).
    pub texture_directory: PathBuf,
    /// Playback speed stored on the imported animation.
    pub animation_speed: f32,
    /// Documents with `FBXVersion` below this value are rejected.
    pub min_version: i32,
    /// Polygons with more vertices than this are skipped.
    pub max_polygon_vertices: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            texture_directory: PathBuf::from("data/textures"),
            animation_speed: DEFAULT_ANIMATION_SPEED,
            min_version: DEFAULT_MIN_VERSION,
            max_polygon_vertices: DEFAULT_MAX_POLYGON_VERTICES,
        }
    }
}
