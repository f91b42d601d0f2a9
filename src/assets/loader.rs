use std::fs;
use std::path::Path;
use std::time::Instant;

use crate::assets::prefab::Prefab;
use crate::convert;
use crate::document::Document;
use crate::errors::Result;
use crate::scene::{NodeHandle, Scene};
use crate::settings::ImportSettings;
use crate::tree;

/// FBX file loader.
///
/// A load runs in one synchronous pass: decode the tree, build and wire the
/// document, assemble a detached [`Prefab`], then instantiate it. Any fatal
/// error is returned before the scene is touched.
///
/// ```rust,ignore
/// let mut scene = Scene::new();
/// let root = FbxLoader::new().load("data/models/house.fbx", &mut scene)?;
/// let animation = scene.animation(root);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FbxLoader {
    settings: ImportSettings,
}

impl FbxLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_settings(settings: ImportSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Loads the file at `path` into `scene` and returns the new root node.
    pub fn load(&self, path: impl AsRef<Path>, scene: &mut Scene) -> Result<NodeHandle> {
        let path = path.as_ref();
        let bytes = fs::read(path).inspect_err(|err| {
            log::error!("FBX: can't open {}: {err}", path.display());
        })?;
        self.load_named(&path.display().to_string(), &bytes, scene)
    }

    /// Same as [`load`](Self::load) for an in-memory file.
    pub fn load_from_bytes(&self, bytes: &[u8], scene: &mut Scene) -> Result<NodeHandle> {
        self.load_named("<memory>", bytes, scene)
    }

    /// Everything up to, but excluding, scene instantiation.
    pub fn load_prefab(&self, bytes: &[u8]) -> Result<Prefab> {
        let root = tree::decode(bytes)?;
        let document = Document::from_tree(&root, self.settings.min_version)?;
        convert::assemble(&document, &self.settings)
    }

    fn load_named(&self, name: &str, bytes: &[u8], scene: &mut Scene) -> Result<NodeHandle> {
        let start = Instant::now();

        let prefab = self.load_prefab(bytes).inspect_err(|err| {
            log::error!("FBX: unable to load {name}: {err}");
        })?;
        log::info!("FBX: {name} parsed in {:.3} seconds", start.elapsed().as_secs_f32());

        let root = scene.instantiate(&prefab);
        log::info!(
            "FBX: {name} loaded in {:.3} seconds ({} node(s), {} track(s))",
            start.elapsed().as_secs_f32(),
            prefab.nodes.len(),
            prefab.tracks.len()
        );
        Ok(root)
    }
}
