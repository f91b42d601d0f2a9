use std::path::{Path, PathBuf};

/// A texture requested by path. Image decoding is up to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    path: PathBuf,
}

impl Texture {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
