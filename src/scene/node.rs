use crate::scene::transform::Transform;
use crate::scene::{LightKey, MeshKey, NodeHandle};

/// What a node carries, derived from its components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Base,
    Mesh,
    Light,
}

/// A scene node.
///
/// # Hierarchy
///
/// - `parent`: handle of the parent node (None for root nodes)
/// - `children`: child handles in attachment order
///
/// Keep both sides in sync through [`Scene::attach`](crate::scene::Scene::attach).
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,

    pub mesh: Option<MeshKey>,
    pub light: Option<LightKey>,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    /// A light wins over a mesh.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        if self.light.is_some() {
            NodeKind::Light
        } else if self.mesh.is_some() {
            NodeKind::Mesh
        } else {
            NodeKind::Base
        }
    }
}
