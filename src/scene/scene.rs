use std::path::{Path, PathBuf};

use glam::Mat4;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::animation::Animation;
use crate::assets::prefab::Prefab;
use crate::scene::light::Light;
use crate::scene::mesh::{Mesh, Surface};
use crate::scene::node::{Node, NodeKind};
use crate::scene::texture::Texture;
use crate::scene::{LightKey, MeshKey, NodeHandle, TextureKey};

/// Name given to the node every import is attached under.
pub const IMPORT_ROOT_NAME: &str = "fbx_root";

/// Scene graph container.
///
/// Nodes, meshes, lights and textures live in slotmaps; animations are keyed
/// by the root node of the import that produced them.
#[derive(Debug, Default)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    // ==== Components / resources ====
    pub meshes: SlotMap<MeshKey, Mesh>,
    pub lights: SlotMap<LightKey, Light>,
    pub textures: SlotMap<TextureKey, Texture>,
    texture_cache: FxHashMap<PathBuf, TextureKey>,

    pub animations: FxHashMap<NodeHandle, Animation>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Nodes & hierarchy
    // ========================================================================

    /// Inserts `node` as a new root node.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn node_kind(&self, handle: NodeHandle) -> Option<NodeKind> {
        self.nodes.get(handle).map(Node::kind)
    }

    /// First node named `name` in the subtree under `root` (depth first).
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let mut stack = vec![root];
        while let Some(handle) = stack.pop() {
            let node = self.nodes.get(handle)?;
            if node.name == name {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// True when `ancestor` is `node` or one of its parents.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            current = self.nodes.get(handle).and_then(|n| n.parent);
        }
        false
    }

    /// Moves `child` under `parent`, detaching it from its previous parent.
    ///
    /// Self-attachment and attachments that would create a cycle are refused.
    /// Returns whether the hierarchy changed.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> bool {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("Node not found during attach!");
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Cannot attach a node to itself or to one of its descendants");
            return false;
        }

        // 1. Detach from old
        match self.nodes[child].parent {
            Some(old) => {
                if let Some(n) = self.nodes.get_mut(old)
                    && let Some(i) = n.children.iter().position(|&x| x == child)
                {
                    n.children.remove(i);
                }
            }
            None => self.root_nodes.retain(|&x| x != child),
        }

        // 2. Attach to new
        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        true
    }

    /// Local matrices composed from the root down to `handle`.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Mat4> {
        let mut matrix = self.nodes.get(handle)?.transform.local_matrix();
        let mut current = self.nodes[handle].parent;
        while let Some(parent) = current {
            let node = self.nodes.get(parent)?;
            matrix = node.transform.local_matrix() * matrix;
            current = node.parent;
        }
        Some(matrix)
    }

    // ========================================================================
    // Resources
    // ========================================================================

    /// Returns the texture for `path`, creating it on first request.
    pub fn request_texture(&mut self, path: impl AsRef<Path>) -> TextureKey {
        let path = path.as_ref();
        if let Some(&key) = self.texture_cache.get(path) {
            return key;
        }
        let key = self.textures.insert(Texture::new(path));
        self.texture_cache.insert(path.to_path_buf(), key);
        key
    }

    #[must_use]
    pub fn animation(&self, root: NodeHandle) -> Option<&Animation> {
        self.animations.get(&root)
    }

    // ========================================================================
    // Prefab instantiation
    // ========================================================================

    /// Turns a staged import into live nodes under a new root node.
    ///
    /// Every node is first attached to the root, then re-parented along the
    /// staged hierarchy. Textures are requested through the shared cache and
    /// the animation is registered under the returned root.
    pub fn instantiate(&mut self, prefab: &Prefab) -> NodeHandle {
        let root = self.create_node(IMPORT_ROOT_NAME);

        let mut handles = Vec::with_capacity(prefab.nodes.len());
        for staged in &prefab.nodes {
            let mut node = Node::new(staged.name.as_str());
            node.transform = staged.transform;

            if let Some(light) = staged.light {
                node.light = Some(self.lights.insert(light));
            }

            if let Some(mesh) = &staged.mesh {
                let surfaces = mesh
                    .surfaces
                    .iter()
                    .map(|s| Surface {
                        data: s.data.clone(),
                        texture: s.texture.as_ref().map(|p| self.request_texture(p)),
                    })
                    .collect();
                node.mesh = Some(self.meshes.insert(Mesh { surfaces }));
            }

            let handle = self.nodes.insert(node);
            self.nodes[root].children.push(handle);
            self.nodes[handle].parent = Some(root);
            handles.push(handle);
        }

        for (index, staged) in prefab.nodes.iter().enumerate() {
            for &child in &staged.children_indices {
                match handles.get(child) {
                    Some(&child) => {
                        self.attach(child, handles[index]);
                    }
                    None => log::warn!("Prefab node {index} names missing child {child}"),
                }
            }
        }

        let mut animation = Animation::new(prefab.animation_speed);
        for track in &prefab.tracks {
            match handles.get(track.node) {
                Some(&handle) => animation.add_track(track.clone().map_node(|_| handle)),
                None => log::warn!("Animation track targets missing node {}", track.node),
            }
        }
        animation.clamp_length();
        self.animations.insert(root, animation);

        root
    }
}
