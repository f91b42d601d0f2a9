//! Component model
//!
//! A [`Document`] is built in two explicit phases:
//!
//! 1. **Build**: every recognized child of `Objects` is read into a typed
//!    [`Component`] and stored under its document identity.
//! 2. **Wire**: the `Connections` list is resolved into typed edges
//!    (see [`connections`]).
//!
//! The table is an ordered map, so lookups are logarithmic and iteration
//! visits components in ascending identity order.

pub mod components;
pub mod connections;
pub mod reader;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

pub use components::{
    AnimationCurve, AnimationCurveNode, Component, ComponentKind, CurveKey, CurveNodeKind, Deformer,
    GeometricTransform, Geometry, LayerElement, Light, Mapping, Material, Model, ModelTransform,
    ObjectId, Reference, SubDeformer, Texture,
};
pub use connections::Connection;

use crate::errors::{FbxError, Result};
use crate::tree::Element;

macro_rules! typed_lookup {
    ($($name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(&self, id: ObjectId) -> Option<&$ty> {
                match self.components.get(&id) {
                    Some(Component::$variant(value)) => Some(value),
                    _ => None,
                }
            }
        )*
    };
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    pub version: i32,
    pub(crate) components: BTreeMap<ObjectId, Component>,
}

impl Document {
    /// Reads `FBXHeaderExtension/FBXVersion`.
    pub fn read_version(root: &Element) -> Result<i32> {
        root.child("FBXHeaderExtension")?.child("FBXVersion")?.get_i32(0)
    }

    /// Checks the version floor, builds every component and wires the
    /// connections.
    pub fn from_tree(root: &Element, min_version: i32) -> Result<Self> {
        let version = Self::read_version(root)?;
        if version < min_version {
            return Err(FbxError::UnsupportedVersion {
                version,
                minimum: min_version,
            });
        }

        let mut document = Self::build(root.child("Objects")?)?;
        document.version = version;

        match root.find_child("Connections") {
            Some(connections) => {
                let connections = connections::read_connections(connections)?;
                connections::resolve(&mut document, &connections)?;
            }
            None => log::debug!("FBX: document has no Connections section"),
        }

        Ok(document)
    }

    /// Build phase: reads every child of `Objects`.
    pub fn build(objects: &Element) -> Result<Self> {
        let mut components = BTreeMap::new();

        for child in &objects.children {
            let Some((id, component)) = reader::read_object(child)? else {
                continue;
            };
            match components.entry(id) {
                Entry::Vacant(slot) => {
                    slot.insert(component);
                }
                Entry::Occupied(existing) => {
                    log::warn!(
                        "FBX: duplicate object id {id} ({:?} vs {:?}), keeping the first",
                        existing.get().kind(),
                        component.kind()
                    );
                }
            }
        }

        let document = Self {
            version: 0,
            components,
        };
        document.log_counts();
        Ok(document)
    }

    /// Wire phase for callers that build the component table themselves.
    pub fn connect(&mut self, connections: &[Connection]) -> Result<()> {
        connections::resolve(self, connections)
    }

    fn log_counts(&self) {
        if !log::log_enabled!(log::Level::Debug) {
            return;
        }
        for kind in [
            ComponentKind::Geometry,
            ComponentKind::Model,
            ComponentKind::Material,
            ComponentKind::Texture,
            ComponentKind::Light,
            ComponentKind::AnimationCurve,
            ComponentKind::AnimationCurveNode,
            ComponentKind::Deformer,
            ComponentKind::SubDeformer,
        ] {
            log::debug!("FBX: contains {} {kind:?} component(s)", self.count(kind));
        }
    }

    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&Component> {
        self.components.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    #[must_use]
    pub fn count(&self, kind: ComponentKind) -> usize {
        self.components.values().filter(|c| c.kind() == kind).count()
    }

    /// All components in ascending identity order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &Component)> {
        self.components.iter().map(|(&id, c)| (id, c))
    }

    /// All models in ascending identity order.
    pub fn models(&self) -> impl Iterator<Item = (ObjectId, &Model)> {
        self.iter().filter_map(|(id, c)| match c {
            Component::Model(model) => Some((id, model)),
            _ => None,
        })
    }

    typed_lookup! {
        geometry => Geometry(Geometry),
        model => Model(Model),
        material => Material(Material),
        texture => Texture(Texture),
        light => Light(Light),
        curve => AnimationCurve(AnimationCurve),
        curve_node => AnimationCurveNode(AnimationCurveNode),
        deformer => Deformer(Deformer),
        sub_deformer => SubDeformer(SubDeformer),
    }
}
