//! Connection resolver.
//!
//! `Connections` is a flat list of `C: "OO", child, parent[, property]`
//! records. Each resolvable pair becomes one typed edge on the parent
//! component, chosen by the kind pair:
//!
//! | child              | parent             | edge                          |
//! |--------------------|--------------------|-------------------------------|
//! | Geometry           | Model              | `model.geometries`            |
//! | Texture            | Material           | `material.diffuse_texture`    |
//! | Material           | Model              | `model.materials`             |
//! | AnimationCurve     | AnimationCurveNode | `curve_node.curves`           |
//! | AnimationCurveNode | Model              | `model.curve_nodes`           |
//! | SubDeformer        | Deformer           | `deformer.sub_deformers`      |
//! | Deformer           | Geometry           | `geometry.deformers`          |
//! | Deformer           | Model              | first geometry's `deformers`  |
//! | Model              | SubDeformer        | `sub_deformer.model`          |
//! | Light              | Model              | `model.light`                 |
//! | Model              | Model              | `model.children`              |
//!
//! Every other pair is ignored.

use rustc_hash::FxHashMap;

use crate::document::Document;
use crate::document::components::{Component, ComponentKind, ObjectId};
use crate::errors::{FbxError, Result};
use crate::tree::{Attribute, Element};

/// One record of the `Connections` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub child: ObjectId,
    pub parent: ObjectId,
    /// Property name of `"OP"` connections (e.g. `d|X`).
    pub property: Option<String>,
}

impl Connection {
    pub fn read(element: &Element) -> Result<Self> {
        let property = match element.attributes.get(3) {
            Some(Attribute::String(s)) => Some(s.clone()),
            _ => None,
        };
        Ok(Self {
            child: element.get_i64(1)?,
            parent: element.get_i64(2)?,
            property,
        })
    }

    /// Axis slot encoded in a `d|X` / `d|Y` / `d|Z` property name.
    fn axis(&self) -> Option<usize> {
        match self.property.as_deref()? {
            "d|X" => Some(0),
            "d|Y" => Some(1),
            "d|Z" => Some(2),
            _ => None,
        }
    }
}

/// Reads every record of the `Connections` element.
pub fn read_connections(connections: &Element) -> Result<Vec<Connection>> {
    connections.children.iter().map(Connection::read).collect()
}

/// Applies `connections` to the component table in order.
pub fn resolve(document: &mut Document, connections: &[Connection]) -> Result<()> {
    let mut axes: FxHashMap<ObjectId, usize> = FxHashMap::default();

    for connection in connections {
        match apply(document, connection) {
            Ok(true) => {
                if let Some(axis) = connection.axis() {
                    axes.insert(connection.child, axis);
                }
            }
            Ok(false) => {}
            Err(err) => err.recover()?,
        }
    }

    order_curves_by_axis(document, &axes);
    move_pending_deformers(document);
    Ok(())
}

/// Applies one connection. Returns whether an edge was added.
fn apply(document: &mut Document, connection: &Connection) -> Result<bool> {
    let &Connection { child, parent, .. } = connection;

    let child_kind = document.get(child).map(Component::kind);
    let (Some(child_kind), Some(parent_component)) = (child_kind, document.components.get_mut(&parent)) else {
        return Err(FbxError::DanglingConnection { child, parent });
    };

    match (child_kind, parent_component) {
        (ComponentKind::Geometry, Component::Model(model)) => model.geometries.push(child),
        (ComponentKind::Texture, Component::Material(material)) => {
            material.diffuse_texture = Some(child);
        }
        (ComponentKind::Material, Component::Model(model)) => model.materials.push(child),
        (ComponentKind::AnimationCurve, Component::AnimationCurveNode(node)) => node.curves.push(child),
        (ComponentKind::AnimationCurveNode, Component::Model(model)) => model.curve_nodes.push(child),
        (ComponentKind::SubDeformer, Component::Deformer(deformer)) => deformer.sub_deformers.push(child),
        (ComponentKind::Deformer, Component::Geometry(geometry)) => geometry.deformers.push(child),
        (ComponentKind::Deformer, Component::Model(model)) => model.pending_deformers.push(child),
        (ComponentKind::Model, Component::SubDeformer(sub)) => sub.model = Some(child),
        (ComponentKind::Light, Component::Model(model)) => model.light = Some(child),
        (ComponentKind::Model, Component::Model(model)) => {
            if child == parent {
                log::warn!("FBX: model {child} connected to itself");
                return Ok(false);
            }
            model.children.push(child);
        }
        _ => return Ok(false),
    }

    Ok(true)
}

/// Curves connected with axis properties are put in X, Y, Z order.
fn order_curves_by_axis(document: &mut Document, axes: &FxHashMap<ObjectId, usize>) {
    for component in document.components.values_mut() {
        if let Component::AnimationCurveNode(node) = component
            && node.curves.iter().all(|id| axes.contains_key(id))
        {
            node.curves.sort_by_key(|id| axes.get(id).copied());
        }
    }
}

fn move_pending_deformers(document: &mut Document) {
    let mut moves = Vec::new();
    for (&id, component) in &mut document.components {
        if let Component::Model(model) = component
            && !model.pending_deformers.is_empty()
        {
            let deformers = std::mem::take(&mut model.pending_deformers);
            match model.geometries.first() {
                Some(&geometry) => moves.push((geometry, deformers)),
                None => log::warn!("FBX: model {id} owns deformers but no geometry"),
            }
        }
    }

    for (geometry, deformers) in moves {
        if let Some(Component::Geometry(g)) = document.components.get_mut(&geometry) {
            g.deformers.extend(deformers);
        }
    }
}
