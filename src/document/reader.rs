//! Kind-specific readers for the children of `Objects`.
//!
//! Readers validate array shapes before trusting them and never set cross
//! references; that is left to [`super::connections`].

use glam::{Mat4, Vec3};

use crate::document::components::{
    AnimationCurve, AnimationCurveNode, Component, CurveKey, CurveNodeKind, Deformer, Geometry,
    LayerElement, Light, Mapping, Material, Model, ObjectId, Reference, SubDeformer, Texture,
};
use crate::errors::{FbxError, Result};
use crate::tree::{Attribute, Element};

/// Seconds per document time tick.
pub const TIME_UNIT: f64 = 1.0 / 46_186_158_000.0;

const BINARY_NAME_SEPARATOR: &str = "\0\u{1}";
const ASCII_NAME_SEPARATOR: &str = "::";

/// `Name` part of `"Class::Name"` (ASCII) or `"Name\0\x01Class"` (binary).
#[must_use]
pub fn object_name(raw: &str) -> &str {
    if let Some((name, _)) = raw.split_once(BINARY_NAME_SEPARATOR) {
        name
    } else if let Some((_, name)) = raw.split_once(ASCII_NAME_SEPARATOR) {
        name
    } else {
        raw
    }
}

/// `Class` part of an object name, empty when the name carries none.
#[must_use]
pub fn object_class(raw: &str) -> &str {
    if let Some((_, class)) = raw.split_once(BINARY_NAME_SEPARATOR) {
        class
    } else if let Some((class, _)) = raw.split_once(ASCII_NAME_SEPARATOR) {
        class
    } else {
        ""
    }
}

/// Model names keep only the segment after the last namespace separator.
#[must_use]
pub fn model_name(raw: &str) -> &str {
    let name = object_name(raw);
    name.rsplit(':').next().unwrap_or(name)
}

/// Reads one child of `Objects`. Unrecognized objects yield `None`.
pub fn read_object(element: &Element) -> Result<Option<(ObjectId, Component)>> {
    let component = match element.name.as_str() {
        "Geometry" => {
            if let Some(Attribute::String(class)) = element.attributes.get(2)
                && class != "Mesh"
            {
                log::debug!("FBX: skipping '{class}' geometry");
                return Ok(None);
            }
            Component::Geometry(read_geometry(element)?)
        }
        "Model" => Component::Model(read_model(element)?),
        "Material" => Component::Material(Material::default()),
        "Texture" => Component::Texture(read_texture(element)?),
        "NodeAttribute" => match element.attributes.get(2) {
            Some(Attribute::String(class)) if class == "Light" => {
                Component::Light(read_light(element)?)
            }
            _ => return Ok(None),
        },
        "AnimationCurve" => Component::AnimationCurve(read_animation_curve(element)?),
        "AnimationCurveNode" => Component::AnimationCurveNode(read_curve_node(element)?),
        "Deformer" => match object_class(element.get_str(1)?) {
            "SubDeformer" => Component::SubDeformer(read_sub_deformer(element)?),
            "Deformer" => Component::Deformer(Deformer::default()),
            other => {
                log::debug!("FBX: skipping deformer of class '{other}'");
                return Ok(None);
            }
        },
        _ => return Ok(None),
    };

    Ok(Some((element.get_i64(0)?, component)))
}

// ============================================================================
// Geometry
// ============================================================================

fn read_geometry(element: &Element) -> Result<Geometry> {
    let vertices = element.array_child("Vertices")?.to_vec3_vec()?;
    let indices = element.array_child("PolygonVertexIndex")?.to_i32_vec()?;

    Ok(Geometry {
        vertices,
        indices,
        normals: read_layer(element, "LayerElementNormal", "Normals", Some("NormalsIndex"), Element::to_vec3_vec)?,
        tangents: read_layer(element, "LayerElementTangent", "Tangents", Some("TangentsIndex"), Element::to_vec3_vec)?,
        binormals: read_layer(element, "LayerElementBinormal", "Binormals", Some("BinormalsIndex"), Element::to_vec3_vec)?,
        uvs: read_layer(element, "LayerElementUV", "UV", Some("UVIndex"), Element::to_vec2_vec)?,
        materials: read_layer(element, "LayerElementMaterial", "Materials", None, Element::to_i32_vec)?,
        deformers: Vec::new(),
    })
}

fn read_layer<T: Default>(
    geometry: &Element,
    layer: &str,
    data: &str,
    index: Option<&str>,
    convert: impl Fn(&Element) -> Result<Vec<T>>,
) -> Result<LayerElement<T>> {
    let Some(node) = geometry.find_child(layer) else {
        return Ok(LayerElement::default());
    };

    let mapping = Mapping::parse(node.child("MappingInformationType")?.get_str(0)?);
    let reference = match node.find_child("ReferenceInformationType") {
        Some(r) => Reference::parse(r.get_str(0)?),
        None => Reference::Direct,
    };

    let index = match index {
        Some(name) if reference == Reference::IndexToDirect => node.array_child(name)?.to_i32_vec()?,
        _ => Vec::new(),
    };

    Ok(LayerElement {
        data: convert(node.array_child(data)?)?,
        index,
        mapping,
        reference,
    })
}

// ============================================================================
// Model / Light / Texture
// ============================================================================

/// Calls `f` for every `Properties70/P` entry with its property name.
fn for_each_property(element: &Element, mut f: impl FnMut(&str, &Element) -> Result<()>) -> Result<()> {
    let Some(properties) = element.find_child("Properties70") else {
        return Ok(());
    };
    for property in properties.children.iter().filter(|p| p.name == "P") {
        f(property.get_str(0)?, property)?;
    }
    Ok(())
}

fn read_model(element: &Element) -> Result<Model> {
    let mut model = Model {
        name: model_name(element.get_str(1)?).to_string(),
        ..Default::default()
    };

    let t = &mut model.transform;
    let g = &mut model.geometric;
    for_each_property(element, |name, p| {
        let slot: &mut Vec3 = match name {
            "Lcl Translation" => &mut t.translation,
            "Lcl Rotation" => &mut t.rotation,
            "Lcl Scaling" => &mut t.scale,
            "PreRotation" => &mut t.pre_rotation,
            "PostRotation" => &mut t.post_rotation,
            "RotationOffset" => &mut t.rotation_offset,
            "RotationPivot" => &mut t.rotation_pivot,
            "ScalingOffset" => &mut t.scaling_offset,
            "ScalingPivot" => &mut t.scaling_pivot,
            "GeometricTranslation" => &mut g.translation,
            "GeometricRotation" => &mut g.rotation,
            "GeometricScaling" => &mut g.scale,
            _ => return Ok(()),
        };
        *slot = p.get_vec3(4)?;
        Ok(())
    })?;

    Ok(model)
}

fn read_light(element: &Element) -> Result<Light> {
    let mut light = Light::default();
    for_each_property(element, |name, p| {
        match name {
            "DecayStart" => light.radius = p.get_f32(4)?,
            "Color" if p.len() >= 7 => light.color = p.get_vec3(4)?.extend(1.0),
            _ => {}
        }
        Ok(())
    })?;
    Ok(light)
}

fn read_texture(element: &Element) -> Result<Texture> {
    let path = element
        .find_child("RelativeFilename")
        .or_else(|| element.find_child("FileName"))
        .ok_or_else(|| FbxError::malformed("texture has neither RelativeFilename nor FileName"))?
        .get_str(0)?;

    let filename = path.rsplit(['\\', '/']).next().unwrap_or(path);
    Ok(Texture {
        filename: filename.to_string(),
    })
}

// ============================================================================
// Animation
// ============================================================================

fn read_animation_curve(element: &Element) -> Result<AnimationCurve> {
    let id = element.get_i64(0)?;
    let array = |name: &str| element.find_child(name).and_then(|n| n.find_child("a"));
    let (Some(times), Some(values)) = (array("KeyTime"), array("KeyValueFloat")) else {
        return Err(FbxError::MissingCurveData { id });
    };

    if times.len() != values.len() {
        return Err(FbxError::CurveKeyMismatch {
            id,
            times: times.len(),
            values: values.len(),
        });
    }

    let keys = (0..times.len())
        .map(|i| {
            Ok(CurveKey {
                time: (times.get_i64(i)? as f64 * TIME_UNIT) as f32,
                value: values.get_f32(i)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(AnimationCurve { keys })
}

fn read_curve_node(element: &Element) -> Result<AnimationCurveNode> {
    let raw = element.get_str(1)?;
    let kind = CurveNodeKind::parse(object_name(raw));
    if kind == CurveNodeKind::Unknown {
        log::warn!("FBX: unknown animation curve node type '{}'", object_name(raw));
    }
    Ok(AnimationCurveNode {
        kind,
        curves: Vec::new(),
    })
}

// ============================================================================
// Skinning
// ============================================================================

fn read_matrix(element: &Element, id: ObjectId, field: &'static str) -> Result<Mat4> {
    let values = element.array_child(field)?.to_f32_vec()?;
    if values.len() != 16 {
        return Err(FbxError::MalformedTransform {
            id,
            field,
            len: values.len(),
        });
    }
    Ok(Mat4::from_cols_slice(&values))
}

fn read_sub_deformer(element: &Element) -> Result<SubDeformer> {
    let id = element.get_i64(0)?;

    let optional = |name: &str| element.find_child(name).and_then(|n| n.find_child("a"));
    let indices = optional("Indexes").map(Element::to_i32_vec).transpose()?.unwrap_or_default();
    let weights = optional("Weights").map(Element::to_f32_vec).transpose()?.unwrap_or_default();

    Ok(SubDeformer {
        indices,
        weights,
        transform: read_matrix(element, id, "Transform")?,
        transform_link: read_matrix(element, id, "TransformLink")?,
        model: None,
    })
}
