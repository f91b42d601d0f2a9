//! Typed components.
//!
//! Every recognized object of the `Objects` section becomes exactly one
//! [`Component`]. Cross references are stored as [`ObjectId`]s and are only
//! ever written by the connection resolver.

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Document-assigned 64-bit identity.
pub type ObjectId = i64;

/// Default light radius when no `DecayStart` property is present.
pub const DEFAULT_LIGHT_RADIUS: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Geometry,
    Model,
    Material,
    Texture,
    Light,
    AnimationCurve,
    AnimationCurveNode,
    Deformer,
    SubDeformer,
}

#[derive(Debug, Clone)]
pub enum Component {
    Geometry(Geometry),
    Model(Model),
    Material(Material),
    Texture(Texture),
    Light(Light),
    AnimationCurve(AnimationCurve),
    AnimationCurveNode(AnimationCurveNode),
    Deformer(Deformer),
    SubDeformer(SubDeformer),
}

impl Component {
    #[must_use]
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Geometry(_) => ComponentKind::Geometry,
            Component::Model(_) => ComponentKind::Model,
            Component::Material(_) => ComponentKind::Material,
            Component::Texture(_) => ComponentKind::Texture,
            Component::Light(_) => ComponentKind::Light,
            Component::AnimationCurve(_) => ComponentKind::AnimationCurve,
            Component::AnimationCurveNode(_) => ComponentKind::AnimationCurveNode,
            Component::Deformer(_) => ComponentKind::Deformer,
            Component::SubDeformer(_) => ComponentKind::SubDeformer,
        }
    }
}

// ============================================================================
// Layer elements
// ============================================================================

/// How an attribute array is addressed relative to the polygon stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mapping {
    ByPolygon,
    ByPolygonVertex,
    ByVertex,
    ByEdge,
    AllSame,
    #[default]
    Unknown,
}

impl Mapping {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "ByPolygon" => Mapping::ByPolygon,
            "ByPolygonVertex" => Mapping::ByPolygonVertex,
            "ByVertex" | "ByVertice" => Mapping::ByVertex,
            "ByEdge" => Mapping::ByEdge,
            "AllSame" => Mapping::AllSame,
            _ => Mapping::Unknown,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Mapping::ByPolygon => "ByPolygon",
            Mapping::ByPolygonVertex => "ByPolygonVertex",
            Mapping::ByVertex => "ByVertex",
            Mapping::ByEdge => "ByEdge",
            Mapping::AllSame => "AllSame",
            Mapping::Unknown => "Unknown",
        }
    }
}

/// Whether an attribute array is read directly or through an index array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reference {
    #[default]
    Direct,
    IndexToDirect,
}

impl Reference {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "IndexToDirect" | "Index" => Reference::IndexToDirect,
            _ => Reference::Direct,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Reference::Direct => "Direct",
            Reference::IndexToDirect => "IndexToDirect",
        }
    }
}

/// One per-geometry attribute layer (`LayerElementNormal`, `LayerElementUV`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerElement<T> {
    pub data: Vec<T>,
    /// Only filled for [`Reference::IndexToDirect`].
    pub index: Vec<i32>,
    pub mapping: Mapping,
    pub reference: Reference,
}

impl<T> LayerElement<T> {
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.data.is_empty()
    }
}

// ============================================================================
// Component payloads
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Geometry {
    pub vertices: Vec<Vec3>,
    /// Raw `PolygonVertexIndex`; the last index of each polygon is stored as `!index`.
    pub indices: Vec<i32>,
    pub normals: LayerElement<Vec3>,
    pub tangents: LayerElement<Vec3>,
    pub binormals: LayerElement<Vec3>,
    pub uvs: LayerElement<Vec2>,
    pub materials: LayerElement<i32>,
    pub deformers: Vec<ObjectId>,
}

/// Local transform decomposition of a model, in document units and Euler degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    pub pre_rotation: Vec3,
    pub post_rotation: Vec3,
    pub rotation_offset: Vec3,
    pub rotation_pivot: Vec3,
    pub scaling_offset: Vec3,
    pub scaling_pivot: Vec3,
}

impl Default for ModelTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            pre_rotation: Vec3::ZERO,
            post_rotation: Vec3::ZERO,
            rotation_offset: Vec3::ZERO,
            rotation_pivot: Vec3::ZERO,
            scaling_offset: Vec3::ZERO,
            scaling_pivot: Vec3::ZERO,
        }
    }
}

/// Transform baked into vertex data; never inherited by children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricTransform {
    pub translation: Vec3,
    /// Euler degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for GeometricTransform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub transform: ModelTransform,
    pub geometric: GeometricTransform,
    pub geometries: Vec<ObjectId>,
    pub materials: Vec<ObjectId>,
    pub curve_nodes: Vec<ObjectId>,
    pub children: Vec<ObjectId>,
    pub light: Option<ObjectId>,
    /// Deformers connected to the model itself, moved onto its first geometry
    /// once every connection is applied.
    pub(crate) pending_deformers: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct Material {
    pub diffuse_texture: Option<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct Texture {
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct Light {
    pub color: Vec4,
    pub radius: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            radius: DEFAULT_LIGHT_RADIUS,
        }
    }
}

/// Ordered `(seconds, value)` keys.
#[derive(Debug, Clone, Default)]
pub struct AnimationCurve {
    pub keys: Vec<CurveKey>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

impl AnimationCurve {
    /// Linear interpolation between the bracketing keys, clamped to the end keys.
    #[must_use]
    pub fn evaluate(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            log::warn!("FBX: evaluating an animation curve with no keys");
            return 0.0;
        };

        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // First key strictly after `time`; the bounds above keep it in 1..len.
        let next = self.keys.partition_point(|k| k.time <= time);
        let (a, b) = (self.keys[next - 1], self.keys[next]);
        let span = b.time - a.time;
        if span <= 0.0 {
            return b.value;
        }
        let k = (time - a.time) / span;
        a.value + (b.value - a.value) * k
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CurveNodeKind {
    Translation,
    Rotation,
    Scale,
    #[default]
    Unknown,
}

impl CurveNodeKind {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.strip_prefix("AnimCurveNode::").unwrap_or(s) {
            "T" => CurveNodeKind::Translation,
            "R" => CurveNodeKind::Rotation,
            "S" => CurveNodeKind::Scale,
            _ => CurveNodeKind::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnimationCurveNode {
    pub kind: CurveNodeKind,
    /// Assumed ordered X, Y, Z.
    pub curves: Vec<ObjectId>,
}

#[derive(Debug, Clone, Default)]
pub struct Deformer {
    pub sub_deformers: Vec<ObjectId>,
}

#[derive(Debug, Clone)]
pub struct SubDeformer {
    pub indices: Vec<i32>,
    pub weights: Vec<f32>,
    pub transform: Mat4,
    pub transform_link: Mat4,
    pub model: Option<ObjectId>,
}
