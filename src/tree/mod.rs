//! Generic attributed tree
//!
//! Both surface syntaxes decode into the same shape: named elements carrying
//! an ordered list of untyped attributes and an ordered list of children.
//! Everything above this module reads documents only through
//! [`Element::find_child`], the typed `get_*` accessors and [`Element::len`].
//!
//! - [`binary`]: length-prefixed records (`Kaydara FBX Binary`)
//! - [`ascii`]: the textual `Name: attr, ... { }` grammar

pub mod ascii;
pub mod binary;

use crate::errors::{FbxError, Result};

/// Deepest element nesting either decoder accepts.
pub const MAX_DEPTH: usize = 256;

/// First bytes of every binary document.
pub const BINARY_MAGIC: &[u8; 18] = b"Kaydara FBX Binary";

/// Returns true when `bytes` starts with the binary magic string.
#[inline]
#[must_use]
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.len() >= BINARY_MAGIC.len() && &bytes[..BINARY_MAGIC.len()] == BINARY_MAGIC
}

/// Decodes either syntax, chosen by sniffing the magic string.
pub fn decode(bytes: &[u8]) -> Result<Element> {
    if is_binary(bytes) {
        binary::decode(bytes)
    } else {
        let text = std::str::from_utf8(bytes).map_err(|e| FbxError::Syntax {
            line: line_of_offset(bytes, e.valid_up_to()),
            message: "document is neither binary nor valid UTF-8 text".to_string(),
        })?;
        ascii::parse(text)
    }
}

fn line_of_offset(bytes: &[u8], offset: usize) -> usize {
    bytes[..offset].iter().filter(|&&b| b == b'\n').count() + 1
}

/// A single untyped attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Raw(Vec<u8>),
    BoolArray(Vec<bool>),
    I32Array(Vec<i32>),
    I64Array(Vec<i64>),
    F32Array(Vec<f32>),
    F64Array(Vec<f64>),
}

impl Attribute {
    fn is_array(&self) -> bool {
        matches!(
            self,
            Attribute::BoolArray(_)
                | Attribute::I32Array(_)
                | Attribute::I64Array(_)
                | Attribute::F32Array(_)
                | Attribute::F64Array(_)
        )
    }

    fn array_len(&self) -> usize {
        match self {
            Attribute::BoolArray(v) => v.len(),
            Attribute::I32Array(v) => v.len(),
            Attribute::I64Array(v) => v.len(),
            Attribute::F32Array(v) => v.len(),
            Attribute::F64Array(v) => v.len(),
            _ => 1,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Attribute::Bool(_) => "bool",
            Attribute::I16(_) => "i16",
            Attribute::I32(_) => "i32",
            Attribute::I64(_) => "i64",
            Attribute::F32(_) => "f32",
            Attribute::F64(_) => "f64",
            Attribute::String(_) => "string",
            Attribute::Raw(_) => "raw",
            Attribute::BoolArray(_) => "bool[]",
            Attribute::I32Array(_) => "i32[]",
            Attribute::I64Array(_) => "i64[]",
            Attribute::F32Array(_) => "f32[]",
            Attribute::F64Array(_) => "f64[]",
        }
    }
}

/// A numeric value pulled out of an attribute, before width conversion.
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_i64(self) -> i64 {
        match self {
            Number::Int(v) => v,
            Number::Float(v) => v as i64,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }
}

/// One node of the generic tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
}

impl Element {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// First direct child named `name`.
    #[must_use]
    pub fn find_child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Like [`Element::find_child`], but a missing child is a malformed document.
    pub fn child(&self, name: &str) -> Result<&Element> {
        self.find_child(name).ok_or_else(|| {
            FbxError::malformed(format!("'{}' has no '{}' child", self.name, name))
        })
    }

    /// Shortcut for the `Name/a` array layout used by every bulk array.
    pub fn array_child(&self, name: &str) -> Result<&Element> {
        self.child(name)?.child("a")
    }

    /// Returns the single array attribute when that is all this element holds.
    fn single_array(&self) -> Option<&Attribute> {
        match self.attributes.as_slice() {
            [only] if only.is_array() => Some(only),
            _ => None,
        }
    }

    /// Attribute array length: the length of the single array attribute, or
    /// the number of scalar attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self.single_array() {
            Some(array) => array.array_len(),
            None => self.attributes.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn out_of_bounds(&self, index: usize) -> FbxError {
        FbxError::ShapeMismatch {
            context: format!("attributes of '{}'", self.name),
            index,
            len: self.len(),
        }
    }

    fn number(&self, index: usize) -> Result<Number> {
        if let Some(array) = self.single_array() {
            let value = match array {
                Attribute::BoolArray(v) => v.get(index).map(|&b| Number::Int(i64::from(b))),
                Attribute::I32Array(v) => v.get(index).map(|&x| Number::Int(i64::from(x))),
                Attribute::I64Array(v) => v.get(index).map(|&x| Number::Int(x)),
                Attribute::F32Array(v) => v.get(index).map(|&x| Number::Float(f64::from(x))),
                Attribute::F64Array(v) => v.get(index).map(|&x| Number::Float(x)),
                _ => None,
            };
            return value.ok_or_else(|| self.out_of_bounds(index));
        }

        let attribute = self
            .attributes
            .get(index)
            .ok_or_else(|| self.out_of_bounds(index))?;

        match attribute {
            Attribute::Bool(b) => Ok(Number::Int(i64::from(*b))),
            Attribute::I16(v) => Ok(Number::Int(i64::from(*v))),
            Attribute::I32(v) => Ok(Number::Int(i64::from(*v))),
            Attribute::I64(v) => Ok(Number::Int(*v)),
            Attribute::F32(v) => Ok(Number::Float(f64::from(*v))),
            Attribute::F64(v) => Ok(Number::Float(*v)),
            other => Err(FbxError::malformed(format!(
                "attribute {index} of '{}' is {}, expected a number",
                self.name,
                other.type_name()
            ))),
        }
    }

    /// Values outside the `i32` range are rejected, never wrapped.
    pub fn get_i32(&self, index: usize) -> Result<i32> {
        let value = self.number(index)?.as_i64();
        i32::try_from(value).map_err(|_| {
            FbxError::malformed(format!(
                "attribute {index} of '{}' is {value}, out of range for i32",
                self.name
            ))
        })
    }

    pub fn get_i64(&self, index: usize) -> Result<i64> {
        Ok(self.number(index)?.as_i64())
    }

    pub fn get_f32(&self, index: usize) -> Result<f32> {
        Ok(self.number(index)?.as_f64() as f32)
    }

    pub fn get_f64(&self, index: usize) -> Result<f64> {
        Ok(self.number(index)?.as_f64())
    }

    pub fn get_str(&self, index: usize) -> Result<&str> {
        match self.attributes.get(index) {
            Some(Attribute::String(s)) => Ok(s.as_str()),
            Some(other) => Err(FbxError::malformed(format!(
                "attribute {index} of '{}' is {}, expected a string",
                self.name,
                other.type_name()
            ))),
            None => Err(self.out_of_bounds(index)),
        }
    }

    /// Reads three consecutive floats starting at `index`.
    pub fn get_vec3(&self, index: usize) -> Result<glam::Vec3> {
        Ok(glam::Vec3::new(
            self.get_f32(index)?,
            self.get_f32(index + 1)?,
            self.get_f32(index + 2)?,
        ))
    }

    /// Collects the whole attribute array as `i32`.
    pub fn to_i32_vec(&self) -> Result<Vec<i32>> {
        if let Some(Attribute::I32Array(v)) = self.single_array() {
            return Ok(v.clone());
        }
        (0..self.len()).map(|i| self.get_i32(i)).collect()
    }

    /// Collects the whole attribute array as `f32`.
    pub fn to_f32_vec(&self) -> Result<Vec<f32>> {
        if let Some(Attribute::F32Array(v)) = self.single_array() {
            return Ok(v.clone());
        }
        (0..self.len()).map(|i| self.get_f32(i)).collect()
    }

    /// Collects the whole attribute array as packed `Vec3`s; a trailing
    /// partial triple is dropped.
    pub fn to_vec3_vec(&self) -> Result<Vec<glam::Vec3>> {
        (0..self.len() / 3).map(|i| self.get_vec3(i * 3)).collect()
    }

    /// Collects the whole attribute array as packed `Vec2`s.
    pub fn to_vec2_vec(&self) -> Result<Vec<glam::Vec2>> {
        (0..self.len() / 2)
            .map(|i| Ok(glam::Vec2::new(self.get_f32(i * 2)?, self.get_f32(i * 2 + 1)?)))
            .collect()
    }
}
