//! Error Types
//!
//! This module defines the error types used throughout the importer.
//!
//! # Overview
//!
//! The main error type [`FbxError`] covers every failure mode of a load:
//! - I/O and low-level decoding failures (binary records, ASCII grammar)
//! - Document validation failures (version floor, missing nodes, bad shapes)
//! - Conversion failures (unsupported mapping modes, degenerate polygons)
//!
//! Each variant belongs to one [`ErrorKind`], and each kind has exactly one
//! [`Recovery`] policy. Call sites never decide on their own whether an error
//! is fatal: they ask [`FbxError::recovery`] and either log and continue or
//! propagate with `?`.
//!
//! ```rust,ignore
//! use fbx_importer::errors::{FbxError, Recovery, Result};
//!
//! fn step(err: FbxError) -> Result<()> {
//!     match err.recovery() {
//!         Recovery::Abort => Err(err),
//!         _ => {
//!             log::warn!("FBX: {err}");
//!             Ok(())
//!         }
//!     }
//! }
//! ```

use thiserror::Error;

/// The main error type for the importer.
#[derive(Error, Debug)]
pub enum FbxError {
    // ========================================================================
    // I/O & Decoding Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The binary record stream is truncated or uses an unknown encoding.
    #[error("Invalid binary FBX data at offset {offset}: {message}")]
    InvalidBinary {
        /// Byte offset where decoding failed
        offset: u64,
        /// What went wrong
        message: String,
    },

    /// The ASCII text does not follow the record grammar.
    #[error("ASCII FBX syntax error at line {line}: {message}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    // ========================================================================
    // Document Errors
    // ========================================================================
    /// The document version is below the supported floor.
    #[error("Unsupported FBX version {version}, version must be >= {minimum}")]
    UnsupportedVersion {
        /// Version found in `FBXHeaderExtension/FBXVersion`
        version: i32,
        /// Lowest accepted version
        minimum: i32,
    },

    /// A required child node or attribute is missing or has the wrong type.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// A sub-deformer transform array does not hold exactly 16 floats.
    #[error("Deformer {id}: {field} must contain 16 floats, got {len}")]
    MalformedTransform {
        /// Identity of the sub-deformer
        id: i64,
        /// `Transform` or `TransformLink`
        field: &'static str,
        /// Actual length
        len: usize,
    },

    /// An animation curve lacks `KeyTime` or `KeyValueFloat`.
    #[error("Animation curve {id}: KeyTime or KeyValueFloat is missing")]
    MissingCurveData {
        /// Identity of the curve
        id: i64,
    },

    /// An animation curve has different time and value counts.
    #[error("Animation curve {id}: {times} key times but {values} key values")]
    CurveKeyMismatch {
        /// Identity of the curve
        id: i64,
        /// Length of `KeyTime/a`
        times: usize,
        /// Length of `KeyValueFloat/a`
        values: usize,
    },

    /// An attribute array is too short for the index used to address it.
    #[error("{context}: index {index} out of bounds (length {len})")]
    ShapeMismatch {
        /// Description of what was being accessed
        context: String,
        /// The invalid index
        index: usize,
        /// Length of the addressed array
        len: usize,
    },

    // ========================================================================
    // Conversion Errors
    // ========================================================================
    /// A normal/UV/material layer uses a mode the converter does not implement.
    #[error("{attribute} mapping {mapping} with reference {reference} is not supported")]
    UnsupportedMapping {
        /// `normal`, `uv` or `material`
        attribute: &'static str,
        /// Mapping mode name
        mapping: String,
        /// Reference mode name
        reference: String,
    },

    /// A connection names an identity that was never materialized.
    #[error("Connection {child} -> {parent} references an unknown object")]
    DanglingConnection {
        /// Child identity
        child: i64,
        /// Parent identity
        parent: i64,
    },

    /// A polygon could not be turned into triangles.
    #[error("Polygon at index {start} skipped: {reason}")]
    DegeneratePolygon {
        /// Offset of the polygon's first index in `PolygonVertexIndex`
        start: usize,
        /// What made the polygon unusable
        reason: String,
    },
}

/// The error taxonomy every [`FbxError`] variant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Syntax,
    UnsupportedVersion,
    MalformedDocument,
    ShapeMismatch,
    UnsupportedMapping,
    DanglingConnection,
    DegeneratePolygon,
}

/// What the importer does when an error of a given kind occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recovery {
    /// Abort the whole load; nothing is attached to the scene.
    Abort,
    /// Drop the single offending connection and keep wiring.
    SkipConnection,
    /// Drop the single offending polygon and keep building the mesh.
    SkipPolygon,
}

impl ErrorKind {
    /// The policy table. This is the only place that decides fatality.
    #[must_use]
    pub fn recovery(self) -> Recovery {
        match self {
            ErrorKind::DanglingConnection => Recovery::SkipConnection,
            ErrorKind::DegeneratePolygon => Recovery::SkipPolygon,
            ErrorKind::Io
            | ErrorKind::Syntax
            | ErrorKind::UnsupportedVersion
            | ErrorKind::MalformedDocument
            | ErrorKind::ShapeMismatch
            | ErrorKind::UnsupportedMapping => Recovery::Abort,
        }
    }
}

impl FbxError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            FbxError::Io(_) => ErrorKind::Io,
            FbxError::InvalidBinary { .. } | FbxError::Syntax { .. } => ErrorKind::Syntax,
            FbxError::UnsupportedVersion { .. } => ErrorKind::UnsupportedVersion,
            FbxError::MalformedDocument(_) | FbxError::MissingCurveData { .. } => {
                ErrorKind::MalformedDocument
            }
            FbxError::MalformedTransform { .. }
            | FbxError::CurveKeyMismatch { .. }
            | FbxError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            FbxError::UnsupportedMapping { .. } => ErrorKind::UnsupportedMapping,
            FbxError::DanglingConnection { .. } => ErrorKind::DanglingConnection,
            FbxError::DegeneratePolygon { .. } => ErrorKind::DegeneratePolygon,
        }
    }

    #[inline]
    #[must_use]
    pub fn recovery(&self) -> Recovery {
        self.kind().recovery()
    }

    /// Applies the policy table: recoverable errors are logged and swallowed,
    /// fatal ones are handed back to the caller.
    ///
    /// Skipped connections are logged at debug level; documents routinely
    /// reference objects that are never materialized.
    pub fn recover(self) -> Result<()> {
        match self.recovery() {
            Recovery::Abort => Err(self),
            Recovery::SkipConnection => {
                log::debug!("FBX: {self}");
                Ok(())
            }
            Recovery::SkipPolygon => {
                log::warn!("FBX: {self}");
                Ok(())
            }
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FbxError::MalformedDocument(message.into())
    }
}

/// Alias for `Result<T, FbxError>`.
pub type Result<T> = std::result::Result<T, FbxError>;
