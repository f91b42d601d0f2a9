#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! FBX importer
//!
//! Loads binary and ASCII FBX documents into a slotmap scene graph:
//!
//! 1. [`tree`] decodes either syntax into a generic attributed tree.
//! 2. [`document`] builds typed components and wires the connection table.
//! 3. [`convert`] triangulates and welds geometry, samples animation and
//!    stages everything in a detached [`Prefab`].
//! 4. [`Scene::instantiate`] attaches the prefab in one step.
//!
//! [`FbxLoader`] runs the whole pipeline.

pub mod animation;
pub mod assets;
pub mod convert;
pub mod document;
pub mod errors;
pub mod scene;
pub mod settings;
pub mod tree;

pub use animation::{Animation, Keyframe, Track};
pub use assets::{FbxLoader, Prefab};
pub use document::Document;
pub use errors::{ErrorKind, FbxError, Recovery, Result};
pub use scene::{Light, Mesh, Node, NodeHandle, NodeKind, Scene, Transform};
pub use settings::ImportSettings;
