// SPDX-License-Identifier: MIT OR Apache-2.0
//! Declarative scene construction runtime for Vista.
//!
//! Authoring is a sequence of constructor-style calls. Each call names a
//! node type and passes keyword attributes; the runtime turns that sequence
//! into one consistent scene:
//! - Cameras, lights, geometry and archives register themselves in order
//! - Materials and textures are embeddable handles shared by reference
//! - Attribute defaults come from the type schema and from ambient defaults
//!
//! ## Architecture
//!
//! The runtime is built on:
//! - Schema tables per node type (typed slots with defaults)
//! - An attribute resolver with shape normalization
//! - An append-only registry with tombstones
//! - Handle-based embedding with cycle guards

pub mod error;
pub mod value;
pub mod schema;
pub mod node;
pub mod resolve;
pub mod registry;
pub mod scene;
pub mod embedding;
pub mod shared;
pub mod snapshot;
pub mod types;
mod math;

pub use error::{Result, SceneError};
pub use value::{Args, ArgValue, AttrType, AttrValue};
pub use schema::{Schema, Slot};
pub use node::{AttributeSet, Node, NodeId, NodeState};
pub use resolve::{AmbientDefaults, Resolved};
pub use registry::Registry;
pub use scene::{Construction, Scene};
pub use shared::SharedScene;
pub use snapshot::SceneSnapshot;
pub use types::{GeometryKind, LightKind, NodeCategory, NodeKind, NodeType, TypeCatalog};
