// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the scene.

use crate::types::{NodeCategory, NodeKind, NodeType};
use crate::value::{Args, AttrValue};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable handle to a constructed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Lifecycle state of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeState {
    /// Constructed and live
    Constructed,
    /// Explicitly removed; outstanding handles still resolve tolerantly
    Removed,
}

/// Finalized attributes of a node, in schema order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet(IndexMap<String, AttrValue>);

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: &str, value: AttrValue) {
        self.0.insert(name.to_string(), value);
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut AttrValue> {
        self.0.get_mut(name)
    }

    /// Get an attribute value
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    /// Check if an attribute is set
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterate over attributes in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the set is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Boolean attribute
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttrValue::as_bool)
    }

    /// Integer attribute
    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_int)
    }

    /// Float attribute
    pub fn float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(AttrValue::as_float)
    }

    /// Vector attribute
    pub fn vector3(&self, name: &str) -> Option<[f32; 3]> {
        self.get(name).and_then(AttrValue::as_vector3)
    }

    /// Color attribute
    pub fn color(&self, name: &str) -> Option<[f32; 4]> {
        self.get(name).and_then(AttrValue::as_color)
    }

    /// Rotation attribute
    pub fn rotation(&self, name: &str) -> Option<[[f32; 3]; 3]> {
        self.get(name).and_then(AttrValue::as_rotation)
    }

    /// String or choice attribute
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    /// Handle attribute
    pub fn handle(&self, name: &str) -> Option<NodeId> {
        self.get(name).and_then(AttrValue::as_handle)
    }

    /// Handle-valued attributes (embedded nodes)
    pub fn handles(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.iter()
            .filter_map(|(name, value)| value.as_handle().map(|id| (name, id)))
    }
}

/// A constructed scene node
///
/// Nodes are immutable once constructed; the scene hands them out behind
/// `Arc` so that embedding is plain reference sharing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    name: Option<String>,
    attributes: AttributeSet,
    /// Keyword arguments of the call that built this node
    #[serde(skip)]
    origin: Args,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        kind: NodeKind,
        name: Option<String>,
        attributes: AttributeSet,
        origin: Args,
    ) -> Self {
        Self {
            id,
            kind,
            name,
            attributes,
            origin,
        }
    }

    /// Node handle
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node type
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Node type name as used by authoring calls
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Node category
    pub fn category(&self) -> NodeCategory {
        self.kind.category()
    }

    /// Optional, non-unique name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Finalized attributes
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Get one attribute value
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Keyword arguments of the originating call
    pub fn origin(&self) -> &Args {
        &self.origin
    }

    /// Embedded handles as (attribute, handle) pairs
    pub fn embedded(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.attributes.handles()
    }

    /// Embedded material handle (geometry, archives)
    pub fn material(&self) -> Option<NodeId> {
        self.attributes.handle("material")
    }

    /// Embedded texture handle (materials)
    pub fn texture(&self) -> Option<NodeId> {
        self.attributes.handle("texture")
    }

    pub(crate) fn attach(&mut self, name: &str, value: AttrValue) {
        self.attributes.insert(name, value);
    }
}
