// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for scene construction.
//!
//! Every error aborts exactly one construction call. The scene is left as it
//! was before the call; nothing is half-registered.

use crate::node::NodeId;
use thiserror::Error;

/// Error raised by a construction or registry call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// Caller supplied an attribute the node type does not declare
    #[error("{node_type} has no attribute named `{name}`")]
    UnknownAttribute {
        /// Node type (or `default` for ambient defaults)
        node_type: String,
        /// Offending attribute name
        name: String,
    },

    /// Value cannot be normalized to the slot's shape
    #[error("{node_type}.{name}: expected {expected}, got {found}")]
    TypeMismatch {
        /// Node type
        node_type: String,
        /// Attribute name
        name: String,
        /// Shape the slot accepts
        expected: String,
        /// Shape that was supplied
        found: String,
    },

    /// Orientation cannot be derived (position equals target, zero direction)
    #[error("{node_type}: cannot derive an orientation from `{attribute}`")]
    DegenerateOrientation {
        /// Node type
        node_type: String,
        /// Attribute the orientation was derived from
        attribute: String,
    },

    /// Handle is unknown to this scene or has been removed
    #[error("Node not found: {0}")]
    NotFound(NodeId),

    /// Embedding would make a node refer back to itself
    #[error("{node_type}.{attribute} embeds {target}, which is not yet constructed")]
    CyclicEmbedding {
        /// Node type under construction
        node_type: String,
        /// Attribute carrying the handle
        attribute: String,
        /// Handle that closes the cycle
        target: NodeId,
    },

    /// Authoring named a node type the catalog does not know
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// Attributes are fixed once a node is constructed
    #[error("Node {id} is immutable; `{attribute}` cannot be changed after construction")]
    Immutable {
        /// Node that was targeted
        id: NodeId,
        /// Attribute the caller tried to change
        attribute: String,
    },
}

/// Result type for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
