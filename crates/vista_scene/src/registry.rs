// SPDX-License-Identifier: MIT OR Apache-2.0
//! Renderer-visible node registry.
//!
//! An append-only sequence: registration order is construction order of the
//! self-registering calls, removal leaves a tombstone so that neither the
//! order nor the remaining handles ever shift.

use crate::error::{Result, SceneError};
use crate::node::{Node, NodeId};
use indexmap::IndexMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Entry {
    node: Arc<Node>,
    live: bool,
}

/// Ordered collection of registered nodes
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: IndexMap<NodeId, Entry>,
    live: usize,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its handle
    ///
    /// Registering a node that is already live is a no-op; a tombstoned
    /// handle cannot be registered again.
    pub fn register(&mut self, node: Arc<Node>) -> Result<NodeId> {
        let id = node.id();
        match self.entries.get(&id) {
            Some(entry) if entry.live => Ok(id),
            Some(_) => Err(SceneError::NotFound(id)),
            None => {
                self.entries.insert(id, Entry { node, live: true });
                self.live += 1;
                Ok(id)
            }
        }
    }

    /// Get a live registered node
    pub fn lookup(&self, id: NodeId) -> Result<&Arc<Node>> {
        match self.entries.get(&id) {
            Some(entry) if entry.live => Ok(&entry.node),
            _ => Err(SceneError::NotFound(id)),
        }
    }

    /// Tombstone a registered node
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        match self.entries.get_mut(&id) {
            Some(entry) if entry.live => {
                entry.live = false;
                self.live -= 1;
                Ok(())
            }
            _ => Err(SceneError::NotFound(id)),
        }
    }

    /// Check if a handle is registered and live
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.get(&id).is_some_and(|entry| entry.live)
    }

    /// Live nodes in registration order
    pub fn all(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.entries
            .values()
            .filter(|entry| entry.live)
            .map(|entry| &entry.node)
    }

    /// Position of a live node in `all()`
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.all().position(|node| node.id() == id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.live
    }

    /// Check if no live node is registered
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of tombstoned entries
    pub fn removed_count(&self) -> usize {
        self.entries.len() - self.live
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.live = 0;
    }
}
