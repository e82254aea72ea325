// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reference graph between nodes.
//!
//! Embedding is by handle: a geometry holds its material's handle, a
//! material holds its texture's. The graph is acyclic because a handle only
//! exists once its construction has finished.

use crate::error::{Result, SceneError};
use crate::node::{AttributeSet, NodeId};
use crate::scene::Scene;
use crate::types::{NodeKind, NodeType};
use crate::value::{AttrType, AttrValue};
use std::collections::HashSet;

impl Scene {
    /// Validate the handles a node under construction embeds
    pub(crate) fn check_embedding(
        &self,
        owner: NodeId,
        kind: NodeKind,
        attrs: &AttributeSet,
    ) -> Result<()> {
        for (attribute, target) in attrs.handles() {
            // A handle still being built cannot be embedded
            if target == owner || self.is_pending(target) {
                return Err(cyclic(kind, attribute, target));
            }
            self.check_handle(kind, attribute, target)?;
            if self.embeds(target, owner) {
                return Err(cyclic(kind, attribute, target));
            }
        }
        Ok(())
    }

    /// Validate a handle given as an ambient default
    pub(crate) fn check_ambient_handle(
        &self,
        kind: NodeKind,
        attribute: &str,
        value: &AttrValue,
    ) -> Result<()> {
        match value {
            AttrValue::Handle(target) => {
                if self.is_pending(*target) {
                    return Err(cyclic(kind, attribute, *target));
                }
                self.check_handle(kind, attribute, *target)
            }
            _ => Ok(()),
        }
    }

    fn check_handle(&self, kind: NodeKind, attribute: &str, target: NodeId) -> Result<()> {
        let node = self.lookup(target)?;
        if let Some(AttrType::Handle(category)) =
            kind.schema().get(attribute).map(|slot| slot.attr_type)
        {
            if node.category() != category {
                return Err(SceneError::TypeMismatch {
                    node_type: kind.type_name().to_string(),
                    name: attribute.to_string(),
                    expected: AttrType::Handle(category).to_string(),
                    found: format!("{:?} handle", node.category()),
                });
            }
        }
        Ok(())
    }

    /// Check if `from` reaches `to` through embedded handles
    fn embeds(&self, from: NodeId, to: NodeId) -> bool {
        let mut stack = vec![from];
        let mut visited = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == to {
                return true;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.embedded().map(|(_, target)| target));
            }
        }
        false
    }

    /// Live nodes that embed the given handle
    pub fn users_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes()
            .filter(|node| node.embedded().any(|(_, target)| target == id))
            .map(|node| node.id())
            .collect()
    }

    /// Every node a renderer needs, embedded ones before their users
    ///
    /// Walks from the registered nodes in registration order. Embedded
    /// nodes that were removed are still included, since their users keep
    /// referring to them.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        for node in self.all() {
            self.visit(node.id(), &mut visited, &mut order);
        }
        order
    }

    fn visit(&self, id: NodeId, visited: &mut HashSet<NodeId>, order: &mut Vec<NodeId>) {
        if !visited.insert(id) {
            return;
        }
        if let Some((node, _)) = self.follow(id) {
            for (_, target) in node.embedded() {
                self.visit(target, visited, order);
            }
        }
        order.push(id);
    }
}

fn cyclic(kind: NodeKind, attribute: &str, target: NodeId) -> SceneError {
    SceneError::CyclicEmbedding {
        node_type: kind.type_name().to_string(),
        attribute: attribute.to_string(),
        target,
    }
}
