// SPDX-License-Identifier: MIT OR Apache-2.0
//! Serializable view of a scene for renderers and tooling.

use crate::node::{Node, NodeId, NodeState};
use crate::scene::Scene;
use serde::{Deserialize, Serialize};

/// Registered nodes plus every node they embed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Scene name
    pub scene: String,
    /// Registered nodes in registration order
    pub nodes: Vec<Node>,
    /// Embedded nodes, each before its first user
    pub embedded: Vec<Node>,
    /// Embedded handles whose node has since been removed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub detached: Vec<NodeId>,
}

impl SceneSnapshot {
    /// Capture the current state of a scene
    pub fn capture(scene: &Scene) -> Self {
        let nodes = scene.all().cloned().collect();
        let mut embedded = Vec::new();
        let mut detached = Vec::new();

        for id in scene.reachable() {
            if scene.registry().contains(id) {
                continue;
            }
            if let Some((node, state)) = scene.follow(id) {
                embedded.push(node.clone());
                if state == NodeState::Removed {
                    detached.push(id);
                }
            }
        }

        Self {
            scene: scene.name().to_string(),
            nodes,
            embedded,
            detached,
        }
    }

    /// Find a node by handle in either list
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes
            .iter()
            .chain(&self.embedded)
            .find(|node| node.id() == id)
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

impl Scene {
    /// Capture a serializable snapshot
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::capture(self)
    }
}
