// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene shared between an authoring thread and readers.
//!
//! Authoring takes the write lock for one batch of calls; readers take
//! snapshots of the registry, which are plain `Arc<Node>` lists and stay
//! valid whatever the author does next.

use crate::node::Node;
use crate::scene::Scene;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe handle to a scene
#[derive(Debug, Clone)]
pub struct SharedScene {
    inner: Arc<RwLock<Scene>>,
}

impl SharedScene {
    /// Wrap a scene
    pub fn new(scene: Scene) -> Self {
        Self {
            inner: Arc::new(RwLock::new(scene)),
        }
    }

    /// Run a batch of authoring calls under the write lock
    pub fn author<R>(&self, f: impl FnOnce(&mut Scene) -> R) -> R {
        let mut scene = self.inner.write();
        f(&mut scene)
    }

    /// Inspect the scene under the read lock
    pub fn read<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
        let scene = self.inner.read();
        f(&scene)
    }

    /// Registered nodes at this instant, in registration order
    pub fn snapshot(&self) -> Vec<Arc<Node>> {
        self.inner.read().all_shared()
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl From<Scene> for SharedScene {
    fn from(scene: Scene) -> Self {
        Self::new(scene)
    }
}
