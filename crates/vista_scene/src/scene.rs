// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene context: the target of every construction call.
//!
//! A scene owns every constructed node (registered or embedded), the
//! registry the renderer consumes, and the ambient defaults in effect.
//! Scenes are explicit values; several can coexist in one process.

use crate::error::{Result, SceneError};
use crate::node::{Node, NodeId, NodeState};
use crate::registry::Registry;
use crate::resolve::{self, AmbientDefaults};
use crate::types::material::DEFAULT_MATERIAL_NAME;
use crate::types::{GeometryKind, LightKind, NodeCategory, NodeKind, NodeType, TypeCatalog};
use crate::value::{ArgValue, AttrValue, Args};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

/// A construction call that has been started but not finished
///
/// The handle is reserved up front so that authoring code can learn it
/// before the node exists. Passing it to another construction before
/// `Scene::finish` is a cyclic embedding. Once the construction is dropped
/// without being finished, the handle is unknown to the scene.
#[derive(Debug)]
#[must_use = "nothing is constructed until the construction is passed to `Scene::finish`"]
pub struct Construction {
    id: NodeId,
    kind: NodeKind,
    args: Args,
    register: bool,
    _live: Arc<()>,
}

impl Construction {
    /// Reserved handle
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Node type being constructed
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Add one keyword argument
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.args.set(name, value);
        self
    }

    /// Add several keyword arguments
    pub fn args(mut self, args: Args) -> Self {
        self.args = self.args.merged(args);
        self
    }

    /// Also list the node in the registry (for embeddable types)
    pub fn registered(mut self) -> Self {
        self.register = true;
        self
    }
}

/// A scene under construction
#[derive(Debug)]
pub struct Scene {
    name: String,
    catalog: TypeCatalog,
    /// Every constructed node, in construction order
    pub(crate) nodes: IndexMap<NodeId, Arc<Node>>,
    pub(crate) removed: HashSet<NodeId>,
    /// Handles reserved by unfinished constructions
    pending: HashMap<NodeId, Weak<()>>,
    registry: Registry,
    ambient: AmbientDefaults,
    default_material: Option<NodeId>,
}

impl Scene {
    /// Create an empty scene with the built-in node types
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_catalog(name, TypeCatalog::standard())
    }

    /// Create an empty scene with a custom type catalog
    pub fn with_catalog(name: impl Into<String>, catalog: TypeCatalog) -> Self {
        let name = name.into();
        tracing::info!(scene = %name, types = catalog.len(), "created scene");
        Self {
            name,
            catalog,
            nodes: IndexMap::new(),
            removed: HashSet::new(),
            pending: HashMap::new(),
            registry: Registry::new(),
            ambient: AmbientDefaults::new(),
            default_material: None,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node types available to `add`
    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Ambient defaults in effect
    pub fn ambient(&self) -> &AmbientDefaults {
        &self.ambient
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Construct a node by type name
    pub fn add(&mut self, type_name: &str, args: Args) -> Result<NodeId> {
        let kind = self.catalog.require(type_name)?;
        self.add_kind(kind, args)
    }

    /// Construct a node of a known type
    pub fn add_kind(&mut self, kind: NodeKind, args: Args) -> Result<NodeId> {
        let construction = self.begin(kind).args(args);
        self.finish(construction)
    }

    /// Construct a camera
    pub fn camera(&mut self, args: Args) -> Result<NodeId> {
        self.add_kind(NodeKind::Camera, args)
    }

    /// Construct a light
    pub fn light(&mut self, kind: LightKind, args: Args) -> Result<NodeId> {
        self.add_kind(NodeKind::Light(kind), args)
    }

    /// Construct a geometry node
    pub fn geometry(&mut self, kind: GeometryKind, args: Args) -> Result<NodeId> {
        self.add_kind(NodeKind::Geometry(kind), args)
    }

    /// Construct a material
    pub fn material(&mut self, args: Args) -> Result<NodeId> {
        self.add_kind(NodeKind::Material, args)
    }

    /// Construct a texture
    pub fn texture(&mut self, args: Args) -> Result<NodeId> {
        self.add_kind(NodeKind::Texture, args)
    }

    /// Construct an archive reference
    pub fn archive(&mut self, args: Args) -> Result<NodeId> {
        self.add_kind(NodeKind::Archive, args)
    }

    /// Start a construction and reserve its handle
    pub fn begin(&mut self, kind: NodeKind) -> Construction {
        self.pending.retain(|_, live| live.strong_count() > 0);
        let id = NodeId::new();
        let live = Arc::new(());
        self.pending.insert(id, Arc::downgrade(&live));
        Construction {
            id,
            kind,
            args: Args::new(),
            register: false,
            _live: live,
        }
    }

    /// Start a construction by type name
    pub fn begin_named(&mut self, type_name: &str) -> Result<Construction> {
        let kind = self.catalog.require(type_name)?;
        Ok(self.begin(kind))
    }

    /// Drop a construction without building anything
    pub fn abandon(&mut self, construction: Construction) {
        self.pending.remove(&construction.id);
    }

    /// Whether a handle is reserved by a construction still held somewhere
    pub(crate) fn is_pending(&self, id: NodeId) -> bool {
        self.pending.get(&id).is_some_and(|live| live.strong_count() > 0)
    }

    /// Resolve, validate and insert a started construction
    ///
    /// On error nothing is inserted or registered.
    pub fn finish(&mut self, construction: Construction) -> Result<NodeId> {
        let Construction {
            id,
            kind,
            args,
            register,
            ..
        } = construction;
        self.pending.remove(&id);

        let node = match self.build(id, kind, args) {
            Ok(node) => Arc::new(node),
            Err(err) => {
                tracing::debug!(node_type = kind.type_name(), %err, "construction rejected");
                return Err(err);
            }
        };

        self.nodes.insert(id, Arc::clone(&node));
        let registered = kind.self_registers() || register;
        if registered {
            self.registry.register(node)?;
        }

        tracing::debug!(node_type = kind.type_name(), %id, registered, "constructed node");
        Ok(id)
    }

    fn build(&mut self, id: NodeId, kind: NodeKind, args: Args) -> Result<Node> {
        let resolved = resolve::resolve(kind.schema(), &args, &self.ambient)?;
        self.check_embedding(id, kind, &resolved.attributes)?;

        let needs_material =
            kind.category() == NodeCategory::Geometry && !resolved.attributes.contains("material");
        let mut node = kind.construct(id, resolved, args)?;

        if needs_material {
            let material = self.default_material();
            node.attach("material", AttrValue::Handle(material));
        }
        Ok(node)
    }

    /// Handle of the flat neutral material used by geometry without one
    ///
    /// Created on first use; it is embedded, not registered.
    pub fn default_material(&mut self) -> NodeId {
        if let Some(id) = self.default_material {
            return id;
        }

        let id = NodeId::new();
        let node = Node::new(
            id,
            NodeKind::Material,
            Some(DEFAULT_MATERIAL_NAME.to_string()),
            NodeKind::Material.schema().defaults(),
            Args::new(),
        );
        self.nodes.insert(id, Arc::new(node));
        self.default_material = Some(id);
        tracing::debug!(%id, "created default material");
        id
    }

    /// Build a new node of the same type from a node's original call
    ///
    /// The source call's arguments are replayed with `overrides` on top;
    /// the source node is left untouched.
    pub fn derive(&mut self, source: NodeId, overrides: Args) -> Result<NodeId> {
        let node = self.lookup(source)?;
        let kind = node.kind();
        let mut args = node.origin().clone().merged(overrides);
        if !args.contains(resolve::NAME_KEY) {
            if let Some(name) = node.name() {
                args.set(resolve::NAME_KEY, name);
            }
        }
        self.add_kind(kind, args)
    }

    /// Attempt to change an attribute after construction
    ///
    /// Always fails: constructed nodes are immutable.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        attribute: &str,
        _value: impl Into<ArgValue>,
    ) -> Result<()> {
        self.lookup(id)?;
        tracing::warn!(%id, attribute, "attempted to mutate a constructed node");
        Err(SceneError::Immutable {
            id,
            attribute: attribute.to_string(),
        })
    }

    // ========================================================================
    // Ambient defaults
    // ========================================================================

    /// Set an ambient default for every type with a matching ambient slot
    ///
    /// Affects later constructions only.
    pub fn set_default(&mut self, attribute: &str, value: impl Into<ArgValue>) -> Result<()> {
        let arg = value.into();
        let slots: Vec<_> = self.catalog.ambient_slots(attribute).collect();
        if slots.is_empty() {
            return Err(SceneError::UnknownAttribute {
                node_type: "default".to_string(),
                name: attribute.to_string(),
            });
        }

        let mut normalized = None;
        for (kind, slot) in slots {
            let value = resolve::normalize_slot(kind.type_name(), slot, &arg)?;
            self.check_ambient_handle(kind, slot.name, &value)?;
            normalized.get_or_insert(value);
        }

        if let Some(value) = normalized {
            tracing::debug!(attribute, ?value, "set ambient default");
            self.ambient.set(attribute, value);
        }
        Ok(())
    }

    /// Set an ambient default for one node type
    pub fn set_default_for(
        &mut self,
        type_name: &str,
        attribute: &str,
        value: impl Into<ArgValue>,
    ) -> Result<()> {
        let kind = self.catalog.require(type_name)?;
        let slot = kind
            .schema()
            .get(attribute)
            .filter(|slot| slot.ambient)
            .ok_or_else(|| SceneError::UnknownAttribute {
                node_type: type_name.to_string(),
                name: attribute.to_string(),
            })?;

        let value = resolve::normalize_slot(type_name, slot, &value.into())?;
        self.check_ambient_handle(kind, slot.name, &value)?;
        tracing::debug!(node_type = type_name, attribute, ?value, "set ambient default");
        self.ambient.set_for(kind.type_name(), attribute, value);
        Ok(())
    }

    /// Remove an ambient default, restoring the static one
    pub fn clear_default(&mut self, attribute: &str) {
        self.ambient.unset(attribute);
    }

    // ========================================================================
    // Registry and lookup
    // ========================================================================

    /// List an already constructed node in the registry
    ///
    /// Used for embeddable nodes; a no-op for nodes already listed.
    pub fn register(&mut self, id: NodeId) -> Result<()> {
        let node = self.lookup_shared(id)?;
        self.registry.register(node)?;
        Ok(())
    }

    /// Get a live node (registered or embedded)
    ///
    /// Removed nodes are `NotFound` here even while other nodes still embed
    /// them. Resolve handles read from another node's attributes with
    /// [`Scene::follow`], which keeps returning the removed node.
    pub fn lookup(&self, id: NodeId) -> Result<&Node> {
        self.lookup_shared_ref(id).map(Arc::as_ref)
    }

    /// Get a live node as a shared pointer
    pub fn lookup_shared(&self, id: NodeId) -> Result<Arc<Node>> {
        self.lookup_shared_ref(id).map(Arc::clone)
    }

    fn lookup_shared_ref(&self, id: NodeId) -> Result<&Arc<Node>> {
        if self.removed.contains(&id) {
            return Err(SceneError::NotFound(id));
        }
        self.nodes.get(&id).ok_or(SceneError::NotFound(id))
    }

    /// Resolve a handle held by another node, tolerating removal
    pub fn follow(&self, id: NodeId) -> Option<(&Node, NodeState)> {
        let node = self.nodes.get(&id)?;
        Some((node.as_ref(), self.state_of(id)))
    }

    /// Lifecycle state of a handle, if it was ever constructed here
    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.nodes.contains_key(&id).then(|| self.state_of(id))
    }

    fn state_of(&self, id: NodeId) -> NodeState {
        if self.removed.contains(&id) {
            NodeState::Removed
        } else {
            NodeState::Constructed
        }
    }

    /// Check if a handle refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.lookup(id).is_ok()
    }

    /// Remove a node
    ///
    /// Registry membership is severed and lookups fail afterwards. Handles
    /// embedded in other nodes are left in place and still `follow`.
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.lookup(id)?;
        if self.registry.contains(id) {
            self.registry.remove(id)?;
        }
        self.removed.insert(id);
        if self.default_material == Some(id) {
            self.default_material = None;
        }

        let users = self.users_of(id);
        if users.is_empty() {
            tracing::debug!(%id, "removed node");
        } else {
            tracing::warn!(%id, users = users.len(), "removed node is still embedded by live nodes");
        }
        Ok(())
    }

    /// Registered live nodes in registration order
    pub fn all(&self) -> impl Iterator<Item = &Node> {
        self.registry.all().map(Arc::as_ref)
    }

    /// Registered live nodes as shared pointers
    pub fn all_shared(&self) -> Vec<Arc<Node>> {
        self.registry.all().cloned().collect()
    }

    /// Every live node, registered or embedded, in construction order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|(id, _)| !self.removed.contains(*id))
            .map(|(_, node)| node.as_ref())
    }

    /// Live nodes with the given name, in construction order
    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes().filter(move |node| node.name() == Some(name))
    }

    /// The registry the renderer consumes
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of registered live nodes
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Number of live nodes, registered or embedded
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.removed.len()
    }

    /// Tear the scene down in one step
    ///
    /// Every node, registry entry and ambient default is dropped. Handles
    /// from before the call no longer resolve.
    pub fn clear(&mut self) {
        let dropped = self.nodes.len();
        self.nodes.clear();
        self.removed.clear();
        self.pending.clear();
        self.registry.clear();
        self.ambient.clear();
        self.default_material = None;
        tracing::info!(scene = %self.name, dropped, "cleared scene");
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new("Untitled")
    }
}
