// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node types and their schemas.
//!
//! Every node type shares one construction contract (`NodeType`) and
//! differs in its attribute schema, in derived attributes and in whether
//! its instances register themselves with the scene.

pub mod archive;
pub mod camera;
pub mod geometry;
pub mod light;
pub mod material;
pub mod texture;

use crate::error::{Result, SceneError};
use crate::node::{AttributeSet, Node, NodeId};
use crate::resolve::Resolved;
use crate::schema::{Schema, Slot};
use crate::value::{ArgValue, Args};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Viewpoints
    Camera,
    /// Light sources
    Light,
    /// Drawable shapes
    Geometry,
    /// Surface descriptions (embeddable)
    Material,
    /// Image references (embeddable)
    Texture,
    /// Externally produced sub-scenes
    Archive,
}

/// Light falloff model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LightKind {
    /// Omnidirectional light at a position
    Point,
    /// Parallel light from a direction
    Distant,
    /// Cone light from a position towards a target
    Spot,
    /// Uniform ambient term
    Ambient,
}

/// Geometry shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    /// Axis-aligned box
    Box,
    /// Sphere
    Sphere,
    /// Cylinder along +Z
    Cylinder,
    /// Cone along +Z
    Cone,
    /// Torus in the XY plane
    Torus,
    /// Rectangle in the XY plane
    Plane,
    /// Disk in the XY plane
    Disk,
}

/// Tagged node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Camera
    Camera,
    /// Light of the given falloff model
    Light(LightKind),
    /// Geometry of the given shape
    Geometry(GeometryKind),
    /// Material
    Material,
    /// Texture
    Texture,
    /// Archive reference
    Archive,
}

impl NodeKind {
    /// Every built-in node type
    pub const ALL: [NodeKind; 15] = [
        NodeKind::Camera,
        NodeKind::Light(LightKind::Point),
        NodeKind::Light(LightKind::Distant),
        NodeKind::Light(LightKind::Spot),
        NodeKind::Light(LightKind::Ambient),
        NodeKind::Geometry(GeometryKind::Box),
        NodeKind::Geometry(GeometryKind::Sphere),
        NodeKind::Geometry(GeometryKind::Cylinder),
        NodeKind::Geometry(GeometryKind::Cone),
        NodeKind::Geometry(GeometryKind::Torus),
        NodeKind::Geometry(GeometryKind::Plane),
        NodeKind::Geometry(GeometryKind::Disk),
        NodeKind::Material,
        NodeKind::Texture,
        NodeKind::Archive,
    ];
}

/// Construction contract shared by all node types
pub trait NodeType {
    /// Tag stored on constructed nodes
    fn kind(&self) -> NodeKind;

    /// Name used by authoring calls
    fn type_name(&self) -> &'static str;

    /// Category
    fn category(&self) -> NodeCategory;

    /// Attribute schema
    fn schema(&self) -> &'static Schema;

    /// Whether instances are appended to the registry on construction
    fn self_registers(&self) -> bool;

    /// Compute derived attributes after resolution
    fn derive(&self, _attrs: &mut AttributeSet) -> Result<()> {
        Ok(())
    }

    /// Check every attribute against the schema
    fn validate(&self, attrs: &AttributeSet) -> Result<()> {
        let schema = self.schema();
        match schema.violation(attrs) {
            None => Ok(()),
            Some((name, value)) => match schema.get(name) {
                None => Err(SceneError::UnknownAttribute {
                    node_type: self.type_name().to_string(),
                    name: name.to_string(),
                }),
                Some(slot) => Err(SceneError::TypeMismatch {
                    node_type: self.type_name().to_string(),
                    name: name.to_string(),
                    expected: slot.attr_type.to_string(),
                    found: ArgValue::from(value.clone()).describe(),
                }),
            },
        }
    }

    /// Build a fully initialized node from resolved attributes
    fn construct(&self, id: NodeId, resolved: Resolved, origin: Args) -> Result<Node> {
        let Resolved { name, mut attributes } = resolved;
        self.derive(&mut attributes)?;
        self.validate(&attributes)?;
        Ok(Node::new(id, self.kind(), name, attributes, origin))
    }
}

impl NodeType for NodeKind {
    fn kind(&self) -> NodeKind {
        *self
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Camera => "Camera",
            Self::Light(LightKind::Point) => "PointLight",
            Self::Light(LightKind::Distant) => "DistantLight",
            Self::Light(LightKind::Spot) => "SpotLight",
            Self::Light(LightKind::Ambient) => "AmbientLight",
            Self::Geometry(GeometryKind::Box) => "Box",
            Self::Geometry(GeometryKind::Sphere) => "Sphere",
            Self::Geometry(GeometryKind::Cylinder) => "Cylinder",
            Self::Geometry(GeometryKind::Cone) => "Cone",
            Self::Geometry(GeometryKind::Torus) => "Torus",
            Self::Geometry(GeometryKind::Plane) => "Plane",
            Self::Geometry(GeometryKind::Disk) => "Disk",
            Self::Material => "Material",
            Self::Texture => "Texture",
            Self::Archive => "Archive",
        }
    }

    fn category(&self) -> NodeCategory {
        match self {
            Self::Camera => NodeCategory::Camera,
            Self::Light(_) => NodeCategory::Light,
            Self::Geometry(_) => NodeCategory::Geometry,
            Self::Material => NodeCategory::Material,
            Self::Texture => NodeCategory::Texture,
            Self::Archive => NodeCategory::Archive,
        }
    }

    fn schema(&self) -> &'static Schema {
        match self {
            Self::Camera => camera::schema(),
            Self::Light(kind) => light::schema(*kind),
            Self::Geometry(kind) => geometry::schema(*kind),
            Self::Material => material::schema(),
            Self::Texture => texture::schema(),
            Self::Archive => archive::schema(),
        }
    }

    fn self_registers(&self) -> bool {
        !matches!(self, Self::Material | Self::Texture)
    }

    fn derive(&self, attrs: &mut AttributeSet) -> Result<()> {
        match self {
            Self::Camera => camera::derive(attrs),
            Self::Light(kind) => light::derive(*kind, attrs),
            _ => Ok(()),
        }
    }
}

/// Catalog of node types available to authoring calls
#[derive(Debug, Clone)]
pub struct TypeCatalog {
    types: IndexMap<&'static str, NodeKind>,
}

impl TypeCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            types: IndexMap::new(),
        }
    }

    /// Catalog with every built-in type
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for kind in NodeKind::ALL {
            catalog.register(kind);
        }
        catalog
    }

    /// Register a node type under its type name
    pub fn register(&mut self, kind: NodeKind) {
        self.types.insert(kind.type_name(), kind);
    }

    /// Get a node type by name
    pub fn get(&self, type_name: &str) -> Option<NodeKind> {
        self.types.get(type_name).copied()
    }

    /// Get a node type by name, or fail with `UnknownNodeType`
    pub fn require(&self, type_name: &str) -> Result<NodeKind> {
        self.get(type_name)
            .ok_or_else(|| SceneError::UnknownNodeType(type_name.to_string()))
    }

    /// All registered types
    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.types.values().copied()
    }

    /// Types in a category
    pub fn kinds_in_category(&self, category: NodeCategory) -> impl Iterator<Item = NodeKind> + '_ {
        self.kinds().filter(move |kind| kind.category() == category)
    }

    /// Ambient slots with the given attribute name, across all types
    pub fn ambient_slots<'a>(
        &'a self,
        attribute: &'a str,
    ) -> impl Iterator<Item = (NodeKind, &'static Slot)> + 'a {
        self.kinds().filter_map(move |kind| {
            kind.schema()
                .get(attribute)
                .filter(|slot| slot.ambient)
                .map(|slot| (kind, slot))
        })
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TypeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_names_round_trip() {
        let catalog = TypeCatalog::standard();
        assert_eq!(catalog.len(), NodeKind::ALL.len());
        for kind in NodeKind::ALL {
            assert_eq!(catalog.get(kind.type_name()), Some(kind));
            assert_eq!(kind.schema().type_name(), kind.type_name());
        }
        assert_eq!(
            catalog.require("Teapot"),
            Err(SceneError::UnknownNodeType("Teapot".to_string()))
        );
    }

    #[test]
    fn test_only_embeddables_skip_registration() {
        for kind in NodeKind::ALL {
            let embeddable = matches!(kind.category(), NodeCategory::Material | NodeCategory::Texture);
            assert_eq!(kind.self_registers(), !embeddable, "{}", kind.type_name());
        }
    }

    #[test]
    fn test_static_defaults_conform_to_schema() {
        for kind in NodeKind::ALL {
            assert!(kind.validate(&kind.schema().defaults()).is_ok(), "{}", kind.type_name());
        }
    }

    #[test]
    fn test_ambient_segments_shared_by_curved_shapes() {
        let catalog = TypeCatalog::standard();
        let kinds: Vec<_> = catalog.ambient_slots("segments").map(|(kind, _)| kind).collect();
        assert!(kinds.contains(&NodeKind::Geometry(GeometryKind::Sphere)));
        assert!(kinds.contains(&NodeKind::Geometry(GeometryKind::Torus)));
        assert!(!kinds.contains(&NodeKind::Geometry(GeometryKind::Box)));
    }

    #[test]
    fn test_lights_in_category() {
        let catalog = TypeCatalog::standard();
        assert_eq!(catalog.kinds_in_category(NodeCategory::Light).count(), 4);
    }
}
