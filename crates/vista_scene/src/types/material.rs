// SPDX-License-Identifier: MIT OR Apache-2.0
//! Material node type.
//!
//! Materials are embeddable: construction returns a handle that geometry
//! and archives refer to. The diffuse `color` is multiplied by `diffuse`.
//! Blend and texture modes are validated here and interpreted by renderers.

use super::NodeCategory;
use crate::schema::{Schema, Slot};
use crate::value::{AttrType, AttrValue};
use std::sync::LazyLock;

/// Accepted blend modes
pub const BLEND_MODES: &[&str] = &["none", "alpha", "add", "multiply"];

/// Accepted texture application modes
pub const TEXTURE_MODES: &[&str] = &["modulate", "decal", "replace", "blend"];

/// Name given to the scene's fallback material
pub const DEFAULT_MATERIAL_NAME: &str = "default";

static MATERIAL: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Material")
        .slot(
            Slot::new("color", AttrType::Color)
                .with_default(AttrValue::Color([0.8, 0.8, 0.8, 1.0]))
                .scaled_by("diffuse"),
        )
        .slot(Slot::new("diffuse", AttrType::Float).with_default(AttrValue::Float(1.0)))
        .slot(Slot::new("specular", AttrType::Color).with_default(AttrValue::Color([0.0, 0.0, 0.0, 1.0])))
        .slot(Slot::new("shininess", AttrType::Float).with_default(AttrValue::Float(20.0)))
        .slot(Slot::new("emissive", AttrType::Color).with_default(AttrValue::Color([0.0, 0.0, 0.0, 1.0])))
        .slot(Slot::new("opacity", AttrType::Float).with_default(AttrValue::Float(1.0)))
        .slot(
            Slot::new("blend", AttrType::Choice(BLEND_MODES))
                .with_default(AttrValue::String("none".to_string())),
        )
        .slot(Slot::new("texture", AttrType::Handle(NodeCategory::Texture)))
        .slot(
            Slot::new("texture_mode", AttrType::Choice(TEXTURE_MODES))
                .with_default(AttrValue::String("modulate".to_string())),
        )
        .slot(Slot::new("double_sided", AttrType::Bool).with_default(AttrValue::Bool(false)))
});

pub(crate) fn schema() -> &'static Schema {
    &MATERIAL
}
