// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute schemas for node types.
//!
//! A schema is a fixed table of slots. Each slot names an attribute, the
//! shape it accepts and its static default. Flags on the slot control how
//! the resolver treats it:
//! - `ambient`: the default can be replaced for the rest of the session
//! - `splat`: a single number stands for a uniform vector
//! - `derived`: computed during construction, never supplied by callers
//! - `scaled_by`: a color multiplied by a scalar slot after merging

use crate::node::AttributeSet;
use crate::value::{AttrType, AttrValue};
use indexmap::IndexMap;

/// One attribute slot of a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Attribute name
    pub name: &'static str,
    /// Accepted shape
    pub attr_type: AttrType,
    /// Static default (absent slots stay unset)
    pub default: Option<AttrValue>,
    /// Default may be overridden by an ambient default
    pub ambient: bool,
    /// A scalar is accepted for a uniform vector
    pub splat: bool,
    /// Computed during construction
    pub derived: bool,
    /// Scalar slot this color is multiplied by
    pub scaled_by: Option<&'static str>,
}

impl Slot {
    /// Create a new slot without a default
    pub fn new(name: &'static str, attr_type: AttrType) -> Self {
        Self {
            name,
            attr_type,
            default: None,
            ambient: false,
            splat: false,
            derived: false,
            scaled_by: None,
        }
    }

    /// Set the static default
    pub fn with_default(mut self, value: AttrValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Allow an ambient default to replace the static one
    pub fn ambient(mut self) -> Self {
        self.ambient = true;
        self
    }

    /// Accept a single number for all three components
    pub fn splat(mut self) -> Self {
        self.splat = true;
        self
    }

    /// Mark as computed during construction
    pub fn derived(mut self) -> Self {
        self.derived = true;
        self
    }

    /// Multiply this color by a scalar slot
    pub fn scaled_by(mut self, scalar: &'static str) -> Self {
        self.scaled_by = Some(scalar);
        self
    }
}

/// Attribute schema of one node type
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: &'static str,
    slots: IndexMap<&'static str, Slot>,
}

impl Schema {
    /// Create an empty schema
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            slots: IndexMap::new(),
        }
    }

    /// Add a slot (builder style)
    pub fn slot(mut self, slot: Slot) -> Self {
        self.slots.insert(slot.name, slot);
        self
    }

    /// Add several slots (builder style)
    pub fn slots_from(mut self, slots: impl IntoIterator<Item = Slot>) -> Self {
        for slot in slots {
            self.slots.insert(slot.name, slot);
        }
        self
    }

    /// Node type this schema belongs to
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Get a slot by name
    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Check if callers may supply this attribute
    pub fn accepts(&self, name: &str) -> bool {
        self.get(name).is_some_and(|slot| !slot.derived)
    }

    /// All slots in declaration order
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    /// Slots that take ambient defaults
    pub fn ambient_slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values().filter(|slot| slot.ambient)
    }

    /// Static defaults only, in declaration order
    pub fn defaults(&self) -> AttributeSet {
        let mut attrs = AttributeSet::new();
        for slot in self.slots() {
            if let Some(value) = &slot.default {
                attrs.insert(slot.name, value.clone());
            }
        }
        attrs
    }

    /// First attribute that is undeclared or does not have its slot's shape
    pub fn violation<'a>(&self, attrs: &'a AttributeSet) -> Option<(&'a str, &'a AttrValue)> {
        attrs.iter().find(|(name, value)| {
            self.get(name)
                .map_or(true, |slot| !slot.attr_type.admits(value))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new("Sample")
            .slot(Slot::new("radius", AttrType::Float).with_default(AttrValue::Float(1.0)))
            .slot(Slot::new("segments", AttrType::Int).with_default(AttrValue::Int(16)).ambient())
            .slot(Slot::new("look", AttrType::Vector3).derived())
    }

    #[test]
    fn test_derived_slots_are_not_accepted() {
        let schema = sample();
        assert!(schema.accepts("radius"));
        assert!(!schema.accepts("look"));
        assert!(!schema.accepts("colour"));
    }

    #[test]
    fn test_defaults_skip_slots_without_default() {
        let defaults = sample().defaults();
        assert_eq!(defaults.len(), 2);
        assert_eq!(defaults.float("radius"), Some(1.0));
        assert!(!defaults.contains("look"));
    }

    #[test]
    fn test_violation_reports_wrong_shape() {
        let schema = sample();
        let mut attrs = schema.defaults();
        assert!(schema.violation(&attrs).is_none());

        attrs.insert("radius", AttrValue::String("big".to_string()));
        assert_eq!(schema.violation(&attrs).map(|(name, _)| name), Some("radius"));
    }

    #[test]
    fn test_ambient_slots() {
        let names: Vec<_> = sample().ambient_slots().map(|s| s.name).collect();
        assert_eq!(names, ["segments"]);
    }
}
