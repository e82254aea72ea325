// SPDX-License-Identifier: MIT OR Apache-2.0
//! Archive node type.
//!
//! Stands in for an externally produced sub-scene referenced by file name.
//! The content is never opened here; an optional material overrides the
//! materials of whatever the archive contains.

use super::geometry::transform_slots;
use super::NodeCategory;
use crate::schema::{Schema, Slot};
use crate::value::AttrType;
use std::sync::LazyLock;

static ARCHIVE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Archive")
        .slot(Slot::new("file", AttrType::String))
        .slot(Slot::new("material", AttrType::Handle(NodeCategory::Material)))
        .slots_from(transform_slots())
});

pub(crate) fn schema() -> &'static Schema {
    &ARCHIVE
}
