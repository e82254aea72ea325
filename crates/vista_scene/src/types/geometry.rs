// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry node types.
//!
//! Every shape carries the same transform slots (`pos`, `rot`, `scale`) on
//! top of its local-space definition, plus an embedded `material`. A shape
//! built without a material gets the scene's default material.

use super::{GeometryKind, NodeCategory};
use crate::math;
use crate::schema::{Schema, Slot};
use crate::value::{AttrType, AttrValue};
use std::sync::LazyLock;

/// Default segment count for curved shapes
pub const DEFAULT_SEGMENTS: i64 = 16;

/// Default ring count for spheres and tori
pub const DEFAULT_RINGS: i64 = 8;

/// Transform slots shared by geometry and archives
pub(crate) fn transform_slots() -> Vec<Slot> {
    vec![
        Slot::new("pos", AttrType::Vector3).with_default(AttrValue::Vector3([0.0, 0.0, 0.0])),
        Slot::new("rot", AttrType::Rotation).with_default(AttrValue::Rotation(math::IDENTITY)),
        Slot::new("scale", AttrType::Vector3)
            .with_default(AttrValue::Vector3([1.0, 1.0, 1.0]))
            .splat(),
    ]
}

fn shared_slots() -> Vec<Slot> {
    let mut slots = transform_slots();
    slots.push(Slot::new("material", AttrType::Handle(NodeCategory::Material)).ambient());
    slots.push(Slot::new("cast_shadows", AttrType::Bool).with_default(AttrValue::Bool(true)));
    slots
}

fn float(name: &'static str, value: f32) -> Slot {
    Slot::new(name, AttrType::Float).with_default(AttrValue::Float(value))
}

fn segments() -> Slot {
    Slot::new("segments", AttrType::Int)
        .with_default(AttrValue::Int(DEFAULT_SEGMENTS))
        .ambient()
}

fn rings() -> Slot {
    Slot::new("rings", AttrType::Int)
        .with_default(AttrValue::Int(DEFAULT_RINGS))
        .ambient()
}

fn caps() -> Slot {
    Slot::new("caps", AttrType::Bool).with_default(AttrValue::Bool(true))
}

static BOX: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Box")
        .slots_from(shared_slots())
        .slot(float("lx", 1.0))
        .slot(float("ly", 1.0))
        .slot(float("lz", 1.0))
});

static SPHERE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Sphere")
        .slots_from(shared_slots())
        .slot(float("radius", 1.0))
        .slot(segments())
        .slot(rings())
});

static CYLINDER: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Cylinder")
        .slots_from(shared_slots())
        .slot(float("radius", 1.0))
        .slot(float("height", 2.0))
        .slot(segments())
        .slot(caps())
});

static CONE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Cone")
        .slots_from(shared_slots())
        .slot(float("radius", 1.0))
        .slot(float("height", 2.0))
        .slot(segments())
        .slot(caps())
});

static TORUS: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Torus")
        .slots_from(shared_slots())
        .slot(float("radius", 1.0))
        .slot(float("thickness", 0.25))
        .slot(segments())
        .slot(rings())
});

static PLANE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Plane")
        .slots_from(shared_slots())
        .slot(float("lx", 1.0))
        .slot(float("ly", 1.0))
});

static DISK: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Disk")
        .slots_from(shared_slots())
        .slot(float("radius", 1.0))
        .slot(segments())
});

pub(crate) fn schema(kind: GeometryKind) -> &'static Schema {
    match kind {
        GeometryKind::Box => &BOX,
        GeometryKind::Sphere => &SPHERE,
        GeometryKind::Cylinder => &CYLINDER,
        GeometryKind::Cone => &CONE,
        GeometryKind::Torus => &TORUS,
        GeometryKind::Plane => &PLANE,
        GeometryKind::Disk => &DISK,
    }
}
