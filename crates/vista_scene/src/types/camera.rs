// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera node type.
//!
//! The look direction is derived at construction: from `target` when one is
//! given, otherwise from `rot`, otherwise straight down -Z. Several cameras
//! may coexist; choosing the active one is up to the renderer.

use crate::error::{Result, SceneError};
use crate::math;
use crate::node::AttributeSet;
use crate::schema::{Schema, Slot};
use crate::value::{AttrType, AttrValue};
use std::sync::LazyLock;

/// Accepted projection modes
pub const PROJECTIONS: &[&str] = &["perspective", "orthographic"];

static CAMERA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Camera")
        .slot(Slot::new("pos", AttrType::Vector3).with_default(AttrValue::Vector3([0.0, 0.0, 10.0])))
        .slot(Slot::new("target", AttrType::Vector3))
        .slot(Slot::new("rot", AttrType::Rotation))
        .slot(Slot::new("up", AttrType::Vector3).with_default(AttrValue::Vector3([0.0, 1.0, 0.0])))
        .slot(Slot::new("fov", AttrType::Float).with_default(AttrValue::Float(45.0)))
        .slot(Slot::new("near", AttrType::Float).with_default(AttrValue::Float(0.1)))
        .slot(Slot::new("far", AttrType::Float).with_default(AttrValue::Float(1000.0)))
        .slot(
            Slot::new("projection", AttrType::Choice(PROJECTIONS))
                .with_default(AttrValue::String("perspective".to_string())),
        )
        .slot(Slot::new("look", AttrType::Vector3).derived())
});

pub(crate) fn schema() -> &'static Schema {
    &CAMERA
}

pub(crate) fn derive(attrs: &mut AttributeSet) -> Result<()> {
    let look = look_direction("Camera", attrs)?;
    attrs.insert("look", AttrValue::Vector3(look));
    Ok(())
}

/// Unit look vector from `pos`/`target`, or from `rot`
pub(crate) fn look_direction(node_type: &str, attrs: &AttributeSet) -> Result<[f32; 3]> {
    let pos = attrs.vector3("pos").unwrap_or([0.0; 3]);
    match (attrs.vector3("target"), attrs.rotation("rot")) {
        (Some(target), rot) => {
            if rot.is_some() {
                tracing::warn!(node_type, "both `target` and `rot` supplied; orienting towards `target`");
            }
            math::direction(pos, target).ok_or_else(|| SceneError::DegenerateOrientation {
                node_type: node_type.to_string(),
                attribute: "target".to_string(),
            })
        }
        (None, Some(rot)) => Ok(math::mat3_mul_vec(&rot, math::FORWARD)),
        (None, None) => Ok(math::FORWARD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{resolve, AmbientDefaults};
    use crate::value::{ArgValue, Args};

    fn derived(args: Args) -> Result<AttributeSet> {
        let mut attrs = resolve(schema(), &args, &AmbientDefaults::new())?.attributes;
        derive(&mut attrs)?;
        Ok(attrs)
    }

    #[test]
    fn test_look_towards_target() {
        let attrs = derived(Args::new().with("pos", [3.0, 2.0, 2.0]).with("target", [0.0, 0.0, 0.0])).unwrap();
        let look = attrs.vector3("look").unwrap();
        let n = 17.0_f32.sqrt();
        let expected = [-3.0 / n, -2.0 / n, -2.0 / n];
        for (a, b) in look.iter().zip(expected.iter()) {
            assert!((a - b).abs() < 1.0e-6);
        }
    }

    #[test]
    fn test_position_equal_to_target_is_degenerate() {
        let err = derived(Args::new().with("pos", [1.0, 1.0, 1.0]).with("target", [1.0, 1.0, 1.0])).unwrap_err();
        assert!(matches!(err, SceneError::DegenerateOrientation { .. }));
    }

    #[test]
    fn test_look_from_rotation() {
        let attrs = derived(Args::new().with("rot", ArgValue::list([0, 180, 0]))).unwrap();
        let look = attrs.vector3("look").unwrap();
        assert!((look[2] - 1.0).abs() < 1.0e-6);
    }

    #[test]
    fn test_default_look_is_forward() {
        let attrs = derived(Args::new()).unwrap();
        assert_eq!(attrs.vector3("look"), Some(math::FORWARD));
        assert_eq!(attrs.string("projection"), Some("perspective"));
    }

    #[test]
    fn test_look_cannot_be_supplied() {
        let err = derived(Args::new().with("look", [0, 0, 1])).unwrap_err();
        assert!(matches!(err, SceneError::UnknownAttribute { .. }));
    }
}
