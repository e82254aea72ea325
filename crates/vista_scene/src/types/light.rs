// SPDX-License-Identifier: MIT OR Apache-2.0
//! Light node types.
//!
//! Point, distant, spot and ambient lights share `color` and an ambient
//! `intensity`. Spot shadow parameters are carried through untouched.

use super::camera::look_direction;
use super::LightKind;
use crate::error::{Result, SceneError};
use crate::math;
use crate::node::AttributeSet;
use crate::schema::{Schema, Slot};
use crate::value::{AttrType, AttrValue};
use std::sync::LazyLock;

/// Accepted point light decay models
pub const DECAY: &[&str] = &["none", "linear", "quadratic"];

/// Spot direction when no `target` is given
const SPOT_DOWN: [f32; 3] = [0.0, -1.0, 0.0];

fn shared_slots() -> Vec<Slot> {
    vec![
        Slot::new("color", AttrType::Color).with_default(AttrValue::Color([1.0, 1.0, 1.0, 1.0])),
        Slot::new("intensity", AttrType::Float).with_default(AttrValue::Float(1.0)).ambient(),
    ]
}

static POINT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("PointLight")
        .slot(Slot::new("pos", AttrType::Vector3).with_default(AttrValue::Vector3([0.0, 0.0, 0.0])))
        .slots_from(shared_slots())
        .slot(Slot::new("decay", AttrType::Choice(DECAY)).with_default(AttrValue::String("quadratic".to_string())))
});

static DISTANT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("DistantLight")
        .slot(Slot::new("dir", AttrType::Vector3).with_default(AttrValue::Vector3([0.0, 0.0, -1.0])))
        .slots_from(shared_slots())
});

static SPOT: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("SpotLight")
        .slot(Slot::new("pos", AttrType::Vector3).with_default(AttrValue::Vector3([0.0, 5.0, 0.0])))
        .slot(Slot::new("target", AttrType::Vector3))
        .slots_from(shared_slots())
        .slot(Slot::new("hotspot", AttrType::Float).with_default(AttrValue::Float(30.0)))
        .slot(Slot::new("falloff", AttrType::Float).with_default(AttrValue::Float(40.0)))
        .slot(Slot::new("shadow", AttrType::Bool).with_default(AttrValue::Bool(false)))
        .slot(Slot::new("shadow_res", AttrType::Int).with_default(AttrValue::Int(512)))
        .slot(Slot::new("shadow_width", AttrType::Float).with_default(AttrValue::Float(1.0)))
        .slot(Slot::new("shadow_bias", AttrType::Float).with_default(AttrValue::Float(0.01)))
        .slot(Slot::new("look", AttrType::Vector3).derived())
});

static AMBIENT: LazyLock<Schema> = LazyLock::new(|| Schema::new("AmbientLight").slots_from(shared_slots()));

pub(crate) fn schema(kind: LightKind) -> &'static Schema {
    match kind {
        LightKind::Point => &POINT,
        LightKind::Distant => &DISTANT,
        LightKind::Spot => &SPOT,
        LightKind::Ambient => &AMBIENT,
    }
}

pub(crate) fn derive(kind: LightKind, attrs: &mut AttributeSet) -> Result<()> {
    match kind {
        LightKind::Distant => {
            let dir = attrs.vector3("dir").unwrap_or(math::FORWARD);
            let unit = math::normalize(dir).ok_or_else(|| SceneError::DegenerateOrientation {
                node_type: "DistantLight".to_string(),
                attribute: "dir".to_string(),
            })?;
            attrs.insert("dir", AttrValue::Vector3(unit));
        }
        LightKind::Spot => {
            let look = match attrs.vector3("target") {
                Some(_) => look_direction("SpotLight", attrs)?,
                None => SPOT_DOWN,
            };
            attrs.insert("look", AttrValue::Vector3(look));
        }
        LightKind::Point | LightKind::Ambient => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{resolve, AmbientDefaults};
    use crate::value::Args;

    fn build(kind: LightKind, args: Args) -> Result<AttributeSet> {
        let mut attrs = resolve(schema(kind), &args, &AmbientDefaults::new())?.attributes;
        derive(kind, &mut attrs)?;
        Ok(attrs)
    }

    #[test]
    fn test_distant_direction_is_normalized() {
        let attrs = build(LightKind::Distant, Args::new().with("dir", [0.0, -4.0, 0.0])).unwrap();
        assert_eq!(attrs.vector3("dir"), Some([0.0, -1.0, 0.0]));
    }

    #[test]
    fn test_zero_direction_is_degenerate() {
        let err = build(LightKind::Distant, Args::new().with("dir", [0, 0, 0])).unwrap_err();
        assert!(matches!(err, SceneError::DegenerateOrientation { ref attribute, .. } if attribute == "dir"));
    }

    #[test]
    fn test_spot_defaults_point_down() {
        let attrs = build(LightKind::Spot, Args::new()).unwrap();
        assert_eq!(attrs.vector3("look"), Some([0.0, -1.0, 0.0]));
        assert_eq!(attrs.bool("shadow"), Some(false));
        assert_eq!(attrs.int("shadow_res"), Some(512));
    }

    #[test]
    fn test_spot_shadow_parameters_pass_through() {
        let args = Args::new()
            .with("shadow", true)
            .with("shadow_res", 1024)
            .with("shadow_width", 2.5)
            .with("shadow_bias", 0.2);
        let attrs = build(LightKind::Spot, args).unwrap();
        assert_eq!(attrs.bool("shadow"), Some(true));
        assert_eq!(attrs.int("shadow_res"), Some(1024));
        assert_eq!(attrs.float("shadow_width"), Some(2.5));
        assert_eq!(attrs.float("shadow_bias"), Some(0.2));
    }

    #[test]
    fn test_spot_at_origin_without_target() {
        let attrs = build(LightKind::Spot, Args::new().with("pos", [0.0, 0.0, 0.0])).unwrap();
        assert_eq!(attrs.vector3("look"), Some(SPOT_DOWN));
        assert_eq!(attrs.vector3("target"), None);
    }

    #[test]
    fn test_spot_on_its_target_is_degenerate() {
        let args = Args::new().with("pos", [1.0, 2.0, 3.0]).with("target", [1.0, 2.0, 3.0]);
        let err = build(LightKind::Spot, args).unwrap_err();
        assert!(matches!(err, SceneError::DegenerateOrientation { ref attribute, .. } if attribute == "target"));
    }

    #[test]
    fn test_spot_aims_at_target() {
        let args = Args::new().with("pos", [0.0, 0.0, 4.0]).with("target", [0.0, 0.0, 0.0]);
        let attrs = build(LightKind::Spot, args).unwrap();
        assert_eq!(attrs.vector3("look"), Some([0.0, 0.0, -1.0]));
    }

    #[test]
    fn test_point_light_rejects_cone_angles() {
        let err = build(LightKind::Point, Args::new().with("hotspot", 20.0)).unwrap_err();
        assert!(matches!(err, SceneError::UnknownAttribute { ref name, .. } if name == "hotspot"));
    }
}
