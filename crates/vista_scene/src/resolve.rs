// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute resolution.
//!
//! Merges, in increasing priority, a schema's static defaults, the ambient
//! defaults in effect and the caller's keyword arguments into one finalized
//! attribute set. Resolution has no side effects on the scene.

use crate::error::{Result, SceneError};
use crate::math;
use crate::node::AttributeSet;
use crate::schema::{Schema, Slot};
use crate::value::{ArgValue, AttrType, AttrValue, Args};
use indexmap::IndexMap;

/// Keyword that carries the node name rather than an attribute
pub const NAME_KEY: &str = "name";

/// Session-scoped fallback values for ambient slots
#[derive(Debug, Clone, Default)]
pub struct AmbientDefaults {
    /// Defaults applying to every type with a matching ambient slot
    global: IndexMap<String, AttrValue>,
    /// Defaults for one node type; they win over global ones
    scoped: IndexMap<(String, String), AttrValue>,
}

impl AmbientDefaults {
    /// Create an empty set of ambient defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a default for every type
    pub fn set(&mut self, attribute: impl Into<String>, value: AttrValue) {
        self.global.insert(attribute.into(), value);
    }

    /// Set a default for one node type
    pub fn set_for(
        &mut self,
        type_name: impl Into<String>,
        attribute: impl Into<String>,
        value: AttrValue,
    ) {
        self.scoped.insert((type_name.into(), attribute.into()), value);
    }

    /// Drop a default (global and every scoped one for that attribute)
    pub fn unset(&mut self, attribute: &str) {
        self.global.shift_remove(attribute);
        self.scoped.retain(|(_, name), _| name != attribute);
    }

    /// Default in effect for a slot of the given type
    pub fn get(&self, type_name: &str, attribute: &str) -> Option<&AttrValue> {
        self.scoped
            .get(&(type_name.to_string(), attribute.to_string()))
            .or_else(|| self.global.get(attribute))
    }

    /// Drop every default
    pub fn clear(&mut self) {
        self.global.clear();
        self.scoped.clear();
    }

    /// Check if no default is set
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.scoped.is_empty()
    }
}

/// Output of a resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// Name taken from the `name` keyword
    pub name: Option<String>,
    /// Finalized attributes in schema order
    pub attributes: AttributeSet,
}

/// Resolve caller arguments against a schema
pub fn resolve(schema: &Schema, args: &Args, ambient: &AmbientDefaults) -> Result<Resolved> {
    let type_name = schema.type_name();

    let name = match args.get(NAME_KEY) {
        None => None,
        Some(ArgValue::String(name)) => Some(name.clone()),
        Some(other) => {
            return Err(SceneError::TypeMismatch {
                node_type: type_name.to_string(),
                name: NAME_KEY.to_string(),
                expected: AttrType::String.to_string(),
                found: other.describe(),
            })
        }
    };

    // Reject unknown keys before anything else, in call order
    if let Some((key, _)) = args
        .iter()
        .find(|(key, _)| *key != NAME_KEY && !schema.accepts(key))
    {
        return Err(SceneError::UnknownAttribute {
            node_type: type_name.to_string(),
            name: key.to_string(),
        });
    }

    let mut attributes = AttributeSet::new();
    for slot in schema.slots().filter(|slot| !slot.derived) {
        let value = match args.get(slot.name) {
            Some(arg) => Some(normalize_slot(type_name, slot, arg)?),
            None => slot
                .ambient
                .then(|| ambient.get(type_name, slot.name))
                .flatten()
                .or(slot.default.as_ref())
                .cloned(),
        };
        if let Some(value) = value {
            attributes.insert(slot.name, value);
        }
    }

    apply_scaling(schema, &mut attributes);

    tracing::trace!(node_type = type_name, count = attributes.len(), "resolved attributes");
    Ok(Resolved { name, attributes })
}

/// Normalize one caller value for a slot, with a descriptive error
pub(crate) fn normalize_slot(type_name: &str, slot: &Slot, arg: &ArgValue) -> Result<AttrValue> {
    normalize(slot.attr_type, arg, slot.splat).ok_or_else(|| SceneError::TypeMismatch {
        node_type: type_name.to_string(),
        name: slot.name.to_string(),
        expected: slot.attr_type.to_string(),
        found: arg.describe(),
    })
}

/// Whole floats inside the `i64` range
fn integral(v: f64) -> Option<i64> {
    // 2^63 is exact in f64; i64::MAX is not
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    (v.fract() == 0.0 && (-LIMIT..LIMIT).contains(&v)).then_some(v as i64)
}

/// Convert a caller value to the canonical form of a shape
pub fn normalize(attr_type: AttrType, arg: &ArgValue, splat: bool) -> Option<AttrValue> {
    match attr_type {
        AttrType::Bool => match arg {
            ArgValue::Bool(b) => Some(AttrValue::Bool(*b)),
            _ => None,
        },
        AttrType::Int => match arg {
            ArgValue::Int(i) => Some(AttrValue::Int(*i)),
            ArgValue::Float(v) => integral(*v).map(AttrValue::Int),
            _ => None,
        },
        AttrType::Float => scalar(arg).map(AttrValue::Float),
        AttrType::Vector3 => match arg {
            ArgValue::Vector3(v) => Some(AttrValue::Vector3(*v)),
            ArgValue::List(values) if values.len() == 3 => {
                Some(AttrValue::Vector3([values[0] as f32, values[1] as f32, values[2] as f32]))
            }
            _ if splat => scalar(arg).map(|s| AttrValue::Vector3([s; 3])),
            _ => None,
        },
        AttrType::Color => match arg {
            ArgValue::Color(c) => Some(AttrValue::Color(*c)),
            ArgValue::Vector3([r, g, b]) => Some(AttrValue::Color([*r, *g, *b, 1.0])),
            ArgValue::List(values) if values.len() == 3 => Some(AttrValue::Color([
                values[0] as f32,
                values[1] as f32,
                values[2] as f32,
                1.0,
            ])),
            ArgValue::List(values) if values.len() == 4 => Some(AttrValue::Color([
                values[0] as f32,
                values[1] as f32,
                values[2] as f32,
                values[3] as f32,
            ])),
            _ => None,
        },
        AttrType::Rotation => rotation(arg).map(AttrValue::Rotation),
        AttrType::String => match arg {
            ArgValue::String(s) => Some(AttrValue::String(s.clone())),
            _ => None,
        },
        AttrType::Choice(options) => match arg {
            ArgValue::String(s) if options.contains(&s.as_str()) => Some(AttrValue::String(s.clone())),
            _ => None,
        },
        AttrType::Handle(_) => match arg {
            ArgValue::Handle(id) => Some(AttrValue::Handle(*id)),
            _ => None,
        },
    }
}

fn scalar(arg: &ArgValue) -> Option<f32> {
    match arg {
        ArgValue::Float(v) => Some(*v as f32),
        ArgValue::Int(i) => Some(*i as f32),
        _ => None,
    }
}

/// Euler triple, flattened 3x3/4x4, or 3x3/4x4 rows
fn rotation(arg: &ArgValue) -> Option<[[f32; 3]; 3]> {
    match arg {
        ArgValue::Rotation(m) => Some(*m),
        ArgValue::Vector3(angles) => Some(math::euler_degrees(*angles)),
        ArgValue::List(values) => match values.len() {
            3 => Some(math::euler_degrees([
                values[0] as f32,
                values[1] as f32,
                values[2] as f32,
            ])),
            9 => Some(upper_left(values, 3)),
            16 => Some(upper_left(values, 4)),
            _ => None,
        },
        ArgValue::Rows(rows) => {
            let n = rows.len();
            if (n == 3 || n == 4) && rows.iter().all(|row| row.len() == n) {
                let flat: Vec<f64> = rows.iter().flatten().copied().collect();
                Some(upper_left(&flat, n))
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Upper-left 3x3 block of a row-major n x n matrix
fn upper_left(values: &[f64], n: usize) -> [[f32; 3]; 3] {
    let mut m = [[0.0; 3]; 3];
    for (r, row) in m.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = values[r * n + c] as f32;
        }
    }
    m
}

/// Multiply scalable colors by their scalar slot
fn apply_scaling(schema: &Schema, attributes: &mut AttributeSet) {
    for slot in schema.slots() {
        let Some(scalar_name) = slot.scaled_by else {
            continue;
        };
        let Some(factor) = attributes.float(scalar_name) else {
            continue;
        };
        if let Some(AttrValue::Color(color)) = attributes.get_mut(slot.name) {
            for channel in color.iter_mut().take(3) {
                *channel *= factor;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new("Sample")
            .slot(Slot::new("pos", AttrType::Vector3).with_default(AttrValue::Vector3([0.0; 3])))
            .slot(Slot::new("scale", AttrType::Vector3).with_default(AttrValue::Vector3([1.0; 3])).splat())
            .slot(
                Slot::new("color", AttrType::Color)
                    .with_default(AttrValue::Color([0.5, 0.5, 0.5, 1.0]))
                    .scaled_by("diffuse"),
            )
            .slot(Slot::new("diffuse", AttrType::Float).with_default(AttrValue::Float(1.0)))
            .slot(Slot::new("tint", AttrType::Color).with_default(AttrValue::Color([1.0; 4])))
            .slot(Slot::new("segments", AttrType::Int).with_default(AttrValue::Int(16)).ambient())
            .slot(Slot::new("rot", AttrType::Rotation))
            .slot(Slot::new("blend", AttrType::Choice(&["none", "alpha"])).with_default(AttrValue::String("none".to_string())))
    }

    #[test]
    fn test_no_args_yields_defaults() {
        let schema = sample();
        let resolved = resolve(&schema, &Args::new(), &AmbientDefaults::new()).unwrap();
        assert_eq!(resolved.attributes, schema.defaults());
        assert_eq!(resolved.name, None);
    }

    #[test]
    fn test_caller_values_win() {
        let args = Args::new().with("segments", 32).with("name", "ball");
        let mut ambient = AmbientDefaults::new();
        ambient.set("segments", AttrValue::Int(24));

        let resolved = resolve(&sample(), &args, &ambient).unwrap();
        assert_eq!(resolved.attributes.int("segments"), Some(32));
        assert_eq!(resolved.name.as_deref(), Some("ball"));
    }

    #[test]
    fn test_ambient_overrides_static_default() {
        let mut ambient = AmbientDefaults::new();
        ambient.set("segments", AttrValue::Int(24));
        let resolved = resolve(&sample(), &Args::new(), &ambient).unwrap();
        assert_eq!(resolved.attributes.int("segments"), Some(24));

        ambient.set_for("Sample", "segments", AttrValue::Int(8));
        let resolved = resolve(&sample(), &Args::new(), &ambient).unwrap();
        assert_eq!(resolved.attributes.int("segments"), Some(8));
    }

    #[test]
    fn test_ambient_ignored_for_non_ambient_slots() {
        let mut ambient = AmbientDefaults::new();
        ambient.set("diffuse", AttrValue::Float(0.1));
        let resolved = resolve(&sample(), &Args::new(), &ambient).unwrap();
        assert_eq!(resolved.attributes.float("diffuse"), Some(1.0));
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        let err = resolve(&sample(), &Args::new().with("colour", [1, 0, 0]), &AmbientDefaults::new())
            .unwrap_err();
        assert_eq!(
            err,
            SceneError::UnknownAttribute {
                node_type: "Sample".to_string(),
                name: "colour".to_string(),
            }
        );
    }

    #[test]
    fn test_short_tuple_is_type_mismatch() {
        let err = resolve(&sample(), &Args::new().with("pos", ArgValue::list([1.0, 2.0])), &AmbientDefaults::new())
            .unwrap_err();
        assert!(matches!(err, SceneError::TypeMismatch { ref name, .. } if name == "pos"));
    }

    #[test]
    fn test_structured_and_plain_forms_are_equivalent() {
        let ambient = AmbientDefaults::new();
        let structured = Args::new().with("pos", [1.0, 2.0, 3.0]).with("tint", [0.2, 0.4, 0.6, 1.0]);
        let plain = Args::new()
            .with("pos", ArgValue::list([1.0, 2.0, 3.0]))
            .with("tint", ArgValue::list([0.2, 0.4, 0.6]));

        let a = resolve(&sample(), &structured, &ambient).unwrap();
        let b = resolve(&sample(), &plain, &ambient).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_splat_scale() {
        let resolved = resolve(&sample(), &Args::new().with("scale", 2), &AmbientDefaults::new()).unwrap();
        assert_eq!(resolved.attributes.vector3("scale"), Some([2.0, 2.0, 2.0]));

        let err = resolve(&sample(), &Args::new().with("pos", 2), &AmbientDefaults::new()).unwrap_err();
        assert!(matches!(err, SceneError::TypeMismatch { .. }));
    }

    #[test]
    fn test_scaling_only_touches_marked_colors() {
        let args = Args::new().with("diffuse", 0.5).with("color", [1.0, 1.0, 1.0, 1.0]);
        let resolved = resolve(&sample(), &args, &AmbientDefaults::new()).unwrap();
        assert_eq!(resolved.attributes.color("color"), Some([0.5, 0.5, 0.5, 1.0]));
        assert_eq!(resolved.attributes.color("tint"), Some([1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_rotation_forms() {
        let identity_rows = ArgValue::rows([[1, 0, 0, 0], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]);
        let flat = ArgValue::list([1, 0, 0, 0, 1, 0, 0, 0, 1]);
        let euler = ArgValue::list([0, 0, 0]);

        for arg in [identity_rows, flat, euler] {
            assert_eq!(normalize(AttrType::Rotation, &arg, false), Some(AttrValue::Rotation(math::IDENTITY)));
        }
        assert_eq!(normalize(AttrType::Rotation, &ArgValue::list([1, 2]), false), None);
        assert_eq!(normalize(AttrType::Rotation, &ArgValue::rows([[1, 0], [0, 1]]), false), None);
    }

    #[test]
    fn test_choice_validation() {
        let err = resolve(&sample(), &Args::new().with("blend", "screen"), &AmbientDefaults::new()).unwrap_err();
        assert!(matches!(err, SceneError::TypeMismatch { ref name, .. } if name == "blend"));
    }

    #[test]
    fn test_integral_float_accepted_for_int() {
        assert_eq!(normalize(AttrType::Int, &ArgValue::Float(12.0), false), Some(AttrValue::Int(12)));
        assert_eq!(normalize(AttrType::Int, &ArgValue::Float(12.5), false), None);
    }

    #[test]
    fn test_out_of_range_float_rejected_for_int() {
        assert_eq!(normalize(AttrType::Int, &ArgValue::Float(1.0e30), false), None);
        assert_eq!(normalize(AttrType::Int, &ArgValue::Float(-1.0e30), false), None);
        assert_eq!(normalize(AttrType::Int, &ArgValue::Float(f64::INFINITY), false), None);
        assert_eq!(normalize(AttrType::Int, &ArgValue::Float(f64::NAN), false), None);
        assert_eq!(
            normalize(AttrType::Int, &ArgValue::Float(-9_223_372_036_854_775_808.0), false),
            Some(AttrValue::Int(i64::MIN))
        );

        let schema = Schema::new("Sphere").slot(Slot::new("segments", AttrType::Int).with_default(AttrValue::Int(24)));
        let args = Args::new().with("segments", 1.0e30);
        let err = resolve(&schema, &args, &AmbientDefaults::new()).unwrap_err();
        assert!(matches!(err, SceneError::TypeMismatch { ref name, .. } if name == "segments"));
    }
}
