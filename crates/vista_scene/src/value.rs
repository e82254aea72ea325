// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attribute shapes, finalized values and caller-supplied arguments.

use crate::node::NodeId;
use crate::types::NodeCategory;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape accepted by an attribute slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrType {
    /// Boolean flag
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// 3D vector (position, direction, scale)
    Vector3,
    /// RGBA color
    Color,
    /// 3x3 rotation matrix
    Rotation,
    /// Free-form string (names, file references)
    String,
    /// One of a fixed set of mode names
    Choice(&'static [&'static str]),
    /// Handle to a node of the given category
    Handle(NodeCategory),
}

impl AttrType {
    /// Check whether a finalized value has this shape
    pub fn admits(&self, value: &AttrValue) -> bool {
        match (self, value) {
            (Self::Bool, AttrValue::Bool(_))
            | (Self::Int, AttrValue::Int(_))
            | (Self::Float, AttrValue::Float(_))
            | (Self::Vector3, AttrValue::Vector3(_))
            | (Self::Color, AttrValue::Color(_))
            | (Self::Rotation, AttrValue::Rotation(_))
            | (Self::String, AttrValue::String(_))
            | (Self::Handle(_), AttrValue::Handle(_)) => true,
            (Self::Choice(options), AttrValue::String(s)) => options.contains(&s.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Vector3 => f.write_str("vector3"),
            Self::Color => f.write_str("color"),
            Self::Rotation => f.write_str("rotation"),
            Self::String => f.write_str("string"),
            Self::Choice(options) => write!(f, "one of [{}]", options.join(", ")),
            Self::Handle(category) => write!(f, "{category:?} handle"),
        }
    }
}

/// Finalized attribute value, in canonical form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f32),
    /// 3D vector
    Vector3([f32; 3]),
    /// RGBA color
    Color([f32; 4]),
    /// Row-major 3x3 rotation
    Rotation([[f32; 3]; 3]),
    /// String (also used for choice values)
    String(String),
    /// Embedded node handle
    Handle(NodeId),
}

impl AttrValue {
    /// Boolean payload
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float payload
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Vector payload
    pub fn as_vector3(&self) -> Option<[f32; 3]> {
        match self {
            Self::Vector3(v) => Some(*v),
            _ => None,
        }
    }

    /// Color payload
    pub fn as_color(&self) -> Option<[f32; 4]> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Rotation payload
    pub fn as_rotation(&self) -> Option<[[f32; 3]; 3]> {
        match self {
            Self::Rotation(m) => Some(*m),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Handle payload
    pub fn as_handle(&self) -> Option<NodeId> {
        match self {
            Self::Handle(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<AttrValue> for ArgValue {
    fn from(value: AttrValue) -> Self {
        match value {
            AttrValue::Bool(b) => Self::Bool(b),
            AttrValue::Int(i) => Self::Int(i),
            AttrValue::Float(v) => Self::Float(f64::from(v)),
            AttrValue::Vector3(v) => Self::Vector3(v),
            AttrValue::Color(c) => Self::Color(c),
            AttrValue::Rotation(m) => Self::Rotation(m),
            AttrValue::String(s) => Self::String(s),
            AttrValue::Handle(id) => Self::Handle(id),
        }
    }
}

/// Value supplied by the caller, before normalization
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Structured 3D vector
    Vector3([f32; 3]),
    /// Structured RGBA color
    Color([f32; 4]),
    /// Structured rotation matrix
    Rotation([[f32; 3]; 3]),
    /// Plain ordered numbers (triple, quad, flattened matrix)
    List(Vec<f64>),
    /// Matrix-like rows of numbers
    Rows(Vec<Vec<f64>>),
    /// String
    String(String),
    /// Handle returned by an earlier construction call
    Handle(NodeId),
}

impl ArgValue {
    /// Build a plain numeric tuple
    pub fn list<T: Into<f64>>(values: impl IntoIterator<Item = T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    /// Build matrix-like rows
    pub fn rows<R, T>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        Self::Rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Short description of the supplied shape, for error messages
    pub fn describe(&self) -> String {
        match self {
            Self::Bool(_) => "bool".to_string(),
            Self::Int(_) => "int".to_string(),
            Self::Float(_) => "float".to_string(),
            Self::Vector3(_) => "vector3".to_string(),
            Self::Color(_) => "color".to_string(),
            Self::Rotation(_) => "rotation".to_string(),
            Self::List(values) => format!("list of {}", values.len()),
            Self::Rows(rows) => format!("{} rows", rows.len()),
            Self::String(s) => format!("string {s:?}"),
            Self::Handle(_) => "handle".to_string(),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ArgValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for ArgValue {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NodeId> for ArgValue {
    fn from(value: NodeId) -> Self {
        Self::Handle(value)
    }
}

impl<T: Into<f64>> From<[T; 3]> for ArgValue {
    fn from(value: [T; 3]) -> Self {
        Self::Vector3(value.map(|c| c.into() as f32))
    }
}

impl<T: Into<f64>> From<[T; 4]> for ArgValue {
    fn from(value: [T; 4]) -> Self {
        Self::Color(value.map(|c| c.into() as f32))
    }
}

impl From<Vec<f64>> for ArgValue {
    fn from(value: Vec<f64>) -> Self {
        Self::List(value)
    }
}

/// Keyword arguments of one construction call, in call order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: IndexMap<String, ArgValue>,
}

impl Args {
    /// Create an empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument (builder style)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Set an argument, replacing any earlier value for the same key
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Get an argument
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    /// Check if an argument is present
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate over arguments in call order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay another argument list; its values win
    pub fn merged(mut self, overrides: Args) -> Self {
        for (name, value) in overrides.values {
            self.values.insert(name, value);
        }
        self
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no arguments were supplied
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Args::new();
        for (name, value) in iter {
            args.set(name, value);
        }
        args
    }
}
