// SPDX-License-Identifier: MIT OR Apache-2.0
//! Texture node type.
//!
//! A leaf node: `image` is an opaque resource identifier that is never
//! loaded here; the sampling modes are carried for the renderer.

use crate::schema::{Schema, Slot};
use crate::value::{AttrType, AttrValue};
use std::sync::LazyLock;

/// Accepted wrap modes
pub const WRAP_MODES: &[&str] = &["repeat", "clamp", "mirror"];

/// Accepted filter modes
pub const FILTER_MODES: &[&str] = &["nearest", "linear", "mipmap"];

static TEXTURE: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("Texture")
        .slot(Slot::new("image", AttrType::String))
        .slot(Slot::new("wrap_s", AttrType::Choice(WRAP_MODES)).with_default(AttrValue::String("repeat".to_string())))
        .slot(Slot::new("wrap_t", AttrType::Choice(WRAP_MODES)).with_default(AttrValue::String("repeat".to_string())))
        .slot(Slot::new("filter", AttrType::Choice(FILTER_MODES)).with_default(AttrValue::String("linear".to_string())))
});

pub(crate) fn schema() -> &'static Schema {
    &TEXTURE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SceneError;
    use crate::resolve::{resolve, AmbientDefaults};
    use crate::value::Args;

    #[test]
    fn test_image_is_opaque() {
        let args = Args::new().with("image", "textures/../brick.png").with("filter", "mipmap");
        let attrs = resolve(schema(), &args, &AmbientDefaults::new()).unwrap().attributes;
        assert_eq!(attrs.string("image"), Some("textures/../brick.png"));
        assert_eq!(attrs.string("wrap_t"), Some("repeat"));
        assert_eq!(attrs.string("filter"), Some("mipmap"));
    }

    #[test]
    fn test_unknown_wrap_mode() {
        let err = resolve(schema(), &Args::new().with("wrap_s", "border"), &AmbientDefaults::new())
            .unwrap_err();
        assert!(matches!(err, SceneError::TypeMismatch { ref name, .. } if name == "wrap_s"));
    }
}
