// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session settings.
//!
//! This module manages settings for one authoring session:
//! - Scene name used when a script does not name one
//! - Ambient defaults installed before the script runs
//! - Error policy for failing statements
//! - Export format and destination

use crate::script::ScriptValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name looked up next to the script
pub const SETTINGS_FILE_NAME: &str = "vista.ron";

/// Errors raised while loading or saving settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("Settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid settings RON
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Settings could not be serialized
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),

    /// File was written by a newer version
    #[error("Settings version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest supported version
        supported: u32,
    },
}

/// Format of the exported scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Rusty Object Notation
    #[default]
    Ron,
    /// JSON
    Json,
}

impl ExportFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Ron => "ron",
            ExportFormat::Json => "json",
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Output format
    #[serde(default)]
    pub format: ExportFormat,
    /// Output file; standard output when unset
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Settings for one authoring session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Format version
    pub version: u32,
    /// Scene name used when the script does not name one
    #[serde(default = "default_scene_name")]
    pub scene_name: String,
    /// Ambient defaults installed before the script runs
    #[serde(default)]
    pub defaults: IndexMap<String, ScriptValue>,
    /// Stop at the first failing statement
    #[serde(default = "default_abort_on_error")]
    pub abort_on_error: bool,
    /// Export settings
    #[serde(default)]
    pub export: ExportSettings,
}

fn default_scene_name() -> String {
    "Untitled".to_string()
}

fn default_abort_on_error() -> bool {
    true
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            scene_name: default_scene_name(),
            defaults: IndexMap::new(),
            abort_on_error: default_abort_on_error(),
            export: ExportSettings::default(),
        }
    }
}

impl SessionSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse settings from RON text
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let settings: SessionSettings = ron::from_str(content)?;

        // Version check
        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        Ok(settings)
    }

    /// Serialize settings to RON text
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Save settings to a file
    #[allow(dead_code)] // Intentionally kept for API completeness
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Settings file path for a directory
    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(SETTINGS_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = SessionSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert!(settings.abort_on_error);
        assert!(settings.defaults.is_empty());
        assert_eq!(settings.export.format, ExportFormat::Ron);
        assert_eq!(settings.export.output, None);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let settings = SessionSettings::from_ron(
            r#"(version: 1, defaults: {"segments": Int(48)}, export: (format: Json))"#,
        )
        .unwrap();
        assert_eq!(settings.scene_name, "Untitled");
        assert!(settings.abort_on_error);
        assert_eq!(settings.defaults.get("segments"), Some(&ScriptValue::Int(48)));
        assert_eq!(settings.export.format, ExportFormat::Json);
        assert_eq!(settings.export.format.extension(), "json");
    }

    #[test]
    fn test_settings_serialization() {
        let mut settings = SessionSettings::default();
        settings.scene_name = "lobby".to_string();
        settings.abort_on_error = false;
        settings.export.output = Some(PathBuf::from("out/lobby.json"));

        let text = settings.to_ron().unwrap();
        let loaded = SessionSettings::from_ron(&text).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_newer_version_rejected() {
        let err = SessionSettings::from_ron("(version: 99)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnsupportedVersion { found: 99, supported: SETTINGS_FORMAT_VERSION }
        ));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("vista-settings-that-does-not-exist.ron");
        let settings = SessionSettings::load_or_default(&path).unwrap();
        assert_eq!(settings, SessionSettings::default());
    }

    #[test]
    fn test_file_path() {
        assert_eq!(
            SessionSettings::file_path(Path::new("scenes")),
            PathBuf::from("scenes").join(SETTINGS_FILE_NAME)
        );
    }
}
