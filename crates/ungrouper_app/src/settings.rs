// SPDX-License-Identifier: MIT OR Apache-2.0
//! Ungrouper settings.
//!
//! Stored next to the scene as `ungrouper.ron`. A missing file means the
//! defaults below.

use crate::scene::ObjectScope;
use serde::{Deserialize, Serialize};
use std::path::Path;
use ungrouper_graph::rewrite::ungroup::DEFAULT_MAX_PASSES;

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Settings file name
pub const SETTINGS_FILE_NAME: &str = "ungrouper.ron";

/// Operator and runner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UngrouperSettings {
    /// Settings format version
    pub version: u32,
    /// Delay between batch ticks in milliseconds
    pub timer_interval_ms: u64,
    /// Bound on ungroup attempts per material
    pub max_passes: usize,
    /// Objects the batch visits
    pub object_scope: ObjectScope,
    /// Repair UV map nodes before ungrouping
    pub fix_uv_maps: bool,
    /// `tracing` filter directive
    pub log_filter: String,
}

impl Default for UngrouperSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            timer_interval_ms: 10,
            max_passes: DEFAULT_MAX_PASSES,
            object_scope: ObjectScope::All,
            fix_uv_maps: true,
            log_filter: "ungrouper_app=info,ungrouper_graph=info".to_string(),
        }
    }
}

impl UngrouperSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: UngrouperSettings = ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Settings version {} is newer than supported version {}",
                    settings.version, SETTINGS_FORMAT_VERSION
                ),
            ));
        }

        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> std::io::Result<Self> {
        match Self::load(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            other => other,
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = UngrouperSettings::default();
        assert_eq!(settings.timer_interval_ms, 10);
        assert_eq!(settings.object_scope, ObjectScope::All);
        assert!(settings.fix_uv_maps);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("{}-{SETTINGS_FILE_NAME}", uuid::Uuid::new_v4()));
        let settings = UngrouperSettings::load_or_default(&path).unwrap();
        assert_eq!(settings, UngrouperSettings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings: UngrouperSettings =
            ron::from_str("(object_scope: Selected, timer_interval_ms: 50)").unwrap();
        assert_eq!(settings.object_scope, ObjectScope::Selected);
        assert_eq!(settings.timer_interval_ms, 50);
        assert_eq!(settings.max_passes, DEFAULT_MAX_PASSES);
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("{}-{SETTINGS_FILE_NAME}", uuid::Uuid::new_v4()));
        let settings = UngrouperSettings {
            fix_uv_maps: false,
            log_filter: "debug".to_string(),
            ..Default::default()
        };
        settings.save(&path).unwrap();
        let loaded = UngrouperSettings::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_newer_version_rejected() {
        let result: Result<UngrouperSettings, _> = ron::from_str("(version: 99)");
        let settings = result.unwrap();
        let path = std::env::temp_dir().join(format!("{}-{SETTINGS_FILE_NAME}", uuid::Uuid::new_v4()));
        settings.save(&path).unwrap();
        let err = UngrouperSettings::load(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
