// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments.

use crate::scene::ObjectScope;
use crate::settings::{UngrouperSettings, SETTINGS_FILE_NAME};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Ungroup every shader node group in the materials of a scene
#[derive(Parser, Debug)]
#[command(name = "ungrouper")]
#[command(version, about = "Ungroups shader node groups in the materials of a scene")]
pub struct Cli {
    /// Scene file (.ron or .json)
    pub scene: PathBuf,

    /// Where to write the result; defaults to overwriting the scene
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Settings file; defaults to ungrouper.ron next to the scene
    #[arg(short, long, env = "UNGROUPER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Only process selected objects
    #[arg(long)]
    pub selected_only: bool,

    /// Skip the UV map repair
    #[arg(long)]
    pub no_uv_fix: bool,

    /// Delay between batch ticks in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Log filter directive, overrides the settings file
    #[arg(long, env = "UNGROUPER_LOG")]
    pub log_filter: Option<String>,
}

impl Cli {
    /// Settings file to read
    pub fn settings_path(&self) -> PathBuf {
        match &self.config {
            Some(path) => path.clone(),
            None => self
                .scene
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(SETTINGS_FILE_NAME),
        }
    }

    /// File the result is written to
    pub fn output_path(&self) -> &Path {
        self.output.as_deref().unwrap_or(&self.scene)
    }

    /// Apply command line overrides
    pub fn apply(&self, settings: &mut UngrouperSettings) {
        if self.selected_only {
            settings.object_scope = ObjectScope::Selected;
        }
        if self.no_uv_fix {
            settings.fix_uv_maps = false;
        }
        if let Some(interval) = self.interval_ms {
            settings.timer_interval_ms = interval;
        }
        if let Some(filter) = &self.log_filter {
            settings.log_filter = filter.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_next_to_scene() {
        let cli = Cli::parse_from(["ungrouper", "scenes/shop.ron"]);
        assert_eq!(cli.settings_path(), Path::new("scenes").join(SETTINGS_FILE_NAME));
        assert_eq!(cli.output_path(), Path::new("scenes/shop.ron"));

        let mut settings = UngrouperSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings, UngrouperSettings::default());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "ungrouper",
            "shop.json",
            "-o",
            "flat.json",
            "-c",
            "custom.ron",
            "--selected-only",
            "--no-uv-fix",
            "--interval-ms",
            "0",
        ]);
        assert_eq!(cli.settings_path(), PathBuf::from("custom.ron"));
        assert_eq!(cli.output_path(), Path::new("flat.json"));

        let mut settings = UngrouperSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.object_scope, ObjectScope::Selected);
        assert!(!settings.fix_uv_maps);
        assert_eq!(settings.timer_interval_ms, 0);
    }
}
