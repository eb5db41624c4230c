use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Store-wide layout settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSettings {
    /// Grid pitch used when snapping positions
    pub grid_size: f64,
    /// Distance between auto-placed and arranged blocks
    pub default_spacing: f64,
    pub min_block_width: f64,
    pub min_block_height: f64,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            default_spacing: 300.0,
            min_block_width: 150.0,
            min_block_height: 100.0,
        }
    }
}

impl GraphSettings {
    /// Snap a coordinate to the nearest grid line, rounding half away from zero
    pub fn snap(&self, value: f64) -> f64 {
        if self.grid_size <= 0.0 {
            return value;
        }
        (value / self.grid_size).round() * self.grid_size
    }

    /// Shallow merge: fields present in `patch` win, missing ones are kept
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(grid_size) = patch.grid_size {
            self.grid_size = grid_size;
        }
        if let Some(default_spacing) = patch.default_spacing {
            self.default_spacing = default_spacing;
        }
        if let Some(min_block_width) = patch.min_block_width {
            self.min_block_width = min_block_width;
        }
        if let Some(min_block_height) = patch.min_block_height {
            self.min_block_height = min_block_height;
        }
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create settings file: {}", path.display()))?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .with_context(|| format!("Failed to write settings to: {}", path.display()))?;
        Ok(())
    }

    /// Load settings from a JSON file; keys missing from the file keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let patch: SettingsPatch = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse settings from: {}", path.display()))?;

        let mut settings = Self::default();
        settings.apply(&patch);
        Ok(settings)
    }
}

/// Partial settings as found in an imported document
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_block_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_block_height: Option<f64>,
}

impl From<&GraphSettings> for SettingsPatch {
    fn from(settings: &GraphSettings) -> Self {
        Self {
            grid_size: Some(settings.grid_size),
            default_spacing: Some(settings.default_spacing),
            min_block_width: Some(settings.min_block_width),
            min_block_height: Some(settings.min_block_height),
        }
    }
}
