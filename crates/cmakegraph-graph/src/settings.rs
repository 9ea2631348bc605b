use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidScale { name: &'static str, value: f32 },
    #[error("zoom range is empty: min {min} > max {max}")]
    EmptyZoomRange { min: f32, max: f32 },
}

/// Scale values controlling how the target graph is drawn and laid out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Local shape units to world units.
    pub node_scale: f32,
    pub text_scale: f32,
    pub arrow_length_scale: f32,
    pub arrow_width_scale: f32,
    /// Stipple period of interface connections as a fraction of the viewport width.
    pub line_stipple_scale: f32,
    pub zoom: ZoomSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    #[serde(default = "default_min_scale")]
    pub min_scale: f32,
    #[serde(default = "default_max_scale")]
    pub max_scale: f32,
    #[serde(default = "default_zoom_step")]
    pub step: f32,
}

fn default_min_scale() -> f32 {
    0.1
}

fn default_max_scale() -> f32 {
    2.0
}

fn default_zoom_step() -> f32 {
    0.1
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            step: default_zoom_step(),
        }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            node_scale: 25.0,
            text_scale: 3.0,
            arrow_length_scale: 9.3,
            arrow_width_scale: 3.15,
            line_stipple_scale: 0.01,
            zoom: ZoomSettings::default(),
        }
    }
}

impl GraphSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let scales = [
            ("node_scale", self.node_scale),
            ("text_scale", self.text_scale),
            ("arrow_length_scale", self.arrow_length_scale),
            ("arrow_width_scale", self.arrow_width_scale),
            ("line_stipple_scale", self.line_stipple_scale),
            ("zoom.min_scale", self.zoom.min_scale),
            ("zoom.max_scale", self.zoom.max_scale),
            ("zoom.step", self.zoom.step),
        ];
        for (name, value) in scales {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::InvalidScale { name, value });
            }
        }

        if self.zoom.min_scale > self.zoom.max_scale {
            return Err(SettingsError::EmptyZoomRange {
                min: self.zoom.min_scale,
                max: self.zoom.max_scale,
            });
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph settings from {}", path.display()))?;
        let settings: GraphSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        tracing::debug!("Loaded graph settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = GraphSettings::default();
        assert_eq!(settings.validate(), Ok(()));
        assert_eq!(settings.zoom.min_scale, 0.1);
        assert_eq!(settings.zoom.max_scale, 2.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: GraphSettings =
            serde_json::from_str(r#"{ "node_scale": 10.0, "zoom": { "step": 0.25 } }"#).unwrap();
        assert_eq!(settings.node_scale, 10.0);
        assert_eq!(settings.arrow_length_scale, 9.3);
        assert_eq!(settings.zoom.step, 0.25);
        assert_eq!(settings.zoom.max_scale, 2.0);
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let settings = GraphSettings {
            node_scale: 0.0,
            ..GraphSettings::default()
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::InvalidScale {
                name: "node_scale",
                value: 0.0
            })
        );

        let settings = GraphSettings {
            arrow_width_scale: f32::NAN,
            ..GraphSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_zoom_range() {
        let mut settings = GraphSettings::default();
        settings.zoom.min_scale = 3.0;
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::EmptyZoomRange { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");

        let mut settings = GraphSettings::default();
        settings.node_scale = 12.5;
        settings.save(&path).unwrap();

        let loaded = GraphSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, r#"{ "text_scale": -1.0 }"#).unwrap();

        let error = GraphSettings::load(&path).unwrap_err();
        assert!(error.to_string().contains("text_scale"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GraphSettings::load(&dir.path().join("missing.json")).is_err());
    }
}
