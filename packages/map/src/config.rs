//! Map view configuration.
//!
//! The defaults live in `config/map.toml`, embedded at compile time. Hosts
//! can override any subset of the keys with their own TOML.

use bakery_map_geography_models::BoundaryFieldMapping;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::ConfigError;

/// Embedded default configuration.
const DEFAULT_CONFIG_TOML: &str = include_str!("../config/map.toml");

/// Whether the map shows its interactive chrome.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum DisplayMode {
    /// Admin dashboard: zoom and filter buttons, popups.
    #[default]
    Interactive,
    /// Public home page: the choropleth only.
    DisplayOnly,
}

/// Viewport size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Complete map configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial center as `[lon, lat]`.
    pub center: [f64; 2],
    /// Initial zoom level.
    pub zoom: f64,
    /// Smallest allowed zoom level.
    pub min_zoom: f64,
    /// Largest allowed zoom level.
    pub max_zoom: f64,
    /// Factor applied by one zoom-in or zoom-out step.
    pub zoom_factor: f64,
    /// Interactive or display-only.
    #[serde(default)]
    pub mode: DisplayMode,
    /// Viewport size.
    pub viewport: ViewportSize,
    /// Boundary feature property names.
    #[serde(default)]
    pub fields: BoundaryFieldMapping,
}

/// A partial configuration; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigOverrides {
    center: Option<[f64; 2]>,
    zoom: Option<f64>,
    min_zoom: Option<f64>,
    max_zoom: Option<f64>,
    zoom_factor: Option<f64>,
    mode: Option<DisplayMode>,
    viewport: Option<ViewportSize>,
    fields: Option<BoundaryFieldMapping>,
}

impl MapConfig {
    /// Returns the embedded default configuration.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML fails to parse or validate. It is a
    /// compile-time constant, so a failure is a development error and is
    /// caught by the test suite.
    #[must_use]
    pub fn embedded() -> Self {
        let config: Self = toml::from_str(DEFAULT_CONFIG_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse embedded map config: {e}"));
        config
            .validate()
            .unwrap_or_else(|e| panic!("Invalid embedded map config: {e}"));
        config
    }

    /// Applies the keys present in `toml_str` on top of `self`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the TOML is malformed or the merged
    /// configuration is invalid.
    pub fn merge_toml(mut self, toml_str: &str) -> Result<Self, ConfigError> {
        let overrides: ConfigOverrides = toml::from_str(toml_str)?;

        if let Some(center) = overrides.center {
            self.center = center;
        }
        if let Some(zoom) = overrides.zoom {
            self.zoom = zoom;
        }
        if let Some(min_zoom) = overrides.min_zoom {
            self.min_zoom = min_zoom;
        }
        if let Some(max_zoom) = overrides.max_zoom {
            self.max_zoom = max_zoom;
        }
        if let Some(zoom_factor) = overrides.zoom_factor {
            self.zoom_factor = zoom_factor;
        }
        if let Some(mode) = overrides.mode {
            self.mode = mode;
        }
        if let Some(viewport) = overrides.viewport {
            self.viewport = viewport;
        }
        if let Some(fields) = overrides.fields {
            self.fields = fields;
        }

        self.validate()?;
        Ok(self)
    }

    /// Same configuration in display-only mode.
    #[must_use]
    pub fn display_only(mut self) -> Self {
        self.mode = DisplayMode::DisplayOnly;
        self
    }

    /// Checks the zoom bounds, zoom factor, center and viewport.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return invalid(format!(
                "zoom bounds must satisfy 0 < min_zoom <= max_zoom (got {}..{})",
                self.min_zoom, self.max_zoom
            ));
        }
        if !(self.min_zoom..=self.max_zoom).contains(&self.zoom) {
            return invalid(format!(
                "zoom {} outside [{}, {}]",
                self.zoom, self.min_zoom, self.max_zoom
            ));
        }
        if !(self.zoom_factor > 1.0 && self.zoom_factor.is_finite()) {
            return invalid(format!("zoom_factor must be > 1 (got {})", self.zoom_factor));
        }
        let [lon, lat] = self.center;
        if !((-180.0..=180.0).contains(&lon) && (-85.0..=85.0).contains(&lat)) {
            return invalid(format!("center [{lon}, {lat}] out of range"));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return invalid("viewport must be non-empty".to_string());
        }
        Ok(())
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::embedded()
    }
}
