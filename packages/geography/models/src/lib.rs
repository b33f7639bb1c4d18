#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative region and boundary document types.
//!
//! A [`Region`] is one department polygon from the boundary document,
//! reduced to the handful of fields the map needs. Which feature
//! properties hold the name, code and centroid is described by a
//! [`BoundaryFieldMapping`], and where the document comes from by a
//! [`BoundarySource`].

pub mod departments;

use serde::{Deserialize, Serialize};

/// One administrative department from the boundary document.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Canonical region name. `None` when the feature lacks the name field.
    pub name: Option<String>,
    /// Stable region code.
    pub code: String,
    /// Polygon or multipolygon geometry, passed through untouched.
    pub geometry: Option<geojson::Geometry>,
    /// Marker position as `[lon, lat]`.
    pub centroid: Option<[f64; 2]>,
    /// The feature's original properties.
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Region {
    /// Name shown in tooltips and popups.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

/// Which feature properties carry the region fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryFieldMapping {
    /// Property holding the canonical region name.
    pub name: String,
    /// Property holding the region code.
    pub code: String,
    /// Property holding a `[lon, lat]` centroid, if the dataset has one.
    #[serde(default)]
    pub centroid: Option<String>,
}

impl Default for BoundaryFieldMapping {
    fn default() -> Self {
        Self {
            name: "NOMBDEP".to_string(),
            code: "FIRST_IDDP".to_string(),
            centroid: None,
        }
    }
}

/// Where to load the boundary document from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoundarySource {
    /// A `GeoJSON` `FeatureCollection` served over HTTP.
    Url {
        /// Versioned URL of the document.
        url: String,
    },
    /// A `GeoJSON` file on local disk.
    File {
        /// Path to the document.
        path: String,
    },
}

impl std::fmt::Display for BoundarySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url { url } => write!(f, "{url}"),
            Self::File { path } => write!(f, "file://{path}"),
        }
    }
}
