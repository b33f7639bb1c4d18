//! Viewing state of the map.

use std::str::FromStr;

use bakery_map_stock_models::StockStatus;
use serde::{Deserialize, Serialize};

use crate::config::MapConfig;

/// Which statuses are painted in their own color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "status")]
pub enum StatusFilter {
    /// Every region keeps its status color.
    #[default]
    All,
    /// Only regions in this status keep their color.
    Only(StockStatus),
}

impl StatusFilter {
    /// Whether a region in `status` is painted in its own color.
    #[must_use]
    pub fn admits(self, status: StockStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(status) => write!(f, "{status}"),
        }
    }
}

/// Error returned when a filter string names no status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown status filter: {0}")]
pub struct UnknownFilter(pub String);

impl FromStr for StatusFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        StockStatus::parse_lenient(s)
            .map(Self::Only)
            .ok_or_else(|| UnknownFilter(s.to_string()))
    }
}

/// Whether a region is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    /// Nothing selected.
    Idle,
    /// A region is selected and, in interactive mode, its popup is open.
    RegionSelected,
}

/// Zoom, center, filter and selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Zoom level, within the configured bounds.
    pub zoom: f64,
    /// Map center as `[lon, lat]`.
    pub center: [f64; 2],
    /// Active status filter.
    pub status_filter: StatusFilter,
    /// Code of the selected region.
    pub selected: Option<String>,
}

impl ViewState {
    /// The initial state described by `config`.
    #[must_use]
    pub const fn initial(config: &MapConfig) -> Self {
        Self {
            zoom: config.zoom,
            center: config.center,
            status_filter: StatusFilter::All,
            selected: None,
        }
    }

    /// Current interaction mode.
    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        if self.selected.is_some() {
            InteractionMode::RegionSelected
        } else {
            InteractionMode::Idle
        }
    }
}
