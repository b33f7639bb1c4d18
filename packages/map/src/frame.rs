//! Render model: everything one frame of the map shows, in screen space.
//!
//! A [`MapFrame`] is produced by [`crate::MapView::frame`] and consumed by
//! [`crate::svg::render`]. It is also serializable so a browser host can
//! draw it itself.

use std::fmt::Write as _;

use bakery_map_enrich::FailureKind;
use bakery_map_geography::normalize::to_multipolygon;
use bakery_map_stock_models::{StockStatus, policy::LegendEntry};
use geo::{LineString, MultiPolygon};
use serde::Serialize;

use crate::{config::DisplayMode, popup::PopupView, projection::Projection, state::StatusFilter};

/// Paint for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionPaint {
    /// Region code.
    pub code: String,
    /// Region name, shown in the tooltip.
    pub name: String,
    /// Derived status, regardless of the filter.
    pub status: StockStatus,
    /// Fill color after the filter is applied.
    pub fill: &'static str,
    /// Whether the active filter hides this region's color.
    pub filtered_out: bool,
    /// Whether this is the selected region.
    pub selected: bool,
    /// SVG path data in screen coordinates. Empty without geometry.
    pub path: String,
    /// Attention marker at the centroid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
}

/// Pulsing marker drawn over regions that need attention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Screen x.
    pub x: f64,
    /// Screen y.
    pub y: f64,
    /// Marker color.
    pub color: &'static str,
}

/// One status filter button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterButton {
    /// Filter applied by the button.
    pub filter: StatusFilter,
    /// Button label.
    pub label: &'static str,
    /// Whether this filter is the active one.
    pub active: bool,
}

/// Zoom, reset and filter controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    /// Zoom-in is possible.
    pub can_zoom_in: bool,
    /// Zoom-out is possible.
    pub can_zoom_out: bool,
    /// Filter buttons, "all" first.
    pub filters: Vec<FilterButton>,
}

/// Hover tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    /// Pointer x.
    pub x: f64,
    /// Pointer y.
    pub y: f64,
    /// Region name.
    pub text: String,
}

/// Banner shown after a failed refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    /// Failure classification.
    pub kind: FailureKind,
    /// Banner text.
    pub message: &'static str,
    /// Label of the retry button.
    pub retry_label: &'static str,
}

impl Notice {
    /// The banner for a failure of `kind`.
    #[must_use]
    pub const fn for_failure(kind: FailureKind) -> Self {
        let message = match kind {
            FailureKind::StatisticsUnavailable => {
                "No se pudieron actualizar las estadísticas. Se muestran los últimos datos."
            }
            FailureKind::MapUnavailable => "Mapa no disponible.",
        };
        Self {
            kind,
            message,
            retry_label: "Reintentar",
        }
    }
}

/// One complete frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapFrame {
    /// Viewport width in pixels.
    pub width: u32,
    /// Viewport height in pixels.
    pub height: u32,
    /// Interactive or display-only.
    pub mode: DisplayMode,
    /// Current zoom level.
    pub zoom: f64,
    /// Current center as `[lon, lat]`.
    pub center: [f64; 2],
    /// Active status filter.
    pub status_filter: StatusFilter,
    /// Region paint in document order.
    pub regions: Vec<RegionPaint>,
    /// Legend rows.
    pub legend: Vec<LegendEntry>,
    /// Controls, interactive mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<Controls>,
    /// Popup for the selected region, interactive mode only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popup: Option<PopupView>,
    /// Hover tooltip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
    /// Refresh failure banner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl MapFrame {
    /// Paint of the region with `code`.
    #[must_use]
    pub fn region(&self, code: &str) -> Option<&RegionPaint> {
        self.regions.iter().find(|r| r.code == code)
    }
}

/// Filter buttons for every status, "all" first.
pub(crate) fn filter_buttons(active: StatusFilter) -> Vec<FilterButton> {
    std::iter::once((StatusFilter::All, "Todos"))
        .chain(
            StockStatus::all()
                .iter()
                .map(|&s| (StatusFilter::Only(s), bakery_map_stock_models::policy::label(s))),
        )
        .map(|(filter, label)| FilterButton {
            filter,
            label,
            active: filter == active,
        })
        .collect()
}

/// SVG path data for a `GeoJSON` geometry under `projection`.
pub(crate) fn path_data(geometry: Option<&geojson::Geometry>, projection: &Projection) -> String {
    let Some(polygons) = geometry.and_then(to_multipolygon) else {
        return String::new();
    };
    multipolygon_path(&polygons, projection)
}

fn multipolygon_path(polygons: &MultiPolygon<f64>, projection: &Projection) -> String {
    let mut path = String::new();
    for polygon in polygons {
        ring_path(&mut path, polygon.exterior(), projection);
        for interior in polygon.interiors() {
            ring_path(&mut path, interior, projection);
        }
    }
    path
}

fn ring_path(path: &mut String, ring: &LineString<f64>, projection: &Projection) {
    for (i, coord) in ring.coords().enumerate() {
        let (x, y) = projection.project(coord.x, coord.y);
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(path, "{command}{x:.1},{y:.1}");
    }
    if !ring.0.is_empty() {
        path.push('Z');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_buttons_mark_active() {
        let buttons = filter_buttons(StatusFilter::Only(StockStatus::Critical));
        assert_eq!(buttons.len(), StockStatus::all().len() + 1);
        assert_eq!(buttons[0].filter, StatusFilter::All);
        let active: Vec<_> = buttons.iter().filter(|b| b.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].label, "Crítico");
    }

    #[test]
    fn square_path_has_one_closed_ring() {
        let ring = vec![
            vec![-76.0, -12.0],
            vec![-75.0, -12.0],
            vec![-75.0, -11.0],
            vec![-76.0, -11.0],
            vec![-76.0, -12.0],
        ];
        let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![ring]));
        let projection = Projection::new([-75.5, -11.5], 1000.0, 600.0, 800.0);
        let path = path_data(Some(&geometry), &projection);
        assert!(path.starts_with('M'));
        assert_eq!(path.matches('Z').count(), 1);
        assert_eq!(path.matches('L').count(), 4);
    }

    #[test]
    fn missing_geometry_has_empty_path() {
        let projection = Projection::new([0.0, 0.0], 1.0, 10.0, 10.0);
        assert!(path_data(None, &projection).is_empty());
    }

    #[test]
    fn notice_distinguishes_failures() {
        let stale = Notice::for_failure(FailureKind::StatisticsUnavailable);
        let down = Notice::for_failure(FailureKind::MapUnavailable);
        assert_ne!(stale.message, down.message);
        assert_eq!(down.retry_label, "Reintentar");
    }
}
