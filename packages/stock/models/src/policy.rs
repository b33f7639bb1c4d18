//! Display color and label for each [`StockStatus`].
//!
//! This table is the single source of truth for status presentation. The
//! choropleth fill, the legend and the region popup all read from it.

use serde::Serialize;

use crate::StockStatus;

/// Fill used for regions hidden by the active status filter.
pub const FILTERED_OUT_COLOR: &str = "#e5e7eb";

/// Returns the display color (CSS hex) for a status.
#[must_use]
pub const fn color(status: StockStatus) -> &'static str {
    match status {
        StockStatus::Normal => "#22c55e",
        StockStatus::Low => "#eab308",
        StockStatus::Critical => "#ef4444",
        StockStatus::NeedsReorder => "#f97316",
        StockStatus::Inactive => "#a855f7",
        StockStatus::NoData => "#9ca3af",
    }
}

/// Returns the human-readable label for a status.
#[must_use]
pub const fn label(status: StockStatus) -> &'static str {
    match status {
        StockStatus::Normal => "Normal",
        StockStatus::Low => "Stock bajo",
        StockStatus::Critical => "Crítico",
        StockStatus::NeedsReorder => "Requiere reposición",
        StockStatus::Inactive => "Inactivo",
        StockStatus::NoData => "Sin datos",
    }
}

/// Color for a raw status string.
///
/// Unrecognized values get the [`StockStatus::NoData`] color.
#[must_use]
pub fn color_of(raw: &str) -> &'static str {
    color(StockStatus::parse_lenient(raw).unwrap_or_default())
}

/// Label for a raw status string.
///
/// Unrecognized values get the [`StockStatus::NoData`] label.
#[must_use]
pub fn label_of(raw: &str) -> &'static str {
    label(StockStatus::parse_lenient(raw).unwrap_or_default())
}

/// One row of the map legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Status this row describes.
    pub status: StockStatus,
    /// Display label.
    pub label: &'static str,
    /// Display color.
    pub color: &'static str,
}

/// Legend rows for every status, in [`StockStatus::all`] order.
#[must_use]
pub fn legend() -> Vec<LegendEntry> {
    StockStatus::all()
        .iter()
        .map(|&status| LegendEntry {
            status,
            label: label(status),
            color: color(status),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn every_status_has_color_and_label() {
        for &status in StockStatus::all() {
            assert!(!color(status).is_empty(), "{status} has empty color");
            assert!(!label(status).is_empty(), "{status} has empty label");
            assert!(color(status).starts_with('#'), "{status} color not hex");
        }
    }

    #[test]
    fn colors_are_distinct() {
        let colors: BTreeSet<_> = StockStatus::all().iter().map(|s| color(*s)).collect();
        assert_eq!(colors.len(), StockStatus::all().len());
        assert!(!colors.contains(FILTERED_OUT_COLOR));
    }

    #[test]
    fn raw_lookups_agree_with_enum_lookups() {
        assert_eq!(color_of("critical"), color(StockStatus::Critical));
        assert_eq!(label_of("NEEDS_REORDER"), label(StockStatus::NeedsReorder));
    }

    #[test]
    fn unrecognized_values_fall_back_to_no_data() {
        for raw in ["", "unknown", "42", "normalish"] {
            assert_eq!(color_of(raw), color(StockStatus::NoData));
            assert_eq!(label_of(raw), label(StockStatus::NoData));
        }
    }

    #[test]
    fn legend_covers_all_statuses_in_order() {
        let rows = legend();
        let statuses: Vec<_> = rows.iter().map(|r| r.status).collect();
        assert_eq!(statuses, StockStatus::all());
        assert_eq!(rows[0].color, "#22c55e");
        assert_eq!(rows[4].color, "#a855f7");
    }
}
