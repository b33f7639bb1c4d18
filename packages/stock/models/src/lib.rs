#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Stock status types shared across the bakery map system.
//!
//! Defines the closed set of inventory-health categories a department can
//! be in, the read-only statistics rows supplied by the back office, and
//! the enriched per-region properties that the map and its host pages
//! consume. The display color and label of every status live in
//! [`policy`] so that every renderer agrees on them.

pub mod policy;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Inventory-health category derived for a region.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum StockStatus {
    /// Stock levels are healthy.
    Normal,
    /// Stock is running low in at least some branches.
    Low,
    /// Stock is critically low.
    Critical,
    /// One or more branches must place a reorder.
    #[serde(alias = "needs_reorder")]
    NeedsReorder,
    /// Every branch in the region is inactive.
    Inactive,
    /// No statistics are available for the region.
    #[default]
    #[serde(alias = "no_data")]
    NoData,
}

impl StockStatus {
    /// Returns all variants of this enum, in legend order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Normal,
            Self::Low,
            Self::Critical,
            Self::NeedsReorder,
            Self::Inactive,
            Self::NoData,
        ]
    }

    /// Parses a status as the back office writes it.
    ///
    /// Accepts any casing and `-`, `_` or space as the word separator
    /// (`"needs-reorder"`, `"NEEDS_REORDER"`, `"Needs Reorder"`).
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        normalized.parse().ok()
    }

    /// Whether regions in this status get a pulsing marker on the map.
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        matches!(self, Self::Critical | Self::NeedsReorder)
    }
}

/// Normalizes a region name for matching: trims surrounding whitespace
/// and lowercases.
///
/// `"Lima"`, `"lima"` and `" LIMA "` all normalize to `"lima"`.
#[must_use]
pub fn normalize_region_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Returns whether two region names refer to the same region.
#[must_use]
pub fn region_names_match(a: &str, b: &str) -> bool {
    normalize_region_name(a) == normalize_region_name(b)
}

/// Per-department stock rollup supplied by the statistics source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStat {
    /// Department (region) name as the back office spells it.
    pub region: String,
    /// Total number of branches in the department.
    pub total_branches: u32,
    /// Number of active branches.
    pub active_branches: u32,
    /// Number of inactive branches.
    pub inactive_branches: u32,
    /// Number of branches that need to reorder stock.
    pub branches_needing_reorder: u32,
    /// Number of provinces with at least one branch.
    pub province_count: u32,
    /// Aggregate status pre-computed by the back office.
    pub status: StockStatus,
    /// Open supply requests, when the source reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<u32>,
}

impl DepartmentStat {
    /// Whether every branch in the department is inactive.
    #[must_use]
    pub const fn all_inactive(&self) -> bool {
        self.inactive_branches > 0 && self.active_branches == 0
    }
}

/// A single branch as listed by the statistics source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDetail {
    /// Branch display name.
    pub name: String,
    /// Province the branch is in.
    pub province: String,
    /// Whether the branch is currently operating.
    pub active: bool,
    /// Department (region) that owns the branch.
    pub region: String,
}

/// Derived properties attached to one region by the enrichment pipeline.
///
/// Serialized field names match the `GeoJSON` feature properties the
/// dashboard reads (`totalBranches`, `displayColor`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedRegionProperties {
    /// Canonical region name from the boundary document.
    pub name: String,
    /// Stable region code.
    pub code: String,
    /// Derived status after the precedence rule.
    pub status: StockStatus,
    /// Total number of branches.
    pub total_branches: u32,
    /// Number of active branches.
    pub active_branches: u32,
    /// Number of inactive branches.
    pub inactive_branches: u32,
    /// Number of branches that need to reorder stock.
    pub branches_needing_reorder: u32,
    /// Number of provinces with branches.
    pub province_count: u32,
    /// Raw matched branch rows (not deduplicated).
    pub branch_details: Vec<BranchDetail>,
    /// Fill color from [`policy::color`] for `status`.
    pub display_color: String,
    /// Open supply requests (home-page variant only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<u32>,
}

impl EnrichedRegionProperties {
    /// Properties for a region with no matching statistics.
    #[must_use]
    pub fn no_data(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            status: StockStatus::NoData,
            total_branches: 0,
            active_branches: 0,
            inactive_branches: 0,
            branches_needing_reorder: 0,
            province_count: 0,
            branch_details: Vec::new(),
            display_color: policy::color(StockStatus::NoData).to_string(),
            pending_requests: None,
        }
    }

    /// Branch rows for branches that are currently active.
    pub fn active_branch_details(&self) -> impl Iterator<Item = &BranchDetail> {
        self.branch_details.iter().filter(|b| b.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_any_separator_and_case() {
        assert_eq!(
            StockStatus::parse_lenient("needs-reorder"),
            Some(StockStatus::NeedsReorder)
        );
        assert_eq!(
            StockStatus::parse_lenient("NEEDS_REORDER"),
            Some(StockStatus::NeedsReorder)
        );
        assert_eq!(
            StockStatus::parse_lenient(" Needs Reorder "),
            Some(StockStatus::NeedsReorder)
        );
        assert_eq!(StockStatus::parse_lenient("No_Data"), Some(StockStatus::NoData));
        assert_eq!(StockStatus::parse_lenient("bogus"), None);
    }

    #[test]
    fn status_serializes_kebab_case() {
        let json = serde_json::to_string(&StockStatus::NeedsReorder).unwrap();
        assert_eq!(json, "\"needs-reorder\"");
        let back: StockStatus = serde_json::from_str("\"no_data\"").unwrap();
        assert_eq!(back, StockStatus::NoData);
    }

    #[test]
    fn region_names_match_ignoring_case_and_padding() {
        for name in ["Lima", "lima", " Lima ", "LIMA\t"] {
            assert!(region_names_match(name, "lima"), "{name:?} should match");
        }
        assert!(!region_names_match("Lima", "Callao"));
    }

    #[test]
    fn all_inactive_requires_no_active_branches() {
        let mut stat = DepartmentStat {
            region: "Trujillo".to_string(),
            total_branches: 2,
            active_branches: 0,
            inactive_branches: 2,
            branches_needing_reorder: 0,
            province_count: 1,
            status: StockStatus::Normal,
            pending_requests: None,
        };
        assert!(stat.all_inactive());
        stat.active_branches = 1;
        assert!(!stat.all_inactive());
        stat.active_branches = 0;
        stat.inactive_branches = 0;
        assert!(!stat.all_inactive());
    }

    #[test]
    fn enriched_properties_use_dashboard_field_names() {
        let props = EnrichedRegionProperties::no_data("Cusco", "08");
        let json = serde_json::to_value(&props).unwrap();
        assert_eq!(json["status"], "no-data");
        assert_eq!(json["totalBranches"], 0);
        assert_eq!(json["branchDetails"], serde_json::json!([]));
        assert!(json.get("pendingRequests").is_none());
    }
}
