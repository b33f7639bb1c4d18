//! The enriched boundary document and its dashboard summary.

use std::collections::BTreeMap;

use bakery_map_geography_models::Region;
use bakery_map_stock_models::{EnrichedRegionProperties, StockStatus};
use geojson::{Feature, FeatureCollection};
use serde::Serialize;

/// One region with its derived properties.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRegion {
    /// The region as read from the boundary document.
    pub region: Region,
    /// Derived stock properties.
    pub properties: EnrichedRegionProperties,
}

impl EnrichedRegion {
    /// Converts the region into a `GeoJSON` feature.
    ///
    /// Properties are a shallow copy of the original feature properties
    /// with the derived properties layered on top.
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        let mut properties = self.region.properties.clone();
        if let Ok(serde_json::Value::Object(derived)) = serde_json::to_value(&self.properties) {
            properties.extend(derived);
        }
        if let Some([lon, lat]) = self.region.centroid {
            properties.insert("centroid".to_string(), serde_json::json!([lon, lat]));
        }

        Feature {
            bbox: None,
            geometry: self.region.geometry.clone(),
            id: Some(geojson::feature::Id::String(self.region.code.clone())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Output of one enrichment run. Rebuilt wholesale on every refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedBoundaryDocument {
    regions: Vec<EnrichedRegion>,
}

impl EnrichedBoundaryDocument {
    /// Wraps enriched regions, in boundary document order.
    #[must_use]
    pub const fn new(regions: Vec<EnrichedRegion>) -> Self {
        Self { regions }
    }

    /// All regions, in boundary document order.
    #[must_use]
    pub fn regions(&self) -> &[EnrichedRegion] {
        &self.regions
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the document has no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Looks up a region by its code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&EnrichedRegion> {
        self.regions.iter().find(|r| r.region.code == code)
    }

    /// Converts the document into a `GeoJSON` `FeatureCollection`.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.regions.iter().map(EnrichedRegion::to_feature).collect(),
            foreign_members: None,
        }
    }

    /// Aggregates region statuses and branch counts for dashboard cards.
    #[must_use]
    pub fn summary(&self) -> StatusSummary {
        let mut summary = StatusSummary::default();
        for status in StockStatus::all() {
            summary.regions_by_status.insert(*status, 0);
        }

        for region in &self.regions {
            let props = &region.properties;
            *summary.regions_by_status.entry(props.status).or_default() += 1;
            summary.total_branches += u64::from(props.total_branches);
            summary.active_branches += u64::from(props.active_branches);
            summary.inactive_branches += u64::from(props.inactive_branches);
            summary.branches_needing_reorder += u64::from(props.branches_needing_reorder);
            if let Some(pending) = props.pending_requests {
                *summary.pending_requests.get_or_insert(0) += u64::from(pending);
            }
        }

        summary
    }
}

/// National totals across all regions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    /// Number of regions in each status. Every status is present.
    pub regions_by_status: BTreeMap<StockStatus, usize>,
    /// Total branches.
    pub total_branches: u64,
    /// Active branches.
    pub active_branches: u64,
    /// Inactive branches.
    pub inactive_branches: u64,
    /// Branches that need to reorder.
    pub branches_needing_reorder: u64,
    /// Open supply requests, if any region reports them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<u64>,
}
