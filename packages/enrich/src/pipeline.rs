//! The enrichment join.
//!
//! For every boundary feature:
//!
//! 1. Find the department stat whose name matches the region name, ignoring
//!    case and surrounding whitespace.
//! 2. Derive the status: `no-data` without a stat, `inactive` when every
//!    branch is inactive, otherwise the stat's own status.
//! 3. Attach every branch row whose region matches, as-is.
//! 4. Color the region from the status policy.
//!
//! The input document is only borrowed; a fresh document is returned.

use std::collections::BTreeMap;

use bakery_map_geography::normalize;
use bakery_map_geography_models::BoundaryFieldMapping;
use bakery_map_stock_models::{
    BranchDetail, DepartmentStat, EnrichedRegionProperties, StockStatus, normalize_region_name,
    policy,
};
use geojson::GeoJson;

use crate::EnrichError;
use crate::document::{EnrichedBoundaryDocument, EnrichedRegion};

/// Derives the display status for a region from its matching stat.
///
/// An all-inactive department reads as `inactive` whatever status the
/// back office computed for it.
#[must_use]
pub const fn derive_status(stat: Option<&DepartmentStat>) -> StockStatus {
    match stat {
        None => StockStatus::NoData,
        Some(stat) if stat.all_inactive() => StockStatus::Inactive,
        Some(stat) => stat.status,
    }
}

/// Enriches a boundary document with one statistics snapshot.
///
/// # Errors
///
/// Returns [`EnrichError::NotACollection`] if `boundaries` is a bare
/// geometry or a single feature rather than a `FeatureCollection`.
pub fn enrich(
    boundaries: &GeoJson,
    fields: &BoundaryFieldMapping,
    stats: &[DepartmentStat],
    branches: &[BranchDetail],
) -> Result<EnrichedBoundaryDocument, EnrichError> {
    let collection = match boundaries {
        GeoJson::FeatureCollection(fc) => fc,
        GeoJson::Feature(_) => return Err(EnrichError::NotACollection { found: "Feature" }),
        GeoJson::Geometry(_) => return Err(EnrichError::NotACollection { found: "Geometry" }),
    };

    let stats_by_name = index_stats(stats);
    let branches_by_name = index_branches(branches);

    let regions: Vec<EnrichedRegion> = normalize::normalize_features(collection, fields)
        .into_iter()
        .map(|region| {
            let Some(name) = region.name.as_deref() else {
                let properties =
                    EnrichedRegionProperties::no_data(region.display_name(), region.code.clone());
                return EnrichedRegion { region, properties };
            };

            let key = normalize_region_name(name);
            let stat = stats_by_name.get(&key).copied();
            if stat.is_none() {
                log::debug!("No statistics for region '{name}'");
            }

            let status = derive_status(stat);
            let branch_details: Vec<BranchDetail> = branches_by_name
                .get(&key)
                .map(|rows| rows.iter().map(|&b| b.clone()).collect())
                .unwrap_or_default();

            let properties = EnrichedRegionProperties {
                name: name.to_string(),
                code: region.code.clone(),
                status,
                total_branches: stat.map_or(0, |s| s.total_branches),
                active_branches: stat.map_or(0, |s| s.active_branches),
                inactive_branches: stat.map_or(0, |s| s.inactive_branches),
                branches_needing_reorder: stat.map_or(0, |s| s.branches_needing_reorder),
                province_count: stat.map_or(0, |s| s.province_count),
                branch_details,
                display_color: policy::color(status).to_string(),
                pending_requests: stat.and_then(|s| s.pending_requests),
            };

            EnrichedRegion { region, properties }
        })
        .collect();

    let matched = regions
        .iter()
        .filter(|r| r.properties.status != StockStatus::NoData)
        .count();
    log::debug!(
        "Enriched {} regions ({matched} with statistics, {} stats supplied)",
        regions.len(),
        stats.len()
    );

    Ok(EnrichedBoundaryDocument::new(regions))
}

/// Indexes stats by normalized region name. The first row for a name wins.
fn index_stats(stats: &[DepartmentStat]) -> BTreeMap<String, &DepartmentStat> {
    let mut map = BTreeMap::new();
    for stat in stats {
        let key = normalize_region_name(&stat.region);
        if map.contains_key(&key) {
            log::warn!("Duplicate statistics for region '{}', keeping the first", stat.region);
            continue;
        }
        map.insert(key, stat);
    }
    map
}

fn index_branches(branches: &[BranchDetail]) -> BTreeMap<String, Vec<&BranchDetail>> {
    let mut map: BTreeMap<String, Vec<&BranchDetail>> = BTreeMap::new();
    for branch in branches {
        map.entry(normalize_region_name(&branch.region))
            .or_default()
            .push(branch);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> BoundaryFieldMapping {
        BoundaryFieldMapping {
            name: "name".to_string(),
            code: "code".to_string(),
            centroid: None,
        }
    }

    fn boundaries(names: &[&str]) -> GeoJson {
        let features: Vec<serde_json::Value> = names
            .iter()
            .map(|name| {
                serde_json::json!({
                    "type": "Feature",
                    "properties": { "name": name },
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                    }
                })
            })
            .collect();
        serde_json::json!({ "type": "FeatureCollection", "features": features })
            .to_string()
            .parse()
            .unwrap()
    }

    fn stat(region: &str, active: u32, inactive: u32, status: StockStatus) -> DepartmentStat {
        DepartmentStat {
            region: region.to_string(),
            total_branches: active + inactive,
            active_branches: active,
            inactive_branches: inactive,
            branches_needing_reorder: 0,
            province_count: 1,
            status,
            pending_requests: None,
        }
    }

    fn branch(region: &str, name: &str, active: bool) -> BranchDetail {
        BranchDetail {
            name: name.to_string(),
            province: region.to_string(),
            active,
            region: region.to_string(),
        }
    }

    #[test]
    fn lima_and_cusco_scenario() {
        let doc = enrich(
            &boundaries(&["Lima", "Cusco"]),
            &fields(),
            &[stat("LIMA", 5, 0, StockStatus::Normal)],
            &[branch("Lima", "Sucursal Centro", true)],
        )
        .unwrap();

        let lima = &doc.regions()[0].properties;
        assert_eq!(lima.status, StockStatus::Normal);
        assert_eq!(lima.branch_details.len(), 1);
        assert_eq!(lima.branch_details[0].name, "Sucursal Centro");
        assert_eq!(lima.display_color, policy::color(StockStatus::Normal));
        assert_eq!(lima.active_branches, 5);

        let cusco = &doc.regions()[1].properties;
        assert_eq!(cusco.status, StockStatus::NoData);
        assert!(cusco.branch_details.is_empty());
        assert_eq!(cusco.display_color, policy::color(StockStatus::NoData));
    }

    #[test]
    fn all_inactive_region_is_forced_inactive() {
        let doc = enrich(
            &boundaries(&["Trujillo"]),
            &fields(),
            &[stat("Trujillo", 0, 2, StockStatus::Normal)],
            &[],
        )
        .unwrap();
        let props = &doc.regions()[0].properties;
        assert_eq!(props.status, StockStatus::Inactive);
        assert_eq!(props.display_color, policy::color(StockStatus::Inactive));
    }

    #[test]
    fn forced_inactive_overrides_every_reported_status() {
        for &reported in StockStatus::all() {
            let status = derive_status(Some(&stat("Ica", 0, 3, reported)));
            assert_eq!(status, StockStatus::Inactive, "reported {reported}");
        }
    }

    #[test]
    fn stat_status_is_kept_when_some_branch_is_active() {
        assert_eq!(
            derive_status(Some(&stat("Ica", 1, 3, StockStatus::Critical))),
            StockStatus::Critical
        );
        assert_eq!(
            derive_status(Some(&stat("Ica", 0, 0, StockStatus::Low))),
            StockStatus::Low
        );
        assert_eq!(derive_status(None), StockStatus::NoData);
    }

    #[test]
    fn name_matching_ignores_case_and_whitespace() {
        for spelling in ["Lima", "lima", " Lima ", "LIMA"] {
            let doc = enrich(
                &boundaries(&[spelling]),
                &fields(),
                &[stat(" lima", 2, 0, StockStatus::Low)],
                &[branch("LIMA ", "Sucursal Miraflores", true)],
            )
            .unwrap();
            let props = &doc.regions()[0].properties;
            assert_eq!(props.status, StockStatus::Low, "spelling {spelling:?}");
            assert_eq!(props.branch_details.len(), 1, "spelling {spelling:?}");
        }
    }

    #[test]
    fn branch_details_are_not_deduplicated() {
        let doc = enrich(
            &boundaries(&["Piura"]),
            &fields(),
            &[stat("Piura", 2, 1, StockStatus::Normal)],
            &[
                branch("Piura", "Sucursal Grau", true),
                branch("Piura", "Sucursal Grau", true),
                branch("Piura", "Sucursal Sullana", false),
                branch("Tumbes", "Sucursal Tumbes", true),
            ],
        )
        .unwrap();
        assert_eq!(doc.regions()[0].properties.branch_details.len(), 3);
    }

    #[test]
    fn enrichment_is_pure() {
        let input = boundaries(&["Lima", "Cusco", "Puno"]);
        let before = input.clone();
        let stats = [stat("Lima", 3, 1, StockStatus::Critical)];
        let branches = [branch("Lima", "Sucursal Centro", true)];

        let first = enrich(&input, &fields(), &stats, &branches).unwrap();
        let second = enrich(&input, &fields(), &stats, &branches).unwrap();

        assert_eq!(first, second);
        assert_eq!(input, before);
    }

    #[test]
    fn feature_without_name_passes_through_as_no_data() {
        let input: GeoJson = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"other":"x"},"geometry":null}
        ]}"#
        .parse()
        .unwrap();
        let doc = enrich(&input, &fields(), &[stat("Lima", 1, 0, StockStatus::Normal)], &[]).unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.regions()[0].properties.status, StockStatus::NoData);
        assert!(doc.regions()[0].properties.branch_details.is_empty());
    }

    #[test]
    fn unnamed_feature_is_labelled_by_code() {
        let input: GeoJson = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"code":"99"},"geometry":null}
        ]}"#
        .parse()
        .unwrap();
        let doc = enrich(&input, &fields(), &[], &[]).unwrap();
        assert_eq!(doc.regions()[0].properties.name, "99");

        let feature = doc.regions()[0].to_feature();
        let properties = feature.properties.unwrap();
        assert_eq!(properties["name"], "99");
        assert_eq!(properties["status"], "no-data");
    }

    #[test]
    fn empty_collection_yields_empty_document() {
        let doc = enrich(&boundaries(&[]), &fields(), &[], &[]).unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn non_collection_is_rejected() {
        let input: GeoJson = r#"{"type":"Point","coordinates":[0,0]}"#.parse().unwrap();
        let result = enrich(&input, &fields(), &[], &[]);
        assert!(matches!(
            result,
            Err(EnrichError::NotACollection { found: "Geometry" })
        ));
    }

    #[test]
    fn first_duplicate_stat_wins() {
        let doc = enrich(
            &boundaries(&["Tacna"]),
            &fields(),
            &[
                stat("Tacna", 1, 0, StockStatus::Low),
                stat("TACNA", 1, 0, StockStatus::Critical),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(doc.regions()[0].properties.status, StockStatus::Low);
    }
}
