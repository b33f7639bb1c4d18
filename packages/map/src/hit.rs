//! Point-in-region lookups over the current document.

use bakery_map_enrich::EnrichedBoundaryDocument;
use bakery_map_geography::normalize::to_multipolygon;
use geo::{Area, BoundingRect, Contains, MultiPolygon};
use rstar::{AABB, RTree, RTreeObject};

use crate::projection::GeoBounds;

/// A region polygon stored in the R-tree.
struct RegionEntry {
    code: String,
    area: f64,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for RegionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree of region polygons, rebuilt whenever the document changes.
pub struct HitIndex {
    regions: RTree<RegionEntry>,
    bounds: Option<GeoBounds>,
}

impl HitIndex {
    /// Indexes every region of `document` that has a polygon geometry.
    #[must_use]
    pub fn build(document: &EnrichedBoundaryDocument) -> Self {
        let mut entries = Vec::with_capacity(document.len());
        let mut bounds: Option<GeoBounds> = None;

        for enriched in document.regions() {
            let region = &enriched.region;
            let Some(polygon) = region.geometry.as_ref().and_then(to_multipolygon) else {
                log::debug!("Region {} has no polygon geometry, not hit-testable", region.code);
                continue;
            };
            let Some(rect) = polygon.bounding_rect() else {
                continue;
            };

            let region_bounds = GeoBounds {
                west: rect.min().x,
                south: rect.min().y,
                east: rect.max().x,
                north: rect.max().y,
            };
            bounds = Some(bounds.map_or(region_bounds, |b| b.union(region_bounds)));

            entries.push(RegionEntry {
                code: region.code.clone(),
                area: polygon.unsigned_area(),
                envelope: AABB::from_corners(
                    [region_bounds.west, region_bounds.south],
                    [region_bounds.east, region_bounds.north],
                ),
                polygon,
            });
        }

        log::debug!("Indexed {} region polygons for hit testing", entries.len());

        Self {
            regions: RTree::bulk_load(entries),
            bounds,
        }
    }

    /// Bounding box of every indexed region.
    #[must_use]
    pub const fn bounds(&self) -> Option<GeoBounds> {
        self.bounds
    }

    /// Code of the region containing `[lon, lat]`.
    ///
    /// Overlapping regions resolve to the smallest one.
    #[must_use]
    pub fn lookup(&self, lon: f64, lat: f64) -> Option<&str> {
        let point = geo::Point::new(lon, lat);
        let query_env = AABB::from_point([lon, lat]);

        let mut best: Option<&RegionEntry> = None;

        for entry in self.regions.locate_in_envelope_intersecting(&query_env) {
            if entry.polygon.contains(&point) {
                match best {
                    None => best = Some(entry),
                    Some(current) if entry.area < current.area => best = Some(entry),
                    _ => {}
                }
            }
        }

        best.map(|e| e.code.as_str())
    }
}
