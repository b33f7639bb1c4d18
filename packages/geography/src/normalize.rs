//! Normalizes `GeoJSON` features into [`Region`] values.
//!
//! Uses a [`BoundaryFieldMapping`] to pull the name, code and centroid
//! out of each feature's properties. Normalization never fails: a feature
//! without a usable name still becomes a [`Region`] (with `name: None`)
//! so that it stays on the map.

use bakery_map_geography_models::{BoundaryFieldMapping, Region, departments};
use geo::{Centroid, MultiPolygon};
use geojson::{Feature, FeatureCollection};

/// Normalizes every feature of a collection, preserving order.
#[must_use]
pub fn normalize_features(collection: &FeatureCollection, fields: &BoundaryFieldMapping) -> Vec<Region> {
    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| normalize_feature(index, feature, fields))
        .collect()
}

/// Normalizes a single feature.
///
/// `index` is the feature's position in the collection and is only used
/// to build a code when nothing better is available.
#[must_use]
pub fn normalize_feature(index: usize, feature: &Feature, fields: &BoundaryFieldMapping) -> Region {
    let properties = feature.properties.clone().unwrap_or_default();

    let name = properties
        .get(&fields.name)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    if name.is_none() {
        log::warn!(
            "Boundary feature #{index} has no '{}' property; it will have no data",
            fields.name
        );
    }

    let code = properties
        .get(&fields.code)
        .and_then(value_to_code)
        .or_else(|| {
            name.as_deref()
                .and_then(departments::department_code)
                .map(ToString::to_string)
        })
        .or_else(|| feature.id.as_ref().map(id_to_code))
        .unwrap_or_else(|| format!("feature-{index}"));

    let centroid = fields
        .centroid
        .as_ref()
        .and_then(|field| properties.get(field))
        .and_then(value_to_point)
        .or_else(|| feature.geometry.as_ref().and_then(geometry_centroid));

    Region {
        name,
        code,
        geometry: feature.geometry.clone(),
        centroid,
        properties,
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
///
/// Handles both `Polygon` and `MultiPolygon`; anything else yields `None`.
#[must_use]
pub fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn geometry_centroid(geometry: &geojson::Geometry) -> Option<[f64; 2]> {
    let point = to_multipolygon(geometry)?.centroid()?;
    Some([point.x(), point.y()])
}

fn value_to_code(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn id_to_code(id: &geojson::feature::Id) -> String {
    match id {
        geojson::feature::Id::String(s) => s.clone(),
        geojson::feature::Id::Number(n) => n.to_string(),
    }
}

fn value_to_point(value: &serde_json::Value) -> Option<[f64; 2]> {
    let coords = value.as_array()?;
    if coords.len() != 2 {
        return None;
    }
    Some([coords[0].as_f64()?, coords[1].as_f64()?])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::GeoJson;

    fn collection(json: &str) -> FeatureCollection {
        match json.parse::<GeoJson>().unwrap() {
            GeoJson::FeatureCollection(fc) => fc,
            other => panic!("expected FeatureCollection, got {other:?}"),
        }
    }

    #[test]
    fn reads_name_and_code_from_mapped_fields() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"NOMBDEP":" LIMA ","FIRST_IDDP":"15"},
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}}
            ]}"#,
        );
        let regions = normalize_features(&fc, &BoundaryFieldMapping::default());
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name.as_deref(), Some("LIMA"));
        assert_eq!(regions[0].code, "15");
        let [lon, lat] = regions[0].centroid.unwrap();
        assert!((lon - 1.0).abs() < 1e-9);
        assert!((lat - 1.0).abs() < 1e-9);
    }

    #[test]
    fn centroid_property_wins_over_geometry() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"name":"Cusco","center":[-72.0,-13.5]},
                 "geometry":{"type":"Polygon","coordinates":[[[0,0],[2,0],[2,2],[0,2],[0,0]]]}}
            ]}"#,
        );
        let fields = BoundaryFieldMapping {
            name: "name".to_string(),
            code: "code".to_string(),
            centroid: Some("center".to_string()),
        };
        let regions = normalize_features(&fc, &fields);
        assert_eq!(regions[0].centroid, Some([-72.0, -13.5]));
        // No code property: falls back to the department table.
        assert_eq!(regions[0].code, "08");
    }

    #[test]
    fn feature_without_name_is_kept() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"OTHER":"x"},"geometry":null},
                {"type":"Feature","id":7,"properties":null,"geometry":null}
            ]}"#,
        );
        let regions = normalize_features(&fc, &BoundaryFieldMapping::default());
        assert_eq!(regions.len(), 2);
        assert!(regions[0].name.is_none());
        assert_eq!(regions[0].code, "feature-0");
        assert_eq!(regions[0].centroid, None);
        assert_eq!(regions[1].code, "7");
    }

    #[test]
    fn numeric_codes_are_stringified() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"NOMBDEP":"PUNO","FIRST_IDDP":21},"geometry":null}
            ]}"#,
        );
        let regions = normalize_features(&fc, &BoundaryFieldMapping::default());
        assert_eq!(regions[0].code, "21");
    }
}
