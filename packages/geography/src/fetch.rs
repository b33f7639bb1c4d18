//! Boundary document fetchers.
//!
//! The document is a single standard `GeoJSON` `FeatureCollection`, served
//! either from a versioned URL or a file on disk.

use geojson::GeoJson;

use crate::BoundaryError;

/// Maximum length of the response body preview included in error messages.
const BODY_PREVIEW_LEN: usize = 200;

/// Fetches and parses the boundary document from `url`.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the request fails, the server answers
/// with a non-success status, or the body is not valid `GeoJSON`.
pub async fn fetch_url(client: &reqwest::Client, url: &str) -> Result<GeoJson, BoundaryError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(BoundaryError::Conversion {
            message: format!("Boundary request failed with status {}", resp.status()),
        });
    }
    let body = resp.text().await?;
    parse(&body)
}

/// Reads and parses the boundary document from a local file.
///
/// # Errors
///
/// Returns [`BoundaryError`] if the file cannot be read or is not valid
/// `GeoJSON`.
pub async fn read_file(path: &str) -> Result<GeoJson, BoundaryError> {
    let body = tokio::fs::read_to_string(path).await?;
    parse(&body)
}

/// Parses a boundary document body.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] if `body` is not valid `GeoJSON`.
pub fn parse(body: &str) -> Result<GeoJson, BoundaryError> {
    body.parse::<GeoJson>().map_err(|e| {
        let preview: String = body.chars().take(BODY_PREVIEW_LEN).collect();
        log::warn!("Failed to parse boundary document: {e}\n  body preview: {preview}");
        BoundaryError::GeoJson(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_feature_collection() {
        let doc = parse(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"NOMBDEP":"LIMA"},"geometry":null}
            ]}"#,
        )
        .unwrap();
        let GeoJson::FeatureCollection(fc) = doc else {
            panic!("expected a FeatureCollection");
        };
        assert_eq!(fc.features.len(), 1);
    }

    #[test]
    fn rejects_non_geojson() {
        assert!(matches!(
            parse("<html>not found</html>"),
            Err(BoundaryError::GeoJson(_))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let path = std::env::temp_dir().join("bakery_map_missing_boundaries.geojson");
        let _ = std::fs::remove_file(&path);
        let result = read_file(&path.to_string_lossy()).await;
        assert!(matches!(result, Err(BoundaryError::Io(_))));
    }

    #[tokio::test]
    async fn reads_file_from_disk() {
        let path = std::env::temp_dir().join("bakery_map_fetch_test.geojson");
        std::fs::write(&path, r#"{"type":"FeatureCollection","features":[]}"#).unwrap();
        let doc = read_file(&path.to_string_lossy()).await.unwrap();
        assert!(matches!(doc, GeoJson::FeatureCollection(_)));
        let _ = std::fs::remove_file(&path);
    }
}
