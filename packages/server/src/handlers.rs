//! HTTP handler functions for the bakery stock map API.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use bakery_map_enrich::{EnrichedBoundaryDocument, FailureKind};
use bakery_map_server_models::{
    ApiError, ApiHealth, ApiRefreshResult, ApiRefreshStatus, MapQueryParams,
};
use bakery_map_stock_models::policy;
use bakery_map_view::{DisplayMode, MapView, StatusFilter, svg};

use crate::AppState;

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        map_ready: state.coordinator.document().is_some(),
    })
}

/// `GET /api/regions`
///
/// Returns the enriched boundary document as a `GeoJSON`
/// `FeatureCollection`.
pub async fn regions(state: web::Data<AppState>) -> HttpResponse {
    match published_document(&state) {
        Ok(document) => HttpResponse::Ok().json(document.to_feature_collection()),
        Err(response) => response,
    }
}

/// `GET /api/regions/{code}`
///
/// Returns the enriched properties of one region.
pub async fn region(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let code = path.into_inner();
    let document = match published_document(&state) {
        Ok(document) => document,
        Err(response) => return response,
    };

    match document.get(&code) {
        Some(region) => HttpResponse::Ok().json(&region.properties),
        None => HttpResponse::NotFound().json(ApiError::fatal(format!("Unknown region {code}"))),
    }
}

/// `GET /api/summary`
///
/// Per-status region counts and national branch totals.
pub async fn summary(state: web::Data<AppState>) -> HttpResponse {
    match published_document(&state) {
        Ok(document) => HttpResponse::Ok().json(document.summary()),
        Err(response) => response,
    }
}

/// `GET /api/legend`
pub async fn legend() -> HttpResponse {
    HttpResponse::Ok().json(policy::legend())
}

/// `GET /api/map.svg`
///
/// Renders the choropleth. Without a published document the SVG carries
/// only the legend and the failure banner.
pub async fn map_svg(
    state: web::Data<AppState>,
    params: web::Query<MapQueryParams>,
) -> HttpResponse {
    let mut config = state.map.clone();
    if let Some(mode) = params.mode.as_deref() {
        match mode.parse::<DisplayMode>() {
            Ok(mode) => config.mode = mode,
            Err(_) => {
                return HttpResponse::BadRequest()
                    .json(ApiError::fatal(format!("Unknown display mode {mode}")));
            }
        }
    }

    let filter = match params.filter.as_deref().map(str::parse::<StatusFilter>) {
        Some(Ok(filter)) => filter,
        Some(Err(e)) => return HttpResponse::BadRequest().json(ApiError::fatal(e.to_string())),
        None => StatusFilter::All,
    };

    let snapshot = state.coordinator.snapshot();
    let mut view = MapView::new(config);

    match snapshot.document {
        Some(document) => {
            view.set_document(document);
            view.set_failure(snapshot.last_failure.map(|f| f.kind));
        }
        None => view.set_failure(Some(FailureKind::MapUnavailable)),
    }

    if let Some(zoom) = params.zoom {
        view.set_zoom(zoom);
    }
    if let (Some(lon), Some(lat)) = (params.lon, params.lat) {
        view.center_on([lon, lat]);
    }
    view.set_status_filter(filter);
    if let Some(code) = params.selected.as_deref()
        && !view.click_region(code)
    {
        log::debug!("Ignoring selection of unknown region {code}");
    }

    HttpResponse::Ok()
        .content_type("image/svg+xml")
        .body(svg::render(&view.frame()))
}

/// `POST /api/refresh`
///
/// Runs one refresh cycle. On failure the previous document stays
/// published and the response is retryable.
pub async fn refresh(state: web::Data<AppState>) -> HttpResponse {
    match state.coordinator.refresh().await {
        Ok(outcome) => HttpResponse::Ok().json(ApiRefreshResult::from(outcome)),
        Err(e) => {
            log::error!("Refresh failed: {e}");
            HttpResponse::BadGateway().json(ApiError::retryable(e.to_string(), e.kind()))
        }
    }
}

/// `GET /api/refresh/status`
pub async fn refresh_status(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiRefreshStatus::from_snapshot(
        state.coordinator.snapshot(),
        state.coordinator.latest_token(),
    ))
}

/// The published document, or a `503` response carrying the last refresh
/// error. Without a document the map is unavailable whatever failed.
fn published_document(
    state: &AppState,
) -> Result<Arc<EnrichedBoundaryDocument>, HttpResponse> {
    let snapshot = state.coordinator.snapshot();
    snapshot.document.ok_or_else(|| {
        let message = snapshot
            .last_failure
            .map_or_else(|| "Map not loaded yet".to_string(), |failure| failure.message);
        HttpResponse::ServiceUnavailable()
            .json(ApiError::retryable(message, FailureKind::MapUnavailable))
    })
}
