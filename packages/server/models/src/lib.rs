#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the bakery stock map server.
//!
//! These are separate from the pipeline types so the HTTP contract the
//! dashboard and home page rely on can evolve independently.

use bakery_map_enrich::{FailureKind, RefreshFailure, RefreshOutcome, RefreshSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
    /// Whether an enriched document has been published.
    pub map_ready: bool,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
    /// Whether retrying (usually via `POST /api/refresh`) may help.
    pub retryable: bool,
    /// Failure classification, for refresh failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
}

impl ApiError {
    /// A non-retryable error.
    #[must_use]
    pub fn fatal(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            retryable: false,
            kind: None,
        }
    }

    /// A retryable error of `kind`.
    #[must_use]
    pub fn retryable(error: impl Into<String>, kind: FailureKind) -> Self {
        Self {
            error: error.into(),
            retryable: true,
            kind: Some(kind),
        }
    }
}

/// Query parameters for `GET /api/map.svg`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapQueryParams {
    /// Zoom level; clamped to the configured bounds.
    pub zoom: Option<f64>,
    /// Center longitude.
    pub lon: Option<f64>,
    /// Center latitude.
    pub lat: Option<f64>,
    /// Status filter: `all` or a status name.
    pub filter: Option<String>,
    /// Code of the region to select.
    pub selected: Option<String>,
    /// `interactive` or `display-only`.
    pub mode: Option<String>,
}

/// Response of `POST /api/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome")]
pub enum ApiRefreshResult {
    /// This refresh's document is now on screen.
    Published {
        /// Refresh token.
        token: u64,
        /// Region count of the new document.
        regions: usize,
    },
    /// A newer refresh won; this result was discarded.
    Superseded {
        /// Refresh token.
        token: u64,
    },
}

impl From<RefreshOutcome> for ApiRefreshResult {
    fn from(outcome: RefreshOutcome) -> Self {
        match outcome {
            RefreshOutcome::Published { token, regions } => Self::Published { token, regions },
            RefreshOutcome::Superseded { token } => Self::Superseded { token },
        }
    }
}

/// Response of `GET /api/refresh/status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRefreshStatus {
    /// Token of the document on screen (0 before the first success).
    pub published_token: u64,
    /// Token of the most recently started refresh.
    pub latest_token: u64,
    /// When the document on screen was produced.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Number of regions on screen.
    pub regions: usize,
    /// Most recent failure newer than the document on screen.
    pub last_failure: Option<RefreshFailure>,
}

impl ApiRefreshStatus {
    /// Builds the status from a coordinator snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: RefreshSnapshot, latest_token: u64) -> Self {
        Self {
            published_token: snapshot.published_token,
            latest_token,
            refreshed_at: snapshot.refreshed_at,
            regions: snapshot.document.as_ref().map_or(0, |d| d.len()),
            last_failure: snapshot.last_failure,
        }
    }
}
