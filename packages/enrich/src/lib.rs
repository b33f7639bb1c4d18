#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region enrichment pipeline.
//!
//! Joins the department boundary document with the stock statistics of
//! one snapshot and derives a display status and color for every region
//! ([`pipeline::enrich`]). The [`refresh`] module drives the fetch →
//! enrich cycle and keeps the last good document when a refresh fails.

pub mod document;
pub mod pipeline;
pub mod refresh;

use thiserror::Error;

pub use document::{EnrichedBoundaryDocument, EnrichedRegion, StatusSummary};
pub use pipeline::{derive_status, enrich};
pub use refresh::{
    FailureKind, RefreshCoordinator, RefreshError, RefreshFailure, RefreshOutcome, RefreshSnapshot,
};

/// Structural failures of the enrichment pipeline.
///
/// Data-quality problems (unmatched names, features without a name) are
/// never errors; they degrade to `no-data` regions.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// The boundary input is not a `FeatureCollection`.
    #[error("Boundary document is not a FeatureCollection (found {found})")]
    NotACollection {
        /// The `GeoJSON` type that was supplied instead.
        found: &'static str,
    },
}
