//! Refresh cycle: fetch boundaries and statistics, enrich, publish.
//!
//! A refresh loads the boundary document and both statistics record sets
//! concurrently and runs the pipeline only once all three have arrived.
//! Any failure aborts the refresh and leaves the previously published
//! document in place.
//!
//! Overlapping refreshes are resolved by request token. Every call to
//! [`RefreshCoordinator::refresh`] takes the next token from a monotonic
//! counter, and a result is published only if its token is still the
//! latest one issued. A refresh that finishes while a newer one is in
//! flight is discarded, even if the newer one later fails, so the
//! last-initiated refresh wins regardless of completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bakery_map_geography::{BoundaryError, BoundaryLoader};
use bakery_map_geography_models::BoundaryFieldMapping;
use bakery_map_stats::{StatisticsSource, StatsError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

use crate::{EnrichError, EnrichedBoundaryDocument, pipeline};

/// Why a refresh failed.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// One of the statistics calls failed.
    #[error("Statistics unavailable: {0}")]
    Statistics(#[from] StatsError),

    /// The boundary document could not be loaded.
    #[error("Boundary document unavailable: {0}")]
    Boundaries(#[from] BoundaryError),

    /// The boundary document is structurally invalid.
    #[error("Enrichment failed: {0}")]
    Enrich(#[from] EnrichError),
}

/// User-facing classification of a refresh failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FailureKind {
    /// Statistics could not be fetched; the last good map stays up.
    StatisticsUnavailable,
    /// The boundary document is unusable; the map cannot render.
    MapUnavailable,
}

impl RefreshError {
    /// Classifies the error for display.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Statistics(_) => FailureKind::StatisticsUnavailable,
            Self::Boundaries(_) | Self::Enrich(_) => FailureKind::MapUnavailable,
        }
    }
}

/// Record of the most recent failed refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshFailure {
    /// Token of the failed refresh.
    pub token: u64,
    /// Failure classification.
    pub kind: FailureKind,
    /// Error message.
    pub message: String,
    /// When the failure happened.
    pub at: DateTime<Utc>,
    /// Failures can always be retried with another refresh.
    pub retryable: bool,
}

/// Result of a refresh that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new document is now the published one.
    Published {
        /// Token of this refresh.
        token: u64,
        /// Number of regions in the new document.
        regions: usize,
    },
    /// A newer refresh was started before this one finished, so this
    /// result was discarded.
    Superseded {
        /// Token of this refresh.
        token: u64,
    },
}

/// Point-in-time view of the coordinator's state.
#[derive(Debug, Clone, Default)]
pub struct RefreshSnapshot {
    /// Last successfully published document.
    pub document: Option<Arc<EnrichedBoundaryDocument>>,
    /// Token of the published document (0 before the first success).
    pub published_token: u64,
    /// When the published document was produced.
    pub refreshed_at: Option<DateTime<Utc>>,
    /// Failure of the latest refresh, if it failed.
    pub last_failure: Option<RefreshFailure>,
}

/// Drives refreshes and holds the last good enriched document.
pub struct RefreshCoordinator {
    stats: Arc<dyn StatisticsSource>,
    boundaries: Arc<dyn BoundaryLoader>,
    fields: BoundaryFieldMapping,
    next_token: AtomicU64,
    state: Mutex<RefreshSnapshot>,
}

impl RefreshCoordinator {
    /// Creates a coordinator with nothing published yet.
    #[must_use]
    pub fn new(
        stats: Arc<dyn StatisticsSource>,
        boundaries: Arc<dyn BoundaryLoader>,
        fields: BoundaryFieldMapping,
    ) -> Self {
        Self {
            stats,
            boundaries,
            fields,
            next_token: AtomicU64::new(0),
            state: Mutex::new(RefreshSnapshot::default()),
        }
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> RefreshSnapshot {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the last published document, if any.
    #[must_use]
    pub fn document(&self) -> Option<Arc<EnrichedBoundaryDocument>> {
        self.snapshot().document
    }

    /// Token of the most recently started refresh.
    #[must_use]
    pub fn latest_token(&self) -> u64 {
        self.next_token.load(Ordering::SeqCst)
    }

    /// Runs one refresh cycle.
    ///
    /// # Errors
    ///
    /// Returns [`RefreshError`] if any fetch fails or the boundary document
    /// is not a `FeatureCollection`. The previously published document is
    /// kept in that case.
    pub async fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("Refresh #{token} started");

        match self.fetch_and_enrich().await {
            Ok(document) => Ok(self.publish(token, document)),
            Err(e) => {
                self.record_failure(token, &e);
                Err(e)
            }
        }
    }

    async fn fetch_and_enrich(&self) -> Result<EnrichedBoundaryDocument, RefreshError> {
        let statistics = async {
            tokio::try_join!(self.stats.department_stock_stats(), self.stats.branch_details())
                .map_err(RefreshError::from)
        };
        let boundaries = async { self.boundaries.load().await.map_err(RefreshError::from) };

        let ((stats, branches), boundaries) = tokio::try_join!(statistics, boundaries)?;

        Ok(pipeline::enrich(&boundaries, &self.fields, &stats, &branches)?)
    }

    fn publish(&self, token: u64, document: EnrichedBoundaryDocument) -> RefreshOutcome {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let latest = self.latest_token();
        if token != latest {
            log::info!("Refresh #{token} superseded by #{latest}, discarding result");
            return RefreshOutcome::Superseded { token };
        }

        let regions = document.len();
        state.document = Some(Arc::new(document));
        state.published_token = token;
        state.refreshed_at = Some(Utc::now());
        state.last_failure = None;
        drop(state);

        log::info!("Refresh #{token} published {regions} regions");
        RefreshOutcome::Published { token, regions }
    }

    fn record_failure(&self, token: u64, error: &RefreshError) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        let latest = self.latest_token();
        if token != latest {
            log::info!("Refresh #{token} failed after #{latest} started: {error}");
            return;
        }

        log::error!("Refresh #{token} failed: {error}");
        state.last_failure = Some(RefreshFailure {
            token,
            kind: error.kind(),
            message: error.to_string(),
            at: Utc::now(),
            retryable: true,
        });
    }
}
