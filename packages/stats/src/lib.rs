#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the back-office stock statistics service.
//!
//! The service supplies two record sets for the same snapshot: one stock
//! rollup per department and one row per branch. Both are decoded once,
//! at this boundary, against a single typed response contract (see
//! [`wire`]); callers only ever see [`DepartmentStat`] and
//! [`BranchDetail`].
//!
//! Requests carry the caller's [`Session`] explicitly. There is no ambient
//! auth state.

pub mod client;
pub mod file;
pub mod retry;
pub mod session;
pub mod wire;

use async_trait::async_trait;
use bakery_map_stock_models::{BranchDetail, DepartmentStat};

pub use client::HttpStatisticsSource;
pub use file::FileStatisticsSource;
pub use session::Session;

/// Errors that can occur while talking to the statistics service.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error reading a local snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Status code returned.
        status: u16,
    },

    /// The response does not follow the statistics contract.
    #[error("Contract violation: {message}")]
    Contract {
        /// Description of what went wrong.
        message: String,
    },
}

/// Source of per-department and per-branch stock statistics.
#[async_trait]
pub trait StatisticsSource: Send + Sync {
    /// Returns one stock rollup per department.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the statistics cannot be fetched or do not
    /// follow the response contract.
    async fn department_stock_stats(&self) -> Result<Vec<DepartmentStat>, StatsError>;

    /// Returns one row per branch. Rows missing required fields are
    /// dropped, not reported as errors.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if the statistics cannot be fetched or do not
    /// follow the response contract.
    async fn branch_details(&self) -> Result<Vec<BranchDetail>, StatsError>;
}
