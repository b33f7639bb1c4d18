//! HTTP implementation of [`StatisticsSource`].
//!
//! Endpoints, relative to the configured base URL:
//!
//! - `GET stats/departments`: department stock rollups
//! - `GET stats/branches`: branch details

use std::sync::Arc;

use async_trait::async_trait;
use bakery_map_stock_models::{BranchDetail, DepartmentStat};

use crate::retry::{self, RetryPolicy};
use crate::{Session, StatisticsSource, StatsError, wire};

/// Statistics source backed by the back-office HTTP API.
pub struct HttpStatisticsSource {
    client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
    retry: RetryPolicy,
}

impl HttpStatisticsSource {
    /// Creates a client for the service rooted at `base_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str, session: Arc<Session>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            retry: RetryPolicy::default(),
        }
    }

    /// Overrides the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Full URL of an endpoint path.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get(&self, path: &str) -> Result<String, StatsError> {
        let url = self.endpoint(path);
        log::debug!("GET {url}");
        retry::send_text(&self.retry, || {
            self.session.authorize(self.client.get(&url))
        })
        .await
    }
}

#[async_trait]
impl StatisticsSource for HttpStatisticsSource {
    async fn department_stock_stats(&self) -> Result<Vec<DepartmentStat>, StatsError> {
        let body = self.get("stats/departments").await?;
        let stats = wire::decode_department_stats(&body)?;
        log::debug!("Fetched {} department stats", stats.len());
        Ok(stats)
    }

    async fn branch_details(&self) -> Result<Vec<BranchDetail>, StatsError> {
        let body = self.get("stats/branches").await?;
        let details = wire::decode_branch_details(&body)?;
        log::debug!("Fetched {} branch details", details.len());
        Ok(details)
    }
}
