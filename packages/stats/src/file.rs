//! Statistics read from a pair of local snapshot files.
//!
//! Each file holds exactly what the HTTP service would have answered,
//! so exported snapshots can be replayed offline.

use std::path::PathBuf;

use async_trait::async_trait;
use bakery_map_stock_models::{BranchDetail, DepartmentStat};

use crate::{StatisticsSource, StatsError, wire};

/// Statistics source backed by two JSON files.
#[derive(Debug, Clone)]
pub struct FileStatisticsSource {
    departments: PathBuf,
    branches: PathBuf,
}

impl FileStatisticsSource {
    /// Creates a source reading department stats and branch details from
    /// the given files.
    #[must_use]
    pub fn new(departments: impl Into<PathBuf>, branches: impl Into<PathBuf>) -> Self {
        Self {
            departments: departments.into(),
            branches: branches.into(),
        }
    }
}

#[async_trait]
impl StatisticsSource for FileStatisticsSource {
    async fn department_stock_stats(&self) -> Result<Vec<DepartmentStat>, StatsError> {
        let body = tokio::fs::read_to_string(&self.departments).await?;
        wire::decode_department_stats(&body)
    }

    async fn branch_details(&self) -> Result<Vec<BranchDetail>, StatsError> {
        let body = tokio::fs::read_to_string(&self.branches).await?;
        wire::decode_branch_details(&body)
    }
}
