//! Response contract of the statistics service.
//!
//! Every endpoint answers with a JSON object whose `data` member is the
//! array of rows:
//!
//! ```json
//! { "data": [ { "region": "LIMA", "totalBranches": 5, ... } ] }
//! ```
//!
//! Department rows are strict: a row missing a count fails the whole
//! response. Branch rows are lenient: a row missing its name, region or
//! active flag is dropped with a warning so that one bad record cannot
//! break the region popup.

use bakery_map_stock_models::{BranchDetail, DepartmentStat, StockStatus};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::StatsError;

/// The single response envelope used by every statistics endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    /// Response rows.
    pub data: Vec<T>,
}

/// A department rollup row as sent over the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentStatRow {
    /// Department name.
    pub region: String,
    /// Total branch count.
    pub total_branches: u32,
    /// Active branch count.
    pub active_branches: u32,
    /// Inactive branch count.
    pub inactive_branches: u32,
    /// Branches that need to reorder.
    pub branches_needing_reorder: u32,
    /// Provinces with branches.
    pub province_count: u32,
    /// Aggregate status in any casing/separator style.
    pub status: String,
    /// Open supply requests, if reported.
    #[serde(default)]
    pub pending_requests: Option<u32>,
}

/// A branch row as sent over the wire. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDetailRow {
    /// Branch name.
    #[serde(default)]
    pub name: Option<String>,
    /// Province name.
    #[serde(default)]
    pub province: Option<String>,
    /// Whether the branch is active.
    #[serde(default)]
    pub active: Option<bool>,
    /// Owning department name.
    #[serde(default)]
    pub region: Option<String>,
}

impl From<DepartmentStatRow> for DepartmentStat {
    fn from(row: DepartmentStatRow) -> Self {
        let status = StockStatus::parse_lenient(&row.status).unwrap_or_else(|| {
            log::warn!(
                "Unrecognized status '{}' for department '{}', treating as no-data",
                row.status,
                row.region
            );
            StockStatus::NoData
        });

        Self {
            region: row.region,
            total_branches: row.total_branches,
            active_branches: row.active_branches,
            inactive_branches: row.inactive_branches,
            branches_needing_reorder: row.branches_needing_reorder,
            province_count: row.province_count,
            status,
            pending_requests: row.pending_requests,
        }
    }
}

impl BranchDetailRow {
    /// Converts the row into a [`BranchDetail`], or `None` if a required
    /// field is missing or blank.
    ///
    /// A missing province is tolerated and becomes an empty string.
    #[must_use]
    pub fn into_detail(self) -> Option<BranchDetail> {
        let name = self.name.filter(|s| !s.trim().is_empty())?;
        let region = self.region.filter(|s| !s.trim().is_empty())?;
        let active = self.active?;

        Some(BranchDetail {
            name,
            province: self.province.unwrap_or_default(),
            active,
            region,
        })
    }
}

/// Decodes a response body into its envelope rows.
///
/// # Errors
///
/// Returns [`StatsError::Contract`] if the body is not a `{ "data": [...] }`
/// envelope of well-formed rows.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, StatsError> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(|envelope| envelope.data)
        .map_err(|e| StatsError::Contract {
            message: format!("expected {{\"data\": [...]}} envelope: {e}"),
        })
}

/// Decodes a department statistics response.
///
/// # Errors
///
/// Returns [`StatsError::Contract`] if the body violates the contract.
pub fn decode_department_stats(body: &str) -> Result<Vec<DepartmentStat>, StatsError> {
    Ok(decode::<DepartmentStatRow>(body)?
        .into_iter()
        .map(DepartmentStat::from)
        .collect())
}

/// Decodes a branch details response, dropping malformed rows.
///
/// # Errors
///
/// Returns [`StatsError::Contract`] if the body is not an envelope.
pub fn decode_branch_details(body: &str) -> Result<Vec<BranchDetail>, StatsError> {
    let rows = decode::<BranchDetailRow>(body)?;
    let total = rows.len();
    let details: Vec<BranchDetail> = rows
        .into_iter()
        .filter_map(BranchDetailRow::into_detail)
        .collect();

    if details.len() < total {
        log::warn!(
            "Dropped {} of {total} branch rows with missing name, region or active flag",
            total - details.len()
        );
    }

    Ok(details)
}
