//! Insight repository trait for the pre-computed metric tables.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::db::models::{InsightQuery, RawInsightRow, RawOverviewRow};

/// Repository trait for reading insight rows.
///
/// Each call checks out one connection for the duration of one query.
/// Implementations must not retry; a failure is reported as-is.
#[async_trait]
pub trait InsightRepository: Send + Sync {
    /// Check if the store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Run the projection described by `query`.
    ///
    /// Rows are returned ordered by `query.order_column` ascending, which is
    /// the order the shaper relies on.
    ///
    /// # Returns
    /// * `Ok(Vec<RawInsightRow>)` - Possibly empty, never an error when empty
    /// * `Err(RepositoryError)` - Invalid identifiers or store failure
    async fn fetch_insight_rows(&self, query: &InsightQuery)
        -> RepositoryResult<Vec<RawInsightRow>>;

    /// Fetch the per-agent overview ordered by `total_prs` descending.
    async fn fetch_overview_rows(&self) -> RepositoryResult<Vec<RawOverviewRow>>;
}
