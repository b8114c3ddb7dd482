//! Repository-agnostic data access.
//!
//! Every function works with any [`FullRepository`] and turns raw rows into
//! the shaped structures the API serves. Nothing is cached or retried here:
//! each call is one query.
//!
//! # Usage
//!
//! ```no_run
//! use aitw_insights::db::{services, repositories::LocalRepository, InsightQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = LocalRepository::new();
//!     let query = InsightQuery::new("insight_language", "bin", "merge_rate", "min")
//!         .with_bounds(true);
//!     let insight = services::fetch_binned_insight(&repo, &query).await?;
//!     println!("{} filters", insight.filters().count());
//!     Ok(())
//! }
//! ```

use log::{debug, info};

use super::models::InsightQuery;
use super::repository::{FullRepository, RepositoryResult};
use crate::api::{BinnedInsight, Overview, Release};
use crate::services::error::InsightResult;
use crate::services::overview::shape_overview;
use crate::services::shaper::shape_insight;

// ==================== Health & Connection ====================

/// Pass-through to the repository's health check.
pub async fn health_check<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<bool> {
    repo.health_check().await
}

// ==================== Insights ====================

/// Run one insight query and shape its rows.
pub async fn fetch_binned_insight<R: FullRepository + ?Sized>(
    repo: &R,
    query: &InsightQuery,
) -> InsightResult<BinnedInsight> {
    debug!(
        "Fetching {}.{} (bounds={})",
        query.table, query.value_column, query.with_bounds
    );
    let rows = repo
        .fetch_insight_rows(query)
        .await
        .map_err(|e| e.with_entity(query.table.clone()))?;
    let insight = shape_insight(&rows, query.with_bounds)?;
    info!(
        "Shaped {} rows from {}.{} into {} filter(s)",
        rows.len(),
        query.table,
        query.value_column,
        insight.filters().count()
    );
    Ok(insight)
}

// ==================== Overview & Metadata ====================

pub async fn fetch_overview<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<Overview> {
    let rows = repo.fetch_overview_rows().await?;
    let overview = shape_overview(&rows);
    info!(
        "Loaded overview: {} rows, {} agents",
        rows.len(),
        overview.len()
    );
    Ok(overview)
}

pub async fn fetch_last_release<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Option<Release>> {
    repo.fetch_last_release().await
}

pub async fn fetch_last_updated<R: FullRepository + ?Sized>(
    repo: &R,
) -> RepositoryResult<Option<String>> {
    repo.fetch_last_updated().await
}
