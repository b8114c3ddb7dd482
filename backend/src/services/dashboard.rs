//! Page-load orchestration.

use futures::future::{try_join4, try_join_all};
use futures::TryFutureExt;
use log::info;
use std::time::Instant;

use super::catalog;
use super::error::{InsightError, InsightResult};
use crate::api::{DashboardData, DashboardInsight, InsightDescriptor, InsightMetric};
use crate::db::repository::FullRepository;
use crate::db::services as db_services;

async fn load_insight<R: FullRepository + ?Sized>(
    repo: &R,
    descriptor: &InsightDescriptor,
) -> InsightResult<DashboardInsight> {
    let share_query = catalog::query(descriptor, InsightMetric::Share);
    let merge_rate_query = catalog::query(descriptor, InsightMetric::MergeRate);
    let (share, merge_rate) = futures::try_join!(
        db_services::fetch_binned_insight(repo, &share_query),
        db_services::fetch_binned_insight(repo, &merge_rate_query),
    )?;

    Ok(DashboardInsight {
        name: descriptor.name.to_string(),
        title: descriptor.title.to_string(),
        x_label: descriptor.x_label.to_string(),
        chart: descriptor.chart,
        share,
        merge_rate,
    })
}

/// Fetch everything a dashboard page needs.
///
/// All queries are issued concurrently; the first failure fails the whole
/// load and no partial data is returned.
pub async fn load_dashboard<R: FullRepository + ?Sized>(repo: &R) -> InsightResult<DashboardData> {
    let start = Instant::now();

    let overview = db_services::fetch_overview(repo).map_err(InsightError::from);
    let release = db_services::fetch_last_release(repo).map_err(InsightError::from);
    let last_updated = db_services::fetch_last_updated(repo).map_err(InsightError::from);
    let insights = try_join_all(catalog::all().iter().map(|d| load_insight(repo, d)));

    let (overview, release, last_updated, insights) =
        try_join4(overview, release, last_updated, insights).await?;

    info!(
        "Dashboard loaded: {} agents, {} insights in {:?}",
        overview.len(),
        insights.len(),
        start.elapsed()
    );

    Ok(DashboardData {
        overview,
        release,
        last_updated,
        insights,
    })
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod dashboard_tests;
