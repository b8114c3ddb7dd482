//! The insight sections of the dashboard and the queries behind them.

use crate::api::{ChartKind, InsightDescriptor, InsightMetric};
use crate::db::models::InsightQuery;

/// Value column of the merge-rate metric in every insight table.
pub const MERGE_RATE_COLUMN: &str = "merge_rate";

const fn descriptor(
    name: &'static str,
    table: &'static str,
    title: &'static str,
    x_label: &'static str,
    chart: ChartKind,
    share_column: &'static str,
    order_column: &'static str,
) -> InsightDescriptor {
    InsightDescriptor {
        name,
        table,
        title,
        x_label,
        chart,
        bucket_column: "bin",
        share_column,
        order_column,
    }
}

/// Dashboard insights in page order.
pub static INSIGHTS: [InsightDescriptor; 7] = [
    descriptor(
        "daily",
        "insight_daily",
        "Daily Trends",
        "Day",
        ChartKind::Line,
        "total_prs",
        "bin::date",
    ),
    descriptor(
        "repo_popularity",
        "insight_repo_popularity",
        "Repo Popularity",
        "Number of repository stars",
        ChartKind::Line,
        "total_pr_share",
        "min",
    ),
    descriptor(
        "change_complexity",
        "insight_change_complexity",
        "Change Complexity",
        "Number of additions + deletions",
        ChartKind::Line,
        "total_pr_share",
        "min",
    ),
    descriptor(
        "changed_files",
        "insight_changed_files",
        "Files Changed",
        "Number of files changed",
        ChartKind::Line,
        "total_pr_share",
        "min",
    ),
    descriptor(
        "ad_ratio",
        "insight_ad_ratio",
        "Additions/Deletions",
        "AD ratio",
        ChartKind::Line,
        "total_pr_share",
        "min",
    ),
    descriptor(
        "language",
        "insight_language",
        "Repository Language",
        "Repository Language",
        ChartKind::Bar,
        "total_pr_share",
        "min",
    ),
    descriptor(
        "change_language",
        "insight_change_language",
        "Change Language",
        "Change Language",
        ChartKind::Bar,
        "total_pr_share",
        "min",
    ),
];

pub fn all() -> &'static [InsightDescriptor] {
    &INSIGHTS
}

/// Look up an insight by name (`-` and `_` are interchangeable).
pub fn find(name: &str) -> Option<&'static InsightDescriptor> {
    let name = name.trim().replace('-', "_");
    INSIGHTS.iter().find(|d| d.name.eq_ignore_ascii_case(&name))
}

/// Query for one metric of an insight.
pub fn query(descriptor: &InsightDescriptor, metric: InsightMetric) -> InsightQuery {
    let value_column = match metric {
        InsightMetric::Share => descriptor.share_column,
        InsightMetric::MergeRate => MERGE_RATE_COLUMN,
    };
    InsightQuery::new(
        descriptor.table,
        descriptor.bucket_column,
        value_column,
        descriptor.order_column,
    )
    .with_bounds(metric.has_bounds())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_queries_are_valid() {
        for d in all() {
            for metric in [InsightMetric::Share, InsightMetric::MergeRate] {
                assert!(query(d, metric).validate().is_ok(), "{} {:?}", d.name, metric);
            }
        }
    }

    #[test]
    fn test_find_by_name() {
        assert_eq!(find("repo-popularity").unwrap().table, "insight_repo_popularity");
        assert_eq!(find("Daily").unwrap().order_column, "bin::date");
        assert!(find("stars").is_none());
    }

    #[test]
    fn test_merge_rate_requests_bounds() {
        let language = find("language").unwrap();
        let q = query(language, InsightMetric::MergeRate);
        assert_eq!(q.value_column, "merge_rate");
        assert!(q.with_bounds);

        let share = query(language, InsightMetric::Share);
        assert_eq!(share.value_column, "total_pr_share");
        assert!(!share.with_bounds);
    }

    #[test]
    fn test_daily_share_counts_prs() {
        let daily = find("daily").unwrap();
        assert_eq!(query(daily, InsightMetric::Share).value_column, "total_prs");
        assert_eq!(daily.chart, ChartKind::Line);
    }
}
