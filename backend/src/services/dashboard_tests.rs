use super::*;
use crate::api::AgentId;
use crate::db::models::RawOverviewRow;
use crate::db::repositories::{LocalRepository, LocalRow};
use crate::db::repository::RepositoryError;
use crate::routes::overview::Release;

fn empty_catalog_repo() -> LocalRepository {
    let repo = LocalRepository::new();
    for d in catalog::all() {
        repo.create_table(d.table);
    }
    repo
}

fn seeded_repo() -> LocalRepository {
    let repo = empty_catalog_repo();
    let language = catalog::find("language").unwrap();
    let share = catalog::query(language, InsightMetric::Share);
    let merge_rate = catalog::query(language, InsightMetric::MergeRate);

    for (i, lang) in ["Python", "Rust"].iter().enumerate() {
        repo.insert_row(
            language.table,
            LocalRow::new()
                .with("agent", "codex")
                .with("filter", "all")
                .with("bin", *lang)
                .with("min", i as f64)
                .with(share.value_column.as_str(), 0.5)
                .with(merge_rate.value_column.as_str(), 0.6)
                .with(merge_rate.lower_column(), 0.55)
                .with(merge_rate.upper_column(), 0.65),
        );
    }

    repo.insert_overview(RawOverviewRow {
        agent: "codex".to_string(),
        total_prs: Some(120),
        closed_prs: Some(100),
        merged_prs: Some(80),
        ..Default::default()
    });
    repo.insert_release(Release {
        doi: "10.5281/zenodo.1".to_string(),
        url: "https://doi.org/10.5281/zenodo.1".to_string(),
        date: "2025-08-01".to_string(),
    });
    repo.set_metadata("last_updated", "2025-08-03");
    repo
}

#[tokio::test]
async fn test_empty_store_loads_empty_dashboard() {
    let data = load_dashboard(&empty_catalog_repo()).await.unwrap();
    assert!(data.overview.is_empty());
    assert!(data.release.is_none());
    assert!(data.last_updated.is_none());
    assert_eq!(data.insights.len(), catalog::all().len());
    assert!(data.insights.iter().all(|i| i.share.is_empty() && i.merge_rate.is_empty()));
}

#[tokio::test]
async fn test_seeded_dashboard() {
    let data = load_dashboard(&seeded_repo()).await.unwrap();

    let names: Vec<_> = data.insights.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names[0], "daily");
    assert_eq!(names.len(), 7);

    let language = data.insight("language").unwrap();
    assert_eq!(
        language.share.get("all").unwrap().keys().collect::<Vec<_>>(),
        vec!["Python", "Rust"]
    );
    let mr = language.merge_rate.value("all", "Rust", AgentId::Codex).unwrap();
    assert_eq!(mr.value, Some(0.6));
    assert_eq!(mr.lower(), Some(0.55));
    // Share metric carries no bounds.
    let share = language.share.value("all", "Rust", AgentId::Codex).unwrap();
    assert!(share.bounds.is_none());

    assert_eq!(
        data.overview.get(AgentId::Codex).unwrap().merge_rate_display(),
        "80.00 %"
    );
    assert_eq!(data.release.unwrap().date, "2025-08-01");
    assert_eq!(data.last_updated.as_deref(), Some("2025-08-03"));
}

#[tokio::test]
async fn test_missing_table_fails_whole_load() {
    let repo = LocalRepository::new();
    let err = load_dashboard(&repo).await.unwrap_err();
    assert!(matches!(
        err,
        InsightError::QueryFailure(RepositoryError::QueryError { .. })
    ));
    assert_eq!(err.code(), "QUERY_FAILURE");
}

#[tokio::test]
async fn test_unreachable_store_fails_load() {
    let repo = seeded_repo();
    repo.set_healthy(false);
    let err = load_dashboard(&repo).await.unwrap_err();
    assert!(matches!(
        err,
        InsightError::QueryFailure(RepositoryError::ConnectionError { .. })
    ));
}

#[tokio::test]
async fn test_malformed_metric_fails_load() {
    let repo = empty_catalog_repo();
    repo.insert_row(
        "insight_daily",
        LocalRow::new()
            .with("agent", "human")
            .with("filter", "all")
            .with("bin", "2025-05-20")
            .with("total_prs", "lots")
            .with("merge_rate", None::<f64>)
            .with("merge_rate_lb", None::<f64>)
            .with("merge_rate_ub", None::<f64>),
    );

    let err = load_dashboard(&repo).await.unwrap_err();
    assert_eq!(err.code(), "MALFORMED_METRIC");
}
