//! HTTP API tests driven through the router with `tower::ServiceExt::oneshot`.

#![cfg(feature = "http-server")]

mod support;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use aitw_insights::api::{AgentId, BinnedInsight};
use aitw_insights::db::repositories::LocalRepository;
use aitw_insights::http::{create_router, AppState};

fn router(repo: LocalRepository) -> Router {
    create_router(AppState::new(Arc::new(repo)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(router(support::empty_repository()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_list_insights_in_page_order() {
    let (status, body) = get(router(support::empty_repository()), "/v1/insights").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 7);
    assert_eq!(body["insights"][0]["name"], "daily");
    assert_eq!(body["insights"][0]["chart"], "line");
    assert_eq!(body["insights"][5]["name"], "language");
    assert_eq!(body["insights"][5]["chart"], "bar");
    assert_eq!(body["insights"][0]["metrics"][1], "merge_rate");
    // Column names stay server side.
    assert!(body["insights"][0].get("table").is_some());
    assert!(body["insights"][0].get("bucket_column").is_none());
}

#[tokio::test]
async fn test_get_insight_metric() {
    let (status, body) = get(
        router(support::seeded_repository()),
        "/v1/insights/daily/merge_rate",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let insight: BinnedInsight = serde_json::from_value(body.clone()).unwrap();
    let human = insight.value("all", "2025-05-20", AgentId::Human).unwrap();
    assert_eq!(human.value, Some(0.8));
    assert_eq!(human.upper(), Some(0.9));

    // Buckets serialize as [key, {agent: value}] pairs.
    assert_eq!(body["all"][0][0], "2025-05-20");
    assert_eq!(body["all"][0][1]["codex"]["lower"], 0.4);
}

#[tokio::test]
async fn test_insight_name_accepts_dashes() {
    let (status, _) = get(
        router(support::seeded_repository()),
        "/v1/insights/change-language/share",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_bar_chart_with_error_bars() {
    let (status, body) = get(
        router(support::seeded_repository()),
        "/v1/insights/language/merge_rate/chart?agents=human,copilot&bounds=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "bar");
    assert_eq!(body["filter"], "all");

    let row = &body["rows"][0];
    assert_eq!(row["key"], "Rust");
    assert_eq!(row["human"], 0.7);
    assert_eq!(row["human_lb"], 0.6);

    let roles: Vec<&str> = body["series"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["value", "error_bar", "value", "error_bar"]);
}

#[tokio::test]
async fn test_chart_popular_filter() {
    let (status, body) = get(
        router(support::seeded_repository()),
        "/v1/insights/language/share/chart?popular=true",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filter"], "popular");
    assert_eq!(body["rows"][0]["copilot"], 0.7);
    // Share has no bounds to draw even when asked.
    assert!(body["series"]
        .as_array()
        .unwrap()
        .iter()
        .all(|s| s["role"] == "value"));
}

#[tokio::test]
async fn test_chart_on_empty_table() {
    let (status, body) = get(
        router(support::empty_repository()),
        "/v1/insights/daily/share/chart",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
    // Default selection still plans a series per visible agent.
    assert_eq!(body["series"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_overview_and_table() {
    let app = router(support::seeded_repository());

    let (status, body) = get(app.clone(), "/v1/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["human"]["total_prs"], 300);
    assert!(body.get("copilot").is_none());

    let (status, body) = get(app, "/v1/overview/table?agents=codex").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["agent"], "human");
    assert_eq!(rows[0]["selected"], false);
    assert_eq!(rows[1]["merge_rate_display"], "80.00 %");
    assert_eq!(rows[1]["selected"], true);
}

#[tokio::test]
async fn test_release_and_last_updated() {
    let (status, body) = get(router(support::seeded_repository()), "/v1/release").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["release"]["date"], "2025-08-01");
    assert_eq!(body["last_updated"], "2025-08-03");

    let (_, body) = get(router(support::empty_repository()), "/v1/release").await;
    assert!(body["release"].is_null());
    assert!(body["last_updated"].is_null());
}

#[tokio::test]
async fn test_dashboard() {
    let (status, body) = get(router(support::seeded_repository()), "/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insights"].as_array().unwrap().len(), 7);
    assert_eq!(body["insights"][0]["title"], "Daily Trends");
    assert_eq!(body["insights"][0]["share"]["all"][1][1]["codex"]["value"], 6.0);
    assert_eq!(body["overview"]["codex"]["merged_prs"], 80);
}
