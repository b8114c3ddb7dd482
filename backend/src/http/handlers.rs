//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for shaping.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{
    HealthResponse, InsightCatalogEntry, InsightCatalogResponse, ReleaseResponse, ViewQuery,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{
    BinnedInsight, ChartData, DashboardData, InsightDescriptor, InsightMetric, Overview,
    OverviewTableRow,
};
use crate::db::services as db_services;
use crate::services::{self, catalog, DashboardViewModel};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn view_model(query: &ViewQuery) -> Result<DashboardViewModel, AppError> {
    Ok(DashboardViewModel::from_params(
        query.agents.as_deref(),
        query.popular,
        query.bounds,
    )?)
}

fn resolve_insight(
    name: &str,
    metric: &str,
) -> Result<(&'static InsightDescriptor, InsightMetric), AppError> {
    let descriptor = catalog::find(name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown insight: {}", name)))?;
    let metric = metric.parse::<InsightMetric>().map_err(AppError::NotFound)?;
    Ok((descriptor, metric))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Verifies the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Page load
// =============================================================================

/// GET /v1/dashboard
///
/// Everything a dashboard page needs. Any failing query fails the request.
pub async fn get_dashboard(State(state): State<AppState>) -> HandlerResult<DashboardData> {
    let data = services::load_dashboard(state.repository.as_ref()).await?;
    Ok(Json(data))
}

/// GET /v1/overview
pub async fn get_overview(State(state): State<AppState>) -> HandlerResult<Overview> {
    let overview = db_services::fetch_overview(state.repository.as_ref()).await?;
    Ok(Json(overview))
}

/// GET /v1/overview/table?agents=
///
/// Overview rows sorted by total PRs, with the checkbox state of each agent.
pub async fn get_overview_table(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
) -> HandlerResult<Vec<OverviewTableRow>> {
    let view_model = view_model(&query)?;
    let overview = db_services::fetch_overview(state.repository.as_ref()).await?;
    Ok(Json(services::overview_table(&overview, &view_model)))
}

/// GET /v1/release
pub async fn get_release(State(state): State<AppState>) -> HandlerResult<ReleaseResponse> {
    let repo = state.repository.as_ref();
    let (release, last_updated) = futures::try_join!(
        db_services::fetch_last_release(repo),
        db_services::fetch_last_updated(repo)
    )?;
    Ok(Json(ReleaseResponse {
        release,
        last_updated,
    }))
}

// =============================================================================
// Insights
// =============================================================================

/// GET /v1/insights
pub async fn list_insights() -> HandlerResult<InsightCatalogResponse> {
    let insights: Vec<InsightCatalogEntry> = catalog::all().iter().map(Into::into).collect();
    let total = insights.len();
    Ok(Json(InsightCatalogResponse { insights, total }))
}

/// GET /v1/insights/{name}/{metric}
///
/// One metric of an insight table, shaped by filter and bucket.
pub async fn get_insight(
    State(state): State<AppState>,
    Path((name, metric)): Path<(String, String)>,
) -> HandlerResult<BinnedInsight> {
    let (descriptor, metric) = resolve_insight(&name, &metric)?;
    let query = catalog::query(descriptor, metric);
    let insight = db_services::fetch_binned_insight(state.repository.as_ref(), &query).await?;
    Ok(Json(insight))
}

/// GET /v1/insights/{name}/{metric}/chart?agents=&popular=&bounds=
///
/// Chart-ready rows and draw plan for the requested selection.
pub async fn get_insight_chart(
    State(state): State<AppState>,
    Path((name, metric)): Path<(String, String)>,
    Query(params): Query<ViewQuery>,
) -> HandlerResult<ChartData> {
    let (descriptor, metric) = resolve_insight(&name, &metric)?;
    let view_model = view_model(&params)?;
    let query = catalog::query(descriptor, metric);
    let insight = db_services::fetch_binned_insight(state.repository.as_ref(), &query).await?;

    Ok(Json(services::chart_data(
        &insight,
        descriptor.chart,
        metric.has_bounds(),
        &view_model,
    )))
}
