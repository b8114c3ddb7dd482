//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies are the shaped structures from the routes module; only
//! the request parameter types and small envelopes live here.

use serde::{Deserialize, Serialize};

pub use crate::api::{
    // Dashboard
    DashboardData, DashboardInsight, InsightDescriptor, InsightMetric,
    // Insights
    BinnedInsight,
    // Overview
    Overview, OverviewTableRow, Release,
    // Series
    ChartData,
};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Store connectivity as seen by the repository
    pub database: String,
}

/// Selection state carried in the query string.
///
/// `agents` is a comma-separated list of agent identifiers; missing
/// parameters fall back to the dashboard defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ViewQuery {
    #[serde(default)]
    pub agents: Option<String>,
    /// Restrict charts to the popular subset
    #[serde(default)]
    pub popular: Option<bool>,
    /// Draw confidence bounds where the metric has them
    #[serde(default)]
    pub bounds: Option<bool>,
}

/// One entry of the insight catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct InsightCatalogEntry {
    #[serde(flatten)]
    pub descriptor: InsightDescriptor,
    pub metrics: Vec<InsightMetric>,
}

impl From<&InsightDescriptor> for InsightCatalogEntry {
    fn from(descriptor: &InsightDescriptor) -> Self {
        Self {
            descriptor: *descriptor,
            metrics: vec![InsightMetric::Share, InsightMetric::MergeRate],
        }
    }
}

/// Catalog listing response.
#[derive(Debug, Clone, Serialize)]
pub struct InsightCatalogResponse {
    pub insights: Vec<InsightCatalogEntry>,
    pub total: usize,
}

/// Data freshness markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseResponse {
    pub release: Option<Release>,
    pub last_updated: Option<String>,
}
