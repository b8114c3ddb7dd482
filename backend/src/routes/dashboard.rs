use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::insights::BinnedInsight;
use super::overview::{Overview, Release};
use super::series::ChartKind;

// =========================================================
// Dashboard types
// =========================================================

/// Which metric of an insight table to chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightMetric {
    /// Portion (or count) of PRs per bucket.
    Share,
    /// Merge rate per bucket, with a confidence interval.
    MergeRate,
}

impl InsightMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            InsightMetric::Share => "share",
            InsightMetric::MergeRate => "merge_rate",
        }
    }

    /// Whether the metric carries lower/upper bound columns.
    pub fn has_bounds(self) -> bool {
        matches!(self, InsightMetric::MergeRate)
    }
}

impl FromStr for InsightMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "share" => Ok(Self::Share),
            "merge_rate" | "merge-rate" => Ok(Self::MergeRate),
            _ => Err(format!("Unknown insight metric: {}", s)),
        }
    }
}

/// Static description of one dashboard insight section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InsightDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    pub title: &'static str,
    pub x_label: &'static str,
    pub chart: ChartKind,
    #[serde(skip)]
    pub bucket_column: &'static str,
    #[serde(skip)]
    pub share_column: &'static str,
    #[serde(skip)]
    pub order_column: &'static str,
}

/// Both metrics of one insight section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardInsight {
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub chart: ChartKind,
    pub share: BinnedInsight,
    pub merge_rate: BinnedInsight,
}

/// Everything a page load needs, fetched once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub overview: Overview,
    pub release: Option<Release>,
    pub last_updated: Option<String>,
    pub insights: Vec<DashboardInsight>,
}

impl DashboardData {
    pub fn insight(&self, name: &str) -> Option<&DashboardInsight> {
        self.insights.iter().find(|i| i.name == name)
    }
}
