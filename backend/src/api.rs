//! Public API surface for the insight backend.
//!
//! This file consolidates the DTO types for the HTTP API.
//! All types derive (or implement) Serialize for JSON serialization.

pub use crate::models::{AgentId, AgentMap, UnknownAgent};
pub use crate::routes::dashboard::DashboardData;
pub use crate::routes::dashboard::DashboardInsight;
pub use crate::routes::dashboard::InsightDescriptor;
pub use crate::routes::dashboard::InsightMetric;
pub use crate::routes::insights::BinnedInsight;
pub use crate::routes::insights::Bounds;
pub use crate::routes::insights::FilterTag;
pub use crate::routes::insights::FilteredInsight;
pub use crate::routes::insights::InsightBucket;
pub use crate::routes::insights::InsightItem;
pub use crate::routes::insights::InsightValue;
pub use crate::routes::overview::AgentOverview;
pub use crate::routes::overview::Overview;
pub use crate::routes::overview::OverviewTableRow;
pub use crate::routes::overview::Release;
pub use crate::routes::series::ChartData;
pub use crate::routes::series::ChartKind;
pub use crate::routes::series::ChartSeries;
pub use crate::routes::series::SeriesCell;
pub use crate::routes::series::SeriesRole;
pub use crate::routes::series::SeriesRow;
pub use crate::routes::series::SeriesValue;
