//! Service layer: shaping, selection state and page-load orchestration.
//!
//! Everything here is independent of the storage backend. Shaping functions
//! are pure; [`dashboard::load_dashboard`] is the only place that issues
//! queries, through the repository traits.

pub mod catalog;
pub mod dashboard;
pub mod error;
pub mod overview;
pub mod series;
pub mod shaper;
pub mod view_model;

pub use dashboard::load_dashboard;
pub use error::{InsightError, InsightResult, MetricField};
pub use overview::{overview_table, shape_overview};
pub use series::{chart_data, chart_series, resolve_filter, to_series_rows};
pub use shaper::shape_insight;
pub use view_model::DashboardViewModel;
