//! [`BinnedInsight`] → flat chart records and a draw plan.
//!
//! Rows carry every agent of a bucket whether visible or not, so visibility
//! and the popularity toggle only change which rows and series are picked,
//! never the shaped data.

use log::debug;

use super::view_model::DashboardViewModel;
use crate::api::{
    BinnedInsight, ChartData, ChartKind, ChartSeries, FilterTag, FilteredInsight, InsightBucket,
    SeriesCell, SeriesRole, SeriesRow, SeriesValue,
};
use crate::routes::series::{LOWER_BOUND_SUFFIX, RANGE_SUFFIX};

/// Bucket list for `filter`, falling back to `all` when it is absent.
pub fn resolve_filter<'a>(
    insight: &'a BinnedInsight,
    filter: &FilterTag,
) -> Option<(FilterTag, &'a FilteredInsight)> {
    if let Some(found) = insight.get(filter.as_str()) {
        return Some((filter.clone(), found));
    }
    let fallback = insight.get(FilterTag::ALL)?;
    debug!("Filter {} not present, falling back to {}", filter, FilterTag::ALL);
    Some((FilterTag::all(), fallback))
}

fn series_row(bucket: &InsightBucket) -> SeriesRow {
    let cells = bucket
        .item()
        .iter()
        .map(|(agent, v)| {
            let cell = SeriesCell {
                value: SeriesValue::from(v.value),
                lower: v.bounds.map(|b| b.lower),
                range: v.bounds.map_or(0.0, |b| b.width()),
            };
            (agent, cell)
        })
        .collect();

    SeriesRow {
        key: bucket.key().to_string(),
        cells,
    }
}

/// One record per bucket of the chosen filter. Empty when neither the
/// requested filter nor `all` exists.
pub fn to_series_rows(insight: &BinnedInsight, filter: &FilterTag) -> Vec<SeriesRow> {
    resolve_filter(insight, filter)
        .map(|(_, filtered)| filtered.buckets().iter().map(series_row).collect())
        .unwrap_or_default()
}

/// Series to draw for the visible agents.
///
/// Line charts draw the confidence band as two stacked areas (an invisible
/// base up to the lower bound, then the band width) below the value lines.
/// Bar charts attach an error bar to each bar.
pub fn chart_series(
    view_model: &DashboardViewModel,
    kind: ChartKind,
    has_bounds: bool,
) -> Vec<ChartSeries> {
    let show_bounds = has_bounds && view_model.bounds_visible();
    let mut series = Vec::new();

    match kind {
        ChartKind::Line => {
            if show_bounds {
                for role in [SeriesRole::BandBase, SeriesRole::BandWidth] {
                    let suffix = match role {
                        SeriesRole::BandBase => LOWER_BOUND_SUFFIX,
                        _ => RANGE_SUFFIX,
                    };
                    series.extend(view_model.visible_agents().map(|agent| ChartSeries {
                        agent,
                        data_key: format!("{}{}", agent, suffix),
                        role,
                        stack_id: Some(format!("{}_confidence", agent)),
                        label: agent.display_name().to_string(),
                    }));
                }
            }
            series.extend(view_model.visible_agents().map(|agent| ChartSeries {
                agent,
                data_key: agent.as_str().to_string(),
                role: SeriesRole::Value,
                stack_id: None,
                label: agent.display_name().to_string(),
            }));
        }
        ChartKind::Bar => {
            for agent in view_model.visible_agents() {
                series.push(ChartSeries {
                    agent,
                    data_key: agent.as_str().to_string(),
                    role: SeriesRole::Value,
                    stack_id: None,
                    label: agent.display_name().to_string(),
                });
                if show_bounds {
                    series.push(ChartSeries {
                        agent,
                        data_key: format!("{}{}", agent, RANGE_SUFFIX),
                        role: SeriesRole::ErrorBar,
                        stack_id: None,
                        label: agent.display_name().to_string(),
                    });
                }
            }
        }
    }

    series
}

/// Rows and draw plan for one insight metric under the current selection.
pub fn chart_data(
    insight: &BinnedInsight,
    kind: ChartKind,
    has_bounds: bool,
    view_model: &DashboardViewModel,
) -> ChartData {
    let requested = view_model.filter_choice();
    let filter = resolve_filter(insight, &requested)
        .map(|(tag, _)| tag)
        .unwrap_or(requested);

    ChartData {
        rows: to_series_rows(insight, &filter),
        series: chart_series(view_model, kind, has_bounds),
        filter,
        kind,
    }
}

#[cfg(test)]
#[path = "series_tests.rs"]
mod series_tests;
