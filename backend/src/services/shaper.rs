//! Flat metric rows → [`BinnedInsight`].
//!
//! The store returns one row per (agent, filter, bucket) already ordered by
//! the table's order column. Shaping groups those rows by filter and bucket
//! without re-sorting, so the bucket order of every filter is the order in
//! which its keys first appear in the stream.

use log::{debug, warn};
use std::collections::HashMap;

use super::error::{InsightError, InsightResult, MetricField};
use crate::api::{
    AgentId, BinnedInsight, Bounds, FilterTag, FilteredInsight, InsightBucket, InsightItem,
    InsightValue,
};
use crate::db::models::RawInsightRow;

/// Buckets of one filter plus a key index into them.
#[derive(Default)]
struct FilterAccumulator {
    buckets: Vec<InsightBucket>,
    index: HashMap<String, usize>,
}

impl FilterAccumulator {
    fn bucket_mut(&mut self, key: &str) -> &mut InsightItem {
        let slot = match self.index.get(key) {
            Some(&slot) => slot,
            None => {
                self.buckets
                    .push(InsightBucket(key.to_string(), InsightItem::new()));
                self.index.insert(key.to_string(), self.buckets.len() - 1);
                self.buckets.len() - 1
            }
        };
        &mut self.buckets[slot].1
    }
}

fn parse_metric(
    raw: Option<&str>,
    field: MetricField,
    row_index: usize,
    row: &RawInsightRow,
) -> InsightResult<Option<f64>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(InsightError::MalformedMetric {
            row: row_index,
            field,
            agent: row.agent.clone(),
            key: row.key.clone(),
            raw: raw.to_string(),
        }),
    }
}

/// Group `rows` into a [`BinnedInsight`].
///
/// - Rows naming an unknown agent are skipped (their bucket still exists).
/// - The first row of a repeated `(filter, key, agent)` wins.
/// - Bounds are read only when `with_bounds` is set; a half pair is dropped.
/// - Any unparseable or non-finite numeric text fails the whole shape.
pub fn shape_insight(rows: &[RawInsightRow], with_bounds: bool) -> InsightResult<BinnedInsight> {
    let mut filters: Vec<(FilterTag, FilterAccumulator)> = Vec::new();
    let mut filter_index: HashMap<&str, usize> = HashMap::new();
    let mut skipped = 0usize;
    let mut duplicates = 0usize;

    for (row_index, row) in rows.iter().enumerate() {
        let slot = match filter_index.get(row.filter.as_str()) {
            Some(&slot) => slot,
            None => {
                filters.push((
                    FilterTag::new(row.filter.as_str()),
                    FilterAccumulator::default(),
                ));
                filter_index.insert(row.filter.as_str(), filters.len() - 1);
                filters.len() - 1
            }
        };
        let item = filters[slot].1.bucket_mut(&row.key);

        // Numbers are checked before the agent so bad data fails even on
        // rows that are skipped.
        let value = parse_metric(row.value.as_deref(), MetricField::Value, row_index, row)?;
        let bounds = if with_bounds {
            let lower = parse_metric(row.lower.as_deref(), MetricField::Lower, row_index, row)?;
            let upper = parse_metric(row.upper.as_deref(), MetricField::Upper, row_index, row)?;
            Bounds::pair(lower, upper)
        } else {
            None
        };

        let agent = match row.agent.parse::<AgentId>() {
            Ok(agent) => agent,
            Err(e) => {
                warn!("Skipping row {}: {}", row_index, e);
                skipped += 1;
                continue;
            }
        };

        if !item.insert_if_absent(agent, InsightValue::with_bounds(value, bounds)) {
            debug!(
                "Ignoring repeated row {} for ({}, {}, {})",
                row_index, row.filter, row.key, agent
            );
            duplicates += 1;
        }
    }

    if skipped > 0 || duplicates > 0 {
        debug!(
            "Shaped {} rows: {} unknown-agent rows skipped, {} duplicates ignored",
            rows.len(),
            skipped,
            duplicates
        );
    }

    Ok(BinnedInsight::from_filters(
        filters
            .into_iter()
            .map(|(tag, acc)| (tag, FilteredInsight(acc.buckets)))
            .collect(),
    ))
}

#[cfg(test)]
#[path = "shaper_tests.rs"]
mod shaper_tests;
