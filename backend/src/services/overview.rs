//! Overview rows → per-agent totals, and the sorted overview table.

use log::{debug, warn};
use std::cmp::Ordering;

use super::view_model::DashboardViewModel;
use crate::api::{AgentId, AgentOverview, Overview, OverviewTableRow};
use crate::db::models::RawOverviewRow;

/// Build the per-agent overview. One row per agent is expected; when an
/// agent repeats, its first row wins. Unknown agents are skipped.
pub fn shape_overview(rows: &[RawOverviewRow]) -> Overview {
    let mut overview = Overview::new();
    for row in rows {
        let agent = match row.agent.parse::<AgentId>() {
            Ok(agent) => agent,
            Err(e) => {
                warn!("Skipping overview row: {}", e);
                continue;
            }
        };
        let entry = AgentOverview {
            total_prs: row.total_prs,
            closed_prs: row.closed_prs,
            merged_prs: row.merged_prs,
            additions: row.additions,
            deletions: row.deletions,
            files_changed: row.changed_files,
            first_seen: row.first_seen,
        };
        if !overview.insert_if_absent(agent, entry) {
            debug!("Ignoring repeated overview row for {}", agent);
        }
    }
    overview
}

/// Descending by total, absent totals last, ties in agent order.
fn by_total_desc(a: &(AgentId, &AgentOverview), b: &(AgentId, &AgentOverview)) -> Ordering {
    match (a.1.total_prs, b.1.total_prs) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then(a.0.cmp(&b.0))
}

/// Rows of the overview table, one per agent with an entry.
pub fn overview_table(overview: &Overview, view_model: &DashboardViewModel) -> Vec<OverviewTableRow> {
    let mut entries: Vec<(AgentId, &AgentOverview)> = overview.iter().collect();
    entries.sort_by(by_total_desc);

    entries
        .into_iter()
        .map(|(agent, o)| OverviewTableRow {
            agent,
            name: agent.display_name().to_string(),
            total_prs: o.total_prs,
            closed_prs: o.closed_prs,
            merged_prs: o.merged_prs,
            merge_rate: o.merge_rate(),
            merge_rate_display: o.merge_rate_display(),
            selected: view_model.is_visible(agent),
        })
        .collect()
}
