use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AgentId, AgentMap};

// =========================================================
// Overview types
// =========================================================

/// Placeholder shown instead of a merge rate that cannot be computed.
pub const MERGE_RATE_PLACEHOLDER: &str = "-";

/// Per-agent pull request totals. Every field may be absent in the store.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentOverview {
    pub total_prs: Option<i64>,
    pub closed_prs: Option<i64>,
    pub merged_prs: Option<i64>,
    pub additions: Option<i64>,
    pub deletions: Option<i64>,
    pub files_changed: Option<i64>,
    pub first_seen: Option<DateTime<Utc>>,
}

impl AgentOverview {
    /// `merged / closed`, or `None` when nothing was closed.
    ///
    /// A missing merged count with closed PRs present counts as zero merges.
    pub fn merge_rate(&self) -> Option<f64> {
        match self.closed_prs {
            Some(closed) if closed > 0 => {
                Some(self.merged_prs.unwrap_or(0) as f64 / closed as f64)
            }
            _ => None,
        }
    }

    /// Merge rate as a percentage with two decimals, or the placeholder.
    pub fn merge_rate_display(&self) -> String {
        match self.merge_rate() {
            Some(rate) => format!("{:.2} %", rate * 100.0),
            None => MERGE_RATE_PLACEHOLDER.to_string(),
        }
    }
}

/// One overview entry per agent.
pub type Overview = AgentMap<AgentOverview>;

/// A row of the overview table, already formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewTableRow {
    pub agent: AgentId,
    pub name: String,
    pub total_prs: Option<i64>,
    pub closed_prs: Option<i64>,
    pub merged_prs: Option<i64>,
    pub merge_rate: Option<f64>,
    pub merge_rate_display: String,
    /// Checkbox state, shared with the chart legend.
    pub selected: bool,
}

/// Most recent published dataset snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub doi: String,
    pub url: String,
    pub date: String,
}
