//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

// =============================================================================
// Store fixtures
// =============================================================================

use aitw_insights::api::Release;
use aitw_insights::db::repositories::{LocalRepository, LocalRow};
use aitw_insights::db::RawOverviewRow;
use aitw_insights::services::catalog;

/// `(agent, day, total_prs, merge_rate, lower, upper)` rows of `insight_daily`.
pub const DAILY: [(&str, &str, f64, f64, f64, f64); 4] = [
    ("human", "2025-05-20", 10.0, 0.80, 0.70, 0.90),
    ("codex", "2025-05-20", 4.0, 0.50, 0.40, 0.60),
    ("human", "2025-05-21", 12.0, 0.75, 0.65, 0.85),
    ("codex", "2025-05-21", 6.0, 0.55, 0.45, 0.65),
];

/// Local store with every catalog table present and empty.
pub fn empty_repository() -> LocalRepository {
    let repo = LocalRepository::new();
    for descriptor in catalog::all() {
        repo.create_table(descriptor.table);
    }
    repo
}

/// Local store holding a small but complete dataset:
/// two days of daily trends, one language bucket under both filters,
/// three overview rows, a release and a last-updated marker.
pub fn seeded_repository() -> LocalRepository {
    let repo = empty_repository();

    for (agent, day, total, rate, lower, upper) in DAILY {
        repo.insert_row(
            "insight_daily",
            LocalRow::new()
                .with("agent", agent)
                .with("filter", "all")
                .with("bin", day)
                .with("total_prs", total)
                .with("merge_rate", rate)
                .with("merge_rate_lb", lower)
                .with("merge_rate_ub", upper),
        );
    }

    for (filter, agent, share) in [
        ("all", "human", 0.4),
        ("all", "copilot", 0.5),
        ("popular", "human", 0.6),
        ("popular", "copilot", 0.7),
    ] {
        repo.insert_row(
            "insight_language",
            LocalRow::new()
                .with("agent", agent)
                .with("filter", filter)
                .with("bin", "Rust")
                .with("min", 0.0)
                .with("total_pr_share", share)
                .with("merge_rate", 0.7)
                .with("merge_rate_lb", 0.6)
                .with("merge_rate_ub", 0.8),
        );
    }

    repo.insert_overview(RawOverviewRow {
        agent: "human".to_string(),
        total_prs: Some(300),
        closed_prs: Some(200),
        merged_prs: Some(150),
        ..Default::default()
    });
    repo.insert_overview(RawOverviewRow {
        agent: "codex".to_string(),
        total_prs: Some(120),
        closed_prs: Some(100),
        merged_prs: Some(80),
        ..Default::default()
    });
    repo.insert_overview(RawOverviewRow {
        agent: "jules".to_string(),
        total_prs: Some(5),
        closed_prs: Some(0),
        merged_prs: Some(0),
        ..Default::default()
    });

    repo.insert_release(Release {
        doi: "10.5281/zenodo.15000000".to_string(),
        url: "https://doi.org/10.5281/zenodo.15000000".to_string(),
        date: "2025-08-01".to_string(),
    });
    repo.set_metadata("last_updated", "2025-08-03");
    repo
}
