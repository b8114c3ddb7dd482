//! In-memory local repository implementation.
//!
//! Tables are stored as lists of column-addressable rows and answered with
//! the same projection and ordering rules as the Postgres queries, which
//! makes this backend suitable for unit tests and local development.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::db::models::{InsightQuery, RawInsightRow, RawOverviewRow};
use crate::db::repository::*;
use crate::routes::overview::Release;

/// One cell of a local table.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Null,
}

impl CellValue {
    /// Text rendering, as a `::text` cast would produce.
    fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Null => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

/// A column-addressable row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalRow(BTreeMap<String, CellValue>);

impl LocalRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, builder style.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }
}

/// In-memory local repository.
///
/// # Example
/// ```
/// use aitw_insights::db::repositories::local::{LocalRepository, LocalRow};
///
/// let repo = LocalRepository::new();
/// repo.insert_row(
///     "insight_language",
///     LocalRow::new()
///         .with("agent", "codex")
///         .with("filter", "all")
///         .with("bin", "Rust")
///         .with("min", 0.0)
///         .with("total_pr_share", 0.25),
/// );
/// assert_eq!(repo.row_count("insight_language"), 1);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    tables: HashMap<String, Vec<LocalRow>>,
    overview: Vec<RawOverviewRow>,
    releases: Vec<Release>,
    metadata: HashMap<String, String>,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
            overview: Vec::new(),
            releases: Vec::new(),
            metadata: HashMap::new(),
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Create an empty table, so queries against it return no rows instead
    /// of failing.
    pub fn create_table(&self, table: impl Into<String>) {
        self.data.write().tables.entry(table.into()).or_default();
    }

    /// Append a row to a table, creating the table if needed.
    pub fn insert_row(&self, table: impl Into<String>, row: LocalRow) {
        self.data
            .write()
            .tables
            .entry(table.into())
            .or_default()
            .push(row);
    }

    /// Append a shaped-query row, laid out in the columns `query` reads.
    ///
    /// `order` is written to the order column (without cast) when it differs
    /// from the bucket column.
    pub fn insert_insight_row(
        &self,
        query: &InsightQuery,
        row: RawInsightRow,
        order: impl Into<CellValue>,
    ) {
        let mut local = LocalRow::new()
            .with("agent", row.agent)
            .with("filter", row.filter)
            .with(query.bucket_column.clone(), row.key)
            .with(query.value_column.clone(), row.value)
            .with(query.lower_column(), row.lower)
            .with(query.upper_column(), row.upper);
        if query.order_column_name() != query.bucket_column {
            local = local.with(query.order_column_name().to_string(), order);
        }
        self.insert_row(query.table.clone(), local);
    }

    pub fn insert_overview(&self, row: RawOverviewRow) {
        self.data.write().overview.push(row);
    }

    pub fn insert_release(&self, release: Release) {
        self.data.write().releases.push(release);
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<String>) {
        self.data.write().metadata.insert(key.into(), value.into());
    }

    /// Set the health status (simulates an unreachable store).
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Number of rows in a table (0 when the table does not exist).
    pub fn row_count(&self, table: &str) -> usize {
        self.data.read().tables.get(table).map_or(0, Vec::len)
    }

    fn check_health(&self, operation: &str) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Database is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_column(column: &str, table: &str, operation: &str) -> RepositoryError {
    RepositoryError::query_with_context(
        format!("column \"{}\" does not exist", column),
        ErrorContext::new(operation).with_entity(table),
    )
}

/// Text of a column, failing like Postgres does for an unknown column.
fn column_text(
    row: &LocalRow,
    column: &str,
    table: &str,
    operation: &str,
) -> RepositoryResult<Option<String>> {
    row.get(column)
        .map(CellValue::to_text)
        .ok_or_else(|| missing_column(column, table, operation))
}

/// Ascending order: numbers (or numeric text) first and numerically, then
/// other text lexically, then NULLs.
fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    fn numeric(cell: &CellValue) -> Option<f64> {
        match cell {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Null => None,
        }
    }

    let a = a.filter(|c| **c != CellValue::Null);
    let b = b.filter(|c| **c != CellValue::Null);
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match (numeric(a), numeric(b)) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.to_text().cmp(&b.to_text()),
        },
    }
}

#[async_trait]
impl InsightRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn fetch_insight_rows(&self, query: &InsightQuery) -> RepositoryResult<Vec<RawInsightRow>> {
        const OP: &str = "fetch_insight_rows";
        query.validate()?;
        self.check_health(OP)?;

        let data = self.data.read();
        let table = data.tables.get(&query.table).ok_or_else(|| {
            RepositoryError::query_with_context(
                format!("relation \"{}\" does not exist", query.table),
                ErrorContext::new(OP).with_entity(query.table.clone()),
            )
        })?;

        let order_column = query.order_column_name();
        let mut ordered: Vec<&LocalRow> = table.iter().collect();
        ordered.sort_by(|a, b| compare_cells(a.get(order_column), b.get(order_column)));

        let mut rows = Vec::with_capacity(ordered.len());
        for row in ordered {
            if row.get(order_column).is_none() {
                return Err(missing_column(order_column, &query.table, OP));
            }
            let (lower, upper) = if query.with_bounds {
                (
                    column_text(row, &query.lower_column(), &query.table, OP)?,
                    column_text(row, &query.upper_column(), &query.table, OP)?,
                )
            } else {
                (None, None)
            };
            rows.push(RawInsightRow {
                agent: column_text(row, "agent", &query.table, OP)?.unwrap_or_default(),
                filter: column_text(row, "filter", &query.table, OP)?.unwrap_or_default(),
                key: column_text(row, &query.bucket_column, &query.table, OP)?.unwrap_or_default(),
                value: column_text(row, &query.value_column, &query.table, OP)?,
                lower,
                upper,
            });
        }

        log::debug!("{}: {} rows from {}", OP, rows.len(), query.table);
        Ok(rows)
    }

    async fn fetch_overview_rows(&self) -> RepositoryResult<Vec<RawOverviewRow>> {
        self.check_health("fetch_overview_rows")?;

        let mut rows = self.data.read().overview.clone();
        // DESC puts NULLs first
        rows.sort_by(|a, b| match (a.total_prs, b.total_prs) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => y.cmp(&x),
        });
        Ok(rows)
    }
}

#[async_trait]
impl MetadataRepository for LocalRepository {
    async fn fetch_last_release(&self) -> RepositoryResult<Option<Release>> {
        self.check_health("fetch_last_release")?;

        let data = self.data.read();
        Ok(data
            .releases
            .iter()
            .fold(None::<&Release>, |latest, r| match latest {
                Some(l) if l.date >= r.date => Some(l),
                _ => Some(r),
            })
            .cloned())
    }

    async fn fetch_last_updated(&self) -> RepositoryResult<Option<String>> {
        self.check_health("fetch_last_updated")?;
        Ok(self.data.read().metadata.get("last_updated").cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_query() -> InsightQuery {
        InsightQuery::new("insight_daily", "bin", "total_prs", "bin::date")
    }

    #[tokio::test]
    async fn test_rows_ordered_by_cast_column() {
        let repo = LocalRepository::new();
        let q = daily_query();
        for day in ["2025-05-03", "2025-05-01", "2025-05-02"] {
            repo.insert_insight_row(&q, RawInsightRow::new("codex", "all", day, "1"), day);
        }

        let rows = repo.fetch_insight_rows(&q).await.unwrap();
        let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["2025-05-01", "2025-05-02", "2025-05-03"]);
    }

    #[tokio::test]
    async fn test_numeric_order_is_stable() {
        let repo = LocalRepository::new();
        let q = InsightQuery::new("insight_changed_files", "bin", "total_pr_share", "min");
        repo.insert_insight_row(&q, RawInsightRow::new("codex", "all", "10-100", "0.1"), 10.0);
        repo.insert_insight_row(&q, RawInsightRow::new("codex", "all", "2-10", "0.2"), 2.0);
        repo.insert_insight_row(&q, RawInsightRow::new("human", "all", "10-100", "0.3"), 10.0);

        let rows = repo.fetch_insight_rows(&q).await.unwrap();
        let pairs: Vec<_> = rows
            .iter()
            .map(|r| (r.agent.as_str(), r.key.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("codex", "2-10"), ("codex", "10-100"), ("human", "10-100")]
        );
    }

    #[tokio::test]
    async fn test_bounds_only_projected_when_requested() {
        let repo = LocalRepository::new();
        let q = InsightQuery::new("insight_language", "bin", "merge_rate", "min");
        repo.insert_insight_row(
            &q,
            RawInsightRow::new("codex", "all", "Rust", "0.5").with_bounds("0.4", "0.6"),
            0.0,
        );

        let plain = repo.fetch_insight_rows(&q).await.unwrap();
        assert_eq!(plain[0].lower, None);

        let bounded = repo
            .fetch_insight_rows(&q.clone().with_bounds(true))
            .await
            .unwrap();
        assert_eq!(bounded[0].lower.as_deref(), Some("0.4"));
        assert_eq!(bounded[0].upper.as_deref(), Some("0.6"));
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let repo = LocalRepository::new();
        let err = repo.fetch_insight_rows(&daily_query()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::QueryError { .. }));
        assert_eq!(err.context().entity.as_deref(), Some("insight_daily"));
    }

    #[tokio::test]
    async fn test_empty_table_is_not_an_error() {
        let repo = LocalRepository::new();
        repo.create_table("insight_daily");
        assert!(repo.fetch_insight_rows(&daily_query()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unhealthy_repository_fails_queries() {
        let repo = LocalRepository::new();
        repo.create_table("insight_daily");
        repo.set_healthy(false);

        assert!(!repo.health_check().await.unwrap());
        let err = repo.fetch_insight_rows(&daily_query()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::ConnectionError { .. }));
        assert!(repo.fetch_overview_rows().await.is_err());
    }

    #[tokio::test]
    async fn test_overview_sorted_desc_with_nulls_first() {
        let repo = LocalRepository::new();
        for (agent, total) in [("human", Some(10)), ("codex", Some(30)), ("jules", None)] {
            repo.insert_overview(RawOverviewRow {
                agent: agent.to_string(),
                total_prs: total,
                ..Default::default()
            });
        }

        let rows = repo.fetch_overview_rows().await.unwrap();
        let agents: Vec<_> = rows.iter().map(|r| r.agent.as_str()).collect();
        assert_eq!(agents, vec!["jules", "codex", "human"]);
    }

    #[tokio::test]
    async fn test_latest_release_and_metadata() {
        let repo = LocalRepository::new();
        assert!(repo.fetch_last_release().await.unwrap().is_none());

        for date in ["2025-06-01", "2025-08-01", "2025-07-01"] {
            repo.insert_release(Release {
                doi: format!("10.5281/zenodo.{}", date),
                url: "https://zenodo.org".to_string(),
                date: date.to_string(),
            });
        }
        repo.set_metadata("last_updated", "2025-08-02");

        let release = repo.fetch_last_release().await.unwrap().unwrap();
        assert_eq!(release.date, "2025-08-01");
        assert_eq!(
            repo.fetch_last_updated().await.unwrap().as_deref(),
            Some("2025-08-02")
        );
    }

    #[test]
    fn test_mixed_order_cells_sort_consistently() {
        let cells = [
            CellValue::from("1a"),
            CellValue::Null,
            CellValue::from("10"),
            CellValue::from(2.0),
            CellValue::from("b"),
        ];
        for a in &cells {
            for b in &cells {
                for c in &cells {
                    let ab = compare_cells(Some(a), Some(b));
                    let bc = compare_cells(Some(b), Some(c));
                    if ab == bc && ab != Ordering::Equal {
                        assert_eq!(compare_cells(Some(a), Some(c)), ab, "{:?} {:?} {:?}", a, b, c);
                    }
                }
            }
        }

        let mut sorted = cells.to_vec();
        sorted.sort_by(|a, b| compare_cells(Some(a), Some(b)));
        assert_eq!(
            sorted,
            vec![
                CellValue::from(2.0),
                CellValue::from("10"),
                CellValue::from("1a"),
                CellValue::from("b"),
                CellValue::Null,
            ]
        );
    }

    #[test]
    fn test_number_cells_render_as_text() {
        assert_eq!(CellValue::Number(0.5).to_text().as_deref(), Some("0.5"));
        assert_eq!(CellValue::Number(3.0).to_text().as_deref(), Some("3"));
        assert_eq!(CellValue::Null.to_text(), None);
    }
}
