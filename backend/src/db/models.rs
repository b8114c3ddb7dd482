//! Query contract types shared by every repository backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::repository::{ErrorContext, RepositoryError, RepositoryResult};

/// Suffix of the lower-bound column next to a value column.
pub const LOWER_BOUND_COLUMN_SUFFIX: &str = "_lb";
/// Suffix of the upper-bound column next to a value column.
pub const UPPER_BOUND_COLUMN_SUFFIX: &str = "_ub";

/// Projection over one pre-computed metric table.
///
/// Issues `(agent, filter, <bucket> AS key, <value> AS value[, <value>_lb AS
/// lower, <value>_ub AS upper])` ordered by `<order>` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightQuery {
    pub table: String,
    pub bucket_column: String,
    pub value_column: String,
    /// May carry a cast, e.g. `bin::date`.
    pub order_column: String,
    pub with_bounds: bool,
}

impl InsightQuery {
    pub fn new(
        table: impl Into<String>,
        bucket_column: impl Into<String>,
        value_column: impl Into<String>,
        order_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            bucket_column: bucket_column.into(),
            value_column: value_column.into(),
            order_column: order_column.into(),
            with_bounds: false,
        }
    }

    pub fn with_bounds(mut self, with_bounds: bool) -> Self {
        self.with_bounds = with_bounds;
        self
    }

    pub fn lower_column(&self) -> String {
        format!("{}{}", self.value_column, LOWER_BOUND_COLUMN_SUFFIX)
    }

    pub fn upper_column(&self) -> String {
        format!("{}{}", self.value_column, UPPER_BOUND_COLUMN_SUFFIX)
    }

    /// Order column without its cast suffix.
    pub fn order_column_name(&self) -> &str {
        self.order_column
            .split_once("::")
            .map(|(name, _)| name)
            .unwrap_or(&self.order_column)
    }

    /// Reject identifiers that cannot be safely interpolated into SQL.
    pub fn validate(&self) -> RepositoryResult<()> {
        let invalid = |what: &str, value: &str| {
            RepositoryError::validation_with_context(
                format!("Invalid {} identifier: {:?}", what, value),
                ErrorContext::new("validate_insight_query").with_entity(self.table.clone()),
            )
        };

        if !is_identifier(&self.table) {
            return Err(invalid("table", &self.table));
        }
        if !is_identifier(&self.bucket_column) {
            return Err(invalid("bucket column", &self.bucket_column));
        }
        if !is_identifier(&self.value_column) {
            return Err(invalid("value column", &self.value_column));
        }
        let order_ok = match self.order_column.split_once("::") {
            Some((name, cast)) => is_identifier(name) && is_identifier(cast),
            None => is_identifier(&self.order_column),
        };
        if !order_ok {
            return Err(invalid("order column", &self.order_column));
        }
        Ok(())
    }

    /// SQL text of the projection. Numeric columns are cast to text so that
    /// parsing (and its failure) happens in the shaper.
    pub fn to_sql(&self) -> RepositoryResult<String> {
        self.validate()?;

        let bounds = if self.with_bounds {
            format!(
                ", {lower}::text AS lower, {upper}::text AS upper",
                lower = self.lower_column(),
                upper = self.upper_column()
            )
        } else {
            ", NULL::text AS lower, NULL::text AS upper".to_string()
        };

        Ok(format!(
            "SELECT agent::text AS agent, filter::text AS filter, {key}::text AS key, {value}::text AS value{bounds} FROM {table} ORDER BY {order} ASC",
            key = self.bucket_column,
            value = self.value_column,
            bounds = bounds,
            table = self.table,
            order = self.order_column,
        ))
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One row of an insight projection, numeric fields still as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInsightRow {
    pub agent: String,
    pub filter: String,
    pub key: String,
    pub value: Option<String>,
    pub lower: Option<String>,
    pub upper: Option<String>,
}

impl RawInsightRow {
    pub fn new(
        agent: impl Into<String>,
        filter: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            agent: agent.into(),
            filter: filter.into(),
            key: key.into(),
            value: Some(value.into()),
            lower: None,
            upper: None,
        }
    }

    pub fn with_bounds(mut self, lower: impl Into<String>, upper: impl Into<String>) -> Self {
        self.lower = Some(lower.into());
        self.upper = Some(upper.into());
        self
    }
}

/// One row of the overview projection.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawOverviewRow {
    pub agent: String,
    pub total_prs: Option<i64>,
    pub closed_prs: Option<i64>,
    pub merged_prs: Option<i64>,
    pub additions: Option<i64>,
    pub deletions: Option<i64>,
    pub changed_files: Option<i64>,
    pub first_seen: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("insight_daily"));
        assert!(is_identifier("_x1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("bin; DROP TABLE prs"));
        assert!(!is_identifier("a.b"));
    }

    #[test]
    fn test_order_column_cast_allowed() {
        let q = InsightQuery::new("insight_daily", "bin", "total_prs", "bin::date");
        assert!(q.validate().is_ok());
        assert_eq!(q.order_column_name(), "bin");

        let bad = InsightQuery::new("insight_daily", "bin", "total_prs", "bin::date; --");
        assert!(matches!(
            bad.validate(),
            Err(RepositoryError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_sql_with_bounds() {
        let q = InsightQuery::new("insight_language", "bin", "merge_rate", "min").with_bounds(true);
        let sql = q.to_sql().unwrap();
        assert!(sql.contains("merge_rate::text AS value"));
        assert!(sql.contains("merge_rate_lb::text AS lower"));
        assert!(sql.contains("merge_rate_ub::text AS upper"));
        assert!(sql.ends_with("FROM insight_language ORDER BY min ASC"));
    }

    #[test]
    fn test_sql_without_bounds_projects_nulls() {
        let q = InsightQuery::new("insight_daily", "bin", "total_prs", "bin::date");
        let sql = q.to_sql().unwrap();
        assert!(sql.contains("NULL::text AS lower"));
        assert!(!sql.contains("total_prs_lb"));
        assert!(sql.ends_with("ORDER BY bin::date ASC"));
    }
}
