use serde::Serialize;
use std::fmt;

use crate::db::repository::RepositoryError;

/// Numeric field of a raw insight row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricField {
    Value,
    Lower,
    Upper,
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetricField::Value => "value",
            MetricField::Lower => "lower",
            MetricField::Upper => "upper",
        })
    }
}

/// Failure while fetching or shaping an insight.
#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    /// A numeric field held text that is not a finite number. The whole
    /// insight is rejected rather than rendered partially.
    #[error("Malformed {field} {raw:?} at row {row} (agent={agent}, key={key})")]
    MalformedMetric {
        row: usize,
        field: MetricField,
        agent: String,
        key: String,
        raw: String,
    },

    /// The store was unreachable or rejected the query.
    #[error("Query failure: {0}")]
    QueryFailure(#[from] RepositoryError),
}

impl InsightError {
    /// Stable error code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            InsightError::MalformedMetric { .. } => "MALFORMED_METRIC",
            InsightError::QueryFailure(_) => "QUERY_FAILURE",
        }
    }
}

pub type InsightResult<T> = Result<T, InsightError>;
