use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text, Timestamptz};

use crate::db::models::{RawInsightRow, RawOverviewRow};
use crate::routes::overview::Release;

#[derive(Debug, Clone, QueryableByName)]
pub struct InsightRowSql {
    #[diesel(sql_type = Nullable<Text>)]
    pub agent: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub filter: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub key: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub value: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub lower: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub upper: Option<String>,
}

impl From<InsightRowSql> for RawInsightRow {
    fn from(row: InsightRowSql) -> Self {
        Self {
            agent: row.agent.unwrap_or_default(),
            filter: row.filter.unwrap_or_default(),
            key: row.key.unwrap_or_default(),
            value: row.value,
            lower: row.lower,
            upper: row.upper,
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct OverviewRowSql {
    #[diesel(sql_type = Text)]
    pub agent: String,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub total_prs: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub merged_prs: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub closed_prs: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub additions: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub deletions: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub changed_files: Option<i64>,
    #[diesel(sql_type = Nullable<Timestamptz>)]
    pub first_seen: Option<DateTime<Utc>>,
}

impl From<OverviewRowSql> for RawOverviewRow {
    fn from(row: OverviewRowSql) -> Self {
        Self {
            agent: row.agent,
            total_prs: row.total_prs,
            closed_prs: row.closed_prs,
            merged_prs: row.merged_prs,
            additions: row.additions,
            deletions: row.deletions,
            changed_files: row.changed_files,
            first_seen: row.first_seen,
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct ReleaseRowSql {
    #[diesel(sql_type = Text)]
    pub doi: String,
    #[diesel(sql_type = Text)]
    pub url: String,
    #[diesel(sql_type = Text)]
    pub date: String,
}

impl From<ReleaseRowSql> for Release {
    fn from(row: ReleaseRowSql) -> Self {
        Self {
            doi: row.doi,
            url: row.url,
            date: row.date,
        }
    }
}

#[derive(Debug, Clone, QueryableByName)]
pub struct MetadataValueSql {
    #[diesel(sql_type = Nullable<Text>)]
    pub value: Option<String>,
}
