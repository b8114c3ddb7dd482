//! Postgres repository implementation using Diesel.
//!
//! The metric tables are produced by an external pipeline; this module only
//! reads them through raw projections, it owns no schema and runs no
//! migrations.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_APPLICATION_NAME`: Reported `application_name` (default: "frontend")
//! - `PG_OVERVIEW_EXTENDED`: Read the optional size and first-seen overview
//!   columns (default: false)

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_query;
use diesel::sql_types::Text;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::models::{InsightQuery, RawInsightRow, RawOverviewRow};
use crate::db::repository::{
    ErrorContext, InsightRepository, MetadataRepository, RepositoryError, RepositoryResult,
};
use crate::routes::overview::Release;

mod models;

use models::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Base overview projection. Only the four count columns are guaranteed to
/// exist in `insight_overview`; the others are read as NULL.
const OVERVIEW_SQL: &str = "SELECT agent::text AS agent, \
     total_prs::bigint AS total_prs, merged_prs::bigint AS merged_prs, \
     closed_prs::bigint AS closed_prs, NULL::bigint AS additions, \
     NULL::bigint AS deletions, NULL::bigint AS changed_files, \
     NULL::timestamptz AS first_seen \
     FROM insight_overview ORDER BY total_prs DESC";

/// Overview projection for stores whose `insight_overview` also carries
/// change size and first-seen columns.
const OVERVIEW_EXTENDED_SQL: &str = "SELECT agent::text AS agent, \
     total_prs::bigint AS total_prs, merged_prs::bigint AS merged_prs, \
     closed_prs::bigint AS closed_prs, additions::bigint AS additions, \
     deletions::bigint AS deletions, changed_files::bigint AS changed_files, \
     first_seen::timestamptz AS first_seen \
     FROM insight_overview ORDER BY total_prs DESC";

fn overview_sql(extended_columns: bool) -> &'static str {
    if extended_columns {
        OVERVIEW_EXTENDED_SQL
    } else {
        OVERVIEW_SQL
    }
}

const LAST_RELEASE_SQL: &str =
    "SELECT doi::text AS doi, url::text AS url, date::text AS date FROM releases ORDER BY date DESC LIMIT 1";

const LAST_UPDATED_SQL: &str = "SELECT value::text AS value FROM metadata WHERE key = $1 LIMIT 1";

const LAST_UPDATED_KEY: &str = "last_updated";

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// `application_name` set on every pooled session
    pub application_name: String,
    /// Read `additions`, `deletions`, `changed_files` and `first_seen` from
    /// `insight_overview` instead of leaving them absent
    pub overview_extended_columns: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            application_name: "frontend".to_string(),
            overview_extended_columns: false,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let defaults = Self::default();

        let max_pool_size = std::env::var("PG_POOL_MAX")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.max_pool_size);

        let min_pool_size = std::env::var("PG_POOL_MIN")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.min_pool_size);

        let connection_timeout_sec = std::env::var("PG_CONN_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.connection_timeout_sec);

        let idle_timeout_sec = std::env::var("PG_IDLE_TIMEOUT_SEC")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.idle_timeout_sec);

        let application_name = std::env::var("PG_APPLICATION_NAME")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.application_name);

        let overview_extended_columns = std::env::var("PG_OVERVIEW_EXTENDED")
            .ok()
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(defaults.overview_extended_columns);

        Ok(Self {
            database_url,
            max_pool_size,
            min_pool_size,
            connection_timeout_sec,
            idle_timeout_sec,
            application_name,
            overview_extended_columns,
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
}

/// Sets `application_name` on every new pooled connection.
#[derive(Debug)]
struct ApplicationName(String);

impl CustomizeConnection<PgConnection, diesel::r2d2::Error> for ApplicationName {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), diesel::r2d2::Error> {
        sql_query("SELECT set_config('application_name', $1, false)")
            .bind::<Text, _>(&self.0)
            .execute(conn)
            .map(|_| ())
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Diesel-backed, read-only repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and its connection pool.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .connection_customizer(Box::new(ApplicationName(config.application_name.clone())))
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        log::info!(
            "Postgres pool ready (max_size={}, application_name={})",
            config.max_pool_size,
            config.application_name
        );

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Run a blocking Diesel operation on a pooled connection.
    ///
    /// Failures are returned as-is; nothing is retried.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;

            total_queries.fetch_add(1, Ordering::Relaxed);
            f(&mut conn).map_err(|e| {
                failed_queries.fetch_add(1, Ordering::Relaxed);
                e.with_operation(operation)
            })
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
        }
    }

    /// Returns a tuple of (is_healthy, latency_ms, error_message).
    pub async fn health_check_detailed(&self) -> (bool, Option<u64>, Option<String>) {
        let start = Instant::now();
        match self.health_check().await {
            Ok(true) => (true, Some(start.elapsed().as_millis() as u64), None),
            Ok(false) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some("Health check returned false".to_string()),
            ),
            Err(e) => (
                false,
                Some(start.elapsed().as_millis() as u64),
                Some(e.to_string()),
            ),
        }
    }
}

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

#[async_trait]
impl InsightRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn fetch_insight_rows(&self, query: &InsightQuery) -> RepositoryResult<Vec<RawInsightRow>> {
        let sql = query.to_sql()?;
        let table = query.table.clone();
        log::debug!("fetch_insight_rows: {}", sql);

        self.with_conn("fetch_insight_rows", move |conn| {
            sql_query(sql)
                .load::<InsightRowSql>(conn)
                .map(|rows| rows.into_iter().map(RawInsightRow::from).collect())
                .map_err(|e| map_diesel_error(e).with_entity(table))
        })
        .await
    }

    async fn fetch_overview_rows(&self) -> RepositoryResult<Vec<RawOverviewRow>> {
        let sql = overview_sql(self.config.overview_extended_columns);
        self.with_conn("fetch_overview_rows", move |conn| {
            sql_query(sql)
                .load::<OverviewRowSql>(conn)
                .map(|rows| rows.into_iter().map(RawOverviewRow::from).collect())
                .map_err(|e| map_diesel_error(e).with_entity("insight_overview"))
        })
        .await
    }
}

#[async_trait]
impl MetadataRepository for PostgresRepository {
    async fn fetch_last_release(&self) -> RepositoryResult<Option<Release>> {
        self.with_conn("fetch_last_release", |conn| {
            sql_query(LAST_RELEASE_SQL)
                .load::<ReleaseRowSql>(conn)
                .map(|rows| rows.into_iter().next().map(Release::from))
                .map_err(|e| map_diesel_error(e).with_entity("releases"))
        })
        .await
    }

    async fn fetch_last_updated(&self) -> RepositoryResult<Option<String>> {
        self.with_conn("fetch_last_updated", |conn| {
            sql_query(LAST_UPDATED_SQL)
                .bind::<Text, _>(LAST_UPDATED_KEY)
                .load::<MetadataValueSql>(conn)
                .map(|rows| rows.into_iter().next().and_then(|row| row.value))
                .map_err(|e| map_diesel_error(e).with_entity("metadata"))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PostgresConfig::with_url("postgres://localhost/aitw");
        assert_eq!(config.database_url, "postgres://localhost/aitw");
        assert_eq!(config.max_pool_size, 10);
        assert_eq!(config.application_name, "frontend");
    }

    #[test]
    fn test_overview_sql_orders_by_total() {
        for sql in [OVERVIEW_SQL, OVERVIEW_EXTENDED_SQL] {
            assert!(sql.contains("FROM insight_overview"));
            assert!(sql.ends_with("ORDER BY total_prs DESC"));
        }
    }

    #[test]
    fn test_base_overview_reads_only_count_columns() {
        assert!(!PostgresConfig::default().overview_extended_columns);
        let sql = overview_sql(false);
        for column in [
            "agent::text",
            "total_prs::bigint",
            "merged_prs::bigint",
            "closed_prs::bigint",
        ] {
            assert!(sql.contains(column), "missing {}", column);
        }
        for column in ["additions", "deletions", "changed_files"] {
            assert!(sql.contains(&format!("NULL::bigint AS {}", column)));
            assert!(!sql.contains(&format!("{}::", column)));
        }
        assert!(sql.contains("NULL::timestamptz AS first_seen"));
    }

    #[test]
    fn test_extended_overview_is_opt_in() {
        let sql = overview_sql(true);
        assert!(sql.contains("additions::bigint AS additions"));
        assert!(sql.contains("first_seen::timestamptz AS first_seen"));
    }
}
