//! Access to the insight store.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP API / dashboard loader                            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs)                            │
//! │  - one query per call, rows shaped on return            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/)                        │
//! │  - InsightRepository, MetadataRepository                │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼───────────────────┐  ┌─────────▼──────────────┐
//! │ Postgres Repository   │  │ Local Repository       │
//! │ (diesel + r2d2)       │  │ (in-memory tables)     │
//! └───────────────────────┘  └────────────────────────┘
//! ```
//!
//! # Recommended Usage
//!
//! ```ignore
//! use aitw_insights::db::{self, services};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let repo = db::get_repository()?;
//!     let overview = services::fetch_overview(repo.as_ref()).await?;
//!     Ok(())
//! }
//! ```

// Feature flag priority: postgres > local
#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod models;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

#[cfg(feature = "postgres-repo")]
pub use repositories::postgres::{PoolStats, PostgresConfig};
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    _private: (),
}
#[cfg(not(feature = "postgres-repo"))]
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    _private: (),
}

// ==================== Service Layer ====================

pub use services::{
    fetch_binned_insight, fetch_last_release, fetch_last_updated, fetch_overview, health_check,
};

// ==================== Repository Pattern Exports ====================

pub use models::{InsightQuery, RawInsightRow, RawOverviewRow};
pub use repo_config::RepositoryConfig;

pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{
    ErrorContext, FullRepository, InsightRepository, MetadataRepository, RepositoryError,
    RepositoryResult,
};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository.
///
/// `REPOSITORY_TYPE` or a database URL in the environment decide the backend;
/// without either, the first `repository.toml` in
/// [`repo_config::DEFAULT_CONFIG_PATHS`] is used, then the local backend.
///
/// Must be called from within a Tokio runtime. Calling it again is a no-op.
pub async fn init_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if let Some(repo) = REPOSITORY.get() {
        return Ok(repo);
    }

    let env_configured = ["REPOSITORY_TYPE", "DATABASE_URL", "PG_DATABASE_URL"]
        .iter()
        .any(|key| std::env::var(key).is_ok());
    let config_file = repo_config::DEFAULT_CONFIG_PATHS
        .iter()
        .find(|path| std::path::Path::new(path).exists());

    let repo = match config_file {
        Some(path) if !env_configured => {
            log::info!("Loading repository configuration from {}", path);
            RepositoryFactory::from_config_file(path).await
        }
        _ => RepositoryFactory::from_env().await,
    }
    .context("Failed to create repository")?;
    // A concurrent initializer may have won; either instance is equivalent.
    let _ = REPOSITORY.set(repo);
    REPOSITORY
        .get()
        .context("Repository was not stored after initialization")
}

/// Get the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    REPOSITORY
        .get()
        .context("Database not initialized. Call init_repository() first.")
}
