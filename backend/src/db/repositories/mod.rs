//! Repository implementations module.
//!
//! - `postgres`: PostgreSQL implementation with Diesel (read-only projections)
//! - `local`: In-memory implementation for unit testing and local development
pub mod local;
#[cfg(feature = "postgres-repo")]
pub mod postgres;

pub use local::{CellValue, LocalRepository, LocalRow};
#[cfg(feature = "postgres-repo")]
pub use postgres::{PoolStats, PostgresConfig, PostgresRepository};
