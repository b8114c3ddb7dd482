//! Repository trait definitions for the insight store.
//!
//! The store is external and read-only from this crate's point of view. Its
//! query contract is split over two focused traits:
//!
//! - [`InsightRepository`]: per-bucket metric rows and the per-agent overview
//! - [`MetadataRepository`]: dataset release and last-refresh metadata
//!
//! For code that needs both, use the [`FullRepository`] trait bound:
//!
//! ```ignore
//! async fn load<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
//!     let rows = repo.fetch_overview_rows().await?;
//!     let release = repo.fetch_last_release().await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod insights;
pub mod metadata;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use insights::InsightRepository;
pub use metadata::MetadataRepository;

/// Composite trait bound for a complete repository implementation.
pub trait FullRepository: InsightRepository + MetadataRepository {}

// Blanket implementation: any type implementing both traits automatically implements FullRepository
impl<T> FullRepository for T where T: InsightRepository + MetadataRepository {}
