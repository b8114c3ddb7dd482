//! Metadata repository trait for dataset release information.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::Release;

/// Repository trait for dataset metadata.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Most recent release by date, or `None` if nothing was released yet.
    async fn fetch_last_release(&self) -> RepositoryResult<Option<Release>>;

    /// Date of the last insight refresh (`metadata.last_updated`).
    async fn fetch_last_updated(&self) -> RepositoryResult<Option<String>>;
}
