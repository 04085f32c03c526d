use async_trait::async_trait;
use std::collections::HashSet;

use crate::models::{ArticleRecord, Source};
use crate::Result;

/// Query contract the ingestion pipeline consumes. The storage engine behind
/// it owns all further record lifecycle.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Returns the subset of `urls` already stored for `source`.
    async fn find_existing_urls(
        &self,
        source: Source,
        urls: &[String],
    ) -> Result<HashSet<String>>;

    /// Inserts all records in one call. Must fail loudly on a duplicate url
    /// rather than silently duplicating; url uniqueness is the final
    /// correctness backstop across concurrent runs.
    async fn bulk_insert(&self, records: &[ArticleRecord]) -> Result<()>;
}
