use async_trait::async_trait;
use models::{Record, Schema};

use crate::errors::ServiceError;
use crate::pagination::PageWindow;

/// Storage seam for one collection. Every mutating call is a single atomic
/// store operation that hands back the document as stored.
#[async_trait]
pub trait RecordRepository<S: Schema>: Send + Sync {
    async fn count(&self) -> Result<u64, ServiceError>;

    /// Records ordered by `(name, _id)`, restricted to `window`.
    async fn find_page(&self, window: PageWindow) -> Result<Vec<Record<S>>, ServiceError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Record<S>>, ServiceError>;

    /// Insert `record` unless its slug is taken. `Conflict` when it is;
    /// `Ok(None)` only if the store acknowledged the write without returning it.
    async fn insert_unique(&self, record: Record<S>) -> Result<Option<Record<S>>, ServiceError>;

    /// Replace every non-identity field of the record currently at `slug`,
    /// keeping its `_id` and `date_added`. `Ok(None)` when nothing matched;
    /// never inserts.
    async fn update_by_slug(&self, slug: &str, replacement: Record<S>) -> Result<Option<Record<S>>, ServiceError>;

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Record<S>>, ServiceError>;
}
