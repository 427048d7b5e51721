use std::sync::Arc;

use common::metrics::record_operation;
use models::{record::now, Record, Schema};
use tracing::{error, info, instrument};

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};
use crate::record::repository::RecordRepository;

/// CRUD orchestration for one collection schema.
///
/// Every write returns the document produced by the store's atomic
/// operation, so server-owned fields (`_id`, timestamps) are authoritative.
pub struct RecordService<S: Schema> {
    repo: Arc<dyn RecordRepository<S>>,
}

impl<S: Schema> RecordService<S> {
    pub fn new(repo: Arc<dyn RecordRepository<S>>) -> Self { Self { repo } }

    #[instrument(skip(self), fields(collection = S::COLLECTION, page = pagination.page))]
    pub async fn list(&self, pagination: Pagination) -> Result<Page<Record<S>>, ServiceError> {
        let res = self.list_inner(pagination).await;
        record_operation(S::COLLECTION, "list", res.is_ok());
        res
    }

    async fn list_inner(&self, pagination: Pagination) -> Result<Page<Record<S>>, ServiceError> {
        let total = self.repo.count().await?;
        let items = self.repo.find_page(pagination.window()).await?;
        Ok(Page { items, total, links: pagination.links(total) })
    }

    /// Create from a client body. Client-supplied `_id` and timestamps are
    /// discarded; `date_added` is stamped here.
    #[instrument(skip(self, body), fields(collection = S::COLLECTION, slug = %body.slug))]
    pub async fn create(&self, body: Record<S>) -> Result<Record<S>, ServiceError> {
        let res = self.create_inner(body).await;
        record_operation(S::COLLECTION, "create", res.is_ok());
        res
    }

    async fn create_inner(&self, body: Record<S>) -> Result<Record<S>, ServiceError> {
        body.validate()?;
        let record = body.into_new(now());
        match self.repo.insert_unique(record).await? {
            Some(stored) => {
                info!(id = ?stored.id, "record created");
                Ok(stored)
            }
            None => {
                error!("insert acknowledged but no document returned");
                Err(ServiceError::Consistency(format!(
                    "The inserted {} went away.",
                    S::LABEL.to_lowercase()
                )))
            }
        }
    }

    #[instrument(skip(self), fields(collection = S::COLLECTION))]
    pub async fn get(&self, slug: &str) -> Result<Record<S>, ServiceError> {
        let res = self
            .repo
            .find_by_slug(slug)
            .await
            .and_then(|found| found.ok_or_else(|| ServiceError::not_found(S::LABEL)));
        record_operation(S::COLLECTION, "get", res.is_ok());
        res
    }

    /// Full replacement of the record at `slug`. Never creates a record.
    #[instrument(skip(self, body), fields(collection = S::COLLECTION, new_slug = %body.slug))]
    pub async fn update(&self, slug: &str, body: Record<S>) -> Result<Record<S>, ServiceError> {
        let res = self.update_inner(slug, body).await;
        record_operation(S::COLLECTION, "update", res.is_ok());
        res
    }

    async fn update_inner(&self, slug: &str, body: Record<S>) -> Result<Record<S>, ServiceError> {
        body.validate()?;
        let replacement = body.into_replacement(now());
        let updated = self
            .repo
            .update_by_slug(slug, replacement)
            .await?
            .ok_or_else(|| ServiceError::not_found(S::LABEL))?;
        info!(id = ?updated.id, "record updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(collection = S::COLLECTION))]
    pub async fn delete(&self, slug: &str) -> Result<Record<S>, ServiceError> {
        let res = self
            .repo
            .delete_by_slug(slug)
            .await
            .and_then(|found| found.ok_or_else(|| ServiceError::not_found(S::LABEL)));
        if let Ok(deleted) = &res {
            info!(id = ?deleted.id, "record deleted");
        }
        record_operation(S::COLLECTION, "delete", res.is_ok());
        res
    }
}
