use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use bson::oid::ObjectId;
use models::{Record, Schema};
use tokio::sync::RwLock;

use crate::errors::ServiceError;
use crate::pagination::PageWindow;
use crate::record::repository::RecordRepository;

/// In-process repository keyed by slug.
///
/// Each call holds the lock for its whole read-modify-write, which gives the
/// same single-document atomicity the MongoDB repository relies on. Used by
/// tests and for running the API without a database.
#[derive(Clone)]
pub struct MemoryRepository<S> {
    inner: Arc<RwLock<HashMap<String, Record<S>>>>,
}

impl<S: Schema> MemoryRepository<S> {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl<S: Schema> Default for MemoryRepository<S> {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl<S: Schema> RecordRepository<S> for MemoryRepository<S> {
    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(self.inner.read().await.len() as u64)
    }

    async fn find_page(&self, window: PageWindow) -> Result<Vec<Record<S>>, ServiceError> {
        let map = self.inner.read().await;
        let mut all: Vec<&Record<S>> = map.values().collect();
        all.sort_by(|a, b| {
            a.fields
                .name()
                .cmp(b.fields.name())
                .then_with(|| a.id.cmp(&b.id))
        });
        let offset = usize::try_from(window.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit).unwrap_or(usize::MAX);
        Ok(all.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Record<S>>, ServiceError> {
        Ok(self.inner.read().await.get(slug).cloned())
    }

    async fn insert_unique(&self, mut record: Record<S>) -> Result<Option<Record<S>>, ServiceError> {
        let mut map = self.inner.write().await;
        if map.contains_key(&record.slug) {
            return Err(ServiceError::duplicate_key());
        }
        record.id = Some(ObjectId::new().to_hex());
        map.insert(record.slug.clone(), record.clone());
        Ok(Some(record))
    }

    async fn update_by_slug(&self, slug: &str, replacement: Record<S>) -> Result<Option<Record<S>>, ServiceError> {
        let mut map = self.inner.write().await;
        if !map.contains_key(slug) {
            return Ok(None);
        }
        if replacement.slug != slug && map.contains_key(&replacement.slug) {
            return Err(ServiceError::duplicate_key());
        }
        let Some(current) = map.remove(slug) else {
            return Ok(None);
        };
        let updated = Record {
            id: current.id,
            slug: replacement.slug,
            fields: replacement.fields,
            date_added: current.date_added,
            date_updated: replacement.date_updated,
        };
        map.insert(updated.slug.clone(), updated.clone());
        Ok(Some(updated))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Record<S>>, ServiceError> {
        Ok(self.inner.write().await.remove(slug))
    }
}
