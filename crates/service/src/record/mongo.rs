use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use futures::stream::TryStreamExt;
use mongodb::{
    error::{Error, ErrorKind, WriteFailure},
    options::ReturnDocument,
    Collection, Database,
};
use models::{Record, Schema, StoredRecord};
use tracing::debug;

use crate::errors::ServiceError;
use crate::pagination::PageWindow;
use crate::record::repository::RecordRepository;

const DUPLICATE_KEY: i32 = 11000;

/// MongoDB-backed repository for the collection named by `S`.
pub struct MongoRepository<S: Schema> {
    collection: Collection<StoredRecord<S>>,
}

impl<S: Schema> MongoRepository<S> {
    pub fn new(db: &Database) -> Self {
        Self { collection: db.collection(S::COLLECTION) }
    }
}

/// Unique-index violation, whichever way the server reported it.
pub fn is_duplicate_key(e: &Error) -> bool {
    match e.kind.as_ref() {
        ErrorKind::Command(c) => c.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(w)) => w.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn to_document<S: Schema>(stored: &StoredRecord<S>) -> Result<Document, ServiceError> {
    bson::to_document(stored).map_err(|e| ServiceError::Db(e.to_string()))
}

/// Outcome of the insert-if-absent upsert: the document is ours only if it
/// carries the id we generated.
fn claimed_by<S: Schema>(found: Option<StoredRecord<S>>, oid: ObjectId) -> Result<Option<Record<S>>, ServiceError> {
    match found {
        Some(doc) if doc.id == Some(oid) => Ok(Some(doc.into())),
        Some(existing) => {
            debug!(slug = %existing.slug, existing_id = ?existing.id, "slug already taken");
            Err(ServiceError::duplicate_key())
        }
        None => Ok(None),
    }
}

/// `$set` for every present field, `$unset` for optional fields the
/// replacement leaves out. `_id` and `date_added` are never touched.
fn replacement_update<S: Schema>(replacement: Record<S>) -> Result<Document, ServiceError> {
    let mut stored = StoredRecord::try_from(replacement)?;
    stored.id = None;
    stored.date_added = None;
    let set = to_document(&stored)?;

    let cleared: Document = S::OPTIONAL_FIELDS
        .iter()
        .filter(|f| !set.contains_key(**f))
        .map(|f| (f.to_string(), Bson::String(String::new())))
        .collect();
    let mut update = doc! { "$set": set };
    if !cleared.is_empty() {
        update.insert("$unset", cleared);
    }
    Ok(update)
}

#[async_trait]
impl<S: Schema> RecordRepository<S> for MongoRepository<S> {
    async fn count(&self) -> Result<u64, ServiceError> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn find_page(&self, window: PageWindow) -> Result<Vec<Record<S>>, ServiceError> {
        let limit = i64::try_from(window.limit).map_err(|e| ServiceError::Validation(e.to_string()))?;
        let mut sort = Document::new();
        sort.insert(S::SORT_FIELD, 1);
        sort.insert("_id", 1);
        let cursor = self
            .collection
            .find(doc! {})
            .sort(sort)
            .skip(window.offset)
            .limit(limit)
            .await?;
        let stored: Vec<StoredRecord<S>> = cursor.try_collect().await?;
        Ok(stored.into_iter().map(Record::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Record<S>>, ServiceError> {
        let found = self.collection.find_one(doc! { "slug": slug }).await?;
        Ok(found.map(Record::from))
    }

    async fn insert_unique(&self, record: Record<S>) -> Result<Option<Record<S>>, ServiceError> {
        // Upsert keyed by slug with $setOnInsert: a match leaves the existing
        // document untouched and comes back with a foreign _id.
        let oid = ObjectId::new();
        let mut stored = StoredRecord::try_from(record)?;
        stored.id = Some(oid);
        let slug = stored.slug.clone();
        let fields = to_document(&stored)?;

        let found = self
            .collection
            .find_one_and_update(doc! { "slug": slug.as_str() }, doc! { "$setOnInsert": fields })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;
        claimed_by(found, oid)
    }

    async fn update_by_slug(&self, slug: &str, replacement: Record<S>) -> Result<Option<Record<S>>, ServiceError> {
        let update = replacement_update(replacement)?;
        let found = self
            .collection
            .find_one_and_update(doc! { "slug": slug }, update)
            .return_document(ReturnDocument::After)
            .await?;
        Ok(found.map(Record::from))
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<Option<Record<S>>, ServiceError> {
        let found = self.collection.find_one_and_delete(doc! { "slug": slug }).await?;
        Ok(found.map(Record::from))
    }
}
