//! Generic record envelope shared by every collection.
//!
//! A record is split into two parts:
//! - server-owned fields (`_id`, `slug`, `date_added`, `date_updated`), handled
//!   the same way for every collection;
//! - the schema payload `S` (name, ingredients, ...), flattened into the same
//!   JSON/BSON object.
//!
//! `Record<S>` is the wire (JSON) form: hex ids and RFC 3339 timestamps.
//! `StoredRecord<S>` is the persistence (BSON) form: `ObjectId` and BSON dates.

use std::fmt::Debug;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::ModelError;
use crate::slug::validate_slug;

/// Entity schema: the payload type of one collection.
pub trait Schema:
    Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync + Unpin + 'static
{
    /// Collection name; also the list key and the URL prefix.
    const COLLECTION: &'static str;
    /// Human label used in error messages ("Cocktail not found").
    const LABEL: &'static str;
    /// Stored field listings sort on, ahead of `_id`.
    const SORT_FIELD: &'static str = "name";
    /// Top-level optional fields; a replacement that omits one clears it.
    const OPTIONAL_FIELDS: &'static [&'static str] = &[];

    /// Value of `SORT_FIELD`.
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<S> {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub slug: String,
    #[serde(flatten)]
    pub fields: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<DateTime<Utc>>,
}

impl<S: Schema> Record<S> {
    pub fn new(slug: impl Into<String>, fields: S) -> Self {
        Self { id: None, slug: slug.into(), fields, date_added: None, date_updated: None }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_slug(&self.slug)
    }

    /// Prepare a client-submitted body for insertion: drop every server-owned
    /// field and stamp the creation time.
    pub fn into_new(mut self, now: DateTime<Utc>) -> Self {
        self.id = None;
        self.date_added = Some(now);
        self.date_updated = None;
        self
    }

    /// Prepare a client-submitted body as a full replacement. `_id` and
    /// `date_added` are dropped; the stored values win.
    pub fn into_replacement(mut self, now: DateTime<Utc>) -> Self {
        self.id = None;
        self.date_added = None;
        self.date_updated = Some(now);
        self
    }
}

/// Current time at the store's resolution (milliseconds), so a timestamp
/// handed back to a caller compares equal to the persisted one.
pub fn now() -> DateTime<Utc> {
    bson::DateTime::now().to_chrono()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord<S> {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub slug: String,
    #[serde(flatten)]
    pub fields: S,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<bson::DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<bson::DateTime>,
}

impl<S: Schema> From<StoredRecord<S>> for Record<S> {
    fn from(stored: StoredRecord<S>) -> Self {
        Self {
            id: stored.id.map(|oid| oid.to_hex()),
            slug: stored.slug,
            fields: stored.fields,
            date_added: stored.date_added.map(|d| d.to_chrono()),
            date_updated: stored.date_updated.map(|d| d.to_chrono()),
        }
    }
}

impl<S: Schema> TryFrom<Record<S>> for StoredRecord<S> {
    type Error = ModelError;

    fn try_from(record: Record<S>) -> Result<Self, Self::Error> {
        let id = record
            .id
            .as_deref()
            .map(ObjectId::parse_str)
            .transpose()
            .map_err(|e| ModelError::InvalidId(e.to_string()))?;
        Ok(Self {
            id,
            slug: record.slug,
            fields: record.fields,
            date_added: record.date_added.map(bson::DateTime::from_chrono),
            date_updated: record.date_updated.map(bson::DateTime::from_chrono),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cocktail::Cocktail;
    use crate::ingredient::Ingredient;
    use serde_json::json;

    fn mojito() -> Record<Cocktail> {
        Record::new(
            "mojito",
            Cocktail {
                name: "Mojito".into(),
                ingredients: vec![Ingredient::new("White rum")],
                instructions: vec!["Muddle the mint".into()],
            },
        )
    }

    #[test]
    fn json_is_flat_and_omits_absent_fields() {
        let v = serde_json::to_value(mojito()).unwrap();
        assert_eq!(v["slug"], "mojito");
        assert_eq!(v["name"], "Mojito");
        assert_eq!(v["instructions"][0], "Muddle the mint");
        assert!(v.get("_id").is_none());
        assert!(v.get("date_added").is_none());
        assert!(v.get("date_updated").is_none());
    }

    #[test]
    fn client_body_parses_with_extra_server_fields() {
        let body = json!({
            "_id": "not-an-object-id",
            "slug": "mojito",
            "name": "Mojito",
            "ingredients": [{"name": "Mint", "quantity": {"quantity": "6", "unit": "leaves"}}],
            "instructions": [],
            "date_added": "1999-01-01T00:00:00Z"
        });
        let rec: Record<Cocktail> = serde_json::from_value(body).unwrap();
        assert_eq!(rec.fields.ingredients[0].name, "Mint");

        let now = now();
        let fresh = rec.into_new(now);
        assert!(fresh.id.is_none());
        assert_eq!(fresh.date_added, Some(now));
        assert!(fresh.date_updated.is_none());
    }

    #[test]
    fn replacement_drops_identity_and_creation_time() {
        let mut rec = mojito();
        rec.id = Some(ObjectId::new().to_hex());
        rec.date_added = Some(now());
        let now = now();
        let repl = rec.into_replacement(now);
        assert!(repl.id.is_none());
        assert!(repl.date_added.is_none());
        assert_eq!(repl.date_updated, Some(now));
    }

    #[test]
    fn stored_form_uses_bson_types() {
        let oid = ObjectId::new();
        let mut rec = mojito();
        rec.id = Some(oid.to_hex());
        rec.date_added = Some(now());

        let stored = StoredRecord::try_from(rec.clone()).unwrap();
        assert_eq!(stored.id, Some(oid));
        let doc = bson::to_document(&stored).unwrap();
        assert_eq!(doc.get_object_id("_id").unwrap(), oid);
        assert!(doc.get_datetime("date_added").is_ok());
        assert_eq!(doc.get_str("name").unwrap(), "Mojito");

        let back: StoredRecord<Cocktail> = bson::from_document(doc).unwrap();
        assert_eq!(Record::from(back), rec);
    }

    #[test]
    fn malformed_hex_id_is_rejected() {
        let mut rec = mojito();
        rec.id = Some("xyz".into());
        assert!(matches!(StoredRecord::try_from(rec), Err(ModelError::InvalidId(_))));
    }
}
