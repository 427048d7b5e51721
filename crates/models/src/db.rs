//! MongoDB connection bootstrap.

use std::time::Duration;

use bson::doc;
use configs::DatabaseConfig;
use mongodb::{
    options::{ClientOptions, IndexOptions},
    Client, Database, IndexModel,
};
use tracing::info;

use crate::record::{Schema, StoredRecord};

/// Used when neither the config nor the connection string names a database.
pub const DEFAULT_DATABASE: &str = "cocktails";

/// Build a pooled client from config and pick the database.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(&cfg.url).await?;
    options.app_name = Some("recipe_api".to_string());
    options.max_pool_size = Some(cfg.max_pool_size);
    options.min_pool_size = Some(cfg.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(cfg.connect_timeout_secs));
    options.max_idle_time = Some(Duration::from_secs(cfg.max_idle_time_secs));

    let client = Client::with_options(options)?;
    let db = match cfg.name.as_deref() {
        Some(name) => client.database(name),
        None => client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
    };
    db.run_command(doc! { "ping": 1 }).await?;
    info!(database = %db.name(), "connected to mongodb");
    Ok(db)
}

/// Create the unique `slug` index backing the uniqueness invariant. Idempotent.
pub async fn ensure_indexes<S: Schema>(db: &Database) -> anyhow::Result<()> {
    let index = IndexModel::builder()
        .keys(doc! { "slug": 1 })
        .options(IndexOptions::builder().unique(true).name("slug_unique".to_string()).build())
        .build();
    db.collection::<StoredRecord<S>>(S::COLLECTION)
        .create_index(index)
        .await?;
    info!(collection = S::COLLECTION, "slug index ensured");
    Ok(())
}
