//! Record model: the generic envelope, the collection schemas and the
//! MongoDB connection bootstrap.

pub mod errors;
pub mod slug;
pub mod record;
pub mod ingredient;
pub mod cocktail;
pub mod recipe;
pub mod db;

pub use cocktail::Cocktail;
pub use recipe::Recipe;
pub use record::{Record, Schema, StoredRecord};
