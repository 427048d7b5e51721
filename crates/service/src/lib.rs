//! Service layer: pagination and the generic record CRUD orchestration on
//! top of the `models` crate.
//! - Storage sits behind `RecordRepository`, with MongoDB and in-memory implementations.
//! - One `RecordService<S>` serves every collection schema.

pub mod errors;
pub mod pagination;
pub mod record;
