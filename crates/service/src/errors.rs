use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// A write reported success but its result could not be observed.
    #[error("consistency error: {0}")]
    Consistency(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn duplicate_key() -> Self { Self::Conflict("Duplicate key error.".into()) }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self {
        if crate::record::mongo::is_duplicate_key(&e) {
            Self::duplicate_key()
        } else {
            Self::Db(e.to_string())
        }
    }
}
