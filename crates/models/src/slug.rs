//! Slugs are the external primary key of a record: they appear verbatim in
//! `/{kind}/{slug}` URLs and are unique per collection (unique index).

use crate::errors::ModelError;

/// Characters that cannot be addressed as a single path segment.
const RESERVED: [char; 3] = ['/', '?', '#'];

pub fn validate_slug(slug: &str) -> Result<(), ModelError> {
    if slug.trim().is_empty() {
        return Err(ModelError::Validation("slug is required".into()));
    }
    if slug.trim() != slug {
        return Err(ModelError::Validation("slug must not have surrounding whitespace".into()));
    }
    if slug.contains(RESERVED) {
        return Err(ModelError::Validation("slug must not contain '/', '?' or '#'".into()));
    }
    Ok(())
}
