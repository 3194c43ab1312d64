//! Join input validation.

use super::{
    error::ValidationError,
    value_object::{Category, DisplayName},
};

/// A validated join request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub display_name: DisplayName,
    pub category: Category,
}

/// Validate the display name and category supplied at join time.
///
/// Missing fields are reported before malformed ones, so an empty name with an
/// unknown category is reported as a missing field.
pub fn validate_join(name: &str, category: &str) -> Result<JoinRequest, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyDisplayName);
    }
    if category.is_empty() {
        return Err(ValidationError::EmptyCategory);
    }
    let display_name = DisplayName::new(name.to_string())?;
    let category = category.parse::<Category>()?;
    Ok(JoinRequest {
        display_name,
        category,
    })
}
