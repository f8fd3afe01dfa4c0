//! Per-resource business rules.
//!
//! Each submodule is a set of plain async functions over a `Store`. The
//! authenticated requester is always an explicit argument; nothing here
//! reads ambient request state.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;

use serde::{Deserialize, Deserializer};

use crate::error::ApiError;

pub const FIELD_REQUIRED: &str = "This field is required.";
pub const FIELD_BLANK: &str = "This field may not be blank.";

/// Distinguish an absent field (`None`) from an explicit null (`Some(None)`)
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A required text field, stored trimmed
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value {
        None => Err(ApiError::field_error(field, FIELD_REQUIRED)),
        Some(text) => non_blank(field, text),
    }
}

/// Text that may be omitted, but not blank when given
pub(crate) fn optional_text(
    field: &str,
    value: Option<String>,
) -> Result<Option<String>, ApiError> {
    value.map(|text| non_blank(field, text)).transpose()
}

fn non_blank(field: &str, text: String) -> Result<String, ApiError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(ApiError::field_error(field, FIELD_BLANK))
    } else {
        Ok(trimmed.to_string())
    }
}
