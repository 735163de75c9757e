//! Field accessors over untyped JSON configuration documents.
//!
//! A JSON `null` is treated the same as an absent key everywhere.

use serde_json::Value;

use crate::error::{DestinationError, DestinationResult};

/// Returns the value at `key` unless it is absent or `null`.
pub(crate) fn present<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|value| !value.is_null())
}

/// Returns the string at `key`, failing if it is absent or not a string.
pub(crate) fn required_str<'a>(
    doc: &'a Value,
    key: &str,
    field: &'static str,
) -> DestinationResult<&'a str> {
    match present(doc, key) {
        None => Err(DestinationError::MissingField { field }),
        Some(value) => value
            .as_str()
            .ok_or_else(|| DestinationError::invalid_field(field, "expected a string")),
    }
}

/// Returns the object at `key`, failing if it is absent or not an object.
pub(crate) fn required_object<'a>(
    doc: &'a Value,
    key: &str,
    field: &'static str,
) -> DestinationResult<&'a Value> {
    match present(doc, key) {
        None => Err(DestinationError::MissingField { field }),
        Some(value) if value.is_object() => Ok(value),
        Some(value) => Err(DestinationError::invalid_field(
            field,
            format!("expected an object, got {}", value),
        )),
    }
}

/// Returns the string at `key`, or `None` when absent. Non-strings fail.
pub(crate) fn optional_str<'a>(
    doc: &'a Value,
    key: &str,
    field: &'static str,
) -> DestinationResult<Option<&'a str>> {
    present(doc, key)
        .map(|value| {
            value
                .as_str()
                .ok_or_else(|| DestinationError::invalid_field(field, "expected a string"))
        })
        .transpose()
}
