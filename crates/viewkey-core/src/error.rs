//! Lookup error types.

use thiserror::Error;

use crate::query::FieldType;

/// Errors raised while narrowing a queryset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The raw value does not convert to the field's type.
    #[error("Field '{field}' expected {expected} but got '{value}'")]
    InvalidValue {
        field: String,
        value: String,
        expected: FieldType,
    },

    /// The queryset has no such field.
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// The lookup suffix is not supported for the field.
    #[error("Unsupported lookup: {0}")]
    UnsupportedLookup(String),
}
