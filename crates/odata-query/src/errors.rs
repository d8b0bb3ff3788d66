//! Error types for catalogue query construction.

use thiserror::Error;

/// Errors that can occur while building a catalogue query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// Attribute name absent from the archive's attribute catalogue.
    #[error("Invalid attribute name: {0}")]
    InvalidAttributeName(String),

    /// Comparison operator outside the supported set.
    #[error("Invalid filter operator: {0}")]
    InvalidOperator(String),

    /// The catalogue advertises a value type this client cannot encode.
    #[error("Unsupported value type for attribute: {0}")]
    UnsupportedValueType(String),
}
