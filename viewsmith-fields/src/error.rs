//! Error types for field validation

use thiserror::Error;

/// A single validation failure against a [`crate::FieldSchema`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// Value is required but missing or null
    #[error("value is required")]
    Required,

    /// Value has the wrong JSON shape for the schema kind
    #[error("expected {expected}, got {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },

    /// Value (or an element of it) is outside the allowed option set
    #[error("value is not an allowed option")]
    NotAllowed,
}
