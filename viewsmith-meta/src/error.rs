//! Error types for the meta registry
//!
//! Only the eager registration path errors: registering a model or view whose
//! identity fields are missing is a programmer mistake in authored config and
//! must fail loudly. Deserialization of persisted JSON never surfaces here —
//! that path logs and drops instead (see `serialize`).

use thiserror::Error;

/// Result type for meta registry operations
pub type Result<T> = std::result::Result<T, MetaError>;

/// Errors that can occur in meta registry operations
#[derive(Debug, Error)]
pub enum MetaError {
    /// Model is missing a required identity attribute
    #[error("invalid model: {reason}")]
    InvalidModel { reason: String },

    /// View is missing a required identity attribute
    #[error("invalid view: {reason}")]
    InvalidView { reason: String },

    /// JSON encoding error during export
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
