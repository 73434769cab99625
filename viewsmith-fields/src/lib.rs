//! Field definitions and pluggable field typers
//!
//! `viewsmith-fields` is a standalone, schema-only crate: it owns the
//! declarative description of fields (name, type tag, options, flags), the
//! validation schema type with its JSON-Schema-like interchange form, and the
//! typer strategy system that derives per-type behavior — default values,
//! default widgets, validation schemas and query operators.
//!
//! # Architecture
//!
//! - **Strategy over inheritance**: one [`FieldTyper`] per type tag in a
//!   [`TyperRegistry`]; adding a type is a registration, not a modification
//! - **Absent is not an error**: an unregistered type tag means "no derived
//!   behavior" — callers fall through to their own fallbacks
//! - **Pure and synchronous**: no I/O, no global state; the model/view layer
//!   (`viewsmith-meta`) composes these pieces

pub mod builtin;
pub mod error;
pub mod query;
pub mod schema;
pub mod typer;
pub mod types;

pub use builtin::builtin_typers;
pub use error::SchemaViolation;
pub use query::{QueryItemMeta, QueryOperator, QueryOption};
pub use schema::{FieldSchema, SchemaKind};
pub use typer::{FieldTyper, TyperRegistry};
pub use types::{widget, FieldDef, FieldType, TypeOptions};
