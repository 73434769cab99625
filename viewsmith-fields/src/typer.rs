//! The field typer strategy trait and its registry.
//!
//! A typer is a per-type strategy object: it knows how to compute a default
//! value, a default widget, a validation schema and query-operator metadata
//! for one field type tag. Adding a type is a pure registration — no existing
//! code changes. An absent typer is never an error; callers fall through to
//! "no derived behavior".

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::builtin::builtin_typers;
use crate::query::QueryItemMeta;
use crate::schema::FieldSchema;
use crate::types::{FieldDef, FieldType};

/// Per-type strategy: derived behavior for one field type tag.
pub trait FieldTyper: Send + Sync {
    /// The type tag this typer handles.
    fn field_type(&self) -> FieldType;

    /// Type-specific default value, `None` when the type has no sensible
    /// default (e.g. an enum with an empty option list).
    fn default_value(&self, field: &FieldDef) -> Option<Value>;

    /// The widget to use when a view item for this field type specifies none.
    fn default_widget(&self, view_type: &str) -> &'static str;

    /// Type-appropriate validation rule set honoring `is_required`.
    fn default_schema(&self, field: &FieldDef) -> FieldSchema;

    /// Operator set and option list for filter UIs. The caller decides which
    /// fields are queryable (searchable); the typer only knows the type.
    fn query_operators(&self, field: &FieldDef) -> Option<QueryItemMeta>;
}

/// Keyed collection of typers, one per field type tag.
///
/// Registration replaces silently, so a host can swap a builtin for its own
/// strategy.
#[derive(Clone)]
pub struct TyperRegistry {
    typers: HashMap<FieldType, Arc<dyn FieldTyper>>,
}

impl TyperRegistry {
    /// An empty registry with no typers at all.
    pub fn empty() -> Self {
        Self {
            typers: HashMap::new(),
        }
    }

    /// A registry pre-populated with the builtin typer per type tag.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for typer in builtin_typers() {
            registry.register(typer);
        }
        registry
    }

    /// Register a typer for its type tag, replacing any prior entry.
    pub fn register(&mut self, typer: Arc<dyn FieldTyper>) {
        let tag = typer.field_type();
        debug!(%tag, "registering field typer");
        self.typers.insert(tag, typer);
    }

    /// Look up the typer for a type tag.
    pub fn get(&self, field_type: FieldType) -> Option<&Arc<dyn FieldTyper>> {
        self.typers.get(&field_type)
    }

    /// All registered typers, in no particular order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<dyn FieldTyper>> {
        self.typers.values()
    }

    pub fn len(&self) -> usize {
        self.typers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.typers.is_empty()
    }
}

impl Default for TyperRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TyperRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut tags: Vec<_> = self.typers.keys().map(FieldType::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("TyperRegistry").field("types", &tags).finish()
    }
}
