//! Derived behavior for one entity model.
//!
//! The delegate wraps a raw [`EntityModel`] and a typer registry and computes
//! everything the declaration implies: the aggregate validation schema,
//! supplemented default values, query metadata and capability checks. The
//! wrapped declaration is never mutated.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use viewsmith_fields::{
    FieldDef, FieldSchema, QueryOperator, QueryOption, SchemaViolation, TyperRegistry,
};

use crate::model::EntityModel;

/// Aggregate object-shaped validation schema for a model: one rule set per
/// field that has one. Fields with neither an authored schema nor a matching
/// typer are simply unvalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    fields: IndexMap<String, FieldSchema>,
}

impl ModelSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate an object of field values. Returns every violation, not just
    /// the first, so a form layer can annotate all fields in one pass. A key
    /// missing from the input counts as null.
    pub fn check(&self, values: &Map<String, Value>) -> Vec<(String, SchemaViolation)> {
        let mut violations = Vec::new();
        for (name, schema) in &self.fields {
            let value = values.get(name).unwrap_or(&Value::Null);
            if let Err(violation) = schema.check(value) {
                violations.push((name.clone(), violation));
            }
        }
        violations
    }
}

/// Query metadata for one searchable field.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct QueryFieldMeta {
    pub field: String,
    pub operators: Vec<QueryOperator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QueryOption>>,
}

/// Computed-behavior wrapper around one registered model.
#[derive(Clone)]
pub struct ModelDelegate {
    model: EntityModel,
    typers: Arc<TyperRegistry>,
}

impl ModelDelegate {
    pub fn new(model: EntityModel, typers: Arc<TyperRegistry>) -> Self {
        Self { model, typers }
    }

    /// The wrapped declaration.
    pub fn model(&self) -> &EntityModel {
        &self.model
    }

    pub fn name(&self) -> &str {
        &self.model.name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.model.fields
    }

    pub fn find_field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.model.find_field(name)
    }

    pub fn find_field_by_title(&self, title: &str) -> Option<&FieldDef> {
        self.model
            .fields
            .iter()
            .find(|f| f.title.as_deref() == Some(title))
    }

    pub fn primary_key_fields(&self) -> Vec<&FieldDef> {
        self.model.fields.iter().filter(|f| f.is_primary_key).collect()
    }

    pub fn unique_fields(&self) -> Vec<&FieldDef> {
        self.model.fields.iter().filter(|f| f.is_unique).collect()
    }

    pub fn searchable_fields(&self) -> Vec<&FieldDef> {
        self.model.fields.iter().filter(|f| f.searchable).collect()
    }

    /// Build the aggregate validation schema: the authored field schema wins,
    /// else the typer-derived default, else the field goes unvalidated.
    pub fn schema(&self) -> ModelSchema {
        let mut fields = IndexMap::new();
        for field in &self.model.fields {
            let schema = match &field.schema {
                Some(authored) => Some(authored.clone()),
                None => self
                    .typers
                    .get(field.field_type)
                    .map(|typer| typer.default_schema(field)),
            };
            if let Some(schema) = schema {
                fields.insert(field.name.clone(), schema);
            }
        }
        ModelSchema { fields }
    }

    /// Fill unset field values with defaults.
    ///
    /// A value counts as unset when the key is missing or the value is falsy
    /// (`null`, `false`, `0`, `""`). That means a legitimately set falsy value
    /// is overwritten by the default — a documented known edge of the
    /// reference behavior, pinned by test, not corrected here. The default is
    /// the field's own `default_value`, else the typer's computed default;
    /// with neither, the key is dropped.
    pub fn supplemented_values(&self, input: &Map<String, Value>) -> Map<String, Value> {
        let mut out = input.clone();
        for field in &self.model.fields {
            let unset = input.get(&field.name).map_or(true, is_falsy);
            if !unset {
                continue;
            }
            let fallback = field.default_value.clone().or_else(|| {
                self.typers
                    .get(field.field_type)
                    .and_then(|typer| typer.default_value(field))
            });
            match fallback {
                Some(value) => {
                    out.insert(field.name.clone(), value);
                }
                None => {
                    out.remove(&field.name);
                }
            }
        }
        out
    }

    /// Query metadata for every searchable field. Fields whose type has no
    /// registered typer (or whose typer yields no operator set) are omitted.
    pub fn query_meta(&self) -> Vec<QueryFieldMeta> {
        self.searchable_fields()
            .into_iter()
            .filter_map(|field| {
                let meta = self.typers.get(field.field_type)?.query_operators(field)?;
                Some(QueryFieldMeta {
                    field: field.name.clone(),
                    operators: meta.operators,
                    options: meta.options,
                })
            })
            .collect()
    }

    /// Whether the model supports a capability. Non-external models support
    /// everything; external models are gated by their declared feature list.
    pub fn supports_feature(&self, feature: &str) -> bool {
        if !self.model.external {
            return true;
        }
        self.model
            .external_config
            .as_ref()
            .map(|config| config.features.iter().any(|f| f == feature))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for ModelDelegate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDelegate")
            .field("name", &self.model.name)
            .field("fields", &self.model.fields.len())
            .finish()
    }
}

/// JavaScript-style falsiness over JSON values. Empty arrays and objects are
/// truthy.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
