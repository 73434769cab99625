//! Query-operator metadata.
//!
//! Each field type carries a fixed operator set (computed by its typer); enum,
//! array and boolean fields additionally surface an option list so a filter UI
//! can offer a closed choice. Options are normalized to `{label, value}`
//! pairs whether the declared source was a raw value or an already-shaped
//! object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A query operator a filter UI may offer for a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum QueryOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Between,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

/// One selectable option in a filter UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryOption {
    pub label: String,
    pub value: Value,
}

impl QueryOption {
    pub fn new(label: impl Into<String>, value: Value) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// Normalize a declared option into a `{label, value}` pair.
    ///
    /// Accepts either a raw value (label derived from the value) or an object
    /// already shaped as `{label, value}` (missing parts derived from the
    /// other).
    pub fn normalize(raw: &Value) -> Self {
        if let Some(obj) = raw.as_object() {
            if obj.contains_key("value") || obj.contains_key("label") {
                let value = obj.get("value").cloned().unwrap_or(Value::Null);
                let label = obj
                    .get("label")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .unwrap_or_else(|| display_label(&value));
                return Self { label, value };
            }
        }
        Self {
            label: display_label(raw),
            value: raw.clone(),
        }
    }
}

fn display_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Operator set and option list for one queryable field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryItemMeta {
    pub operators: Vec<QueryOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QueryOption>>,
}

impl QueryItemMeta {
    pub fn new(operators: Vec<QueryOperator>) -> Self {
        Self {
            operators,
            options: None,
        }
    }

    pub fn with_options(mut self, options: Vec<QueryOption>) -> Self {
        self.options = Some(options);
        self
    }
}
