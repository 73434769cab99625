//! Entity model declarations.
//!
//! A model is a named, ordered set of field definitions plus flags describing
//! where its data lives. Models are pure declarations — all derived behavior
//! (schemas, defaults, query metadata) comes from the delegate layer.

use serde::{Deserialize, Serialize};
use viewsmith_fields::FieldDef;

/// Capability tags an external model may support. Non-external models support
/// everything implicitly.
pub mod feature {
    pub const CREATE: &str = "create";
    pub const UPDATE: &str = "update";
    pub const DELETE: &str = "delete";
}

/// Capability gates for an externally-sourced model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExternalConfig {
    #[serde(default)]
    pub features: Vec<String>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A declarative entity type: a registry-keyed name plus an ordered field set.
/// Field names are unique within a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub external: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_config: Option<ExternalConfig>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl EntityModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            external: false,
            external_config: None,
            fields: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the model external with the given capability tags.
    pub fn external_with_features(mut self, features: Vec<String>) -> Self {
        self.external = true;
        self.external_config = Some(ExternalConfig { features });
        self
    }

    /// Append a field definition.
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Name lookup over the ordered field list.
    pub fn find_field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}
