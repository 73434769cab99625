//! Core field types.
//!
//! A `FieldDef` is the complete declarative description of one named attribute
//! of an entity model. Field definitions serialize to/from JSON via serde with
//! camelCase keys matching the interchange format; the optional validation
//! schema is carried out-of-band by the serializer (`schemaSerialized`), never
//! by the derive.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::FieldSchema;

/// The type tag of a field — determines default value, widget, validation
/// and query operators via the matching [`crate::FieldTyper`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    Enum,
    Array,
    ManyToOne,
    OneToOne,
    OneToMany,
    ManyToMany,
    Binary,
    Json,
}

impl FieldType {
    /// The wire tag for this type (`"string"`, `"many_to_one"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::ManyToOne => "many_to_one",
            Self::OneToOne => "one_to_one",
            Self::OneToMany => "one_to_many",
            Self::ManyToMany => "many_to_many",
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }

    /// Parse a wire tag. Returns `None` for anything outside the fixed set.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "enum" => Some(Self::Enum),
            "array" => Some(Self::Array),
            "many_to_one" => Some(Self::ManyToOne),
            "one_to_one" => Some(Self::OneToOne),
            "one_to_many" => Some(Self::OneToMany),
            "many_to_many" => Some(Self::ManyToMany),
            "binary" => Some(Self::Binary),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Whether this type points at another model.
    pub fn is_relation(&self) -> bool {
        matches!(
            self,
            Self::ManyToOne | Self::OneToOne | Self::OneToMany | Self::ManyToMany
        )
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Widget names used by the builtin typers and the resolution fallback table.
/// Widgets are open strings — hosts may use any name — these are just the
/// builtin vocabulary.
pub mod widget {
    pub const TEXTFIELD: &str = "textfield";
    pub const NUMBER: &str = "number";
    pub const SWITCH: &str = "switch";
    pub const DATE: &str = "date";
    pub const SELECT: &str = "select";
    pub const REFERENCE: &str = "reference";
    pub const NONE: &str = "none";
}

/// Type-specific parameters for a field.
///
/// `options` is the declared option list for enum/array fields. Each entry is
/// either a raw value or an already-shaped `{label, value}` object —
/// normalization happens at query-metadata time, not here. Anything else the
/// host declares is passed through in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TypeOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A field definition — the complete declarative schema for a single named
/// attribute of a model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_primary_key: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_unique: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub editable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub searchable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_field: Option<String>,
    #[serde(default)]
    pub order: i32,
    /// Authored validation schema. Interchanged as `schemaSerialized` by the
    /// serializer, never by this derive.
    #[serde(skip)]
    pub schema: Option<FieldSchema>,
}

impl FieldDef {
    /// Create a field with the given name and type; everything else defaults.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            title: None,
            field_type,
            type_options: None,
            description: None,
            default_value: None,
            is_required: false,
            is_primary_key: false,
            is_unique: false,
            editable: true,
            searchable: false,
            ref_model: None,
            ref_field: None,
            order: 0,
            schema: None,
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

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Declare the option list for enum/array fields.
    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.type_options.get_or_insert_with(TypeOptions::default).options = options;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Point a relation field at another model.
    pub fn with_ref(mut self, model: impl Into<String>, field: impl Into<String>) -> Self {
        self.ref_model = Some(model.into());
        self.ref_field = Some(field.into());
        self
    }

    pub fn with_schema(mut self, schema: FieldSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    /// The declared option list, empty when none was declared.
    pub fn options(&self) -> &[Value] {
        self.type_options
            .as_ref()
            .map(|t| t.options.as_slice())
            .unwrap_or(&[])
    }
}
