//! Field validation schemas and their interchange form.
//!
//! A `FieldSchema` is the in-memory validation rule set for one field. It has
//! no native JSON representation of its own; the serializer converts it to and
//! from a JSON-Schema-like interchange object. The interchange conversion is
//! lossy by design for anything beyond kind/required/options, and
//! deserialization is defensive: a malformed or unsupported interchange shape
//! logs a warning and yields no schema, never an error.

use serde_json::{json, Value};
use tracing::warn;

use crate::error::SchemaViolation;

/// The value shape a schema accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Text,
    Number,
    Boolean,
    Date,
    Choice,
    List,
    Reference,
    Any,
}

impl SchemaKind {
    /// The interchange `type` tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Choice => "enum",
            Self::List => "array",
            Self::Reference => "reference",
            Self::Any => "any",
        }
    }

    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "string" => Some(Self::Text),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "enum" => Some(Self::Choice),
            "array" => Some(Self::List),
            "reference" => Some(Self::Reference),
            "any" => Some(Self::Any),
            _ => None,
        }
    }
}

/// Validation rule set for a single field value.
///
/// `one_of: None` means unrestricted — an empty authored option list must map
/// to `None`, never to `Some(vec![])`, which would reject every value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub kind: SchemaKind,
    pub required: bool,
    pub one_of: Option<Vec<Value>>,
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FieldSchema {
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            required: false,
            one_of: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict accepted values (or list elements) to the given set.
    /// An empty set is treated as unrestricted.
    pub fn one_of(mut self, values: Vec<Value>) -> Self {
        self.one_of = if values.is_empty() { None } else { Some(values) };
        self
    }

    /// Validate a single value. `Null` counts as absent.
    pub fn check(&self, value: &Value) -> Result<(), SchemaViolation> {
        if value.is_null() {
            return if self.required {
                Err(SchemaViolation::Required)
            } else {
                Ok(())
            };
        }

        match self.kind {
            SchemaKind::Text => {
                if !value.is_string() {
                    return Err(self.wrong_type("string", value));
                }
            }
            SchemaKind::Number => {
                if !value.is_number() {
                    return Err(self.wrong_type("number", value));
                }
            }
            SchemaKind::Boolean => {
                if !value.is_boolean() {
                    return Err(self.wrong_type("boolean", value));
                }
            }
            // Dates travel as ISO strings or epoch numbers.
            SchemaKind::Date => {
                if !value.is_string() && !value.is_number() {
                    return Err(self.wrong_type("date", value));
                }
            }
            SchemaKind::Choice => {
                if value.is_array() || value.is_object() {
                    return Err(self.wrong_type("scalar", value));
                }
                if let Some(allowed) = &self.one_of {
                    if !allowed.contains(value) {
                        return Err(SchemaViolation::NotAllowed);
                    }
                }
            }
            SchemaKind::List => {
                let Some(items) = value.as_array() else {
                    return Err(self.wrong_type("array", value));
                };
                if let Some(allowed) = &self.one_of {
                    if items.iter().any(|item| !allowed.contains(item)) {
                        return Err(SchemaViolation::NotAllowed);
                    }
                }
            }
            // References carry a key, a keyed object, or a list of either.
            SchemaKind::Reference => {
                if value.is_boolean() {
                    return Err(self.wrong_type("reference", value));
                }
            }
            SchemaKind::Any => {}
        }

        Ok(())
    }

    fn wrong_type(&self, expected: &'static str, value: &Value) -> SchemaViolation {
        SchemaViolation::WrongType {
            expected,
            actual: shape_of(value),
        }
    }

    /// Convert to the JSON-Schema-like interchange object.
    pub fn to_interchange(&self) -> Value {
        let mut obj = json!({ "type": self.kind.as_str() });
        if self.required {
            obj["required"] = json!(true);
        }
        if let Some(allowed) = &self.one_of {
            obj["enum"] = Value::Array(allowed.clone());
        }
        obj
    }

    /// Rebuild a schema from its interchange form.
    ///
    /// Defensive: a non-object, a missing/unknown `type`, or any other
    /// unsupported shape logs a warning and returns `None`. Wrong-typed
    /// `required`/`enum` attributes are ignored rather than failing the whole
    /// schema.
    pub fn from_interchange(value: &Value) -> Option<Self> {
        let Some(obj) = value.as_object() else {
            warn!(shape = shape_of(value), "schema interchange is not an object, dropping");
            return None;
        };
        let kind = match obj.get("type").and_then(Value::as_str) {
            Some(tag) => match SchemaKind::parse(tag) {
                Some(kind) => kind,
                None => {
                    warn!(%tag, "unsupported schema type tag, dropping");
                    return None;
                }
            },
            None => {
                warn!("schema interchange has no type tag, dropping");
                return None;
            }
        };
        let required = obj.get("required").and_then(Value::as_bool).unwrap_or(false);
        let one_of = obj
            .get("enum")
            .and_then(Value::as_array)
            .filter(|allowed| !allowed.is_empty())
            .cloned();
        Some(Self {
            kind,
            required,
            one_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_null() {
        let schema = FieldSchema::new(SchemaKind::Text).required();
        assert_eq!(schema.check(&Value::Null), Err(SchemaViolation::Required));
        assert_eq!(schema.check(&json!("ok")), Ok(()));
    }

    #[test]
    fn optional_accepts_null() {
        let schema = FieldSchema::new(SchemaKind::Number);
        assert_eq!(schema.check(&Value::Null), Ok(()));
    }

    #[test]
    fn text_rejects_non_string() {
        let schema = FieldSchema::new(SchemaKind::Text);
        assert!(matches!(
            schema.check(&json!(42)),
            Err(SchemaViolation::WrongType { expected: "string", actual: "number" })
        ));
    }

    #[test]
    fn date_accepts_string_or_number() {
        let schema = FieldSchema::new(SchemaKind::Date);
        assert_eq!(schema.check(&json!("2024-06-01")), Ok(()));
        assert_eq!(schema.check(&json!(1717200000)), Ok(()));
        assert!(schema.check(&json!(true)).is_err());
    }

    #[test]
    fn choice_enforces_one_of() {
        let schema =
            FieldSchema::new(SchemaKind::Choice).one_of(vec![json!("a"), json!("b")]);
        assert_eq!(schema.check(&json!("a")), Ok(()));
        assert_eq!(schema.check(&json!("c")), Err(SchemaViolation::NotAllowed));
    }

    #[test]
    fn choice_with_empty_options_is_unrestricted() {
        let schema = FieldSchema::new(SchemaKind::Choice).one_of(Vec::new());
        assert_eq!(schema.one_of, None);
        assert_eq!(schema.check(&json!("anything")), Ok(()));
    }

    #[test]
    fn list_checks_elements() {
        let schema = FieldSchema::new(SchemaKind::List).one_of(vec![json!(1), json!(2)]);
        assert_eq!(schema.check(&json!([1, 2, 1])), Ok(()));
        assert_eq!(schema.check(&json!([1, 3])), Err(SchemaViolation::NotAllowed));
        assert!(schema.check(&json!("not a list")).is_err());
    }

    #[test]
    fn interchange_round_trip() {
        let schema = FieldSchema::new(SchemaKind::Choice)
            .required()
            .one_of(vec![json!("x"), json!("y")]);
        let wire = schema.to_interchange();
        assert_eq!(wire["type"], "enum");
        assert_eq!(wire["required"], json!(true));
        let back = FieldSchema::from_interchange(&wire).unwrap();
        assert_eq!(back, schema);
    }

    #[test]
    fn interchange_omits_defaults() {
        let wire = FieldSchema::new(SchemaKind::Text).to_interchange();
        assert_eq!(wire, json!({"type": "string"}));
    }

    #[test]
    fn from_interchange_rejects_unknown_type() {
        assert!(FieldSchema::from_interchange(&json!({"type": "uuid"})).is_none());
        assert!(FieldSchema::from_interchange(&json!({"required": true})).is_none());
        assert!(FieldSchema::from_interchange(&json!("string")).is_none());
    }

    #[test]
    fn from_interchange_ignores_malformed_attributes() {
        let schema =
            FieldSchema::from_interchange(&json!({"type": "string", "required": "yes", "enum": 3}))
                .unwrap();
        assert!(!schema.required);
        assert_eq!(schema.one_of, None);
    }

    #[test]
    fn from_interchange_empty_enum_is_unrestricted() {
        let schema =
            FieldSchema::from_interchange(&json!({"type": "enum", "enum": []})).unwrap();
        assert_eq!(schema.one_of, None);
    }
}
