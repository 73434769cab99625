//! Builtin typers, one strategy object per field type tag.
//!
//! Operator sets are fixed per type. Enum and array typers must stay safe on
//! an absent or empty option list: they fall back to "no default" and an
//! unrestricted schema rather than indexing past the end or producing an
//! empty-choice rule.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::query::{QueryItemMeta, QueryOperator, QueryOption};
use crate::schema::{FieldSchema, SchemaKind};
use crate::typer::FieldTyper;
use crate::types::{widget, FieldDef, FieldType};

use QueryOperator::*;

/// All builtin typers. Relation tags share one parameterized strategy.
pub fn builtin_typers() -> Vec<Arc<dyn FieldTyper>> {
    vec![
        Arc::new(StringTyper),
        Arc::new(NumberTyper),
        Arc::new(BooleanTyper),
        Arc::new(DateTyper),
        Arc::new(EnumTyper),
        Arc::new(ArrayTyper),
        Arc::new(RelationTyper::new(FieldType::ManyToOne)),
        Arc::new(RelationTyper::new(FieldType::OneToOne)),
        Arc::new(RelationTyper::new(FieldType::OneToMany)),
        Arc::new(RelationTyper::new(FieldType::ManyToMany)),
        Arc::new(BinaryTyper),
        Arc::new(JsonTyper),
    ]
}

/// The plain value of a declared option, unwrapping `{label, value}` objects.
fn option_value(raw: &Value) -> Value {
    match raw.as_object() {
        Some(obj) if obj.contains_key("value") => obj["value"].clone(),
        _ => raw.clone(),
    }
}

fn option_values(field: &FieldDef) -> Vec<Value> {
    field.options().iter().map(option_value).collect()
}

fn normalized_options(field: &FieldDef) -> Vec<QueryOption> {
    field.options().iter().map(QueryOption::normalize).collect()
}

fn schema(kind: SchemaKind, field: &FieldDef) -> FieldSchema {
    let base = FieldSchema::new(kind);
    if field.is_required {
        base.required()
    } else {
        base
    }
}

pub struct StringTyper;

impl FieldTyper for StringTyper {
    fn field_type(&self) -> FieldType {
        FieldType::String
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        Some(json!(""))
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::TEXTFIELD
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Text, field)
    }

    fn query_operators(&self, _field: &FieldDef) -> Option<QueryItemMeta> {
        Some(QueryItemMeta::new(vec![
            Eq, Contains, StartsWith, EndsWith, IsNull, IsNotNull,
        ]))
    }
}

pub struct NumberTyper;

impl FieldTyper for NumberTyper {
    fn field_type(&self) -> FieldType {
        FieldType::Number
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        Some(json!(0))
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::NUMBER
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Number, field)
    }

    fn query_operators(&self, _field: &FieldDef) -> Option<QueryItemMeta> {
        Some(QueryItemMeta::new(vec![Eq, Gt, Lt, IsNull, IsNotNull]))
    }
}

pub struct BooleanTyper;

impl FieldTyper for BooleanTyper {
    fn field_type(&self) -> FieldType {
        FieldType::Boolean
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        Some(json!(false))
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::SWITCH
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Boolean, field)
    }

    fn query_operators(&self, _field: &FieldDef) -> Option<QueryItemMeta> {
        Some(
            QueryItemMeta::new(vec![Eq, IsNull, IsNotNull]).with_options(vec![
                QueryOption::new("Yes", json!(true)),
                QueryOption::new("No", json!(false)),
            ]),
        )
    }
}

pub struct DateTyper;

impl FieldTyper for DateTyper {
    fn field_type(&self) -> FieldType {
        FieldType::Date
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        None
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::DATE
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Date, field)
    }

    fn query_operators(&self, _field: &FieldDef) -> Option<QueryItemMeta> {
        Some(QueryItemMeta::new(vec![Eq, Gt, Lt, Between, IsNull, IsNotNull]))
    }
}

pub struct EnumTyper;

impl FieldTyper for EnumTyper {
    fn field_type(&self) -> FieldType {
        FieldType::Enum
    }

    /// First declared option, absent when the option list is empty.
    fn default_value(&self, field: &FieldDef) -> Option<Value> {
        field.options().first().map(option_value)
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::SELECT
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Choice, field).one_of(option_values(field))
    }

    fn query_operators(&self, field: &FieldDef) -> Option<QueryItemMeta> {
        Some(
            QueryItemMeta::new(vec![Eq, Ne, IsNull, IsNotNull])
                .with_options(normalized_options(field)),
        )
    }
}

pub struct ArrayTyper;

impl FieldTyper for ArrayTyper {
    fn field_type(&self) -> FieldType {
        FieldType::Array
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        Some(json!([]))
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::SELECT
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::List, field).one_of(option_values(field))
    }

    fn query_operators(&self, field: &FieldDef) -> Option<QueryItemMeta> {
        Some(
            QueryItemMeta::new(vec![In, NotIn, IsNull, IsNotNull])
                .with_options(normalized_options(field)),
        )
    }
}

/// Shared strategy for the four relation tags. To-many relations filter by
/// set membership, to-one by equality.
pub struct RelationTyper {
    field_type: FieldType,
    to_many: bool,
}

impl RelationTyper {
    pub fn new(field_type: FieldType) -> Self {
        let to_many = matches!(field_type, FieldType::OneToMany | FieldType::ManyToMany);
        Self {
            field_type,
            to_many,
        }
    }
}

impl FieldTyper for RelationTyper {
    fn field_type(&self) -> FieldType {
        self.field_type
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        None
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        if self.to_many {
            widget::REFERENCE
        } else {
            widget::SELECT
        }
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Reference, field)
    }

    fn query_operators(&self, _field: &FieldDef) -> Option<QueryItemMeta> {
        let operators = if self.to_many {
            vec![In, IsNull, IsNotNull]
        } else {
            vec![Eq, In, IsNull, IsNotNull]
        };
        Some(QueryItemMeta::new(operators))
    }
}

pub struct BinaryTyper;

impl FieldTyper for BinaryTyper {
    fn field_type(&self) -> FieldType {
        FieldType::Binary
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        None
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::NONE
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Any, field)
    }

    fn query_operators(&self, _field: &FieldDef) -> Option<QueryItemMeta> {
        Some(QueryItemMeta::new(vec![IsNull, IsNotNull]))
    }
}

pub struct JsonTyper;

impl FieldTyper for JsonTyper {
    fn field_type(&self) -> FieldType {
        FieldType::Json
    }

    fn default_value(&self, _field: &FieldDef) -> Option<Value> {
        None
    }

    fn default_widget(&self, _view_type: &str) -> &'static str {
        widget::NONE
    }

    fn default_schema(&self, field: &FieldDef) -> FieldSchema {
        schema(SchemaKind::Any, field)
    }

    fn query_operators(&self, _field: &FieldDef) -> Option<QueryItemMeta> {
        Some(QueryItemMeta::new(vec![IsNull, IsNotNull]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaViolation;

    fn enum_field(options: Vec<Value>) -> FieldDef {
        FieldDef::new("status", FieldType::Enum).with_options(options)
    }

    #[test]
    fn string_defaults() {
        let field = FieldDef::new("name", FieldType::String);
        let typer = StringTyper;
        assert_eq!(typer.default_value(&field), Some(json!("")));
        assert_eq!(typer.default_widget("grid"), "textfield");
        let meta = typer.query_operators(&field).unwrap();
        assert_eq!(
            meta.operators,
            vec![Eq, Contains, StartsWith, EndsWith, IsNull, IsNotNull]
        );
        assert!(meta.options.is_none());
    }

    #[test]
    fn number_operator_set() {
        let field = FieldDef::new("price", FieldType::Number);
        let meta = NumberTyper.query_operators(&field).unwrap();
        assert_eq!(meta.operators, vec![Eq, Gt, Lt, IsNull, IsNotNull]);
        assert_eq!(NumberTyper.default_value(&field), Some(json!(0)));
    }

    #[test]
    fn boolean_yes_no_options() {
        let field = FieldDef::new("active", FieldType::Boolean);
        let meta = BooleanTyper.query_operators(&field).unwrap();
        assert_eq!(meta.operators, vec![Eq, IsNull, IsNotNull]);
        let options = meta.options.unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0], QueryOption::new("Yes", json!(true)));
        assert_eq!(options[1], QueryOption::new("No", json!(false)));
    }

    #[test]
    fn date_operator_set_includes_between() {
        let field = FieldDef::new("created", FieldType::Date);
        let meta = DateTyper.query_operators(&field).unwrap();
        assert_eq!(meta.operators, vec![Eq, Gt, Lt, Between, IsNull, IsNotNull]);
        assert_eq!(DateTyper.default_value(&field), None);
    }

    #[test]
    fn enum_first_option_is_default() {
        let field = enum_field(vec![json!("open"), json!("closed")]);
        assert_eq!(EnumTyper.default_value(&field), Some(json!("open")));
    }

    #[test]
    fn enum_shaped_option_default_unwraps_value() {
        let field = enum_field(vec![json!({"label": "Open", "value": 1})]);
        assert_eq!(EnumTyper.default_value(&field), Some(json!(1)));
    }

    #[test]
    fn enum_empty_options_does_not_panic() {
        let field = enum_field(Vec::new());
        assert_eq!(EnumTyper.default_value(&field), None);
        let schema = EnumTyper.default_schema(&field);
        // Unrestricted, not an empty-choice rule.
        assert_eq!(schema.one_of, None);
        assert_eq!(schema.check(&json!("anything")), Ok(()));

        let no_options = FieldDef::new("status", FieldType::Enum);
        assert_eq!(EnumTyper.default_value(&no_options), None);
        assert_eq!(EnumTyper.default_schema(&no_options).one_of, None);
    }

    #[test]
    fn enum_schema_restricts_to_options() {
        let field = enum_field(vec![json!("open"), json!("closed")]).required();
        let schema = EnumTyper.default_schema(&field);
        assert!(schema.required);
        assert_eq!(schema.check(&json!("open")), Ok(()));
        assert_eq!(schema.check(&json!("other")), Err(SchemaViolation::NotAllowed));
    }

    #[test]
    fn enum_query_options_are_normalized() {
        let field = enum_field(vec![json!("open"), json!({"label": "Closed", "value": "closed"})]);
        let meta = EnumTyper.query_operators(&field).unwrap();
        assert_eq!(meta.operators, vec![Eq, Ne, IsNull, IsNotNull]);
        let options = meta.options.unwrap();
        assert_eq!(options[0], QueryOption::new("open", json!("open")));
        assert_eq!(options[1], QueryOption::new("Closed", json!("closed")));
    }

    #[test]
    fn array_defaults_and_operators() {
        let field = FieldDef::new("tags", FieldType::Array)
            .with_options(vec![json!("red"), json!("blue")]);
        assert_eq!(ArrayTyper.default_value(&field), Some(json!([])));
        let meta = ArrayTyper.query_operators(&field).unwrap();
        assert_eq!(meta.operators, vec![In, NotIn, IsNull, IsNotNull]);
        assert_eq!(meta.options.unwrap().len(), 2);

        let schema = ArrayTyper.default_schema(&field);
        assert_eq!(schema.check(&json!(["red"])), Ok(()));
        assert_eq!(schema.check(&json!(["green"])), Err(SchemaViolation::NotAllowed));
    }

    #[test]
    fn array_empty_options_unrestricted() {
        let field = FieldDef::new("tags", FieldType::Array);
        let schema = ArrayTyper.default_schema(&field);
        assert_eq!(schema.one_of, None);
        assert_eq!(schema.check(&json!(["anything"])), Ok(()));
    }

    #[test]
    fn relation_widgets_and_operators() {
        let to_one = RelationTyper::new(FieldType::ManyToOne);
        assert_eq!(to_one.default_widget("form"), "select");
        assert_eq!(
            to_one
                .query_operators(&FieldDef::new("owner", FieldType::ManyToOne))
                .unwrap()
                .operators,
            vec![Eq, In, IsNull, IsNotNull]
        );

        let to_many = RelationTyper::new(FieldType::ManyToMany);
        assert_eq!(to_many.default_widget("form"), "reference");
        assert_eq!(
            to_many
                .query_operators(&FieldDef::new("tags", FieldType::ManyToMany))
                .unwrap()
                .operators,
            vec![In, IsNull, IsNotNull]
        );
    }

    #[test]
    fn binary_and_json_null_checks_only() {
        let field = FieldDef::new("payload", FieldType::Json);
        assert_eq!(
            JsonTyper.query_operators(&field).unwrap().operators,
            vec![IsNull, IsNotNull]
        );
        assert_eq!(
            BinaryTyper
                .query_operators(&FieldDef::new("blob", FieldType::Binary))
                .unwrap()
                .operators,
            vec![IsNull, IsNotNull]
        );
        assert_eq!(JsonTyper.default_widget("grid"), "none");
    }

    #[test]
    fn required_flag_flows_into_schema() {
        let field = FieldDef::new("name", FieldType::String).required();
        let schema = StringTyper.default_schema(&field);
        assert_eq!(schema.check(&Value::Null), Err(SchemaViolation::Required));
    }
}
