//! Bidirectional JSON conversion for models and views.
//!
//! Serialization is lossy by design for validation logic: an authored
//! in-memory schema is emitted in its interchange form (`schemaSerialized`)
//! and the object form is dropped; deserialization rebuilds it.
//!
//! Deserialization here is the defensive path: persisted configuration may be
//! stale, hand-edited or written by an older format version, so every
//! attribute is type-checked before admission, wrong-typed attributes are
//! omitted, invalid entries are logged and dropped, and nothing ever panics
//! or errors. Contrast with live registration, which validates eagerly and
//! fails loudly.

use serde_json::{json, Map, Value};
use tracing::warn;

use viewsmith_fields::{FieldDef, FieldSchema, FieldType, TypeOptions};

use crate::model::{EntityModel, ExternalConfig};
use crate::view::{EntityView, Hilite, ViewItem};

/// Stamped into every serialized view to allow future format evolution.
pub const VIEW_SERIALIZER_VERSION: u64 = 2;

// --- Typed attribute access (strict: wrong shape means absent) ---

fn get_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_owned)
}

fn get_nonempty_string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    get_string(obj, key).filter(|s| !s.is_empty())
}

fn get_bool(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

fn get_i32(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    obj.get(key)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
}

fn get_f64(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

fn get_value(obj: &Map<String, Value>, key: &str) -> Option<Value> {
    obj.get(key).filter(|v| !v.is_null()).cloned()
}

// --- Models ---

/// Serialize a model to its plain interchange object, converting each field's
/// authored schema to `schemaSerialized`.
pub fn model_to_value(model: &EntityModel) -> Value {
    let mut root = match serde_json::to_value(model) {
        Ok(value) => value,
        Err(e) => {
            warn!(model = %model.name, %e, "model serialization failed");
            return Value::Null;
        }
    };
    if let Some(Value::Array(fields)) = root.get_mut("fields") {
        for (field, emitted) in model.fields.iter().zip(fields.iter_mut()) {
            if let (Some(schema), Value::Object(obj)) = (&field.schema, emitted) {
                obj.insert("schemaSerialized".into(), schema.to_interchange());
            }
        }
    }
    root
}

/// Rebuild a model from its interchange object. Returns `None` only when the
/// entry has no usable identity; everything else degrades per attribute.
pub fn model_from_value(value: &Value) -> Option<EntityModel> {
    let Some(obj) = value.as_object() else {
        warn!("model entry is not an object, dropping");
        return None;
    };
    let Some(name) = get_nonempty_string(obj, "name") else {
        warn!("model entry has no name, dropping");
        return None;
    };

    let mut model = EntityModel::new(name);
    model.title = get_string(obj, "title");
    model.description = get_string(obj, "description");
    model.external = get_bool(obj, "external").unwrap_or(false);
    model.external_config = obj
        .get("externalConfig")
        .and_then(Value::as_object)
        .map(|config| ExternalConfig {
            features: config
                .get("features")
                .and_then(Value::as_array)
                .map(|list| {
                    list.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_owned)
                        .collect()
                })
                .unwrap_or_default(),
        });

    if let Some(entries) = obj.get("fields").and_then(Value::as_array) {
        for entry in entries {
            let Some(field) = field_from_value(entry) else {
                warn!(model = %model.name, "skipping invalid field entry");
                continue;
            };
            if model.find_field(&field.name).is_some() {
                warn!(model = %model.name, field = %field.name, "skipping duplicate field name");
                continue;
            }
            model.fields.push(field);
        }
    }

    Some(model)
}

fn field_from_value(value: &Value) -> Option<FieldDef> {
    let obj = value.as_object()?;
    let name = get_nonempty_string(obj, "name")?;
    let field_type = get_string(obj, "type").and_then(|tag| {
        let parsed = FieldType::parse(&tag);
        if parsed.is_none() {
            warn!(field = %name, %tag, "unknown field type tag");
        }
        parsed
    })?;

    let mut field = FieldDef::new(name, field_type);
    field.title = get_string(obj, "title");
    field.description = get_string(obj, "description");
    field.type_options = obj
        .get("typeOptions")
        .and_then(Value::as_object)
        .map(type_options_from_object);
    field.default_value = get_value(obj, "defaultValue");
    field.is_required = get_bool(obj, "isRequired").unwrap_or(false);
    field.is_primary_key = get_bool(obj, "isPrimaryKey").unwrap_or(false);
    field.is_unique = get_bool(obj, "isUnique").unwrap_or(false);
    field.editable = get_bool(obj, "editable").unwrap_or(true);
    field.searchable = get_bool(obj, "searchable").unwrap_or(false);
    field.ref_model = get_string(obj, "refModel");
    field.ref_field = get_string(obj, "refField");
    field.order = get_i32(obj, "order").unwrap_or(0);
    // Interchange conversion may itself fail; a missing schema just means the
    // typer-derived default applies later.
    field.schema = obj
        .get("schemaSerialized")
        .and_then(FieldSchema::from_interchange);

    Some(field)
}

fn type_options_from_object(obj: &Map<String, Value>) -> TypeOptions {
    let mut options = TypeOptions::default();
    for (key, value) in obj {
        if key == "options" {
            match value.as_array() {
                Some(list) => options.options = list.clone(),
                None => warn!("typeOptions.options is not an array, ignoring"),
            }
        } else {
            options.extra.insert(key.clone(), value.clone());
        }
    }
    options
}

// --- Views ---

/// Serialize a view to its plain interchange object: stamps the serializer
/// version and drops any item (at any depth) whose name is missing.
pub fn view_to_value(view: &EntityView) -> Value {
    let mut root = match serde_json::to_value(view) {
        Ok(value) => value,
        Err(e) => {
            warn!(view = %view.name, %e, "view serialization failed");
            return Value::Null;
        }
    };
    if let Some(obj) = root.as_object_mut() {
        obj.insert(
            "__viewSerializerVersion".into(),
            json!(VIEW_SERIALIZER_VERSION),
        );
        if let Some(Value::Array(items)) = obj.get_mut("items") {
            prune_nameless_items(items);
        }
    }
    root
}

fn prune_nameless_items(items: &mut Vec<Value>) {
    items.retain(|item| {
        let named = item
            .get("name")
            .and_then(Value::as_str)
            .is_some_and(|name| !name.is_empty());
        if !named {
            warn!("dropping view item with no name");
        }
        named
    });
    for item in items {
        if let Some(Value::Array(children)) = item.get_mut("fields") {
            prune_nameless_items(children);
        }
    }
}

/// Rebuild a view from its interchange object. Same defensive policy as
/// [`model_from_value`]; identity attributes (`name`, `modelName`,
/// `viewType`) are the only hard requirements, mirroring what live
/// registration enforces.
pub fn view_from_value(value: &Value) -> Option<EntityView> {
    let Some(obj) = value.as_object() else {
        warn!("view entry is not an object, dropping");
        return None;
    };
    let Some(name) = get_nonempty_string(obj, "name") else {
        warn!("view entry has no name, dropping");
        return None;
    };
    let Some(model_name) = get_nonempty_string(obj, "modelName") else {
        warn!(view = %name, "view entry has no modelName, dropping");
        return None;
    };
    let Some(view_type) = get_nonempty_string(obj, "viewType") else {
        warn!(view = %name, "view entry has no viewType, dropping");
        return None;
    };

    let mut view = EntityView::new(name, model_name, view_type);
    view.title = get_string(obj, "title");
    view.description = get_string(obj, "description");
    view.density = get_string(obj, "density");
    view.view_options = get_value(obj, "viewOptions");
    view.can_edit = get_bool(obj, "canEdit").unwrap_or(true);
    view.can_new = get_bool(obj, "canNew").unwrap_or(true);
    view.can_delete = get_bool(obj, "canDelete").unwrap_or(false);

    if let Some(entries) = obj.get("items").and_then(Value::as_array) {
        view.items = entries
            .iter()
            .filter_map(|entry| {
                let item = item_from_value(entry);
                if item.is_none() {
                    warn!(view = %view.name, "skipping invalid view item");
                }
                item
            })
            .collect();
    }

    if let Some(entries) = obj.get("hilites").and_then(Value::as_array) {
        view.hilites = entries
            .iter()
            .filter_map(|entry| {
                let rule = entry.as_object()?;
                Some(Hilite {
                    when: get_string(rule, "when")?,
                    color: get_string(rule, "color")?,
                })
            })
            .collect();
    }

    Some(view)
}

fn item_from_value(value: &Value) -> Option<ViewItem> {
    let obj = value.as_object()?;
    let name = get_nonempty_string(obj, "name")?;

    let mut item = ViewItem::field(name);
    item.title = get_string(obj, "title");
    item.description = get_string(obj, "description");
    item.icon = get_string(obj, "icon");
    item.widget = get_string(obj, "widget");
    item.widget_options = get_value(obj, "widgetOptions");
    item.width = get_f64(obj, "width");
    item.flex = get_i32(obj, "flex");
    item.span_cols = get_i32(obj, "spanCols");
    item.order = get_i32(obj, "order");
    item.hidden_when = get_string(obj, "hiddenWhen");
    item.show_when = get_string(obj, "showWhen");
    item.required_when = get_string(obj, "requiredWhen");
    item.read_only_when = get_string(obj, "readOnlyWhen");
    item.disabled_when = get_string(obj, "disabledWhen");
    item.reference_view = get_string(obj, "referenceView");
    item.reference_comp = get_string(obj, "referenceComp");

    if let Some(fields) = obj.get("fields") {
        match fields.as_array() {
            Some(children) => {
                item.fields = Some(children.iter().filter_map(item_from_value).collect());
            }
            None => warn!(item = %item.name, "item fields is not an array, treating as leaf"),
        }
    }

    Some(item)
}
