//! Derived behavior for one entity view.
//!
//! The delegate wraps a raw [`EntityView`] and produces supplemented copies:
//! view items matched to model fields inherit missing display attributes and
//! get their widget resolved through the explicit → typer → fallback-table
//! priority. The wrapped declaration is never mutated.

use serde_json::Value;
use tracing::warn;

use viewsmith_fields::{widget, FieldType, TyperRegistry};

use crate::model_delegate::ModelDelegate;
use crate::view::{EntityView, ViewItem};

/// Maximum panel nesting depth the supplementation walk follows. Deeper
/// subtrees pass through unresolved instead of risking call-stack exhaustion
/// on hostile input.
pub const MAX_PANEL_DEPTH: usize = 64;

/// Fixed type→widget table used when a field's type has no registered typer.
fn fallback_widget(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::String => widget::TEXTFIELD,
        FieldType::Number => widget::NUMBER,
        FieldType::Boolean => widget::SWITCH,
        FieldType::Date => widget::DATE,
        FieldType::Enum | FieldType::Array => widget::SELECT,
        FieldType::OneToMany | FieldType::ManyToMany => widget::REFERENCE,
        FieldType::ManyToOne | FieldType::OneToOne => widget::SELECT,
        FieldType::Binary | FieldType::Json => widget::NONE,
    }
}

/// Computed-behavior wrapper around one registered view.
#[derive(Debug, Clone)]
pub struct ViewDelegate {
    view: EntityView,
}

impl ViewDelegate {
    pub fn new(view: EntityView) -> Self {
        Self { view }
    }

    /// The wrapped declaration.
    pub fn view(&self) -> &EntityView {
        &self.view
    }

    pub fn name(&self) -> &str {
        &self.view.name
    }

    pub fn model_name(&self) -> &str {
        &self.view.model_name
    }

    pub fn view_type(&self) -> &str {
        &self.view.view_type
    }

    /// Top-level view items.
    pub fn items(&self) -> &[ViewItem] {
        &self.view.items
    }

    /// Produce a new, fully resolved view.
    ///
    /// Panels recurse into their children only; their own attributes pass
    /// through. Leaf items with a same-named model field inherit missing
    /// `title`/`description`/`order`, default `flex` to 0, and resolve the
    /// widget by priority: explicit value, then the typer's default for this
    /// view type, then the fixed fallback table. Leaf items with no matching
    /// model field pass through unresolved. With no model at all (e.g. a
    /// model-independent view) every item passes through.
    pub fn to_supplemented_view(
        &self,
        model: Option<&ModelDelegate>,
        typers: &TyperRegistry,
        view_options_override: Option<Value>,
    ) -> ViewDelegate {
        let mut view = self.view.clone();
        if let Some(options) = view_options_override {
            view.view_options = Some(options);
        }
        view.items = supplement_items(&self.view.items, model, typers, &self.view.view_type, 0);
        ViewDelegate::new(view)
    }
}

fn supplement_items(
    items: &[ViewItem],
    model: Option<&ModelDelegate>,
    typers: &TyperRegistry,
    view_type: &str,
    depth: usize,
) -> Vec<ViewItem> {
    items
        .iter()
        .map(|item| {
            if let Some(children) = &item.fields {
                let mut out = item.clone();
                if depth < MAX_PANEL_DEPTH {
                    out.fields =
                        Some(supplement_items(children, model, typers, view_type, depth + 1));
                } else {
                    warn!(
                        name = %item.name,
                        "panel nesting exceeds max depth, leaving subtree unresolved"
                    );
                }
                out
            } else {
                supplement_leaf(item, model, typers, view_type)
            }
        })
        .collect()
}

fn supplement_leaf(
    item: &ViewItem,
    model: Option<&ModelDelegate>,
    typers: &TyperRegistry,
    view_type: &str,
) -> ViewItem {
    let Some(field) = model.and_then(|m| m.find_field_by_name(&item.name)) else {
        return item.clone();
    };

    let mut out = item.clone();
    if out.title.is_none() {
        out.title = field.title.clone();
    }
    if out.description.is_none() {
        out.description = field.description.clone();
    }
    if out.order.is_none() {
        out.order = Some(field.order);
    }
    if out.flex.is_none() {
        out.flex = Some(0);
    }
    if out.widget.is_none() {
        let resolved = match typers.get(field.field_type) {
            Some(typer) => typer.default_widget(view_type),
            None => fallback_widget(field.field_type),
        };
        out.widget = Some(resolved.to_string());
    }
    out
}
