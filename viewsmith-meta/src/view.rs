//! Entity view declarations.
//!
//! A view is a named layout bound to a model: an ordered tree of view items
//! (leaf fields and nested panels, the same recursive shape), plus view-level
//! options and highlight rules. The `*when` condition strings are opaque
//! boolean expressions evaluated by the renderer against current field
//! values — this layer only stores them.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel `model_name` for views not bound to any model (e.g. shells and
/// dashboards). Such views never resolve fields or widgets from a model.
pub const MODEL_NONE: &str = "$none";

/// Known view type tags. View types are open strings — these are just the
/// builtin vocabulary.
pub mod view_type {
    pub const GRID: &str = "grid";
    pub const FORM: &str = "form";
    pub const KANBAN: &str = "kanban";
    pub const DASHBOARD: &str = "dashboard";
    pub const SHELL: &str = "shell";
    pub const MASTER_DETAIL: &str = "master-detail";
}

/// A conditional highlight rule: `when` is a boolean expression over field
/// values, `color` the highlight to apply when it holds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hilite {
    pub when: String,
    pub color: String,
}

/// One node of a view's layout tree.
///
/// A leaf item is bound to a model field by `name` and carries widget and
/// layout attributes. An item with `fields` present is a panel: its children
/// are view items to arbitrary depth, and its own widget attributes pass
/// through resolution untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget_options: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// 0 or 1; defaulted to 0 during supplementation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flex: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span_cols: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_when: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_comp: Option<String>,
    /// Present iff this item is a panel containing nested items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<ViewItem>>,
}

impl ViewItem {
    /// A leaf item bound to a model field by name.
    pub fn field(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            icon: None,
            widget: None,
            widget_options: None,
            width: None,
            flex: None,
            span_cols: None,
            order: None,
            hidden_when: None,
            show_when: None,
            required_when: None,
            read_only_when: None,
            disabled_when: None,
            reference_view: None,
            reference_comp: None,
            fields: None,
        }
    }

    /// A panel containing nested items.
    pub fn panel(name: impl Into<String>, children: Vec<ViewItem>) -> Self {
        let mut item = Self::field(name);
        item.fields = Some(children);
        item
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_widget(mut self, widget: impl Into<String>) -> Self {
        self.widget = Some(widget.into());
        self
    }

    pub fn with_widget_options(mut self, options: Value) -> Self {
        self.widget_options = Some(options);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    pub fn hidden_when(mut self, expr: impl Into<String>) -> Self {
        self.hidden_when = Some(expr.into());
        self
    }

    pub fn is_panel(&self) -> bool {
        self.fields.is_some()
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

fn default_true() -> bool {
    true
}

fn is_true(b: &bool) -> bool {
    *b
}

/// A declarative view definition bound to a model (or [`MODEL_NONE`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EntityView {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model_name: String,
    pub view_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_options: Option<Value>,
    #[serde(default)]
    pub items: Vec<ViewItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hilites: Vec<Hilite>,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_edit: bool,
    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub can_new: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub can_delete: bool,
}

impl EntityView {
    pub fn new(
        name: impl Into<String>,
        model_name: impl Into<String>,
        view_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            model_name: model_name.into(),
            view_type: view_type.into(),
            density: None,
            view_options: None,
            items: Vec::new(),
            hilites: Vec::new(),
            can_edit: true,
            can_new: true,
            can_delete: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_view_options(mut self, options: Value) -> Self {
        self.view_options = Some(options);
        self
    }

    pub fn with_density(mut self, density: impl Into<String>) -> Self {
        self.density = Some(density.into());
        self
    }

    pub fn item(mut self, item: ViewItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn hilite(mut self, when: impl Into<String>, color: impl Into<String>) -> Self {
        self.hilites.push(Hilite {
            when: when.into(),
            color: color.into(),
        });
        self
    }

    /// Whether this view is bound to a model at all.
    pub fn is_model_bound(&self) -> bool {
        self.model_name != MODEL_NONE
    }
}
