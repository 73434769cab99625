//! The meta registry: the live maps of registered models and views.
//!
//! An explicit instance — callers hold it and pass it where needed; there is
//! no process-global registry. It assumes a single logical writer: all
//! metadata updates funnel through one admin path, and reads are only
//! guaranteed consistent in the absence of a concurrent write.
//!
//! Two error policies meet here. Registration is eager: authored config with
//! missing identity fields fails loudly. Import is defensive: persisted
//! bundles are parsed permissively and invalid entries are logged and
//! dropped (see `serialize`).

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use viewsmith_fields::TyperRegistry;

use crate::error::{MetaError, Result};
use crate::event::{ConfigListener, ConfigUpdated};
use crate::model::EntityModel;
use crate::model_delegate::ModelDelegate;
use crate::serialize;
use crate::view::{EntityView, ViewItem, MODEL_NONE};
use crate::view_delegate::ViewDelegate;

pub struct MetaRegistry {
    typers: Arc<TyperRegistry>,
    models: IndexMap<String, Arc<ModelDelegate>>,
    views: IndexMap<String, Arc<ViewDelegate>>,
    listeners: Vec<ConfigListener>,
}

impl MetaRegistry {
    /// A registry with the builtin typers.
    pub fn new() -> Self {
        Self::with_typers(Arc::new(TyperRegistry::with_builtins()))
    }

    /// A registry using the given typer set (e.g. builtins plus host typers).
    pub fn with_typers(typers: Arc<TyperRegistry>) -> Self {
        Self {
            typers,
            models: IndexMap::new(),
            views: IndexMap::new(),
            listeners: Vec::new(),
        }
    }

    pub fn typers(&self) -> &Arc<TyperRegistry> {
        &self.typers
    }

    /// Subscribe to [`ConfigUpdated`] notifications.
    pub fn on_config_updated(
        &mut self,
        listener: impl Fn(&ConfigUpdated) + Send + Sync + 'static,
    ) {
        self.listeners.push(Box::new(listener));
    }

    // --- Registration (eager path) ---

    /// Register a model, replacing any prior entry with the same name.
    pub fn register_model(&mut self, model: EntityModel) -> Result<()> {
        if model.name.is_empty() {
            return Err(MetaError::InvalidModel {
                reason: "missing name".into(),
            });
        }
        debug!(model = %model.name, fields = model.fields.len(), "registering model");
        let delegate = Arc::new(ModelDelegate::new(model, Arc::clone(&self.typers)));
        self.models.insert(delegate.name().to_owned(), delegate);
        Ok(())
    }

    /// Register a view, replacing any prior entry with the same name.
    pub fn register_view(&mut self, view: EntityView) -> Result<()> {
        if view.name.is_empty() {
            return Err(MetaError::InvalidView {
                reason: "missing name".into(),
            });
        }
        if view.model_name.is_empty() {
            return Err(MetaError::InvalidView {
                reason: format!("view '{}' has no modelName", view.name),
            });
        }
        if view.view_type.is_empty() {
            return Err(MetaError::InvalidView {
                reason: format!("view '{}' has no viewType", view.name),
            });
        }
        debug!(view = %view.name, model = %view.model_name, "registering view");
        let delegate = Arc::new(ViewDelegate::new(view));
        self.views.insert(delegate.name().to_owned(), delegate);
        Ok(())
    }

    // --- Lookup ---

    pub fn get_model(&self, name: &str) -> Option<Arc<ModelDelegate>> {
        self.models.get(name).cloned()
    }

    pub fn get_view(&self, name: &str) -> Option<Arc<ViewDelegate>> {
        self.views.get(name).cloned()
    }

    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    /// Resolve a view for a model and view type.
    ///
    /// Resolution order: exact name match if `name` is given; else the first
    /// registered view matching both model and view type; else, if the model
    /// exists, a synthesized throwaway default view — one item per model
    /// field ordered by declared order, widgets left for supplementation — so
    /// a model can always be displayed with zero authored views.
    /// Model-independent views only ever resolve by exact name.
    pub fn find_view(
        &self,
        model_name: &str,
        view_type: &str,
        name: Option<&str>,
    ) -> Option<Arc<ViewDelegate>> {
        if let Some(name) = name {
            if let Some(view) = self.get_view(name) {
                return Some(view);
            }
        }
        if model_name == MODEL_NONE {
            return None;
        }
        if let Some(view) = self
            .views
            .values()
            .find(|v| v.model_name() == model_name && v.view_type() == view_type)
        {
            return Some(Arc::clone(view));
        }
        let model = self.get_model(model_name)?;
        debug!(model = %model_name, %view_type, "synthesizing default view");
        Some(Arc::new(self.synthesize_default_view(&model, view_type)))
    }

    fn synthesize_default_view(&self, model: &ModelDelegate, view_type: &str) -> ViewDelegate {
        let mut fields: Vec<_> = model.fields().iter().collect();
        fields.sort_by_key(|f| f.order);
        let mut view = EntityView::new(
            format!("{}_{}_default", model.name(), view_type),
            model.name(),
            view_type,
        );
        view.items = fields
            .into_iter()
            .map(|f| ViewItem::field(&f.name))
            .collect();
        ViewDelegate::new(view)
    }

    /// Resolve a view delegate against its model and typers, producing a new
    /// fully resolved delegate.
    pub fn supplement_view(
        &self,
        view: &ViewDelegate,
        view_options_override: Option<Value>,
    ) -> ViewDelegate {
        let model = if view.view().is_model_bound() {
            self.get_model(view.model_name())
        } else {
            None
        };
        view.to_supplemented_view(model.as_deref(), &self.typers, view_options_override)
    }

    // --- Interchange ---

    /// The plain interchange object for a registered model.
    pub fn to_plain_model_object(&self, name: &str) -> Option<Value> {
        self.get_model(name)
            .map(|delegate| serialize::model_to_value(delegate.model()))
    }

    /// The plain interchange object for a registered view, supplemented first
    /// so the emitted JSON always reflects fully resolved widgets.
    pub fn to_plain_view_object(&self, name: &str) -> Option<Value> {
        self.get_view(name)
            .map(|view| serialize::view_to_value(self.supplement_view(&view, None).view()))
    }

    /// Export the full registry as a JSON bundle. Views are exported raw
    /// (unsupplemented) so export/import round-trips the declarations.
    pub fn to_json_string(&self) -> Result<String> {
        let models: Vec<Value> = self
            .models
            .values()
            .map(|d| serialize::model_to_value(d.model()))
            .collect();
        let views: Vec<Value> = self
            .views
            .values()
            .map(|d| serialize::view_to_value(d.view()))
            .collect();
        Ok(serde_json::to_string(&json!({
            "models": models,
            "views": views,
        }))?)
    }

    /// Destructive import: clears everything, then registers the bundle's
    /// models before its views. A view bound to a model absent from the
    /// arriving bundle is skipped with a warning. Emits one notification
    /// naming everything that changed (removed and registered).
    pub fn from_json_string(&mut self, bundle: &str) {
        let parsed: Value = match serde_json::from_str(bundle) {
            Ok(value) => value,
            Err(e) => {
                warn!(%e, "registry bundle is not valid JSON, ignoring");
                return;
            }
        };

        let mut event = self.drain();
        let (models, views) = self.register_bundle(&parsed, true);
        event.models.extend(models);
        event.views.extend(views);
        dedup(&mut event.models);
        dedup(&mut event.views);
        self.emit(event);
    }

    /// Incremental import: registers (replacing same-named entries) every
    /// model and view present in the bundle, leaving everything else alone.
    /// Emits a notification naming the changed entries; a no-op bundle emits
    /// nothing.
    pub fn update_or_register(&mut self, bundle: &Value) {
        let (models, views) = self.register_bundle(bundle, false);
        let event = ConfigUpdated { models, views };
        self.emit(event);
    }

    /// Register the models then the views of a parsed bundle, defensively.
    /// `fresh` marks a just-cleared registry, where a view's model can only
    /// come from the bundle itself.
    fn register_bundle(&mut self, bundle: &Value, fresh: bool) -> (Vec<String>, Vec<String>) {
        let mut model_names = Vec::new();
        let mut view_names = Vec::new();

        if let Some(entries) = bundle.get("models").and_then(Value::as_array) {
            for entry in entries {
                let Some(model) = serialize::model_from_value(entry) else {
                    warn!("skipping invalid model entry in bundle");
                    continue;
                };
                let name = model.name.clone();
                if self.register_model(model).is_ok() {
                    model_names.push(name);
                }
            }
        }

        if let Some(entries) = bundle.get("views").and_then(Value::as_array) {
            for entry in entries {
                let Some(view) = serialize::view_from_value(entry) else {
                    warn!("skipping invalid view entry in bundle");
                    continue;
                };
                if view.is_model_bound() && !self.models.contains_key(&view.model_name) {
                    warn!(
                        view = %view.name,
                        model = %view.model_name,
                        fresh,
                        "skipping view bound to unknown model"
                    );
                    continue;
                }
                let name = view.name.clone();
                if self.register_view(view).is_ok() {
                    view_names.push(name);
                }
            }
        }

        (model_names, view_names)
    }

    // --- Lifecycle ---

    /// Full reset: discard every model and view and notify subscribers which
    /// names were affected.
    pub fn cleanup(&mut self) {
        let event = self.drain();
        self.emit(event);
    }

    fn drain(&mut self) -> ConfigUpdated {
        let event = ConfigUpdated {
            models: self.models.keys().cloned().collect(),
            views: self.views.keys().cloned().collect(),
        };
        self.models.clear();
        self.views.clear();
        event
    }

    fn emit(&self, event: ConfigUpdated) {
        if event.is_empty() {
            return;
        }
        info!(
            models = event.models.len(),
            views = event.views.len(),
            "config.updated"
        );
        for listener in &self.listeners {
            listener(&event);
        }
    }
}

impl Default for MetaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaRegistry")
            .field("models", &self.models.len())
            .field("views", &self.views.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

fn dedup(names: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    names.retain(|name| seen.insert(name.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::view_type;
    use serde_json::json;
    use viewsmith_fields::{FieldDef, FieldType};

    fn product() -> EntityModel {
        EntityModel::new("Product")
            .field(FieldDef::new("name", FieldType::String).required().with_order(1))
            .field(FieldDef::new("price", FieldType::Number).with_order(2))
            .field(FieldDef::new("active", FieldType::Boolean).searchable().with_order(3))
    }

    #[test]
    fn register_model_requires_name() {
        let mut registry = MetaRegistry::new();
        let err = registry.register_model(EntityModel::new("")).unwrap_err();
        assert!(matches!(err, MetaError::InvalidModel { .. }));
    }

    #[test]
    fn register_view_requires_identity() {
        let mut registry = MetaRegistry::new();
        assert!(registry
            .register_view(EntityView::new("", "Product", "grid"))
            .is_err());
        assert!(registry
            .register_view(EntityView::new("v", "", "grid"))
            .is_err());
        assert!(registry
            .register_view(EntityView::new("v", "Product", ""))
            .is_err());
    }

    #[test]
    fn reregistration_replaces_silently() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();
        registry
            .register_model(EntityModel::new("Product").with_title("v2"))
            .unwrap();
        assert_eq!(registry.model_names().count(), 1);
        let model = registry.get_model("Product").unwrap();
        assert_eq!(model.model().title.as_deref(), Some("v2"));
        assert!(model.fields().is_empty());
    }

    #[test]
    fn find_view_prefers_exact_name() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();
        registry
            .register_view(EntityView::new("special", "Product", view_type::FORM))
            .unwrap();
        registry
            .register_view(EntityView::new("grid1", "Product", view_type::GRID))
            .unwrap();
        let found = registry
            .find_view("Product", view_type::GRID, Some("special"))
            .unwrap();
        assert_eq!(found.name(), "special");
    }

    #[test]
    fn find_view_falls_back_to_first_matching() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();
        registry
            .register_view(EntityView::new("p_form", "Product", view_type::FORM))
            .unwrap();
        registry
            .register_view(EntityView::new("p_grid", "Product", view_type::GRID))
            .unwrap();
        let found = registry.find_view("Product", view_type::GRID, None).unwrap();
        assert_eq!(found.name(), "p_grid");
    }

    #[test]
    fn find_view_synthesizes_default() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();
        let found = registry.find_view("Product", view_type::GRID, None).unwrap();
        assert_eq!(found.items().len(), 3);
        let names: Vec<_> = found.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["name", "price", "active"]);
        assert!(found.items().iter().all(|i| i.widget.is_none()));
        // Synthesized views are throwaway, not registered.
        assert_eq!(registry.view_names().count(), 0);
    }

    #[test]
    fn find_view_synthesized_orders_by_field_order() {
        let mut registry = MetaRegistry::new();
        registry
            .register_model(
                EntityModel::new("M")
                    .field(FieldDef::new("b", FieldType::String).with_order(2))
                    .field(FieldDef::new("a", FieldType::String).with_order(1)),
            )
            .unwrap();
        let found = registry.find_view("M", view_type::GRID, None).unwrap();
        let names: Vec<_> = found.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn find_view_unknown_model_is_none() {
        let registry = MetaRegistry::new();
        assert!(registry.find_view("Ghost", view_type::GRID, None).is_none());
    }

    #[test]
    fn plain_view_object_is_supplemented() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();
        registry
            .register_view(
                EntityView::new("p_grid", "Product", view_type::GRID)
                    .item(ViewItem::field("active")),
            )
            .unwrap();
        let plain = registry.to_plain_view_object("p_grid").unwrap();
        assert_eq!(plain["items"][0]["widget"], "switch");
        assert_eq!(plain["__viewSerializerVersion"], json!(serialize::VIEW_SERIALIZER_VERSION));
    }

    #[test]
    fn cleanup_emits_affected_names() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();
        registry
            .register_view(EntityView::new("p_grid", "Product", view_type::GRID))
            .unwrap();

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.on_config_updated(move |event| {
            sink.lock().unwrap().push(event.clone());
        });

        registry.cleanup();
        assert_eq!(registry.model_names().count(), 0);
        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].models, vec!["Product"]);
        assert_eq!(events[0].views, vec!["p_grid"]);
    }

    #[test]
    fn cleanup_of_empty_registry_emits_nothing() {
        let mut registry = MetaRegistry::new();
        let seen = Arc::new(std::sync::Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        registry.on_config_updated(move |_| *sink.lock().unwrap() += 1);
        registry.cleanup();
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn update_or_register_is_incremental() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();
        registry
            .register_model(EntityModel::new("Order"))
            .unwrap();

        registry.update_or_register(&json!({
            "models": [{"name": "Product", "title": "Replaced"}]
        }));

        // Order untouched, Product replaced.
        assert!(registry.get_model("Order").is_some());
        let product = registry.get_model("Product").unwrap();
        assert_eq!(product.model().title.as_deref(), Some("Replaced"));
    }

    #[test]
    fn update_or_register_emits_changed_names() {
        let mut registry = MetaRegistry::new();
        registry.register_model(product()).unwrap();

        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.on_config_updated(move |event| sink.lock().unwrap().push(event.clone()));

        registry.update_or_register(&json!({
            "models": [{"name": "Order"}],
            "views": [{"name": "o_grid", "modelName": "Order", "viewType": "grid"}]
        }));

        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].models, vec!["Order"]);
        assert_eq!(events[0].views, vec!["o_grid"]);
    }

    #[test]
    fn update_or_register_noop_emits_nothing() {
        let mut registry = MetaRegistry::new();
        let seen = Arc::new(std::sync::Mutex::new(0usize));
        let sink = Arc::clone(&seen);
        registry.on_config_updated(move |_| *sink.lock().unwrap() += 1);

        registry.update_or_register(&json!({}));
        registry.update_or_register(&json!({"models": [], "views": ["junk"]}));
        assert_eq!(*seen.lock().unwrap(), 0);
    }

    #[test]
    fn model_independent_views_resolve_by_name_only() {
        let mut registry = MetaRegistry::new();
        registry
            .register_view(EntityView::new("home", MODEL_NONE, view_type::DASHBOARD))
            .unwrap();
        let named = registry
            .find_view(MODEL_NONE, view_type::DASHBOARD, Some("home"))
            .unwrap();
        assert_eq!(named.name(), "home");
        assert!(registry
            .find_view(MODEL_NONE, view_type::DASHBOARD, None)
            .is_none());
    }

    #[test]
    fn model_independent_views_need_no_model() {
        let mut registry = MetaRegistry::new();
        registry.update_or_register(&json!({
            "views": [{"name": "home", "modelName": MODEL_NONE, "viewType": "dashboard"}]
        }));
        assert!(registry.get_view("home").is_some());
    }
}
