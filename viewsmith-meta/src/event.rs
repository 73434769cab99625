//! Change notifications emitted by the meta registry.

/// Emitted after registry content changes (incremental update or cleanup),
/// naming the affected entries so dependent layers can invalidate caches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdated {
    /// Names of models that were added, replaced or removed.
    pub models: Vec<String>,
    /// Names of views that were added, replaced or removed.
    pub views: Vec<String>,
}

impl ConfigUpdated {
    pub fn is_empty(&self) -> bool {
        self.models.is_empty() && self.views.is_empty()
    }
}

/// Subscriber callback for [`ConfigUpdated`] notifications.
pub type ConfigListener = Box<dyn Fn(&ConfigUpdated) + Send + Sync>;
