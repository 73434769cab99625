//! Model and view metadata: delegates, registry and interchange
//!
//! `viewsmith-meta` holds the runtime metadata layer on top of
//! `viewsmith-fields`: entity models and views as declared by hosts, the
//! delegates that answer derived questions about them (schemas, defaults,
//! query metadata, widget resolution), and the registry that owns the live
//! set plus its JSON interchange.
//!
//! # Architecture
//!
//! - **Declarations vs behavior**: [`EntityModel`]/[`EntityView`] are plain
//!   data; [`ModelDelegate`]/[`ViewDelegate`] wrap them and do the work
//! - **Two trust boundaries**: registration of authored config fails eagerly
//!   with [`MetaError`]; import of persisted JSON is defensive — invalid
//!   entries are logged and dropped, never fatal
//! - **Explicit registry instance**: [`MetaRegistry`] is owned by the caller;
//!   there is no process-global state

pub mod error;
pub mod event;
pub mod model;
pub mod model_delegate;
pub mod registry;
pub mod serialize;
pub mod view;
pub mod view_delegate;

pub use error::{MetaError, Result};
pub use event::{ConfigListener, ConfigUpdated};
pub use model::{feature, EntityModel, ExternalConfig};
pub use model_delegate::{ModelDelegate, ModelSchema, QueryFieldMeta};
pub use registry::MetaRegistry;
pub use serialize::VIEW_SERIALIZER_VERSION;
pub use view::{view_type, EntityView, Hilite, ViewItem, MODEL_NONE};
pub use view_delegate::{ViewDelegate, MAX_PANEL_DEPTH};
