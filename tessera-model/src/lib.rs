//! Model marshaling for Tessera.
//!
//! Converts typed domain entities ("models") to and from JSON objects,
//! JSON arrays and flat string maps (form submissions) without any
//! per-entity conversion code:
//! - [`Model`]: a type declares its named properties once, through
//!   [`Properties`]
//! - [`Registry`]: builds each model's [`ModelDescriptor`] on first use and
//!   shares it process-wide
//! - [`Coerce`]: turns untyped JSON/string values into a property's
//!   declared type
//! - [`marshal`]: get/set by name, `to_json`/`from_json`/`from_map`,
//!   extend-attribute extraction, identity-aware copy
//!
//! ```
//! use tessera_model::{marshal, Model, Properties};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Tag {
//!     id: i64,
//!     label: String,
//! }
//!
//! impl Model for Tag {
//!     fn properties(props: &mut Properties<Self>) {
//!         props.id("id", |t| &t.id, |t| &mut t.id);
//!         props.field("label", |t| &t.label, |t| &mut t.label);
//!     }
//! }
//!
//! let tag = Tag { id: 7, label: "rust".into() };
//! let json = marshal::to_json(&tag, None);
//! assert_eq!(marshal::from_json::<Tag>(&json), Some(tag));
//! ```

pub mod coerce;
mod descriptor;
mod error;
pub mod marshal;
mod object;
mod registry;
mod schema;

pub use coerce::{Coerce, CoercionFailure, NamedEnum, DATETIME_FORMAT, DATE_FORMAT};
pub use descriptor::{ModelDescriptor, Properties, PropertyDescriptor};
pub use error::{MarshalError, MarshalResult};
pub use object::ModelObject;
pub use registry::{describe, Registry};
pub use schema::{FieldType, ModelSchema, PropertySchema};

/// A domain entity whose properties can be marshaled by name.
///
/// Implementors only declare their properties; every conversion is driven
/// by the cached [`ModelDescriptor`] built from that declaration.
pub trait Model: Default + Clone + Send + Sync + 'static {
    /// Name used in diagnostics and schema export.
    fn model_name() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Declares the model's properties in output order.
    fn properties(props: &mut Properties<Self>);
}
