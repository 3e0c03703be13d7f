use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a model property.
///
/// Serialized with a `kind` tag so schema exports read naturally:
/// `{"kind": "list", "item": {"kind": "text"}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Integer,
    Float,
    Text,
    /// Calendar date, `%Y-%m-%d`.
    Date,
    /// Date and time without zone, `%Y-%m-%d %H:%M:%S`.
    DateTime,
    /// Enumeration looked up by variant name.
    Enum { variants: Vec<String> },
    /// Opaque JSON, passed through unchanged.
    Json,
    /// Nested model, marshaled as a JSON object.
    Model { name: String },
    List { item: Box<FieldType> },
    Optional { inner: Box<FieldType> },
}

impl FieldType {
    /// Shorthand for a list of `item`.
    pub fn list(item: FieldType) -> Self {
        Self::List {
            item: Box::new(item),
        }
    }

    /// Shorthand for an optional `inner`.
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional {
            inner: Box::new(inner),
        }
    }

    /// Shorthand for a nested model type.
    pub fn model(name: &str) -> Self {
        Self::Model { name: name.into() }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Text => f.write_str("text"),
            Self::Date => f.write_str("date"),
            Self::DateTime => f.write_str("datetime"),
            Self::Enum { variants } => write!(f, "enum[{}]", variants.join("|")),
            Self::Json => f.write_str("json"),
            Self::Model { name } => write!(f, "model<{name}>"),
            Self::List { item } => write!(f, "list<{item}>"),
            Self::Optional { inner } => write!(f, "optional<{inner}>"),
        }
    }
}

/// Serializable summary of one property of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub name: String,
    /// Alternate internal field name accepted on lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub field_type: FieldType,
    pub readable: bool,
    pub writable: bool,
    #[serde(default)]
    pub identity: bool,
}

/// Serializable summary of a model's properties, in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub model: String,
    pub properties: Vec<PropertySchema>,
}

impl ModelSchema {
    /// Name of the identity property, if the model declares one.
    pub fn identity(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| p.identity)
            .map(|p| p.name.as_str())
    }
}
