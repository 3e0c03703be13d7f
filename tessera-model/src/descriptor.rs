//! Property descriptors and the builder models declare them with.

use crate::coerce::{Coerce, CoercionFailure};
use crate::error::{MarshalError, MarshalResult};
use crate::schema::{FieldType, ModelSchema, PropertySchema};
use crate::Model;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

type Reader<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Writer<T> = Box<dyn Fn(&mut T, &Value) -> Result<(), CoercionFailure> + Send + Sync>;
type Copier<T> = Box<dyn Fn(&T, &mut T) + Send + Sync>;

/// One named property of a model: its declared type, capabilities and the
/// type-erased accessor/mutator pair registered for it.
pub struct PropertyDescriptor<T> {
    model: &'static str,
    name: &'static str,
    column: Option<&'static str>,
    field_type: FieldType,
    identity: bool,
    reader: Option<Reader<T>>,
    writer: Option<Writer<T>>,
    copier: Option<Copier<T>>,
}

impl<T> PropertyDescriptor<T> {
    /// External (logical) name, used as the JSON key.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Alternate internal field name accepted on lookup.
    pub fn column(&self) -> Option<&'static str> {
        self.column
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn is_readable(&self) -> bool {
        self.reader.is_some()
    }

    pub fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    /// Reads the property as JSON. `None` when the property is write-only.
    pub fn read(&self, model: &T) -> Option<Value> {
        self.reader.as_ref().map(|read| read(model))
    }

    /// Coerces `raw` to the declared type and stores it.
    ///
    /// Returns `Ok(false)` without touching the model when the property is
    /// read-only. On a coercion failure the model is left unchanged.
    pub fn write(&self, model: &mut T, raw: &Value) -> MarshalResult<bool> {
        let Some(write) = &self.writer else {
            return Ok(false);
        };
        write(model, raw).map_err(|failure| MarshalError::Coercion {
            model: self.model.to_owned(),
            property: self.name.to_owned(),
            expected: failure.expected,
            value: failure.found,
        })?;
        Ok(true)
    }

    /// Copies the typed value from `source` to `target` without coercion.
    /// Returns `false` when the property is not both readable and writable.
    pub fn copy(&self, source: &T, target: &mut T) -> bool {
        match &self.copier {
            Some(copy) => {
                copy(source, target);
                true
            }
            None => false,
        }
    }

    fn schema(&self) -> PropertySchema {
        PropertySchema {
            name: self.name.to_owned(),
            column: self.column.map(str::to_owned),
            field_type: self.field_type.clone(),
            readable: self.is_readable(),
            writable: self.is_writable(),
            identity: self.identity,
        }
    }
}

impl<T> fmt::Debug for PropertyDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("model", &self.model)
            .field("name", &self.name)
            .field("column", &self.column)
            .field("field_type", &self.field_type)
            .field("identity", &self.identity)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}

fn lens<T: 'static, V: Coerce>(
    model: &'static str,
    name: &'static str,
    identity: bool,
    get: fn(&T) -> &V,
    get_mut: fn(&mut T) -> &mut V,
) -> PropertyDescriptor<T> {
    PropertyDescriptor {
        model,
        name,
        column: None,
        field_type: V::field_type(),
        identity,
        reader: Some(Box::new(move |m: &T| V::to_json(get(m)))),
        writer: Some(Box::new(move |m: &mut T, raw: &Value| {
            *get_mut(m) = V::coerce(raw)?;
            Ok(())
        })),
        copier: Some(Box::new(move |source: &T, target: &mut T| {
            *get_mut(target) = get(source).clone();
        })),
    }
}

/// Registration builder handed to [`Model::properties`].
///
/// Properties are kept in declaration order, which is also the output order
/// of `to_json`. Re-declaring a name keeps the first declaration.
pub struct Properties<T> {
    model: &'static str,
    entries: Vec<PropertyDescriptor<T>>,
    last: Option<usize>,
}

impl<T: Model> Properties<T> {
    pub(crate) fn new() -> Self {
        Self {
            model: T::model_name(),
            entries: Vec::new(),
            last: None,
        }
    }

    /// Declares the identity property.
    pub fn id<V: Coerce>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        let identity = !self.entries.iter().any(|p| p.identity);
        if !identity {
            warn!(
                model = self.model,
                property = name,
                "Second identity property declared; treating it as a plain field"
            );
        }
        let property = lens(self.model, name, identity, get, get_mut);
        self.push(property)
    }

    /// Declares a readable and writable stored property.
    pub fn field<V: Coerce>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> &mut Self {
        let property = lens(self.model, name, false, get, get_mut);
        self.push(property)
    }

    /// Declares a computed property with both a getter and a setter.
    pub fn accessor<V: Coerce>(
        &mut self,
        name: &'static str,
        getter: fn(&T) -> V,
        setter: fn(&mut T, V),
    ) -> &mut Self {
        let property = PropertyDescriptor {
            model: self.model,
            name,
            column: None,
            field_type: V::field_type(),
            identity: false,
            reader: Some(Box::new(move |m: &T| getter(m).to_json())),
            writer: Some(Box::new(move |m: &mut T, raw: &Value| {
                setter(m, V::coerce(raw)?);
                Ok(())
            })),
            copier: Some(Box::new(move |source: &T, target: &mut T| {
                setter(target, getter(source));
            })),
        };
        self.push(property)
    }

    /// Declares a property that is emitted but never assigned.
    pub fn read_only<V: Coerce>(&mut self, name: &'static str, getter: fn(&T) -> V) -> &mut Self {
        let property = PropertyDescriptor {
            model: self.model,
            name,
            column: None,
            field_type: V::field_type(),
            identity: false,
            reader: Some(Box::new(move |m: &T| getter(m).to_json())),
            writer: None,
            copier: None,
        };
        self.push(property)
    }

    /// Declares a property that is accepted on input but never emitted.
    pub fn write_only<V: Coerce>(
        &mut self,
        name: &'static str,
        setter: fn(&mut T, V),
    ) -> &mut Self {
        let property = PropertyDescriptor {
            model: self.model,
            name,
            column: None,
            field_type: V::field_type(),
            identity: false,
            reader: None,
            writer: Some(Box::new(move |m: &mut T, raw: &Value| {
                setter(m, V::coerce(raw)?);
                Ok(())
            })),
            copier: None,
        };
        self.push(property)
    }

    /// Sets the internal field name of the property declared just before.
    pub fn column(&mut self, column: &'static str) -> &mut Self {
        if let Some(property) = self.last.and_then(|index| self.entries.get_mut(index)) {
            property.column = Some(column);
        }
        self
    }

    fn push(&mut self, property: PropertyDescriptor<T>) -> &mut Self {
        if self.entries.iter().any(|p| p.name == property.name) {
            warn!(
                model = self.model,
                property = property.name,
                "Duplicate property declaration ignored"
            );
            self.last = None;
        } else {
            self.last = Some(self.entries.len());
            self.entries.push(property);
        }
        self
    }

    pub(crate) fn build(self) -> ModelDescriptor<T> {
        ModelDescriptor::new(self.model, self.entries)
    }
}

/// Lower-cases ASCII and drops `_` and `-`, so `createdAt`, `created_at`
/// and `CREATED-AT` resolve to the same property.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// The ordered, immutable property table of one model type.
pub struct ModelDescriptor<T> {
    model: &'static str,
    properties: Vec<PropertyDescriptor<T>>,
    by_name: HashMap<&'static str, usize>,
    by_column: HashMap<&'static str, usize>,
    by_normalized: HashMap<String, usize>,
    identity: Option<usize>,
}

impl<T> ModelDescriptor<T> {
    fn new(model: &'static str, properties: Vec<PropertyDescriptor<T>>) -> Self {
        let mut by_name = HashMap::with_capacity(properties.len());
        let mut by_column = HashMap::new();
        let mut by_normalized = HashMap::with_capacity(properties.len());
        for (index, property) in properties.iter().enumerate() {
            by_name.insert(property.name, index);
            by_normalized.entry(normalize(property.name)).or_insert(index);
            if let Some(column) = property.column {
                by_column.entry(column).or_insert(index);
                by_normalized.entry(normalize(column)).or_insert(index);
            }
        }
        let identity = properties.iter().position(|p| p.identity);

        Self {
            model,
            properties,
            by_name,
            by_column,
            by_normalized,
            identity,
        }
    }

    pub fn model_name(&self) -> &'static str {
        self.model
    }

    /// Properties in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor<T>] {
        &self.properties
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PropertyDescriptor<T>> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Resolves a name: external name first, then internal field name, then
    /// the case/format-normalized form of either.
    pub fn find(&self, name: &str) -> Option<&PropertyDescriptor<T>> {
        self.by_name
            .get(name)
            .or_else(|| self.by_column.get(name))
            .copied()
            .or_else(|| self.by_normalized.get(&normalize(name)).copied())
            .and_then(|index| self.properties.get(index))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    pub fn identity(&self) -> Option<&PropertyDescriptor<T>> {
        self.identity.and_then(|index| self.properties.get(index))
    }

    /// The identity property, or [`MarshalError::UnsupportedModel`].
    pub fn require_identity(&self) -> MarshalResult<&PropertyDescriptor<T>> {
        self.identity()
            .ok_or_else(|| MarshalError::UnsupportedModel {
                model: self.model.to_owned(),
                reason: "no identity property declared".to_owned(),
            })
    }

    /// Serializable summary of the property table.
    pub fn schema(&self) -> ModelSchema {
        ModelSchema {
            model: self.model.to_owned(),
            properties: self.properties.iter().map(PropertyDescriptor::schema).collect(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ModelDescriptor<T> {
    type Item = &'a PropertyDescriptor<T>;
    type IntoIter = std::slice::Iter<'a, PropertyDescriptor<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.iter()
    }
}

impl<T> fmt::Debug for ModelDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDescriptor")
            .field("model", &self.model)
            .field("properties", &self.properties)
            .finish()
    }
}
