//! Conversions between models and JSON objects, JSON arrays and flat
//! string maps.
//!
//! Input is tolerant: keys that match no property are skipped, and `get`/
//! `set` on unknown names are no-ops. Whole-entity conversions are
//! all-or-nothing: the first value that fails to coerce aborts the
//! conversion, and the `Option` variants report that as `None` rather than
//! returning a half-populated model.

use crate::error::{MarshalError, MarshalResult};
use crate::registry::describe;
use crate::Model;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Reads a property by external name, internal field name or normalized
/// name. `None` when no readable property matches.
pub fn get<T: Model>(model: &T, name: &str) -> Option<Value> {
    describe::<T>().find(name)?.read(model)
}

/// Coerces `value` and assigns it to the named property.
///
/// Unknown and read-only names are silently ignored. A coercion failure is
/// returned and leaves the model unchanged.
pub fn set<T: Model>(model: &mut T, name: &str, value: &Value) -> MarshalResult<()> {
    let descriptor = describe::<T>();
    if let Some(property) = descriptor.find(name) {
        property.write(model, value)?;
    }
    Ok(())
}

/// Renders every readable property, in declaration order, skipping names in
/// `ignores`. Nested models and lists are rendered recursively; `ignores`
/// applies to the top level only.
pub fn to_json<T: Model>(model: &T, ignores: Option<&HashSet<String>>) -> Map<String, Value> {
    let descriptor = describe::<T>();
    let mut json = Map::with_capacity(descriptor.len());
    for property in descriptor.iter() {
        if ignores.is_some_and(|set| is_ignored(set, property.name(), property.column())) {
            continue;
        }
        if let Some(value) = property.read(model) {
            json.insert(property.name().to_owned(), value);
        }
    }
    json
}

fn is_ignored(ignores: &HashSet<String>, name: &str, column: Option<&str>) -> bool {
    ignores.contains(name) || column.is_some_and(|column| ignores.contains(column))
}

/// Renders each model with [`to_json`], preserving order.
pub fn to_json_list<T: Model>(models: &[T], ignores: Option<&HashSet<String>>) -> Vec<Value> {
    models
        .iter()
        .map(|model| Value::Object(to_json(model, ignores)))
        .collect()
}

/// Builds a model from a JSON object, reporting the first failure.
pub fn try_from_json<T: Model>(json: &Map<String, Value>) -> MarshalResult<T> {
    let descriptor = describe::<T>();
    let mut model = T::default();
    for (key, value) in json {
        if let Some(property) = descriptor.find(key) {
            property.write(&mut model, value)?;
        }
    }
    Ok(model)
}

/// Builds a model from a JSON object. `None` when any value fails to coerce.
pub fn from_json<T: Model>(json: &Map<String, Value>) -> Option<T> {
    try_from_json(json)
        .inspect_err(|err| debug!(model = T::model_name(), error = %err, "JSON conversion failed"))
        .ok()
}

/// Builds one model per array element, reporting the first failure.
/// Elements that are not objects fail the batch.
pub fn try_from_json_array<T: Model>(array: &[Value]) -> MarshalResult<Vec<T>> {
    array
        .iter()
        .map(|element| match element {
            Value::Object(json) => try_from_json(json),
            other => Err(MarshalError::NotAnObject {
                model: T::model_name().to_owned(),
                found: json_kind(other).to_owned(),
            }),
        })
        .collect()
}

/// Builds one model per array element; `None` unless every element converts.
pub fn from_json_array<T: Model>(array: &[Value]) -> Option<Vec<T>> {
    try_from_json_array(array)
        .inspect_err(|err| {
            debug!(
                model = T::model_name(),
                elements = array.len(),
                error = %err,
                "JSON array conversion failed"
            )
        })
        .ok()
}

/// Parses JSON text holding one object and builds a model from it.
pub fn from_json_str<T: Model>(text: &str) -> MarshalResult<T> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(json) => try_from_json(&json),
        other => Err(MarshalError::NotAnObject {
            model: T::model_name().to_owned(),
            found: json_kind(&other).to_owned(),
        }),
    }
}

/// Builds a model from form-style string pairs, reporting the first failure.
/// Every value goes through string coercion, whatever the declared type.
pub fn try_from_map<T: Model>(map: &HashMap<String, String>) -> MarshalResult<T> {
    let descriptor = describe::<T>();
    let mut model = T::default();
    for (key, value) in map {
        if let Some(property) = descriptor.find(key) {
            property.write(&mut model, &Value::String(value.clone()))?;
        }
    }
    Ok(model)
}

/// Builds a model from form-style string pairs. `None` when any value fails
/// to coerce.
pub fn from_map<T: Model>(map: &HashMap<String, String>) -> Option<T> {
    try_from_map(map)
        .inspect_err(|err| debug!(model = T::model_name(), error = %err, "Map conversion failed"))
        .ok()
}

/// The entries of `map` that match no property of `T`, as JSON strings,
/// ordered by key.
pub fn get_extend<T: Model>(map: &HashMap<String, String>) -> Map<String, Value> {
    let descriptor = describe::<T>();
    let mut extra: Vec<(&String, &String)> = map
        .iter()
        .filter(|(key, _)| !descriptor.contains(key))
        .collect();
    extra.sort_unstable_by(|a, b| a.0.cmp(b.0));
    extra
        .into_iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect()
}

/// Copies every readable-and-writable property from `source` to `target`.
///
/// The identity property is copied only when `contain_id` is set; skipping
/// it requires the model to declare one, otherwise this fails with
/// [`MarshalError::UnsupportedModel`] before `target` is touched.
pub fn copy<T: Model>(source: &T, target: &mut T, contain_id: bool) -> MarshalResult<()> {
    let descriptor = describe::<T>();
    if !contain_id {
        descriptor.require_identity()?;
    }
    for property in descriptor.iter() {
        if property.is_identity() && !contain_id {
            continue;
        }
        property.copy(source, target);
    }
    Ok(())
}

/// Compact JSON text of [`to_json`], for logs and debugging.
pub fn to_string<T: Model>(model: &T) -> String {
    Value::Object(to_json(model, None)).to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
