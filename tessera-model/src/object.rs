use crate::error::MarshalResult;
use crate::{marshal, Model};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashSet;

/// Object-safe view of a [`Model`].
///
/// Lets heterogeneous models travel as `&dyn ModelObject` while every call
/// still resolves against the descriptor of the concrete type.
pub trait ModelObject: Any + Send + Sync {
    fn model_type(&self) -> &'static str;

    fn get_property(&self, name: &str) -> Option<Value>;

    fn set_property(&mut self, name: &str, value: &Value) -> MarshalResult<()>;

    fn to_json_map(&self, ignores: Option<&HashSet<String>>) -> Map<String, Value>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Model> ModelObject for T {
    fn model_type(&self) -> &'static str {
        T::model_name()
    }

    fn get_property(&self, name: &str) -> Option<Value> {
        marshal::get(self, name)
    }

    fn set_property(&mut self, name: &str, value: &Value) -> MarshalResult<()> {
        marshal::set(self, name, value)
    }

    fn to_json_map(&self, ignores: Option<&HashSet<String>>) -> Map<String, Value> {
        marshal::to_json(self, ignores)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn ModelObject {
    /// Renders a mixed collection of models, preserving order.
    pub fn to_json_all(
        models: &[&dyn ModelObject],
        ignores: Option<&HashSet<String>>,
    ) -> Vec<Value> {
        models
            .iter()
            .map(|model| Value::Object(model.to_json_map(ignores)))
            .collect()
    }

    pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }
}
