//! Process-wide cache of model descriptors.
//!
//! Each model type is described once, on first use, and the published
//! [`ModelDescriptor`] is shared read-only for the life of the process.
//! Entries are never replaced or removed.

use crate::descriptor::{ModelDescriptor, Properties};
use crate::Model;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

type Entry = Arc<dyn Any + Send + Sync>;

/// Descriptor cache keyed by the concrete model type.
#[derive(Default)]
pub struct Registry {
    entries: RwLock<HashMap<TypeId, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by every marshaling call in the process.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    /// Returns the descriptor of `T`, building and publishing it on first use.
    ///
    /// Concurrent first calls may each build a descriptor, but only the first
    /// one published is kept and every caller receives that same instance.
    pub fn describe<T: Model>(&self) -> Arc<ModelDescriptor<T>> {
        let type_id = TypeId::of::<T>();
        if let Some(descriptor) = self.lookup::<T>(type_id) {
            return descriptor;
        }

        let mut props = Properties::<T>::new();
        T::properties(&mut props);
        let built = Arc::new(props.build());

        let published = {
            let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
            let entry = entries.entry(type_id).or_insert_with(|| {
                debug!(
                    model = built.model_name(),
                    properties = built.len(),
                    "Model described"
                );
                let entry: Entry = built.clone();
                entry
            });
            Arc::clone(entry)
        };
        published.downcast::<ModelDescriptor<T>>().unwrap_or(built)
    }

    fn lookup<T: Model>(&self, type_id: TypeId) -> Option<Arc<ModelDescriptor<T>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&type_id)
            .and_then(|entry| Arc::clone(entry).downcast().ok())
    }

    /// Whether `T` has been described by this registry.
    pub fn contains<T: Model>(&self) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&TypeId::of::<T>())
    }

    /// Number of described model types.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Descriptor of `T` from the [global](Registry::global) registry.
pub fn describe<T: Model>() -> Arc<ModelDescriptor<T>> {
    Registry::global().describe::<T>()
}
