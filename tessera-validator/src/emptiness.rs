//! Blank/empty checks across strings, collections and JSON values.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

/// Values that can be "empty" in the request-validation sense.
///
/// Strings are empty when they hold only whitespace; collections when they
/// hold no elements; `None` is always empty.
pub trait Emptiness {
    fn is_blank(&self) -> bool;
}

impl Emptiness for str {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Emptiness for String {
    fn is_blank(&self) -> bool {
        self.as_str().is_blank()
    }
}

impl<T> Emptiness for [T] {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T, const N: usize> Emptiness for [T; N] {
    fn is_blank(&self) -> bool {
        N == 0
    }
}

impl<T> Emptiness for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiness for VecDeque<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T, S> Emptiness for HashSet<T, S> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiness for BTreeSet<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Emptiness for HashMap<K, V, S> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Emptiness for BTreeMap<K, V> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for Value {
    fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_blank(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }
}

impl<T: Emptiness> Emptiness for Option<T> {
    fn is_blank(&self) -> bool {
        self.as_ref().is_none_or(Emptiness::is_blank)
    }
}

impl<T: Emptiness + ?Sized> Emptiness for &T {
    fn is_blank(&self) -> bool {
        (**self).is_blank()
    }
}

impl<T: Emptiness + ?Sized> Emptiness for Box<T> {
    fn is_blank(&self) -> bool {
        (**self).is_blank()
    }
}

/// Whether an arbitrary iterable yields nothing. Consumes at most one item.
pub fn is_empty_iter<I: IntoIterator>(iter: I) -> bool {
    iter.into_iter().next().is_none()
}
