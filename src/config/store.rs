//! The configuration store overlays are merged into.

use super::Mapping;
use crate::error::StoreError;
use serde_json::Value;
use std::collections::BTreeMap;

/// Key-value store mapping a namespace to its configuration mapping.
///
/// The loader only ever calls `get` and `set`; it never removes entries.
pub trait ConfigStore {
    /// Current mapping for `namespace`, or `None` if nothing is stored.
    fn get(&self, namespace: &str) -> Option<Mapping>;

    /// Replace the mapping stored for `namespace`.
    fn set(&mut self, namespace: &str, value: Mapping) -> Result<(), StoreError>;
}

/// In-memory store, ordered by namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    entries: BTreeMap<String, Mapping>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing namespaces.
    pub fn from_mappings<I, K>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, Mapping)>,
        K: Into<String>,
    {
        Self {
            entries: mappings.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the mapping for a namespace.
    pub fn namespace(&self, namespace: &str) -> Option<&Mapping> {
        self.entries.get(namespace)
    }

    /// Resolve a dotted key path such as `database.connections.mysql.host`.
    ///
    /// Namespaces are tried longest first, so files named `app.mail.yaml`
    /// stay addressable; a miss inside one falls back to the next shorter
    /// namespace. A bare namespace returns the whole mapping.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        let segments: Vec<&str> = key.split('.').collect();
        (1..=segments.len()).rev().find_map(|split| {
            let mapping = self.entries.get(&segments[..split].join("."))?;
            descend(mapping, &segments[split..])
        })
    }

    /// The whole store as one JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), Value::Object(v.clone())))
                .collect(),
        )
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, namespace: &str) -> Option<Mapping> {
        self.entries.get(namespace).cloned()
    }

    fn set(&mut self, namespace: &str, value: Mapping) -> Result<(), StoreError> {
        self.entries.insert(namespace.to_string(), value);
        Ok(())
    }
}

fn descend(mapping: &Mapping, path: &[&str]) -> Option<Value> {
    let Some((first, rest)) = path.split_first() else {
        return Some(Value::Object(mapping.clone()));
    };
    let mut current = mapping.get(*first)?;
    for segment in rest {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current.clone())
}
