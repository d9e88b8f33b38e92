//! Bound variables handed to the render engine

use serde::Serialize;
use serde_json::{Map, Value};

/// Read-only variable set for one artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GenerationContext {
    values: Map<String, Value>,
}

impl GenerationContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Bind every top-level field of a serializable struct
    ///
    /// Values that do not serialize to an object are ignored.
    pub fn extend_from<T: Serialize>(&mut self, source: &T) -> Result<(), serde_json::Error> {
        if let Value::Object(map) = serde_json::to_value(source)? {
            self.values.extend(map);
        }
        Ok(())
    }

    /// Remove a binding, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Look up a binding
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether `key` is bound
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Underlying map
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Bound keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
