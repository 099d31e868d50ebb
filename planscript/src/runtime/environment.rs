// Variable bindings for a single execution

use serde_json::{Map, Value};

/// The flat variable environment of one execution.
///
/// There is no scope chain: `LET` inside an `IF` or `FOR` body binds into the
/// same mapping as top-level statements. Only loop variables are scoped, and
/// the interpreter handles that by saving and restoring the prior binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    bindings: Map<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Defines a new variable or overwrites an existing one.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.bindings.remove(name)
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.bindings
    }
}
