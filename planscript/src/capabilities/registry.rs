// Name -> capability mapping supplied by the caller of an execution

use super::{AsyncFnCapability, Capability, CapabilityResult, FixtureCapability, FnCapability};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Capabilities available to an execution, keyed by tool name.
///
/// Cloning is cheap (entries are `Arc`s), so one registry can back any
/// number of concurrent executions.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: HashMap<String, Arc<dyn Capability>>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, capability: impl Capability + 'static) {
        self.capabilities
            .insert(name.into(), Arc::new(capability));
    }

    pub fn register_fn<F>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(Value) -> CapabilityResult + Send + Sync + 'static,
    {
        self.register(name, FnCapability::new(func));
    }

    pub fn register_async<F, Fut>(&mut self, name: impl Into<String>, func: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CapabilityResult> + Send + 'static,
    {
        self.register(name, AsyncFnCapability::new(func));
    }

    /// One fixture capability per entry: each tool returns its canned value.
    pub fn from_fixtures(fixtures: Map<String, Value>) -> Self {
        let mut registry = Self::new();
        for (name, result) in fixtures {
            registry.register(name, FixtureCapability::new(result));
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.capabilities.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.capabilities.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// The subset of `required` that is not registered, in the given order.
    pub fn missing(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.contains(name))
            .cloned()
            .collect()
    }
}

impl fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_and_invoke() {
        let mut registry = CapabilityRegistry::new();
        registry.register_fn("double", |args| Ok(json!(args["n"].as_i64().unwrap_or(0) * 2)));
        registry.register_async("later", |_args| async { Ok(json!("done")) });

        assert_eq!(registry.len(), 2);
        let double = registry.get("double").unwrap();
        assert_eq!(double.invoke(json!({"n": 21})).await, Ok(json!(42)));
        let later = registry.get("later").unwrap();
        assert_eq!(later.invoke(Value::Null).await, Ok(json!("done")));
        assert!(registry.get("absent").is_none());
    }

    #[test]
    fn test_from_fixtures_and_missing() {
        let fixtures = json!({"fetch_order": "pending", "update_order": {"ok": true}});
        let Value::Object(map) = fixtures else {
            unreachable!()
        };
        let registry = CapabilityRegistry::from_fixtures(map);
        assert_eq!(registry.names(), vec!["fetch_order", "update_order"]);

        let required = vec![
            "fetch_order".to_string(),
            "send_email".to_string(),
            "update_order".to_string(),
        ];
        assert_eq!(registry.missing(&required), vec!["send_email".to_string()]);
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = CapabilityRegistry::new();
        registry.register("a", FixtureCapability::new(json!(1)));
        registry.register("a", FixtureCapability::new(json!(2)));
        assert_eq!(registry.len(), 1);
    }
}
