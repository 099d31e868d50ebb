//! Capabilities: the named external operations a plan can `CALL`.
//!
//! A capability receives one structured argument (the resolved argument map
//! as a JSON object) and produces one structured value, possibly
//! asynchronously. The interpreter imposes no schema beyond that shape.
//! Thread-safety of state shared between concurrent executions is the
//! capability author's responsibility.

mod registry;

pub use registry::CapabilityRegistry;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use thiserror::Error;

/// Failure reported by a capability implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
}

impl CapabilityError {
    pub fn failed(message: impl Into<String>) -> Self {
        CapabilityError::Failed(message.into())
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        CapabilityError::InvalidArguments(message.into())
    }
}

pub type CapabilityResult = Result<Value, CapabilityError>;

#[async_trait]
pub trait Capability: Send + Sync {
    async fn invoke(&self, args: Value) -> CapabilityResult;
}

/// Wraps a synchronous closure.
pub struct FnCapability<F> {
    func: F,
}

impl<F> FnCapability<F>
where
    F: Fn(Value) -> CapabilityResult + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Capability for FnCapability<F>
where
    F: Fn(Value) -> CapabilityResult + Send + Sync,
{
    async fn invoke(&self, args: Value) -> CapabilityResult {
        (self.func)(args)
    }
}

impl<F> fmt::Debug for FnCapability<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCapability")
    }
}

/// Wraps a closure returning a future.
pub struct AsyncFnCapability<F, Fut> {
    func: F,
    _future: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnCapability<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = CapabilityResult> + Send,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            _future: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> Capability for AsyncFnCapability<F, Fut>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = CapabilityResult> + Send,
{
    async fn invoke(&self, args: Value) -> CapabilityResult {
        (self.func)(args).await
    }
}

impl<F, Fut> fmt::Debug for AsyncFnCapability<F, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AsyncFnCapability")
    }
}

/// Returns the same canned value for every invocation, ignoring arguments.
#[derive(Debug, Clone)]
pub struct FixtureCapability {
    result: Value,
}

impl FixtureCapability {
    pub fn new(result: Value) -> Self {
        Self { result }
    }
}

#[async_trait]
impl Capability for FixtureCapability {
    async fn invoke(&self, _args: Value) -> CapabilityResult {
        Ok(self.result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_capability() {
        let add = FnCapability::new(|args: Value| {
            let lhs = args["lhs"].as_i64().unwrap_or(0);
            let rhs = args["rhs"].as_i64().unwrap_or(0);
            Ok(json!(lhs + rhs))
        });
        assert_eq!(add.invoke(json!({"lhs": 2, "rhs": 3})).await, Ok(json!(5)));
    }

    #[tokio::test]
    async fn test_async_fn_capability() {
        let echo = AsyncFnCapability::new(|args: Value| async move {
            tokio::task::yield_now().await;
            Ok(args)
        });
        assert_eq!(echo.invoke(json!({"a": 1})).await, Ok(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_fixture_capability_ignores_args() {
        let fixture = FixtureCapability::new(json!("pending"));
        assert_eq!(fixture.invoke(json!({"id": 1})).await, Ok(json!("pending")));
        assert_eq!(fixture.invoke(Value::Null).await, Ok(json!("pending")));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CapabilityError::failed("boom").to_string(), "boom");
        assert_eq!(
            CapabilityError::invalid_arguments("missing id").to_string(),
            "invalid arguments: missing id"
        );
    }
}
