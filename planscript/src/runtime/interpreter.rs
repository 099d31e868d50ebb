//! Tree-walking interpreter.
//!
//! One [`Interpreter`] owns the environment, trace and budget of a single
//! execution. Blocks evaluate to a [`Flow`]: either fall through to the next
//! sibling or carry a `RETURN` value outward. Faults travel the same path as
//! `Err` and are converted into an [`ExecutionResult`] once, at the top.

use super::budget::StepBudget;
use super::environment::Environment;
use super::error::{ExecutionError, RuntimeResult};
use super::resolve::{evaluate_condition, resolve_map, resolve_value};
use super::trace::{TraceEntry, TraceKind};
use crate::ast::{Condition, PlanNode, Statement, ToolInvocation, ValueExpr};
use crate::capabilities::CapabilityRegistry;
use crate::config::ExecutionOptions;
use crate::values::type_name;
use async_recursion::async_recursion;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

/// Outcome of one execution. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub ok: bool,
    /// Value of the `RETURN` that ended the plan, if one ran.
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub return_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Environment as it stood when execution stopped.
    pub vars: Map<String, Value>,
    pub trace: Vec<TraceEntry>,
    /// Statements plus loop iterations consumed.
    pub steps: u32,
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn count(&self, kind: TraceKind) -> usize {
        self.trace.iter().filter(|entry| entry.kind() == kind).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Flow {
    Continue,
    Return(Value),
}

pub struct Interpreter {
    capabilities: CapabilityRegistry,
    options: ExecutionOptions,
    env: Environment,
    trace: Vec<TraceEntry>,
    budget: StepBudget,
}

impl Interpreter {
    pub fn new(capabilities: CapabilityRegistry, options: ExecutionOptions) -> Self {
        let budget = StepBudget::new(&options);
        Self {
            capabilities,
            options,
            env: Environment::new(),
            trace: Vec::new(),
            budget,
        }
    }

    /// Run `plan` against `capabilities` in a fresh environment.
    pub async fn execute(
        plan: &PlanNode,
        capabilities: &CapabilityRegistry,
        options: ExecutionOptions,
    ) -> ExecutionResult {
        Interpreter::new(capabilities.clone(), options).run(plan).await
    }

    pub async fn run(mut self, plan: &PlanNode) -> ExecutionResult {
        info!(
            "Executing plan: {} statements, max_steps={}, dry_run={}",
            plan.statements.len(),
            self.options.max_steps,
            self.options.dry_run
        );

        let outcome = self.exec_block(&plan.statements).await;
        let steps = self.budget.consumed();
        let elapsed = self.budget.elapsed();

        match outcome {
            Ok(flow) => {
                let return_value = match flow {
                    Flow::Return(value) => Some(value),
                    Flow::Continue => None,
                };
                info!("Plan finished in {} steps ({:?})", steps, elapsed);
                ExecutionResult {
                    ok: true,
                    return_value,
                    error: None,
                    vars: self.env.into_map(),
                    trace: self.trace,
                    steps,
                }
            }
            Err(err) => {
                warn!("Plan aborted after {} steps: {}", steps, err);
                ExecutionResult {
                    ok: false,
                    return_value: None,
                    error: Some(err.to_string()),
                    vars: self.env.into_map(),
                    trace: self.trace,
                    steps,
                }
            }
        }
    }

    #[async_recursion]
    async fn exec_block(&mut self, statements: &[Statement]) -> RuntimeResult<Flow> {
        for statement in statements {
            self.budget.checkpoint()?;
            if let Flow::Return(value) = self.exec_statement(statement).await? {
                return Ok(Flow::Return(value));
            }
            self.budget.check_deadline()?;
        }
        Ok(Flow::Continue)
    }

    async fn exec_statement(&mut self, statement: &Statement) -> RuntimeResult<Flow> {
        match statement {
            Statement::Let { name, value } => {
                self.exec_let(name, value);
                Ok(Flow::Continue)
            }
            Statement::Call(call) => {
                self.exec_call(call).await?;
                Ok(Flow::Continue)
            }
            Statement::If {
                condition,
                then_block,
                else_block,
            } => self.exec_if(condition, then_block, else_block.as_ref()).await,
            Statement::For {
                var,
                iterable,
                body,
            } => self.exec_for(var, iterable, body).await,
            Statement::Return { value } => {
                let value = resolve_value(value, &self.env);
                debug!("RETURN {}", value);
                self.trace.push(TraceEntry::Return {
                    value: value.clone(),
                });
                Ok(Flow::Return(value))
            }
            Statement::Empty => Ok(Flow::Continue),
        }
    }

    fn exec_let(&mut self, name: &str, expr: &ValueExpr) {
        let value = resolve_value(expr, &self.env);
        debug!("LET {} = {}", name, value);
        self.env.define(name, value.clone());
        self.trace.push(TraceEntry::Let {
            name: name.to_string(),
            value,
        });
    }

    async fn exec_call(&mut self, call: &ToolInvocation) -> RuntimeResult<()> {
        let args = resolve_map(&call.args, &self.env);
        let capability = self
            .capabilities
            .get(&call.name)
            .ok_or_else(|| ExecutionError::UnknownCapability(call.name.clone()))?;

        let result = if self.options.dry_run {
            debug!("CALL {} (dry run)", call.name);
            Value::Null
        } else {
            debug!("CALL {} at {}", call.name, call.location);
            capability
                .invoke(Value::Object(args.clone()))
                .await
                .map_err(|source| ExecutionError::Capability {
                    name: call.name.clone(),
                    source,
                })?
        };

        if let Some(capture) = &call.capture {
            self.env.define(capture.as_str(), result.clone());
        }
        self.trace.push(TraceEntry::Call {
            name: call.name.clone(),
            args,
            capture: call.capture.clone(),
            result,
        });
        Ok(())
    }

    async fn exec_if(
        &mut self,
        condition: &Condition,
        then_block: &PlanNode,
        else_block: Option<&PlanNode>,
    ) -> RuntimeResult<Flow> {
        let outcome = evaluate_condition(condition, &self.env);
        debug!("IF -> {}", outcome);
        self.trace.push(TraceEntry::If {
            condition: condition.clone(),
            outcome,
        });

        let branch = if outcome { Some(then_block) } else { else_block };
        match branch {
            Some(block) => self.exec_block(&block.statements).await,
            None => Ok(Flow::Continue),
        }
    }

    /// The loop variable lives in the shared environment while the loop runs
    /// and gets its prior binding (or absence) back on every exit path.
    async fn exec_for(
        &mut self,
        var: &str,
        iterable: &ValueExpr,
        body: &PlanNode,
    ) -> RuntimeResult<Flow> {
        let items = match resolve_value(iterable, &self.env) {
            Value::Array(items) => items,
            other => {
                return Err(ExecutionError::TypeMismatch(format!(
                    "FOR {} expects an array, got {}",
                    var,
                    type_name(&other)
                )))
            }
        };

        let saved = self.env.get(var).cloned();
        let outcome = self.iterate(var, items, body).await;
        match saved {
            Some(previous) => self.env.define(var, previous),
            None => {
                self.env.remove(var);
            }
        }
        outcome
    }

    async fn iterate(&mut self, var: &str, items: Vec<Value>, body: &PlanNode) -> RuntimeResult<Flow> {
        for (index, item) in items.into_iter().enumerate() {
            self.budget.checkpoint()?;
            debug!("FOR {}[{}] = {}", var, index, item);
            self.env.define(var, item.clone());
            self.trace.push(TraceEntry::ForIter {
                var: var.to_string(),
                index,
                value: item,
            });
            if let Flow::Return(value) = self.exec_block(&body.statements).await? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::CapabilityError;
    use crate::parser::parse_plan;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn run(source: &str, registry: &CapabilityRegistry) -> ExecutionResult {
        let plan = parse_plan(source).unwrap();
        Interpreter::execute(&plan, registry, ExecutionOptions::default()).await
    }

    #[tokio::test]
    async fn test_let_and_return_literal() {
        let result = run("LET x = (a=1 b=[true null])\nRETURN $x", &CapabilityRegistry::new()).await;
        assert!(result.ok);
        assert_eq!(result.return_value, Some(json!({"a": 1, "b": [true, null]})));
        assert_eq!(result.count(TraceKind::Let), 1);
        assert_eq!(result.count(TraceKind::Return), 1);
    }

    #[tokio::test]
    async fn test_no_return_leaves_value_absent() {
        let result = run("LET x = 1", &CapabilityRegistry::new()).await;
        assert!(result.ok);
        assert_eq!(result.return_value, None);
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("return").is_none());
        assert!(json.get("error").is_none());
    }

    #[tokio::test]
    async fn test_flat_scope_inside_blocks() {
        let source = "IF 1 == 1: {\n  LET inner = yes\n}\nRETURN $inner";
        let result = run(source, &CapabilityRegistry::new()).await;
        assert_eq!(result.return_value, Some(json!("yes")));
        assert_eq!(result.vars["inner"], json!("yes"));
    }

    #[tokio::test]
    async fn test_else_branch() {
        let source = "LET n = 5\nIF $n < 3: {\n  RETURN small\n} ELSE: {\n  RETURN large\n}";
        let result = run(source, &CapabilityRegistry::new()).await;
        assert_eq!(result.return_value, Some(json!("large")));
        match &result.trace[1] {
            TraceEntry::If { outcome, .. } => assert!(!outcome),
            other => panic!("expected IF entry, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_for_over_non_array_is_type_mismatch() {
        let result = run("LET x = 3\nFOR i IN $x: { LET y = $i }", &CapabilityRegistry::new()).await;
        assert!(!result.ok);
        assert_eq!(
            result.error.as_deref(),
            Some("type mismatch: FOR i expects an array, got number")
        );
        assert_eq!(result.vars["x"], json!(3));
    }

    #[tokio::test]
    async fn test_loop_variable_restored_after_error() {
        let mut registry = CapabilityRegistry::new();
        registry.register_fn("fail", |_| Err(CapabilityError::failed("boom")));
        let source = "LET i = outer\nFOR i IN [1 2]: {\n  CALL fail\n}";
        let result = run(source, &registry).await;
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("tool 'fail' failed: boom"));
        assert_eq!(result.vars["i"], json!("outer"));
    }

    #[tokio::test]
    async fn test_capture_binds_tool_result() {
        let mut registry = CapabilityRegistry::new();
        registry.register_fn("echo", |args| Ok(args));
        let result = run("LET n = 2\nCALL echo value=$n label=two -> out", &registry).await;
        assert!(result.ok);
        assert_eq!(result.vars["out"], json!({"value": 2, "label": "two"}));
    }

    #[tokio::test]
    async fn test_empty_lines_count_as_steps() {
        let result = run("\n\nLET a = 1\n", &CapabilityRegistry::new()).await;
        assert!(result.ok);
        assert_eq!(result.steps, 3);
        assert_eq!(result.trace.len(), 1);
    }
}
