//! Plan script: a small language for describing auditable, budgeted
//! sequences of capability calls.
//!
//! ```text
//! CALL fetch_order id=42 -> status
//! IF $status == "pending": {
//!   CALL update_order id=42 amount=33 -> updated
//!   RETURN $updated
//! }
//! RETURN $status
//! ```
//!
//! Source text goes through [`lexer`] and [`parser`] into a [`PlanNode`]
//! plus an [`Analysis`] of the capabilities it needs. The [`runtime`]
//! interpreter then walks the plan against a [`CapabilityRegistry`],
//! enforcing the step and deadline limits from [`ExecutionOptions`].

pub mod ast;
pub mod capabilities;
pub mod config;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod values;

pub use ast::PlanNode;
pub use capabilities::{
    AsyncFnCapability, Capability, CapabilityError, CapabilityRegistry, CapabilityResult,
    FixtureCapability, FnCapability,
};
pub use config::{ConfigError, ExecutionOptions};
pub use parser::{Analysis, ParseError};
pub use runtime::{ExecutionError, ExecutionResult, Interpreter, TraceEntry, TraceKind};

use thiserror::Error;

/// Errors that stop a plan before it starts executing.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Lex, parse and analyze `source`.
pub fn analyze(source: &str) -> Result<Analysis, ParseError> {
    parser::parse(source)
}

/// Parse `source` once for deferred, repeatable execution.
pub fn prepare(source: &str) -> Result<PreparedPlan, ParseError> {
    Ok(PreparedPlan {
        analysis: analyze(source)?,
    })
}

/// Parse and run `source` in one go.
///
/// Syntax errors and invalid options come back as `Err` before any
/// capability is invoked; everything that goes wrong during execution is
/// reported inside the returned [`ExecutionResult`].
pub async fn execute(
    source: &str,
    capabilities: &CapabilityRegistry,
    options: ExecutionOptions,
) -> Result<ExecutionResult, PlanError> {
    options.validate()?;
    let prepared = prepare(source)?;
    Ok(prepared.run(capabilities, options).await)
}

#[derive(Debug, Clone)]
pub struct PreparedPlan {
    analysis: Analysis,
}

impl PreparedPlan {
    pub fn required_capabilities(&self) -> &[String] {
        &self.analysis.required_capabilities
    }

    /// Required capabilities that `capabilities` does not provide.
    pub fn missing_capabilities(&self, capabilities: &CapabilityRegistry) -> Vec<String> {
        capabilities.missing(&self.analysis.required_capabilities)
    }

    pub async fn run(
        &self,
        capabilities: &CapabilityRegistry,
        options: ExecutionOptions,
    ) -> ExecutionResult {
        Interpreter::execute(&self.analysis.plan, capabilities, options).await
    }
}
