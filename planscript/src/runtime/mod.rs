//! Plan execution: environment, budget, trace and the interpreter itself.

pub mod budget;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod resolve;
pub mod trace;

pub use budget::StepBudget;
pub use environment::Environment;
pub use error::{ExecutionError, RuntimeResult};
pub use interpreter::{ExecutionResult, Interpreter};
pub use trace::{TraceEntry, TraceKind};
