use crate::capabilities::CapabilityError;
use thiserror::Error;

/// Faults that end an execution. Each one is terminal and reported once
/// through `ExecutionResult::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("unknown tool '{0}'")]
    UnknownCapability(String),

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("step limit exceeded: more than {limit} steps")]
    StepLimitExceeded { limit: u32 },

    #[error("deadline exceeded: execution ran longer than {deadline_ms} ms")]
    DeadlineExceeded { deadline_ms: u64 },

    #[error("tool '{name}' failed: {source}")]
    Capability {
        name: String,
        #[source]
        source: CapabilityError,
    },
}

pub type RuntimeResult<T> = Result<T, ExecutionError>;
