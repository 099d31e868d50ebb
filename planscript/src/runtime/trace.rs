//! Execution trace: the append-only audit log of one execution.
//!
//! Serialized as `{"kind": "CALL", "info": {...}}`. The interpreter only
//! ever appends; nothing reads the trace back during execution.

use crate::ast::Condition;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "info", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceEntry {
    Let {
        name: String,
        value: Value,
    },
    Call {
        name: String,
        args: Map<String, Value>,
        capture: Option<String>,
        /// Null in dry-run mode.
        result: Value,
    },
    If {
        condition: Condition,
        outcome: bool,
    },
    ForIter {
        var: String,
        index: usize,
        value: Value,
    },
    Return {
        value: Value,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceKind {
    Let,
    Call,
    If,
    ForIter,
    Return,
}

impl TraceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceKind::Let => "LET",
            TraceKind::Call => "CALL",
            TraceKind::If => "IF",
            TraceKind::ForIter => "FOR_ITER",
            TraceKind::Return => "RETURN",
        }
    }
}

impl fmt::Display for TraceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TraceEntry {
    pub fn kind(&self) -> TraceKind {
        match self {
            TraceEntry::Let { .. } => TraceKind::Let,
            TraceEntry::Call { .. } => TraceKind::Call,
            TraceEntry::If { .. } => TraceKind::If,
            TraceEntry::ForIter { .. } => TraceKind::ForIter,
            TraceEntry::Return { .. } => TraceKind::Return,
        }
    }
}
