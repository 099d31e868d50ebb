// Plan tree produced by the parser and walked by the interpreter

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Number;
use std::fmt;

/// Source position of a construct (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub col: usize,
}

impl SourceLocation {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// One step of a variable path: `[0]` or `["key"]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IndexStep {
    Position(i64),
    Key(String),
}

/// `$name[...]...`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarRef {
    pub name: String,
    pub path: Vec<IndexStep>,
}

impl VarRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Vec::new(),
        }
    }
}

/// A value expression. Everything here is pure: resolving one never has side effects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ValueExpr {
    Number(Number),
    Bool(bool),
    Null,
    String(String),
    /// Unquoted word; resolved against the environment at evaluation time.
    Bare(String),
    Array(Vec<ValueExpr>),
    /// Duplicate keys: the last one written wins.
    Map(IndexMap<String, ValueExpr>),
    Var(VarRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CmpOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl CmpOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "==" => Some(CmpOp::Eq),
            "!=" => Some(CmpOp::Ne),
            "<" => Some(CmpOp::Lt),
            "<=" => Some(CmpOp::Le),
            ">" => Some(CmpOp::Gt),
            ">=" => Some(CmpOp::Ge),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Boolean condition of an `IF`. Precedence: OR < AND < NOT < comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    Not {
        inner: Box<Condition>,
    },
    And {
        left: Box<Condition>,
        right: Box<Condition>,
    },
    Or {
        left: Box<Condition>,
        right: Box<Condition>,
    },
    Cmp {
        op: CmpOp,
        left: ValueExpr,
        right: ValueExpr,
    },
}

/// `CALL name key=value ... -> capture`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolInvocation {
    pub name: String,
    pub args: IndexMap<String, ValueExpr>,
    pub capture: Option<String>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    Let {
        name: String,
        value: ValueExpr,
    },
    Call(ToolInvocation),
    If {
        condition: Condition,
        then_block: PlanNode,
        else_block: Option<PlanNode>,
    },
    For {
        var: String,
        iterable: ValueExpr,
        body: PlanNode,
    },
    Return {
        value: ValueExpr,
    },
    /// Blank line.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanNodeKind {
    /// Top level of a plan.
    Script,
    /// `{ ... }` nested under an `IF`, `ELSE` or `FOR`.
    Block,
}

/// An ordered statement sequence. Scripts and blocks execute identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanNode {
    pub kind: PlanNodeKind,
    pub statements: Vec<Statement>,
}

impl PlanNode {
    pub fn script(statements: Vec<Statement>) -> Self {
        Self {
            kind: PlanNodeKind::Script,
            statements,
        }
    }

    pub fn block(statements: Vec<Statement>) -> Self {
        Self {
            kind: PlanNodeKind::Block,
            statements,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
