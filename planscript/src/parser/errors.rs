use crate::lexer::{LexError, Token, TokenKind};
use thiserror::Error;

/// Errors raised while turning source text into a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("lexical error: {0}")]
    Lex(#[from] LexError),

    #[error("unexpected token {kind} '{found}' at line {line}, col {col}; expected {expected}")]
    UnexpectedToken {
        found: String,
        kind: TokenKind,
        expected: String,
        line: usize,
        col: usize,
    },

    #[error("nesting deeper than {limit} levels at line {line}, col {col}")]
    NestingTooDeep { limit: usize, line: usize, col: usize },

    #[error("numeric literal '{text}' out of range at line {line}, col {col}")]
    NumberOutOfRange { text: String, line: usize, col: usize },
}

impl ParseError {
    pub fn unexpected(token: &Token, expected: impl Into<String>) -> Self {
        ParseError::UnexpectedToken {
            found: token.text.clone(),
            kind: token.kind,
            expected: expected.into(),
            line: token.line,
            col: token.col,
        }
    }

    pub fn nesting_too_deep(token: &Token, limit: usize) -> Self {
        ParseError::NestingTooDeep {
            limit,
            line: token.line,
            col: token.col,
        }
    }

    pub fn number_out_of_range(token: &Token) -> Self {
        ParseError::NumberOutOfRange {
            text: token.text.clone(),
            line: token.line,
            col: token.col,
        }
    }

    /// Source position of the offending token or character.
    pub fn position(&self) -> (usize, usize) {
        match self {
            ParseError::Lex(LexError::UnexpectedCharacter { line, col, .. })
            | ParseError::Lex(LexError::UnterminatedString { line, col })
            | ParseError::UnexpectedToken { line, col, .. }
            | ParseError::NestingTooDeep { line, col, .. }
            | ParseError::NumberOutOfRange { line, col, .. } => (*line, *col),
        }
    }
}
