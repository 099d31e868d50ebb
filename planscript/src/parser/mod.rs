//! Recursive-descent parser for plan scripts.
//!
//! One token of lookahead drives every decision except two spots that peek a
//! little further: an `ELSE` on the line after a closing brace, and telling a
//! parenthesised condition apart from a `( key=value )` map literal.

use crate::ast::PlanNode;
use crate::lexer::{tokenize, Token, TokenKind};

// Declare submodules
pub mod analysis;
pub mod errors;
pub mod expressions;
pub mod statements;

pub use analysis::{analyze_plan, Analysis};
pub use errors::ParseError;

pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest allowed nesting of blocks, arrays, maps, `NOT`s and parenthesised
/// conditions. Keeps recursion in the parser, analysis and interpreter bounded.
pub const MAX_NESTING: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    /// Build a parser over a token sequence. A missing trailing EOF is added.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let (line, col) = tokens.last().map(|t| (t.line, t.col + 1)).unwrap_or((1, 1));
            tokens.push(Token::new(TokenKind::Eof, "", line, col));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        let last = self.tokens.len() - 1;
        self.tokens[(self.pos + offset).min(last)].kind
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(self.peek(), expected)
    }

    /// Run `parse` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::nesting_too_deep(self.peek(), MAX_NESTING));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    /// Parse the whole token sequence as a top-level script.
    pub fn parse_script(&mut self) -> ParseResult<PlanNode> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            statements.push(self.parse_statement()?);
        }
        Ok(PlanNode::script(statements))
    }
}

/// Parse source text into a plan tree without static analysis.
pub fn parse_plan(source: &str) -> ParseResult<PlanNode> {
    let tokens = tokenize(source)?;
    Parser::new(tokens).parse_script()
}

/// Parse source text and derive the capabilities and invocations it uses.
pub fn parse(source: &str) -> ParseResult<Analysis> {
    Ok(analyze_plan(parse_plan(source)?))
}
