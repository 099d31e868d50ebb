// Statement-level grammar: LET, CALL, IF/ELSE, FOR, RETURN and blocks

use super::{ParseResult, Parser};
use crate::ast::{PlanNode, SourceLocation, Statement, ToolInvocation};
use crate::lexer::TokenKind;
use indexmap::IndexMap;

impl Parser {
    pub(super) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(Statement::Empty)
            }
            TokenKind::Let => self.parse_let(),
            TokenKind::Call => self.parse_call(),
            TokenKind::If => self.parse_if(),
            TokenKind::For => self.parse_for(),
            TokenKind::Return => self.parse_return(),
            _ => Err(self.unexpected("statement")),
        }
    }

    /// A statement ends at a newline (consumed), end of input, or the
    /// closing brace of the enclosing block (left for the block parser).
    fn expect_terminator(&mut self) -> ParseResult<()> {
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof | TokenKind::RBrace => Ok(()),
            _ => Err(self.unexpected("NEWLINE or end of input")),
        }
    }

    fn parse_let(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Let, "LET")?;
        let name = self.expect(TokenKind::Name, "variable name")?.text;
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_value_or_var()?;
        self.expect_terminator()?;
        Ok(Statement::Let { name, value })
    }

    fn parse_call(&mut self) -> ParseResult<Statement> {
        let call = self.expect(TokenKind::Call, "CALL")?;
        let name = match self.peek_kind() {
            TokenKind::Name | TokenKind::Bare => self.advance().text,
            _ => return Err(self.unexpected("tool name")),
        };

        let mut args = IndexMap::new();
        while self.check(TokenKind::Name) {
            let key = self.advance().text;
            self.expect(TokenKind::Assign, "'=' after argument name")?;
            let value = self.parse_value_or_var()?;
            args.insert(key, value);
        }

        let capture = if self.eat(TokenKind::Arrow) {
            match self.peek_kind() {
                TokenKind::Name | TokenKind::Bare => Some(self.advance().text),
                _ => return Err(self.unexpected("capture variable name")),
            }
        } else {
            None
        };
        self.expect_terminator()?;

        Ok(Statement::Call(ToolInvocation {
            name,
            args,
            capture,
            location: SourceLocation::new(call.line, call.col),
        }))
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::If, "IF")?;
        let condition = self.parse_condition()?;
        let then_block = self.parse_block()?;

        // ELSE may sit on the same line as the closing brace or further down
        let resume = self.pos;
        self.skip_newlines();
        let else_block = if self.eat(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            self.pos = resume;
            None
        };
        self.expect_terminator()?;

        Ok(Statement::If {
            condition,
            then_block,
            else_block,
        })
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::For, "FOR")?;
        let var = self.expect(TokenKind::Name, "loop variable name")?.text;
        self.expect(TokenKind::In, "IN")?;
        let iterable = self.parse_value_or_var()?;
        let body = self.parse_block()?;
        self.expect_terminator()?;
        Ok(Statement::For {
            var,
            iterable,
            body,
        })
    }

    fn parse_return(&mut self) -> ParseResult<Statement> {
        self.expect(TokenKind::Return, "RETURN")?;
        let value = self.parse_value_or_var()?;
        self.expect_terminator()?;
        Ok(Statement::Return { value })
    }

    /// `: { statements }`. Any number of colons (including none) and blank
    /// lines may precede the opening brace.
    fn parse_block(&mut self) -> ParseResult<PlanNode> {
        self.nested(Self::parse_block_body)
    }

    fn parse_block_body(&mut self) -> ParseResult<PlanNode> {
        while self.eat(TokenKind::Colon) {}
        self.skip_newlines();
        self.expect(TokenKind::LBrace, "'{'")?;

        let mut statements = Vec::new();
        loop {
            match self.peek_kind() {
                TokenKind::RBrace => break,
                TokenKind::Eof => return Err(self.unexpected("'}'")),
                _ => statements.push(self.parse_statement()?),
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(PlanNode::block(statements))
    }
}
