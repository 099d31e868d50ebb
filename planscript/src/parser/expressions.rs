// Value expressions and boolean conditions

use super::{ParseError, ParseResult, Parser};
use crate::ast::{CmpOp, Condition, IndexStep, ValueExpr, VarRef};
use crate::lexer::TokenKind;
use crate::values::number_from_text;
use indexmap::IndexMap;

impl Parser {
    /// A variable reference (`$name[0]["key"]`) or a literal value.
    pub(super) fn parse_value_or_var(&mut self) -> ParseResult<ValueExpr> {
        if self.check(TokenKind::Dollar) {
            return self.parse_var_ref().map(ValueExpr::Var);
        }
        self.parse_value()
    }

    fn parse_var_ref(&mut self) -> ParseResult<VarRef> {
        self.expect(TokenKind::Dollar, "'$'")?;
        let name = self.expect(TokenKind::Name, "variable name after '$'")?.text;
        let mut path = Vec::new();
        while self.eat(TokenKind::LBracket) {
            let step = match self.peek_kind() {
                TokenKind::Number => {
                    let token = self.peek().clone();
                    let index = token
                        .text
                        .parse::<i64>()
                        .map_err(|_| self.unexpected("integer index"))?;
                    self.advance();
                    IndexStep::Position(index)
                }
                TokenKind::String => IndexStep::Key(self.advance().text),
                _ => return Err(self.unexpected("integer index or quoted key")),
            };
            path.push(step);
            self.expect(TokenKind::RBracket, "']'")?;
        }
        Ok(VarRef { name, path })
    }

    fn parse_value(&mut self) -> ParseResult<ValueExpr> {
        match self.peek_kind() {
            TokenKind::Number => {
                // The lexer only emits well-formed numeric text, so a miss here
                // means the value does not fit in an f64.
                let number = number_from_text(&self.peek().text)
                    .ok_or_else(|| ParseError::number_out_of_range(self.peek()))?;
                self.advance();
                Ok(ValueExpr::Number(number))
            }
            TokenKind::True => {
                self.advance();
                Ok(ValueExpr::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(ValueExpr::Bool(false))
            }
            TokenKind::Null => {
                self.advance();
                Ok(ValueExpr::Null)
            }
            TokenKind::String => Ok(ValueExpr::String(self.advance().text)),
            TokenKind::Name | TokenKind::Bare => Ok(ValueExpr::Bare(self.advance().text)),
            TokenKind::LBracket => self.nested(Self::parse_array),
            TokenKind::LParen => self.nested(Self::parse_map),
            _ => Err(self.unexpected("value")),
        }
    }

    /// `[ v, v v ]` - commas between items are optional.
    fn parse_array(&mut self) -> ParseResult<ValueExpr> {
        self.expect(TokenKind::LBracket, "'['")?;
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_value_or_var()?);
            self.skip_newlines();
            self.eat(TokenKind::Comma);
        }
        Ok(ValueExpr::Array(items))
    }

    /// `( key=v key=v )`
    fn parse_map(&mut self) -> ParseResult<ValueExpr> {
        self.expect(TokenKind::LParen, "'('")?;
        let mut entries = IndexMap::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RParen) {
                break;
            }
            let key = match self.peek_kind() {
                TokenKind::Name | TokenKind::String => self.advance().text,
                _ => return Err(self.unexpected("map key")),
            };
            self.expect(TokenKind::Assign, "'=' after map key")?;
            let value = self.parse_value_or_var()?;
            entries.insert(key, value);
            self.skip_newlines();
            self.eat(TokenKind::Comma);
        }
        Ok(ValueExpr::Map(entries))
    }

    pub(super) fn parse_condition(&mut self) -> ParseResult<Condition> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Condition> {
        let mut left = self.parse_and()?;
        while self.eat(TokenKind::Or) {
            let right = self.parse_and()?;
            left = Condition::Or {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Condition> {
        let mut left = self.parse_not()?;
        while self.eat(TokenKind::And) {
            let right = self.parse_not()?;
            left = Condition::And {
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Condition> {
        if self.eat(TokenKind::Not) {
            let inner = self.nested(Self::parse_not)?;
            return Ok(Condition::Not {
                inner: Box::new(inner),
            });
        }
        self.parse_primary_condition()
    }

    fn parse_primary_condition(&mut self) -> ParseResult<Condition> {
        if self.check(TokenKind::LParen) && !self.lparen_starts_map() {
            self.advance();
            let inner = self.nested(Self::parse_or)?;
            self.expect(TokenKind::RParen, "')'")?;
            return Ok(inner);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> ParseResult<Condition> {
        let left = self.parse_value_or_var()?;
        let op_token = self.expect(TokenKind::Cmp, "comparison operator")?;
        let op = CmpOp::from_symbol(&op_token.text)
            .ok_or_else(|| ParseError::unexpected(&op_token, "comparison operator"))?;
        let right = self.parse_value_or_var()?;
        Ok(Condition::Cmp { op, left, right })
    }

    /// `()` and `( key =` open a map literal; any other `(` groups a condition.
    fn lparen_starts_map(&self) -> bool {
        match self.peek_kind_at(1) {
            TokenKind::RParen => true,
            TokenKind::Name | TokenKind::String => self.peek_kind_at(2) == TokenKind::Assign,
            _ => false,
        }
    }
}
