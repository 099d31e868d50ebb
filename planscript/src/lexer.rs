//! Plan script lexer
//!
//! Single left-to-right pass over the source text producing a flat token
//! sequence. Newlines are significant (they terminate statements) and are
//! emitted as tokens; all other whitespace and `//` comments are skipped.
//! The sequence always ends with exactly one [`TokenKind::Eof`] token.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Statement keywords
    Let,
    Call,
    If,
    Else,
    For,
    In,
    Return,
    // Logical operators
    And,
    Or,
    Not,
    // Literal keywords
    True,
    False,
    Null,
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Colon,
    Comma,
    Arrow,
    Assign,
    /// Any of `==`, `!=`, `<`, `<=`, `>`, `>=`; the token text holds the operator.
    Cmp,
    /// The variable sigil `$`.
    Dollar,
    Number,
    /// Double- or single-quoted string; the token text holds the unescaped content.
    String,
    Bare,
    Name,
    Newline,
    Eof,
}

impl TokenKind {
    /// Keyword lookup for an identifier. Keywords are case-sensitive.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "LET" => TokenKind::Let,
            "CALL" => TokenKind::Call,
            "IF" => TokenKind::If,
            "ELSE" => TokenKind::Else,
            "FOR" => TokenKind::For,
            "IN" => TokenKind::In,
            "RETURN" => TokenKind::Return,
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Let => "LET",
            TokenKind::Call => "CALL",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::For => "FOR",
            TokenKind::In => "IN",
            TokenKind::Return => "RETURN",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::Not => "NOT",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Null => "NULL",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBracket => "LBRACKET",
            TokenKind::RBracket => "RBRACKET",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Colon => "COLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Arrow => "ARROW",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Cmp => "CMP",
            TokenKind::Dollar => "DOLLAR",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Bare => "BARE",
            TokenKind::Name => "NAME",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Eof => "EOF",
        };
        f.write_str(name)
    }
}

/// A single token with its kind, text, and 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, col: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            col,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at line {line}, col {col}")]
    UnexpectedCharacter { ch: char, line: usize, col: usize },

    #[error("unterminated string starting at line {line}, col {col}")]
    UnterminatedString { line: usize, col: usize },
}

/// Tokenize plan script source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).run()
}

/// Characters that may appear in a bare (unquoted) word.
fn is_bare_char(ch: char) -> bool {
    !ch.is_whitespace()
        && !matches!(
            ch,
            '(' | ')' | '[' | ']' | '{' | '}' | ',' | ':' | '=' | '<' | '>' | '!' | '"' | '\''
                | '$'
        )
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    #[inline]
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, text: impl Into<String>, line: usize, col: usize) {
        self.tokens.push(Token::new(kind, text, line, col));
    }

    /// `->` never belongs to a bare word or number, so `tool->out` splits.
    fn at_arrow(&self) -> bool {
        self.peek() == Some('-') && self.peek_at(1) == Some('>')
    }

    fn continues_bare(&self) -> bool {
        matches!(self.peek(), Some(ch) if is_bare_char(ch)) && !self.at_arrow()
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(ch) = self.peek() {
            let (line, col) = (self.line, self.col);
            match ch {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => self.skip_comment(),
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, "\n", line, col);
                }
                '(' | ')' | '[' | ']' | '{' | '}' | ':' | ',' => {
                    self.bump();
                    let kind = match ch {
                        '(' => TokenKind::LParen,
                        ')' => TokenKind::RParen,
                        '[' => TokenKind::LBracket,
                        ']' => TokenKind::RBracket,
                        '{' => TokenKind::LBrace,
                        '}' => TokenKind::RBrace,
                        ':' => TokenKind::Colon,
                        _ => TokenKind::Comma,
                    };
                    self.push(kind, ch.to_string(), line, col);
                }
                '=' | '!' if self.peek_at(1) == Some('=') => {
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Cmp, format!("{}=", ch), line, col);
                }
                '<' | '>' => {
                    self.bump();
                    if self.peek() == Some('=') {
                        self.bump();
                        self.push(TokenKind::Cmp, format!("{}=", ch), line, col);
                    } else {
                        self.push(TokenKind::Cmp, ch.to_string(), line, col);
                    }
                }
                '-' if self.peek_at(1) == Some('>') => {
                    self.bump();
                    self.bump();
                    self.push(TokenKind::Arrow, "->", line, col);
                }
                '=' => {
                    self.bump();
                    self.push(TokenKind::Assign, "=", line, col);
                }
                '$' => {
                    self.bump();
                    self.push(TokenKind::Dollar, "$", line, col);
                }
                '"' => self.lex_double_quoted(line, col)?,
                '\'' => self.lex_single_quoted(line, col)?,
                c if c.is_ascii_digit()
                    || (c == '-' && matches!(self.peek_at(1), Some(d) if d.is_ascii_digit())) =>
                {
                    self.lex_number(line, col)
                }
                c if c.is_alphabetic() || c == '_' => self.lex_word(line, col),
                c if is_bare_char(c) => {
                    let text = self.take_bare(String::new());
                    self.push(TokenKind::Bare, text, line, col);
                }
                other => {
                    return Err(LexError::UnexpectedCharacter {
                        ch: other,
                        line,
                        col,
                    })
                }
            }
        }
        let (line, col) = (self.line, self.col);
        self.push(TokenKind::Eof, "", line, col);
        Ok(self.tokens)
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    /// Consume the rest of a bare run, appending to `text`.
    fn take_bare(&mut self, mut text: String) -> String {
        while self.continues_bare() {
            if let Some(ch) = self.bump() {
                text.push(ch);
            }
        }
        text
    }

    fn lex_number(&mut self, line: usize, col: usize) {
        let mut raw = String::new();
        if self.peek() == Some('-') {
            self.bump();
            raw.push('-');
        }
        let mut seen_dot = false;
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' | '_' => {}
                '.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            self.bump();
            raw.push(ch);
        }
        if self.continues_bare() {
            // `1.2.3`, `3rd`: the whole run is a bare word
            let text = self.take_bare(raw);
            self.push(TokenKind::Bare, text, line, col);
        } else {
            let text: String = raw.chars().filter(|c| *c != '_').collect();
            self.push(TokenKind::Number, text, line, col);
        }
    }

    fn lex_word(&mut self, line: usize, col: usize) {
        let mut word = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                self.bump();
                word.push(ch);
            } else {
                break;
            }
        }
        if self.continues_bare() {
            let text = self.take_bare(word);
            self.push(TokenKind::Bare, text, line, col);
        } else if let Some(kind) = TokenKind::keyword(&word) {
            self.push(kind, word, line, col);
        } else {
            self.push(TokenKind::Name, word, line, col);
        }
    }

    fn lex_double_quoted(&mut self, line: usize, col: usize) -> Result<(), LexError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(LexError::UnterminatedString { line, col }),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    None => return Err(LexError::UnterminatedString { line, col }),
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(other) => text.push(other),
                },
                Some(ch) => text.push(ch),
            }
        }
        self.push(TokenKind::String, text, line, col);
        Ok(())
    }

    fn lex_single_quoted(&mut self, line: usize, col: usize) -> Result<(), LexError> {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(LexError::UnterminatedString { line, col }),
                Some('\'') => break,
                Some('\\') => match self.bump() {
                    None => return Err(LexError::UnterminatedString { line, col }),
                    Some('\\') => text.push('\\'),
                    Some('\'') => text.push('\''),
                    Some('n') | Some('\n') => text.push('\n'),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                },
                Some(ch) => text.push(ch),
            }
        }
        self.push(TokenKind::String, text, line, col);
        Ok(())
    }
}
