use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Write};

use super::ast::RelOp;
use crate::error::{DbError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Create,
    Table,
    Insert,
    Into,
    Values,
    Load,
    Store,
    Print,
    Select,
    From,
    Where,
    And,
    As,
    Exit,
    Quit,

    // Names and literals
    Identifier(String),
    Literal(String),

    // Operators
    Relation(RelOp),

    // Punctuation
    LParen,
    RParen,
    Comma,
    Semicolon,

    // Special
    Eof,
}

impl TokenKind {
    /// Keywords match their exact lowercase spelling only.
    fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "create" => TokenKind::Create,
            "table" => TokenKind::Table,
            "insert" => TokenKind::Insert,
            "into" => TokenKind::Into,
            "values" => TokenKind::Values,
            "load" => TokenKind::Load,
            "store" => TokenKind::Store,
            "print" => TokenKind::Print,
            "select" => TokenKind::Select,
            "from" => TokenKind::From,
            "where" => TokenKind::Where,
            "and" => TokenKind::And,
            "as" => TokenKind::As,
            "exit" => TokenKind::Exit,
            "quit" => TokenKind::Quit,
            _ => return None,
        };
        Some(kind)
    }

    fn is_keyword(&self) -> bool {
        Self::keyword(self.text()).as_ref() == Some(self)
    }

    fn text(&self) -> &str {
        match self {
            TokenKind::Create => "create",
            TokenKind::Table => "table",
            TokenKind::Insert => "insert",
            TokenKind::Into => "into",
            TokenKind::Values => "values",
            TokenKind::Load => "load",
            TokenKind::Store => "store",
            TokenKind::Print => "print",
            TokenKind::Select => "select",
            TokenKind::From => "from",
            TokenKind::Where => "where",
            TokenKind::And => "and",
            TokenKind::As => "as",
            TokenKind::Exit => "exit",
            TokenKind::Quit => "quit",
            TokenKind::Identifier(name) => name,
            TokenKind::Literal(value) => value,
            TokenKind::Relation(op) => op.symbol(),
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Eof => "",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::Literal(value) => write!(f, "literal '{}'", value),
            other => write!(f, "'{}'", other.text()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize) -> Self {
        Self { kind, line }
    }
}

/// Lazy token stream over a line-oriented source.
///
/// Lines are pulled from the source only when the parser asks for a token
/// the buffered input cannot supply, which is what lets an interactive
/// session execute each statement as soon as its `;` arrives.
pub struct Tokenizer<R> {
    source: R,
    prompter: Option<Box<dyn Write>>,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    exhausted: bool,
    /// True once a statement has started and its `;` has not been seen.
    in_statement: bool,
    lookahead: VecDeque<Token>,
    /// Tokens consumed since the last `flush`, replayed by `rewind`.
    history: Vec<Token>,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            prompter: None,
            chars: Vec::new(),
            pos: 0,
            line: 0,
            exhausted: false,
            in_statement: false,
            lookahead: VecDeque::new(),
            history: Vec::new(),
        }
    }

    /// Writes `> ` before the first line of each statement and `... `
    /// before continuation lines.
    pub fn with_prompter(mut self, prompter: Box<dyn Write>) -> Self {
        self.prompter = Some(prompter);
        self
    }

    /// Current source line, 1-based.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn peek(&mut self) -> Result<&Token> {
        if self.lookahead.is_empty() {
            let token = self.scan()?;
            self.lookahead.push_back(token);
        }
        Ok(&self.lookahead[0])
    }

    pub fn peek_kind(&mut self) -> Result<&TokenKind> {
        Ok(&self.peek()?.kind)
    }

    /// Consumes the next token. At end of input this keeps returning `Eof`.
    pub fn next(&mut self) -> Result<Token> {
        self.peek()?;
        let token = match self.lookahead.pop_front() {
            Some(token) => token,
            None => Token::new(TokenKind::Eof, self.line),
        };
        if token.kind == TokenKind::Eof {
            self.lookahead.push_front(token.clone());
        } else {
            self.history.push(token.clone());
        }
        Ok(token)
    }

    /// Consumes the next token if it is `kind`.
    pub fn next_if(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.peek_kind()? == kind {
            self.next()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Consumes the next token, which must be `kind`. A mismatch is a syntax
    /// error and leaves the token in place.
    pub fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        let token = self.peek()?;
        if &token.kind != kind {
            return Err(DbError::UnexpectedToken {
                expected: kind.to_string(),
                found: token.kind.to_string(),
                line: token.line,
            });
        }
        self.next()
    }

    /// Consumes a name. Keywords are only reserved where the grammar asks
    /// for them, so a keyword-spelled word is accepted here as well.
    pub fn expect_identifier(&mut self) -> Result<String> {
        self.take(
            |k| match k {
                TokenKind::Identifier(name) => Some(name.clone()),
                kind if kind.is_keyword() => Some(kind.text().to_string()),
                _ => None,
            },
            "name",
        )
    }

    pub fn expect_literal(&mut self) -> Result<String> {
        self.take(
            |k| match k {
                TokenKind::Literal(value) => Some(value.clone()),
                _ => None,
            },
            "literal",
        )
    }

    pub fn expect_relation(&mut self) -> Result<RelOp> {
        self.take(
            |k| match k {
                TokenKind::Relation(op) => Some(*op),
                _ => None,
            },
            "relation",
        )
    }

    /// Forgets consumed tokens; a later `rewind` goes back no further than here.
    pub fn flush(&mut self) {
        self.history.clear();
    }

    /// Puts every token consumed since the last `flush` back on the stream.
    pub fn rewind(&mut self) {
        for token in self.history.drain(..).rev() {
            self.lookahead.push_front(token);
        }
    }

    fn take<T>(&mut self, extract: impl Fn(&TokenKind) -> Option<T>, expected: &str) -> Result<T> {
        let token = self.peek()?;
        match extract(&token.kind) {
            Some(value) => {
                self.next()?;
                Ok(value)
            }
            None => Err(DbError::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind.to_string(),
                line: token.line,
            }),
        }
    }

    fn scan(&mut self) -> Result<Token> {
        loop {
            let Some(c) = self.current() else {
                if self.read_line() {
                    continue;
                }
                return Ok(Token::new(TokenKind::Eof, self.line));
            };

            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }

            let kind = match (c, self.lookahead_char()) {
                ('/', Some('*')) => {
                    self.skip_block_comment()?;
                    continue;
                }
                ('/', Some('/')) | ('-', Some('-')) => {
                    self.pos = self.chars.len();
                    continue;
                }
                ('(', _) => self.single(TokenKind::LParen),
                (')', _) => self.single(TokenKind::RParen),
                (',', _) => self.single(TokenKind::Comma),
                (';', _) => self.single(TokenKind::Semicolon),
                ('=' | '!' | '<' | '>', _) => self.read_relation()?,
                ('\'', _) => self.read_literal()?,
                (c, _) if c.is_alphabetic() => self.read_identifier_or_keyword(),
                (c, _) => {
                    self.pos += 1;
                    return Err(self.lexical(format!("unrecognized character '{}'", c)));
                }
            };

            self.in_statement = kind != TokenKind::Semicolon;
            return Ok(Token::new(kind, self.line));
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn lookahead_char(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    /// Longest relation symbol at the cursor: `<=` wins over `<`.
    fn read_relation(&mut self) -> Result<TokenKind> {
        let rest = &self.chars[self.pos..];
        for width in [2, 1] {
            if rest.len() < width {
                continue;
            }
            let symbol: String = rest[..width].iter().collect();
            if let Some(op) = RelOp::from_symbol(&symbol) {
                self.pos += width;
                return Ok(TokenKind::Relation(op));
            }
        }

        let c = rest[0];
        self.pos += 1;
        Err(self.lexical(format!("unrecognized character '{}'", c)))
    }

    /// Loads the next source line. Returns false at end of input; a read
    /// failure counts as end of input.
    fn read_line(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        if let Some(prompter) = self.prompter.as_mut() {
            let prompt = if self.in_statement { "... " } else { "> " };
            if let Err(e) = prompter
                .write_all(prompt.as_bytes())
                .and_then(|()| prompter.flush())
            {
                log::warn!("could not write prompt: {}", e);
            }
        }

        let mut buf = String::new();
        match self.source.read_line(&mut buf) {
            Ok(0) => {
                self.exhausted = true;
                false
            }
            Ok(_) => {
                self.chars = buf.trim_end_matches(['\n', '\r']).chars().collect();
                self.pos = 0;
                self.line += 1;
                true
            }
            Err(e) => {
                log::warn!("input stream closed: {}", e);
                self.exhausted = true;
                false
            }
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        self.pos += 2;
        loop {
            match (self.current(), self.lookahead_char()) {
                (Some('*'), Some('/')) => {
                    self.pos += 2;
                    return Ok(());
                }
                (Some(_), _) => self.pos += 1,
                (None, _) => {
                    if !self.read_line() {
                        return Err(self.lexical("unterminated comment".to_string()));
                    }
                }
            }
        }
    }

    fn read_literal(&mut self) -> Result<TokenKind> {
        self.pos += 1;
        let start = self.pos;

        let Some(len) = self.chars[start..].iter().position(|&c| c == '\'') else {
            self.pos = self.chars.len();
            return Err(self.lexical("unterminated literal".to_string()));
        };

        let value: String = self.chars[start..start + len].iter().collect();
        self.pos = start + len + 1;

        if value.contains(',') {
            return Err(self.lexical(format!("literal may not contain ',': '{}'", value)));
        }
        Ok(TokenKind::Literal(value))
    }

    fn read_identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.pos;
        while let Some(c) = self.current() {
            if c.is_alphanumeric() || c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        let word: String = self.chars[start..self.pos].iter().collect();
        TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier(word))
    }

    fn lexical(&self, message: String) -> DbError {
        DbError::Lexical {
            line: self.line,
            message,
        }
    }
}
