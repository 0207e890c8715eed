use std::io::BufRead;

use super::ast::*;
use super::lexer::{TokenKind, Tokenizer};
use crate::error::{DbError, Result};

/// Recursive-descent parser: one method per grammar rule, each consuming
/// exactly the tokens of its production.
pub struct Parser<R> {
    tokens: Tokenizer<R>,
    /// False while a statement has been started but not fully consumed.
    complete: bool,
}

impl<R: BufRead> Parser<R> {
    pub fn new(tokens: Tokenizer<R>) -> Self {
        Self {
            tokens,
            complete: true,
        }
    }

    /// Parses the next statement. End of input parses as [`Statement::Exit`].
    pub fn parse_statement(&mut self) -> Result<Statement> {
        self.tokens.flush();
        self.complete = false;
        let statement = self.parse_next()?;
        self.complete = true;
        Ok(statement)
    }

    /// Discards the rest of a statement whose parse failed, through the next
    /// `;` or to end of input. Errors met along the way are dropped. After a
    /// statement that parsed completely there is nothing to discard.
    pub fn skip_command(&mut self) {
        while !self.complete {
            if let Ok(token) = self.tokens.next() {
                self.complete = matches!(token.kind, TokenKind::Semicolon | TokenKind::Eof);
            }
        }
    }

    fn parse_next(&mut self) -> Result<Statement> {
        let kind = self.tokens.peek_kind()?.clone();
        match kind {
            TokenKind::Create => self.parse_create(),
            TokenKind::Insert => self.parse_insert(),
            TokenKind::Load => self.parse_load(),
            TokenKind::Store => self.parse_store(),
            TokenKind::Print => self.parse_print(),
            TokenKind::Select => {
                let select = self.parse_select_clause()?;
                self.tokens.expect(&TokenKind::Semicolon)?;
                Ok(Statement::Select(select))
            }
            TokenKind::Exit | TokenKind::Quit => self.parse_exit(),
            TokenKind::Eof => Ok(Statement::Exit),
            other => Err(DbError::UnknownCommand(other.to_string())),
        }
    }

    fn parse_create(&mut self) -> Result<Statement> {
        self.tokens.expect(&TokenKind::Create)?;
        self.tokens.expect(&TokenKind::Table)?;
        let name = self.name()?;

        let definition = if self.tokens.next_if(&TokenKind::LParen)? {
            let columns = self.name_list()?;
            self.tokens.expect(&TokenKind::RParen)?;
            TableDefinition::Columns(columns)
        } else {
            self.tokens.expect(&TokenKind::As)?;
            TableDefinition::Query(self.parse_select_clause()?)
        };

        self.tokens.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Create { name, definition })
    }

    fn parse_insert(&mut self) -> Result<Statement> {
        self.tokens.expect(&TokenKind::Insert)?;
        self.tokens.expect(&TokenKind::Into)?;
        let table = self.name()?;
        self.tokens.expect(&TokenKind::Values)?;

        let mut rows = vec![self.parse_row()?];
        while self.tokens.next_if(&TokenKind::Comma)? {
            rows.push(self.parse_row()?);
        }

        self.tokens.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Insert { table, rows })
    }

    fn parse_row(&mut self) -> Result<Vec<String>> {
        self.tokens.expect(&TokenKind::LParen)?;
        let mut values = vec![self.literal()?];
        while self.tokens.next_if(&TokenKind::Comma)? {
            values.push(self.literal()?);
        }
        self.tokens.expect(&TokenKind::RParen)?;
        Ok(values)
    }

    fn parse_load(&mut self) -> Result<Statement> {
        self.tokens.expect(&TokenKind::Load)?;
        let name = self.name()?;
        self.tokens.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Load { name })
    }

    fn parse_store(&mut self) -> Result<Statement> {
        self.tokens.expect(&TokenKind::Store)?;
        let name = self.name()?;
        self.tokens.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Store { name })
    }

    fn parse_print(&mut self) -> Result<Statement> {
        self.tokens.expect(&TokenKind::Print)?;
        let name = self.name()?;
        self.tokens.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Print { name })
    }

    fn parse_exit(&mut self) -> Result<Statement> {
        if !self.tokens.next_if(&TokenKind::Quit)? {
            self.tokens.expect(&TokenKind::Exit)?;
        }
        self.tokens.expect(&TokenKind::Semicolon)?;
        Ok(Statement::Exit)
    }

    fn parse_select_clause(&mut self) -> Result<SelectClause> {
        self.tokens.expect(&TokenKind::Select)?;
        let columns = self.name_list()?;

        self.tokens.expect(&TokenKind::From)?;
        let tables = self.name_list()?;

        let mut conditions = Vec::new();
        if self.tokens.next_if(&TokenKind::Where)? {
            conditions.push(self.parse_condition()?);
            while self.tokens.next_if(&TokenKind::And)? {
                conditions.push(self.parse_condition()?);
            }
        }

        Ok(SelectClause {
            columns,
            tables,
            conditions,
        })
    }

    fn parse_condition(&mut self) -> Result<Condition> {
        let column = self.name()?;
        let op = self.tokens.expect_relation()?;

        // A quote starts a literal; anything else must be a column name.
        let operand = if matches!(self.tokens.peek_kind()?, TokenKind::Literal(_)) {
            Operand::Literal(self.literal()?)
        } else {
            Operand::Column(self.name()?)
        };

        Ok(Condition::new(column, op, operand))
    }

    fn name_list(&mut self) -> Result<Vec<String>> {
        let mut names = vec![self.name()?];
        while self.tokens.next_if(&TokenKind::Comma)? {
            names.push(self.name()?);
        }
        Ok(names)
    }

    fn name(&mut self) -> Result<String> {
        self.tokens.expect_identifier()
    }

    /// A literal's value, without quotes or surrounding blanks.
    fn literal(&mut self) -> Result<String> {
        Ok(self.tokens.expect_literal()?.trim().to_string())
    }
}
