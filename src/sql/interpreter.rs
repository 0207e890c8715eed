use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use super::ast::{SelectClause, Statement, TableDefinition};
use super::executor::Executor;
use super::lexer::Tokenizer;
use super::parser::Parser;
use crate::error::{DbError, Result};
use crate::storage::{table_path, CsvReader, CsvWriter, Database, Table};

/// Reads statements from a token stream and executes them one at a time
/// against its own [`Database`], writing results to `out`.
pub struct Interpreter<R, W> {
    parser: Parser<R>,
    db: Database,
    out: W,
    data_dir: PathBuf,
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    /// `data_dir` is where `load` and `store` look for `<name>.db` files.
    pub fn new(tokens: Tokenizer<R>, out: W, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            parser: Parser::new(tokens),
            db: Database::new(),
            out,
            data_dir: data_dir.into(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Executes statements until `exit;`, `quit;` or end of input. A failed
    /// statement is reported on the output and skipped; only a failure to
    /// write the output ends the loop early.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            match self.statement() {
                Ok(true) => {}
                Ok(false) => return Ok(()),
                Err(e) => {
                    log::warn!("statement failed: {}", e);
                    writeln!(self.out, "Error: {}", e)?;
                    self.skip_command();
                }
            }
        }
    }

    /// Parses and executes one statement. Returns false once the session
    /// should end.
    pub fn statement(&mut self) -> Result<bool> {
        let statement = self.parser.parse_statement()?;
        self.execute(statement)
    }

    /// Discards the rest of a statement that failed.
    pub fn skip_command(&mut self) {
        self.parser.skip_command();
    }

    pub fn execute(&mut self, statement: Statement) -> Result<bool> {
        log::debug!("executing {:?}", statement);
        match statement {
            Statement::Create { name, definition } => self.create(name, definition)?,
            Statement::Insert { table, rows } => self.insert(&table, &rows)?,
            Statement::Load { name } => self.load(name)?,
            Statement::Store { name } => self.store(&name)?,
            Statement::Print { name } => self.print(&name)?,
            Statement::Select(select) => self.select(&select)?,
            Statement::Exit => return Ok(false),
        }
        Ok(true)
    }

    fn create(&mut self, name: String, definition: TableDefinition) -> Result<()> {
        let table = match definition {
            TableDefinition::Columns(columns) => Table::new(columns)?,
            TableDefinition::Query(select) => Executor::new(&self.db).select(&select)?,
        };
        self.db.put(name, table);
        Ok(())
    }

    /// Inserts every row or none: all rows are checked against the table's
    /// width before the first one is added.
    fn insert(&mut self, name: &str, rows: &[Vec<String>]) -> Result<()> {
        let table = self
            .db
            .get_mut(name)
            .ok_or_else(|| DbError::UnknownTable(name.to_string()))?;

        if let Some(row) = rows.iter().find(|r| r.len() != table.column_count()) {
            return Err(DbError::Arity {
                expected: table.column_count(),
                found: row.len(),
            });
        }

        for row in rows {
            table.add(row)?;
        }
        Ok(())
    }

    fn load(&mut self, name: String) -> Result<()> {
        let path = table_path(&self.data_dir, &name);
        let table = CsvReader::new().read_file(&path)?;
        log::info!("loaded {} row(s) from {}", table.size(), path.display());

        writeln!(self.out, "Loaded {}.db", name)?;
        self.db.put(name, table);
        Ok(())
    }

    fn store(&mut self, name: &str) -> Result<()> {
        let table = self
            .db
            .get(name)
            .ok_or_else(|| DbError::UnknownTable(name.to_string()))?;
        let path = table_path(&self.data_dir, name);
        CsvWriter::new().write_file(table, &path)?;
        log::info!("stored {} row(s) to {}", table.size(), path.display());

        writeln!(self.out, "Stored {}.db", name)?;
        Ok(())
    }

    fn print(&mut self, name: &str) -> Result<()> {
        let table = self
            .db
            .get(name)
            .ok_or_else(|| DbError::UnknownTable(name.to_string()))?;

        writeln!(self.out, "Contents of {}:", name)?;
        table.print(&mut self.out)?;
        Ok(())
    }

    fn select(&mut self, select: &SelectClause) -> Result<()> {
        let result = Executor::new(&self.db).select(select)?;

        writeln!(self.out, "Search results:")?;
        result.print(&mut self.out)?;
        Ok(())
    }
}
