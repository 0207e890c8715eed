use std::path::PathBuf;

use thiserror::Error;

/// Broad classes of [`DbError`]. The driver treats all of them the same way;
/// the classification exists for reporting and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntax,
    Semantic,
    Io,
}

#[derive(Error, Debug)]
pub enum DbError {
    #[error("line {line}: {message}")]
    Lexical { line: usize, message: String },

    #[error("line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("unrecognizable command: {0}")]
    UnknownCommand(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("table must have at least one column")]
    NoColumns,

    #[error("row has {found} values, table has {expected} columns")]
    Arity { expected: usize, found: usize },

    #[error("invalid row or column: ({row}, {col})")]
    InvalidAccess { row: usize, col: usize },

    #[error("select takes one or two tables, found {0}")]
    TooManyTables(usize),

    #[error("could not find {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("{}: line {line}: {message}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("problem accessing {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Lexical { .. } => ErrorKind::Lexical,
            DbError::UnexpectedToken { .. } | DbError::UnknownCommand(_) => ErrorKind::Syntax,
            DbError::UnknownTable(_)
            | DbError::UnknownColumn(_)
            | DbError::DuplicateColumn(_)
            | DbError::NoColumns
            | DbError::Arity { .. }
            | DbError::InvalidAccess { .. }
            | DbError::TooManyTables(_) => ErrorKind::Semantic,
            DbError::FileNotFound(_)
            | DbError::Format { .. }
            | DbError::File { .. }
            | DbError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;
