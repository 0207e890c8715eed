pub mod cli;
pub mod error;
pub mod sql;
pub mod storage;

pub use error::{DbError, ErrorKind, Result};
pub use sql::{Interpreter, Tokenizer};
pub use storage::{Database, Table};
