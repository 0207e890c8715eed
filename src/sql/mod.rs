pub mod ast;
pub mod executor;
pub mod interpreter;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use executor::{natural_join, Executor};
pub use interpreter::Interpreter;
pub use lexer::{Token, TokenKind, Tokenizer};
pub use parser::Parser;
