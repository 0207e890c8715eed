pub mod csv;
pub mod database;
pub mod table;

pub use csv::{table_path, CsvReader, CsvWriter};
pub use database::Database;
pub use table::Table;
