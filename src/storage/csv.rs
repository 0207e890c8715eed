use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::table::Table;
use crate::error::{DbError, Result};

const DELIMITER: char = ',';

/// Location of the file backing table `name` inside `dir`.
pub fn table_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.db", name))
}

/// Reads `.db` files: one header line of column titles, then one line per
/// row. Fields are split on commas with no quoting.
#[derive(Debug, Default)]
pub struct CsvReader;

impl CsvReader {
    pub fn new() -> Self {
        Self
    }

    pub fn read_file(&self, path: &Path) -> Result<Table> {
        let file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => DbError::FileNotFound(path.to_path_buf()),
            _ => DbError::File {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        self.read_from_reader(BufReader::new(file), path)
    }

    /// Builds a table from `reader`. `path` is only used in error messages.
    pub fn read_from_reader<R: BufRead>(&self, reader: R, path: &Path) -> Result<Table> {
        let io_error = |source| DbError::File {
            path: path.to_path_buf(),
            source,
        };
        let format_error = |line, message: String| DbError::Format {
            path: path.to_path_buf(),
            line,
            message,
        };

        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => line.map_err(io_error)?,
            None => return Err(format_error(1, "missing header".to_string())),
        };

        let mut table = Table::new(header.split(DELIMITER))
            .map_err(|e| format_error(1, e.to_string()))?;

        for (i, line) in lines.enumerate() {
            let line = line.map_err(io_error)?;
            let fields: Vec<&str> = line.split(DELIMITER).collect();
            table
                .add(&fields)
                .map_err(|e| format_error(i + 2, e.to_string()))?;
        }

        Ok(table)
    }
}

/// Writes tables in the format [`CsvReader`] reads. Rows go out in physical
/// insertion order, not sorted order.
#[derive(Debug, Default)]
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }

    pub fn write_file(&self, table: &Table, path: &Path) -> Result<()> {
        let file_error = |source| DbError::File {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(file_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to_writer(table, &mut writer).map_err(file_error)?;
        writer.flush().map_err(file_error)
    }

    pub fn write_to_writer<W: Write>(&self, table: &Table, writer: &mut W) -> io::Result<()> {
        let sep = DELIMITER.to_string();
        writeln!(writer, "{}", table.titles().join(&sep))?;
        for row in table.rows() {
            writeln!(writer, "{}", row.join(&sep))?;
        }
        Ok(())
    }
}
