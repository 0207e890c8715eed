use std::cmp::Ordering;
use std::io::Write;

use crate::error::{DbError, Result};

/// A relation of string cells.
///
/// Cells are stored column-major in physical insertion order. `index` holds
/// the physical row numbers sorted by full-row value, so ordered iteration
/// never has to move the cells themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    titles: Vec<String>,
    columns: Vec<Vec<String>>,
    index: Vec<usize>,
}

impl Table {
    /// Creates an empty table. Titles must be non-empty and pairwise distinct.
    pub fn new<I, S>(titles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let titles: Vec<String> = titles.into_iter().map(Into::into).collect();
        if titles.is_empty() {
            return Err(DbError::NoColumns);
        }

        for (i, title) in titles.iter().enumerate() {
            if titles[..i].contains(title) {
                return Err(DbError::DuplicateColumn(title.clone()));
            }
        }

        let columns = vec![Vec::new(); titles.len()];
        Ok(Self {
            titles,
            columns,
            index: Vec::new(),
        })
    }

    pub fn column_count(&self) -> usize {
        self.titles.len()
    }

    pub fn size(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Title of column `k`, if there is one.
    pub fn title(&self, k: usize) -> Option<&str> {
        self.titles.get(k).map(String::as_str)
    }

    /// Position of the column named `title`. Absence is not an error, so
    /// join code can probe for shared columns.
    pub fn find_column(&self, title: &str) -> Option<usize> {
        self.titles.iter().position(|t| t == title)
    }

    /// Cell at physical `row`, column `col`.
    pub fn get(&self, row: usize, col: usize) -> Result<&str> {
        self.columns
            .get(col)
            .and_then(|column| column.get(row))
            .map(String::as_str)
            .ok_or(DbError::InvalidAccess { row, col })
    }

    /// All cells of physical row `row`.
    pub fn row(&self, row: usize) -> Result<Vec<&str>> {
        if row >= self.size() {
            return Err(DbError::InvalidAccess { row, col: 0 });
        }
        Ok(self.columns.iter().map(|c| c[row].as_str()).collect())
    }

    /// Rows in physical insertion order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        (0..self.size()).map(move |r| self.cells(r))
    }

    /// Rows in ascending lexicographic order.
    pub fn sorted_rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.index.iter().map(move |&r| self.cells(r))
    }

    /// Physical row numbers in sorted order.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Inserts `values` unless an identical row is already present.
    ///
    /// Returns `Ok(true)` when the row was added and `Ok(false)` for a
    /// duplicate. A row of the wrong width is rejected and leaves the table
    /// untouched.
    pub fn add<S: AsRef<str>>(&mut self, values: &[S]) -> Result<bool> {
        if values.len() != self.column_count() {
            return Err(DbError::Arity {
                expected: self.column_count(),
                found: values.len(),
            });
        }

        let mut rank = self.index.len();
        for (i, &k) in self.index.iter().enumerate() {
            match self.compare_new_row(k, values) {
                Ordering::Equal => return Ok(false),
                Ordering::Greater => {
                    rank = i;
                    break;
                }
                Ordering::Less => {}
            }
        }

        let position = self.size();
        for (column, value) in self.columns.iter_mut().zip(values) {
            column.push(value.as_ref().to_string());
        }
        self.index.insert(rank, position);
        Ok(true)
    }

    /// Writes the rows in sorted order, each indented by two spaces.
    pub fn print<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for row in self.sorted_rows() {
            writeln!(out, "  {}", row.join(" "))?;
        }
        Ok(())
    }

    fn cells(&self, row: usize) -> Vec<&str> {
        self.columns.iter().map(|c| c[row].as_str()).collect()
    }

    /// Compares stored row `k` against a candidate row, column by column.
    fn compare_new_row<S: AsRef<str>>(&self, k: usize, row: &[S]) -> Ordering {
        self.columns
            .iter()
            .zip(row)
            .map(|(column, value)| column[k].as_str().cmp(value.as_ref()))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}
