use std::collections::HashMap;

use super::table::Table;

/// The set of named tables visible to the interpreter.
///
/// Names are case-sensitive. `put` replaces any table already registered
/// under the same name.
#[derive(Debug, Default)]
pub struct Database {
    tables: HashMap<String, Table>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn put(&mut self, name: impl Into<String>, table: Table) {
        self.tables.insert(name.into(), table);
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Registered names, sorted.
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_put() {
        let mut db = Database::new();
        assert!(db.get("table").is_none());

        let mut table = Table::new(["a", "b", "c"]).unwrap();
        table.add(&["aa", "fe", "3"]).unwrap();
        table.add(&["fee", "s2", "4"]).unwrap();
        db.put("table", table.clone());

        assert_eq!(db.get("table"), Some(&table));
        assert!(db.get("Table").is_none());
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let mut db = Database::new();
        db.put("t", Table::new(["a"]).unwrap());
        db.put("t", Table::new(["x", "y"]).unwrap());

        assert_eq!(db.len(), 1);
        assert_eq!(db.get("t").unwrap().column_count(), 2);
    }

    #[test]
    fn test_get_mut_inserts_in_place() {
        let mut db = Database::new();
        db.put("t", Table::new(["a"]).unwrap());
        db.get_mut("t").unwrap().add(&["1"]).unwrap();
        assert_eq!(db.get("t").unwrap().size(), 1);
    }

    #[test]
    fn test_table_names_sorted() {
        let mut db = Database::new();
        db.put("zeta", Table::new(["a"]).unwrap());
        db.put("alpha", Table::new(["a"]).unwrap());
        assert_eq!(db.table_names(), vec!["alpha", "zeta"]);
        assert_eq!(db.len(), 2);
    }
}
