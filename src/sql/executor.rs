use super::ast::*;
use crate::error::{DbError, Result};
use crate::storage::{Database, Table};

/// Evaluates select clauses against the tables of a [`Database`].
pub struct Executor<'a> {
    db: &'a Database,
}

impl<'a> Executor<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn table(&self, name: &str) -> Result<&'a Table> {
        self.db
            .get(name)
            .ok_or_else(|| DbError::UnknownTable(name.to_string()))
    }

    /// Runs `clause` and returns a new table holding its result.
    ///
    /// Two source tables are combined with [`natural_join`] before the WHERE
    /// conditions and the projection are applied.
    pub fn select(&self, clause: &SelectClause) -> Result<Table> {
        let sources = clause
            .tables
            .iter()
            .map(|name| self.table(name))
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "select {:?} from {:?} with {} condition(s)",
            clause.columns,
            clause.tables,
            clause.conditions.len()
        );

        match sources.as_slice() {
            [single] => project(single, clause),
            [left, right] => {
                let joined = natural_join(left, right)?;
                log::debug!("joined relation has {} row(s)", joined.size());
                project(&joined, clause)
            }
            _ => Err(DbError::TooManyTables(sources.len())),
        }
    }
}

/// Natural join of `left` and `right`.
///
/// The result has all of `left`'s columns followed by the columns of
/// `right` that `left` lacks. Rows come from a nested loop over the
/// physical rows of both tables, `left` outermost, keeping pairs that agree
/// on every shared column.
pub fn natural_join(left: &Table, right: &Table) -> Result<Table> {
    let shared: Vec<(usize, usize)> = left
        .titles()
        .iter()
        .enumerate()
        .filter_map(|(i, title)| right.find_column(title).map(|j| (i, j)))
        .collect();

    let right_only: Vec<usize> = right
        .titles()
        .iter()
        .enumerate()
        .filter(|(_, title)| left.find_column(title).is_none())
        .map(|(j, _)| j)
        .collect();

    let titles = left
        .titles()
        .iter()
        .chain(right_only.iter().map(|&j| &right.titles()[j]))
        .cloned();
    let mut joined = Table::new(titles)?;

    for left_row in left.rows() {
        for right_row in right.rows() {
            if shared.iter().all(|&(i, j)| left_row[i] == right_row[j]) {
                let mut row = left_row.clone();
                row.extend(right_only.iter().map(|&j| right_row[j]));
                joined.add(&row)?;
            }
        }
    }

    Ok(joined)
}

/// Filters `source` by the clause's conditions and keeps the projected
/// columns. Rows that project to the same values collapse into one.
fn project(source: &Table, clause: &SelectClause) -> Result<Table> {
    let positions = clause
        .columns
        .iter()
        .map(|name| column_index(source, name))
        .collect::<Result<Vec<_>>>()?;

    let conditions = clause
        .conditions
        .iter()
        .map(|c| BoundCondition::bind(c, source))
        .collect::<Result<Vec<_>>>()?;

    let mut result = Table::new(clause.columns.iter().cloned())?;
    for row in source.rows() {
        if conditions.iter().all(|c| c.holds(&row)) {
            let projected: Vec<&str> = positions.iter().map(|&i| row[i]).collect();
            result.add(&projected)?;
        }
    }

    Ok(result)
}

fn column_index(table: &Table, name: &str) -> Result<usize> {
    table
        .find_column(name)
        .ok_or_else(|| DbError::UnknownColumn(name.to_string()))
}

/// A condition with its column names resolved to positions in one relation.
struct BoundCondition<'c> {
    column: usize,
    op: RelOp,
    operand: BoundOperand<'c>,
}

enum BoundOperand<'c> {
    Literal(&'c str),
    Column(usize),
}

impl<'c> BoundCondition<'c> {
    fn bind(condition: &'c Condition, table: &Table) -> Result<Self> {
        let operand = match &condition.operand {
            Operand::Literal(value) => BoundOperand::Literal(value),
            Operand::Column(name) => BoundOperand::Column(column_index(table, name)?),
        };
        Ok(Self {
            column: column_index(table, &condition.column)?,
            op: condition.op,
            operand,
        })
    }

    /// Both sides are compared without surrounding blanks, so padded cells
    /// from a `.db` file still match trimmed literals.
    fn holds(&self, row: &[&str]) -> bool {
        let right = match self.operand {
            BoundOperand::Literal(value) => value,
            BoundOperand::Column(i) => row[i],
        };
        self.op.holds(row[self.column].trim(), right.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(titles: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(titles.iter().copied()).unwrap();
        for &row in rows {
            table.add(row).unwrap();
        }
        table
    }

    fn clause(columns: &[&str], tables: &[&str], conditions: Vec<Condition>) -> SelectClause {
        SelectClause {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            tables: tables.iter().map(|s| s.to_string()).collect(),
            conditions,
        }
    }

    fn sorted(table: &Table) -> Vec<Vec<String>> {
        table
            .sorted_rows()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect()
    }

    fn literal(column: &str, op: RelOp, value: &str) -> Condition {
        Condition::new(column, op, Operand::Literal(value.to_string()))
    }

    #[test]
    fn test_projection() {
        let mut db = Database::new();
        db.put("T", table(&["a", "b"], &[&["x", "1"], &["y", "2"]]));

        let result = Executor::new(&db).select(&clause(&["a"], &["T"], vec![])).unwrap();
        assert_eq!(result.titles(), &["a"]);
        assert_eq!(sorted(&result), vec![vec!["x"], vec!["y"]]);
    }

    #[test]
    fn test_projection_collapses_duplicates() {
        let mut db = Database::new();
        db.put("T", table(&["a", "b"], &[&["x", "1"], &["x", "2"], &["y", "3"]]));

        let result = Executor::new(&db).select(&clause(&["a"], &["T"], vec![])).unwrap();
        assert_eq!(result.size(), 2);
    }

    #[test]
    fn test_projection_reorders_columns() {
        let mut db = Database::new();
        db.put("T", table(&["a", "b"], &[&["x", "1"]]));

        let result = Executor::new(&db)
            .select(&clause(&["b", "a"], &["T"], vec![]))
            .unwrap();
        assert_eq!(result.titles(), &["b", "a"]);
        assert_eq!(sorted(&result), vec![vec!["1", "x"]]);
    }

    #[test]
    fn test_where_literal_and_column() {
        let mut db = Database::new();
        db.put(
            "T",
            table(
                &["name", "lo", "hi"],
                &[&["a", "1", "5"], &["b", "7", "3"], &["c", "2", "2"], &["d", "4", "9"]],
            ),
        );

        let conditions = vec![
            Condition::new("lo", RelOp::LtEq, Operand::Column("hi".into())),
            literal("name", RelOp::NotEq, "d"),
        ];
        let result = Executor::new(&db)
            .select(&clause(&["name"], &["T"], conditions))
            .unwrap();
        assert_eq!(sorted(&result), vec![vec!["a"], vec!["c"]]);
    }

    #[test]
    fn test_conditions_ignore_padding() {
        let mut db = Database::new();
        db.put(
            "T",
            table(&["a", "b", "c"], &[&["x", " 1", "1 "], &["y", "2", " 3"]]),
        );
        let executor = Executor::new(&db);

        let literal_match = executor
            .select(&clause(&["a"], &["T"], vec![literal("b", RelOp::Eq, "1")]))
            .unwrap();
        assert_eq!(sorted(&literal_match), vec![vec!["x"]]);

        let column_match = executor
            .select(&clause(
                &["a"],
                &["T"],
                vec![Condition::new("b", RelOp::Eq, Operand::Column("c".into()))],
            ))
            .unwrap();
        assert_eq!(sorted(&column_match), vec![vec!["x"]]);

        // Projected cells keep their padding.
        let projected = executor.select(&clause(&["b"], &["T"], vec![])).unwrap();
        assert_eq!(sorted(&projected), vec![vec![" 1"], vec!["2"]]);
    }

    #[test]
    fn test_operators_against_literal() {
        let mut db = Database::new();
        db.put("T", table(&["v"], &[&["5"]]));
        let executor = Executor::new(&db);

        let keeps = |op, value| {
            executor
                .select(&clause(&["v"], &["T"], vec![literal("v", op, value)]))
                .unwrap()
                .size()
                == 1
        };

        assert!(keeps(RelOp::Eq, "5"));
        assert!(keeps(RelOp::GtEq, "5"));
        assert!(keeps(RelOp::LtEq, "5"));
        assert!(!keeps(RelOp::Lt, "5"));
        assert!(!keeps(RelOp::Gt, "5"));
        assert!(!keeps(RelOp::NotEq, "5"));
    }

    #[test]
    fn test_natural_join_single_match() {
        let mut db = Database::new();
        db.put("T1", table(&["a", "b"], &[&["1", "2"]]));
        db.put("T2", table(&["b", "c"], &[&["2", "3"]]));

        let result = Executor::new(&db)
            .select(&clause(&["a", "c"], &["T1", "T2"], vec![]))
            .unwrap();
        assert_eq!(sorted(&result), vec![vec!["1", "3"]]);
    }

    #[test]
    fn test_natural_join_no_match() {
        let mut db = Database::new();
        db.put("T1", table(&["a", "b"], &[&["1", "2"]]));
        db.put("T2", table(&["b", "c"], &[&["9", "3"]]));

        let result = Executor::new(&db)
            .select(&clause(&["a", "c"], &["T1", "T2"], vec![]))
            .unwrap();
        assert_eq!(result.size(), 0);
    }

    #[test]
    fn test_join_columns_and_physical_order() {
        let left = table(&["a", "b"], &[&["2", "x"], &["1", "y"]]);
        let right = table(&["c", "b"], &[&["q", "y"], &["p", "x"], &["r", "x"]]);

        let joined = natural_join(&left, &right).unwrap();
        assert_eq!(joined.titles(), &["a", "b", "c"]);

        let physical: Vec<Vec<&str>> = joined.rows().collect();
        assert_eq!(
            physical,
            vec![vec!["2", "x", "p"], vec!["2", "x", "r"], vec!["1", "y", "q"]]
        );
    }

    #[test]
    fn test_join_without_shared_columns_is_cross_product() {
        let left = table(&["a"], &[&["1"], &["2"]]);
        let right = table(&["b"], &[&["x"], &["y"], &["z"]]);

        let joined = natural_join(&left, &right).unwrap();
        assert_eq!(joined.size(), 6);
    }

    #[test]
    fn test_where_applies_after_join() {
        let mut db = Database::new();
        db.put("S", table(&["sid", "name"], &[&["1", "ann"], &["2", "bob"]]));
        db.put("E", table(&["sid", "course"], &[&["1", "61b"], &["2", "61b"], &["2", "70"]]));

        let result = Executor::new(&db)
            .select(&clause(&["name"], &["S", "E"], vec![literal("course", RelOp::Eq, "70")]))
            .unwrap();
        assert_eq!(sorted(&result), vec![vec!["bob"]]);
    }

    #[test]
    fn test_errors() {
        let mut db = Database::new();
        db.put("T", table(&["a"], &[&["1"]]));
        let executor = Executor::new(&db);

        assert!(matches!(
            executor.select(&clause(&["a"], &["missing"], vec![])),
            Err(DbError::UnknownTable(ref t)) if t == "missing"
        ));
        assert!(matches!(
            executor.select(&clause(&["z"], &["T"], vec![])),
            Err(DbError::UnknownColumn(ref c)) if c == "z"
        ));
        assert!(matches!(
            executor.select(&clause(&["a"], &["T"], vec![literal("q", RelOp::Eq, "1")])),
            Err(DbError::UnknownColumn(_))
        ));
        assert!(matches!(
            executor.select(&clause(&["a", "a"], &["T"], vec![])),
            Err(DbError::DuplicateColumn(_))
        ));
        assert!(matches!(
            executor.select(&clause(&["a"], &["T", "T", "T"], vec![])),
            Err(DbError::TooManyTables(3))
        ));
    }
}
