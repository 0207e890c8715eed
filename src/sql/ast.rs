use std::cmp::Ordering;
use std::fmt;

/// One parsed statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Create { name: String, definition: TableDefinition },
    Insert { table: String, rows: Vec<Vec<String>> },
    Load { name: String },
    Store { name: String },
    Print { name: String },
    Select(SelectClause),
    /// `exit;`, `quit;` or end of input.
    Exit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableDefinition {
    Columns(Vec<String>),
    Query(SelectClause),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub columns: Vec<String>,
    pub tables: Vec<String>,
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: RelOp,
    pub operand: Operand,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: RelOp, operand: Operand) -> Self {
        Self {
            column: column.into(),
            op,
            operand,
        }
    }
}

/// Right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(String),
    Column(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl RelOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(RelOp::Eq),
            "!=" => Some(RelOp::NotEq),
            "<" => Some(RelOp::Lt),
            "<=" => Some(RelOp::LtEq),
            ">" => Some(RelOp::Gt),
            ">=" => Some(RelOp::GtEq),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Eq => "=",
            RelOp::NotEq => "!=",
            RelOp::Lt => "<",
            RelOp::LtEq => "<=",
            RelOp::Gt => ">",
            RelOp::GtEq => ">=",
        }
    }

    /// Whether `left op right` holds under plain string ordering.
    pub fn holds(&self, left: &str, right: &str) -> bool {
        let ordering = left.cmp(right);
        match self {
            RelOp::Eq => ordering == Ordering::Equal,
            RelOp::NotEq => ordering != Ordering::Equal,
            RelOp::Lt => ordering == Ordering::Less,
            RelOp::LtEq => ordering != Ordering::Greater,
            RelOp::Gt => ordering == Ordering::Greater,
            RelOp::GtEq => ordering != Ordering::Less,
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
