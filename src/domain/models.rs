use std::fmt;

static NULL_VALUE: Value = Value::Null;

/// A single scalar cell, mirroring the storage classes of the table store.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric reading of the cell. Text counts when it parses as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
                }
            }
        }
    }

    /// Converts a loosely typed text field (e.g. from CSV) into the narrowest value.
    pub fn infer(raw: &str) -> Value {
        if raw.is_empty() {
            return Value::Null;
        }
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Integer(i);
        }
        match raw.parse::<f64>() {
            Ok(r) if r.is_finite() => Value::Real(r),
            _ => Value::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) if r.fract() == 0.0 && r.abs() < 1e15 => write!(f, "{:.1}", r),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Column type inferred from the cells of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Only nulls (or no rows at all).
    Empty,
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Declared type used when the column is created in the store.
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Empty | ColumnType::Text => "TEXT",
        }
    }

    fn widen(self, value: &Value) -> ColumnType {
        match (self, value) {
            (current, Value::Null) => current,
            (ColumnType::Text, _) | (_, Value::Text(_)) => ColumnType::Text,
            (ColumnType::Real, _) | (_, Value::Real(_)) => ColumnType::Real,
            (_, Value::Integer(_)) => ColumnType::Integer,
        }
    }
}

/// Reconciliation policy applied when a table is written into the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Drop the stored table and recreate it with exactly the incoming rows.
    Replace,
    /// Keep the stored rows and add the incoming rows after them.
    Append,
}

impl WriteMode {
    /// Verb used in status messages ("Data replaced successfully.").
    pub fn past_tense(&self) -> &'static str {
        match self {
            WriteMode::Replace => "replaced",
            WriteMode::Append => "appended",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Replace => f.write_str("replace"),
            WriteMode::Append => f.write_str("append"),
        }
    }
}

/// In-memory working table: named columns and rows of scalar cells.
///
/// Every row holds exactly one value per column; short rows are padded with
/// nulls and long rows truncated on insertion.
///
/// # Examples
///
/// ```
/// use xldash::domain::{Table, Value};
///
/// let mut table = Table::new(vec!["name".to_string(), "age".to_string()]);
/// table.push_row(vec![Value::Text("a".to_string()), Value::Integer(10)]);
/// assert_eq!(table.row_count(), 1);
/// assert_eq!(table.column_index("age"), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// A table without rows is empty even when it has columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Value {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL_VALUE)
    }

    pub fn column_values(&self, col: usize) -> impl Iterator<Item = &Value> + '_ {
        self.rows.iter().filter_map(move |row| row.get(col))
    }

    pub fn column_type(&self, col: usize) -> ColumnType {
        self.column_values(col)
            .fold(ColumnType::Empty, |ty, value| ty.widen(value))
    }

    /// Unifies numeric columns: a column whose numbers are all whole becomes
    /// integer, any other column mixing integers and reals becomes real.
    /// Columns containing text are left alone.
    pub fn normalize_numeric_columns(&mut self) {
        for col in 0..self.columns.len() {
            if self.column_type(col) != ColumnType::Real {
                continue;
            }
            let whole = self.column_values(col).all(|value| match value {
                Value::Real(r) => r.fract() == 0.0 && r.abs() < i64::MAX as f64,
                _ => true,
            });
            for row in &mut self.rows {
                row[col] = match row[col] {
                    Value::Real(r) if whole => Value::Integer(r as i64),
                    Value::Integer(i) if !whole => Value::Real(i as f64),
                    _ => continue,
                };
            }
        }
    }

    /// Display width of a column: widest of header and cells, clamped to 3..=50.
    pub fn column_width(&self, col: usize) -> usize {
        let header_width = self.columns.get(col).map(|c| c.chars().count()).unwrap_or(0);
        let content_width = self
            .column_values(col)
            .map(|v| v.to_string().chars().count())
            .max()
            .unwrap_or(0);
        header_width.max(content_width).max(3).min(50)
    }
}
