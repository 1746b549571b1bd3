//! Named-table storage on top of a single SQLite file.
//!
//! Every call opens its own connection and drops it before returning, so no
//! connection or lock outlives a single operation.

use crate::domain::{DataError, DataResult, Table, Value, WriteMode};
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

impl From<rusqlite::Error> for DataError {
    fn from(err: rusqlite::Error) -> Self {
        DataError::Store(err.to_string())
    }
}

/// Quotes a table or column name as an SQLite identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Real(r) => SqlValue::Real(*r),
        Value::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn from_sql(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Value::Text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Accessor for the on-disk table store.
#[derive(Debug, Clone)]
pub struct TableStore {
    path: PathBuf,
}

impl TableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> DataResult<Connection> {
        Connection::open(&self.path).map_err(|e| {
            DataError::Store(format!("cannot open store {}: {}", self.path.display(), e))
        })
    }

    /// Names of all user tables, sorted.
    pub fn list_tables(&self) -> DataResult<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(store = %self.path.display(), count = names.len(), "listed tables");
        Ok(names)
    }

    /// Whether `name` is stored. Table names match without regard to ASCII case,
    /// as SQLite resolves them.
    pub fn table_exists(&self, name: &str) -> DataResult<bool> {
        let conn = self.connect()?;
        Self::exists_on(&conn, name)
    }

    fn exists_on(conn: &Connection, name: &str) -> DataResult<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn stored_columns(conn: &Connection, name: &str) -> DataResult<Vec<String>> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(name)))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Reads every row of `name` in storage order.
    pub fn load_table(&self, name: &str) -> DataResult<Table> {
        let conn = self.connect()?;
        if !Self::exists_on(&conn, name)? {
            return Err(DataError::Store(format!("no such table: {}", name)));
        }

        let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(name)))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut table = Table::new(columns);
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(from_sql(row.get_ref(idx)?));
            }
            table.push_row(values);
        }

        debug!(table = name, rows = table.row_count(), "loaded table");
        Ok(table)
    }

    pub fn row_count(&self, name: &str) -> DataResult<usize> {
        let conn = self.connect()?;
        if !Self::exists_on(&conn, name)? {
            return Err(DataError::Store(format!("no such table: {}", name)));
        }
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(name)),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Writes `table` into the store under `name`.
    ///
    /// `Replace` drops and recreates the table. `Append` keeps the stored rows
    /// and adds the new ones after them; the column sets must match (in any
    /// order) or nothing is written. Appending to a missing table creates it.
    /// Each call runs in one transaction.
    pub fn write_table(&self, name: &str, table: &Table, mode: WriteMode) -> DataResult<()> {
        if name.trim().is_empty() {
            return Err(DataError::Store("table name must not be empty".to_string()));
        }
        if table.column_count() == 0 {
            return Err(DataError::Store(format!(
                "cannot write table '{}' without columns",
                name
            )));
        }

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let exists = Self::exists_on(&tx, name)?;

        match mode {
            WriteMode::Replace => {
                tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(name)), [])?;
                Self::create(&tx, name, table)?;
            }
            WriteMode::Append if exists => {
                let stored = Self::stored_columns(&tx, name)?;
                if !same_column_set(&stored, table.columns()) {
                    return Err(DataError::schema_mismatch(name, &stored, table.columns()));
                }
            }
            WriteMode::Append => Self::create(&tx, name, table)?,
        }

        {
            let column_list = table
                .columns()
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ");
            let placeholders = (1..=table.column_count())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let mut insert = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(name),
                column_list,
                placeholders
            ))?;
            for row in table.rows() {
                insert.execute(params_from_iter(row.iter().map(to_sql)))?;
            }
        }

        tx.commit()?;
        debug!(table = name, %mode, rows = table.row_count(), "wrote table");
        Ok(())
    }

    fn create(conn: &Connection, name: &str, table: &Table) -> DataResult<()> {
        let definitions = table
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                format!("{} {}", quote_ident(column), table.column_type(idx).sql_type())
            })
            .collect::<Vec<_>>()
            .join(", ");
        conn.execute(
            &format!("CREATE TABLE {} ({})", quote_ident(name), definitions),
            [],
        )?;
        Ok(())
    }
}

/// Column names compare like SQLite identifiers: ASCII case-insensitive.
fn same_column_set(stored: &[String], incoming: &[String]) -> bool {
    let mut stored: Vec<String> = stored.iter().map(|c| c.to_ascii_lowercase()).collect();
    let mut incoming: Vec<String> = incoming.iter().map(|c| c.to_ascii_lowercase()).collect();
    stored.sort();
    incoming.sort();
    stored == incoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn store() -> (TempDir, TableStore) {
        let dir = TempDir::new().unwrap();
        let store = TableStore::new(dir.path().join("test.db"));
        (dir, store)
    }

    fn sales() -> Table {
        Table::from_rows(
            vec!["name".to_string(), "age".to_string()],
            vec![
                vec![text("a"), Value::Integer(10)],
                vec![text("b"), Value::Integer(20)],
            ],
        )
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_replace_then_load() {
        let (_dir, store) = store();
        store.write_table("sales", &sales(), WriteMode::Replace).unwrap();

        let loaded = store.load_table("sales").unwrap();
        assert_eq!(loaded, sales());
        assert_eq!(store.row_count("sales").unwrap(), 2);
    }

    #[test]
    fn test_replace_discards_previous_rows_and_columns() {
        let (_dir, store) = store();
        store.write_table("sales", &sales(), WriteMode::Replace).unwrap();

        let other = Table::from_rows(vec!["amount".to_string()], vec![vec![Value::Real(1.5)]]);
        store.write_table("sales", &other, WriteMode::Replace).unwrap();

        assert_eq!(store.load_table("sales").unwrap(), other);
    }

    #[test]
    fn test_append_keeps_existing_rows_first() {
        let (_dir, store) = store();
        store.write_table("sales", &sales(), WriteMode::Replace).unwrap();

        let incoming = Table::from_rows(
            vec!["name".to_string(), "age".to_string()],
            vec![
                vec![text("c"), Value::Integer(30)],
                vec![text("d"), Value::Integer(40)],
                vec![text("e"), Value::Integer(50)],
            ],
        );
        store.write_table("sales", &incoming, WriteMode::Append).unwrap();

        let loaded = store.load_table("sales").unwrap();
        assert_eq!(loaded.row_count(), 5);
        let names: Vec<String> = loaded.column_values(0).map(|v| v.to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_append_matches_columns_by_name() {
        let (_dir, store) = store();
        store.write_table("sales", &sales(), WriteMode::Replace).unwrap();

        let reordered = Table::from_rows(
            vec!["age".to_string(), "name".to_string()],
            vec![vec![Value::Integer(30), text("c")]],
        );
        store.write_table("sales", &reordered, WriteMode::Append).unwrap();

        let loaded = store.load_table("sales").unwrap();
        assert_eq!(loaded.columns(), &["name".to_string(), "age".to_string()]);
        assert_eq!(loaded.cell(2, 0), &text("c"));
        assert_eq!(loaded.cell(2, 1), &Value::Integer(30));
    }

    #[test]
    fn test_append_with_different_columns_fails_without_writing() {
        let (_dir, store) = store();
        store.write_table("sales", &sales(), WriteMode::Replace).unwrap();

        let mismatched = Table::from_rows(vec!["name".to_string()], vec![vec![text("z")]]);
        let err = store
            .write_table("sales", &mismatched, WriteMode::Append)
            .unwrap_err();

        assert!(matches!(err, DataError::SchemaMismatch { .. }));
        assert_eq!(store.row_count("sales").unwrap(), 2);
    }

    #[test]
    fn test_table_names_and_columns_ignore_case() {
        let (_dir, store) = store();
        store.write_table("sales", &sales(), WriteMode::Replace).unwrap();

        let incoming = Table::from_rows(
            vec!["NAME".to_string(), "Age".to_string()],
            vec![vec![text("c"), Value::Integer(30)]],
        );
        store.write_table("Sales", &incoming, WriteMode::Append).unwrap();

        assert!(store.table_exists("SALES").unwrap());
        assert_eq!(store.list_tables().unwrap(), vec!["sales"]);
        let loaded = store.load_table("Sales").unwrap();
        assert_eq!(loaded.columns(), &["name".to_string(), "age".to_string()]);
        assert_eq!(loaded.row_count(), 3);
        assert_eq!(loaded.cell(2, 0), &text("c"));
        assert_eq!(store.row_count("SaLeS").unwrap(), 3);
    }

    #[test]
    fn test_append_creates_missing_table() {
        let (_dir, store) = store();
        store.write_table("fresh", &sales(), WriteMode::Append).unwrap();
        assert_eq!(store.row_count("fresh").unwrap(), 2);
    }

    #[test]
    fn test_list_tables_sorted() {
        let (_dir, store) = store();
        assert!(store.list_tables().unwrap().is_empty());

        store.write_table("zeta", &sales(), WriteMode::Replace).unwrap();
        store.write_table("alpha", &sales(), WriteMode::Replace).unwrap();

        assert_eq!(store.list_tables().unwrap(), vec!["alpha", "zeta"]);
        assert!(store.table_exists("zeta").unwrap());
        assert!(!store.table_exists("missing").unwrap());
    }

    #[test]
    fn test_load_missing_table_is_store_error() {
        let (_dir, store) = store();
        let err = store.load_table("missing").unwrap_err();
        assert_eq!(err, DataError::Store("no such table: missing".to_string()));
    }

    #[test]
    fn test_unopenable_store_is_store_error() {
        let dir = TempDir::new().unwrap();
        let store = TableStore::new(dir.path().join("no/such/dir/test.db"));
        assert!(matches!(store.list_tables(), Err(DataError::Store(_))));
    }

    #[test]
    fn test_rejects_empty_name_and_columnless_table() {
        let (_dir, store) = store();
        assert!(store.write_table(" ", &sales(), WriteMode::Replace).is_err());
        assert!(store
            .write_table("t", &Table::default(), WriteMode::Replace)
            .is_err());
        assert!(!store.table_exists("t").unwrap());
    }

    #[test]
    fn test_nulls_and_reals_round_trip() {
        let (_dir, store) = store();
        let table = Table::from_rows(
            vec!["odd \"name\"".to_string(), "r".to_string()],
            vec![vec![Value::Null, Value::Real(2.5)]],
        );
        store.write_table("weird table", &table, WriteMode::Replace).unwrap();
        assert_eq!(store.load_table("weird table").unwrap(), table);
    }
}
