//! Statement synthesis for one extract file
//!
//! The create statement is plain DDL built from validated identifiers and
//! type names. The insert is parameterized: every value is bound as text and
//! cast to its column's store type, e.g. `CAST($1 AS UUID)`. The literal rendering
//! exists only for diagnostics and is never executed.

use sqlx::{Postgres, QueryBuilder};

use super::models::{ColumnSpec, RowValues};

/// PostgreSQL limit on bind parameters per statement
pub const MAX_BIND_PARAMS: usize = 65_535;

/// `CREATE TABLE IF NOT EXISTS <table> (<col> <type>, ...)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStatement {
    table: String,
    columns: ColumnSpec,
}

impl CreateTableStatement {
    pub fn new(table: impl Into<String>, columns: ColumnSpec) -> Self {
        Self {
            table: table.into(),
            columns,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &ColumnSpec {
        &self.columns
    }

    pub fn sql(&self) -> String {
        let definitions: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.store_type))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table,
            definitions.join(", ")
        )
    }
}

impl std::fmt::Display for CreateTableStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Bulk insert of every encoded row of a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: String,
    columns: ColumnSpec,
    rows: Vec<RowValues>,
}

impl InsertStatement {
    pub fn new(table: impl Into<String>, columns: ColumnSpec, rows: Vec<RowValues>) -> Self {
        Self {
            table: table.into(),
            columns,
            rows,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn rows(&self) -> &[RowValues] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows per statement that keep bind parameters within the server limit
    pub fn rows_per_chunk(&self) -> usize {
        (MAX_BIND_PARAMS / self.columns.len().max(1)).max(1)
    }

    pub fn chunks(&self) -> std::slice::Chunks<'_, RowValues> {
        self.rows.chunks(self.rows_per_chunk())
    }

    fn prefix(&self) -> String {
        let names: Vec<&str> = self.columns.names().collect();
        format!("INSERT INTO {} ({}) ", self.table, names.join(","))
    }

    /// Parameterized insert for `rows`, which must belong to this statement
    pub fn query_builder<'a>(&'a self, rows: &'a [RowValues]) -> QueryBuilder<'a, Postgres> {
        let mut builder = QueryBuilder::new(self.prefix());
        builder.push_values(rows, |mut b, row| {
            for (value, column) in row.iter().zip(self.columns.iter()) {
                b.push("CAST(")
                    .push_bind_unseparated(value.as_deref())
                    .push_unseparated(format!(" AS {})", column.store_type));
            }
        });
        builder
    }

    /// Parameterized text for all rows in one statement
    pub fn placeholder_sql(&self) -> String {
        self.query_builder(&self.rows).sql().to_string()
    }

    /// `INSERT INTO <table> (<cols>) VALUES ('v',...),(...);` with quotes doubled
    pub fn literal_sql(&self) -> String {
        let tuples: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| literal(v.as_deref())).collect();
                format!("({})", values.join(","))
            })
            .collect();
        format!("{}VALUES {};", self.prefix(), tuples.join(","))
    }
}

fn literal(value: Option<&str>) -> String {
    match value {
        Some(v) => format!("'{}'", v.replace('\'', "''")),
        None => "NULL".to_string(),
    }
}
