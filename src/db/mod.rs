//! SQLite access: schema reading and single-statement execution.
//!
//! Connections are opened and closed per call; there is no pooling and no
//! transaction beyond the implicit single statement.

pub mod seed;

use crate::types::error::{Result, ServiceError};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{Map, Number, Value};
use std::path::Path;

/// One result row: column name mapped to a JSON scalar.
pub type Row = Map<String, Value>;

/// Return all CREATE TABLE statements from the database, joined by blank lines.
pub fn schema_text(path: &Path) -> Result<String> {
    let conn = Connection::open(path)?;
    let mut stmt =
        conn.prepare("SELECT sql FROM sqlite_master WHERE type='table' AND sql IS NOT NULL")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut statements = Vec::new();
    for sql in rows {
        statements.push(sql?);
    }

    Ok(statements.join("\n\n"))
}

/// Execute a single statement and fetch every row.
///
/// The statement is executed as-is; nothing is validated or allow-listed
/// before it reaches SQLite. Any database error (syntax error, missing
/// table, constraint violation) is reported as an execution error carrying
/// the offending SQL text. The connection closes on drop, error or not.
pub fn execute(path: &Path, sql: &str) -> Result<Vec<Row>> {
    fetch_all(path, sql).map_err(|e| ServiceError::ExecutionError {
        sql: sql.to_string(),
        message: e.to_string(),
    })
}

fn fetch_all(path: &Path, sql: &str) -> rusqlite::Result<Vec<Row>> {
    let conn = Connection::open(path)?;
    let mut stmt = conn.prepare(sql)?;

    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows = stmt.query([])?;
    let mut records = Vec::new();

    while let Some(row) = rows.next()? {
        let mut record = Map::new();
        for (idx, name) in column_names.iter().enumerate() {
            record.insert(name.clone(), value_to_json(row.get_ref(idx)?));
        }
        records.push(record);
    }

    Ok(records)
}

/// Map a SQLite value to its JSON representation.
fn value_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(text) => Value::String(String::from_utf8_lossy(text).into_owned()),
        ValueRef::Blob(bytes) => {
            Value::Array(bytes.iter().map(|b| Value::Number((*b).into())).collect())
        }
    }
}
