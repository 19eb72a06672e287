//! Database schema definitions
//!
//! All DDL is generated from the field catalog so the table shape can
//! never drift from the statements that read and write it.

use crate::Result;
use crate::fields::SchemaVariant;
use rusqlite::Connection;

/// Name of the single person table
pub const TABLE: &str = "pessoas";

/// SQL to create the person table for the given field set
pub fn create_table_sql(variant: SchemaVariant) -> String {
    let mut columns = vec!["id INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
    for field in variant.fields() {
        if field.natural_key {
            columns.push(format!("{} TEXT NOT NULL UNIQUE", field.column));
        } else {
            columns.push(format!("{} TEXT", field.column));
        }
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        TABLE,
        columns.join(",\n    ")
    )
}

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] =
    &["CREATE INDEX IF NOT EXISTS idx_pessoas_nome ON pessoas(nome)"];

/// Idempotently guarantee the table and indexes exist.
///
/// Safe to invoke on every process start; does not alter an existing
/// incompatible table (schema mismatches are a deployment concern).
pub fn ensure_schema(conn: &Connection, variant: SchemaVariant) -> Result<()> {
    conn.execute(&create_table_sql(variant), [])?;
    for stmt in CREATE_INDEXES {
        conn.execute(stmt, [])?;
    }
    Ok(())
}
