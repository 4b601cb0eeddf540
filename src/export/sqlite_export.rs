use crate::export::{column_union, ExportResult};
use crate::schema::{Record, Value};
use rusqlite::Connection;
use std::path::Path;

/// Writes records into a `records` table in a SQLite database.
///
/// Columns are the union of keys across all records (TEXT affinity); null and
/// missing fields become SQL NULL, sequences their JSON representation.
pub fn write_sqlite(records: &[Record], path: &Path) -> ExportResult<()> {
    let columns = column_union(records);
    let conn = Connection::open(path)?;

    if columns.is_empty() {
        tracing::warn!("No data to export, leaving database empty");
        return Ok(());
    }

    let column_defs = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS records ({})",
        column_defs
    ))?;

    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql = format!(
        "INSERT INTO records ({}) VALUES ({})",
        column_list, placeholders
    );

    let mut statement = conn.prepare(&insert_sql)?;
    for record in records {
        let row: Vec<Option<String>> = columns
            .iter()
            .map(|column| match record.get(column) {
                None | Some(Value::Null) => None,
                Some(value) => Some(value.render_cell()),
            })
            .collect();
        statement.execute(rusqlite::params_from_iter(row.iter()))?;
    }

    Ok(())
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
