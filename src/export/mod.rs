//! Record exporters
//!
//! Writes scraped records to JSON, CSV, XLSX or SQLite. The format set is
//! closed: a format is resolved from a name or file extension through one
//! lookup that returns a typed error for unknown names. Tabular formats share
//! a column layout: the union of keys across all records in first-seen order,
//! with sequences serialized as their JSON representation.

mod csv_export;
mod json;
mod sqlite_export;
mod xlsx;

pub use csv_export::write_csv;
pub use json::{read_json, write_json};
pub use sqlite_export::write_sqlite;
pub use xlsx::write_xlsx;

use crate::schema::Record;
use std::path::Path;
use thiserror::Error;

/// Errors from export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;

/// The closed set of supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Xlsx,
    Sqlite,
}

impl ExportFormat {
    /// Resolves a format from a name or file extension
    pub fn from_name(name: &str) -> ExportResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" | "xls" => Ok(ExportFormat::Xlsx),
            "sqlite" | "sqlite3" | "db" => Ok(ExportFormat::Sqlite),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }

    /// Resolves a format from a path's extension; no extension means JSON
    pub fn from_path(path: &Path) -> ExportResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::from_name(ext),
            None => Ok(ExportFormat::Json),
        }
    }
}

/// Exports records to a path, dispatching on its extension
pub fn export_records(records: &[Record], path: &Path) -> ExportResult<()> {
    let format = ExportFormat::from_path(path)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    tracing::info!(
        "Exporting {} records to {} ({:?})",
        records.len(),
        path.display(),
        format
    );

    match format {
        ExportFormat::Json => write_json(records, path),
        ExportFormat::Csv => write_csv(records, path),
        ExportFormat::Xlsx => write_xlsx(records, path),
        ExportFormat::Sqlite => write_sqlite(records, path),
    }
}

/// The union of keys across all records, in first-seen order
pub(crate) fn column_union(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;

    #[test]
    fn test_format_from_name() {
        assert_eq!(ExportFormat::from_name("json").unwrap(), ExportFormat::Json);
        assert_eq!(ExportFormat::from_name("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_name("xls").unwrap(), ExportFormat::Xlsx);
        assert_eq!(
            ExportFormat::from_name("sqlite3").unwrap(),
            ExportFormat::Sqlite
        );
        assert!(matches!(
            ExportFormat::from_name("parquet").unwrap_err(),
            ExportError::UnknownFormat(_)
        ));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ExportFormat::from_path(Path::new("out/data.csv")).unwrap(),
            ExportFormat::Csv
        );
        assert_eq!(
            ExportFormat::from_path(Path::new("plain")).unwrap(),
            ExportFormat::Json
        );
    }

    #[test]
    fn test_column_union_first_seen_order() {
        let mut a = Record::new();
        a.insert("title".to_string(), Value::Text("t".to_string()));
        a.insert("url".to_string(), Value::Text("u".to_string()));

        let mut b = Record::new();
        b.insert("price".to_string(), Value::Float(1.0));
        b.insert("title".to_string(), Value::Text("t2".to_string()));

        let columns = column_union(&[a, b]);
        assert_eq!(columns, vec!["title", "url", "price"]);
    }

    #[test]
    fn test_column_union_empty() {
        assert!(column_union(&[]).is_empty());
    }
}
