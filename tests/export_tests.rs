//! Integration tests for the exporters
//!
//! Exercise the format dispatch and the tabular layout rules through the
//! public `export_records` entry point.

use webharvest::export::{export_records, read_json, ExportError};
use webharvest::schema::{Record, Value};

fn record_of(fields: &[(&str, Value)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn sample_records() -> Vec<Record> {
    vec![
        record_of(&[
            ("title", Value::Text("First".to_string())),
            ("price", Value::Float(9.99)),
            (
                "links",
                Value::Many(vec![
                    Value::Text("/a".to_string()),
                    Value::Text("/b".to_string()),
                ]),
            ),
        ]),
        record_of(&[
            ("title", Value::Text("Second".to_string())),
            ("stock", Value::Int(4)),
        ]),
    ]
}

#[test]
fn test_json_export_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");

    let records = sample_records();
    export_records(&records, &path).unwrap();

    assert_eq!(read_json(&path).unwrap(), records);
}

#[test]
fn test_csv_export_union_header_and_empty_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    export_records(&sample_records(), &path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next().unwrap(), "links,price,title,stock");

    let first = lines.next().unwrap();
    assert!(first.contains("First"));
    assert!(first.ends_with(',') , "missing stock column should be empty: {}", first);

    let second = lines.next().unwrap();
    assert!(second.starts_with(",,"), "missing links/price should be empty: {}", second);
    assert!(second.ends_with('4'));
}

#[test]
fn test_xlsx_export_writes_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.xlsx");

    export_records(&sample_records(), &path).unwrap();
    assert!(std::fs::metadata(&path).unwrap().len() > 0);
}

#[test]
fn test_sqlite_export_writes_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.db");

    export_records(&sample_records(), &path).unwrap();

    let conn = rusqlite::Connection::open(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn test_unknown_extension_is_typed_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.parquet");

    let result = export_records(&sample_records(), &path);
    assert!(matches!(result.unwrap_err(), ExportError::UnknownFormat(_)));
}

#[test]
fn test_export_creates_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/deep/out.json");

    export_records(&sample_records(), &path).unwrap();
    assert!(path.exists());
}
