use crate::export::{column_union, ExportResult};
use crate::schema::Record;
use rust_xlsxwriter::Workbook;
use std::path::Path;

/// Writes records as an XLSX workbook with one worksheet.
///
/// Same tabular layout as the CSV exporter: union-of-keys header, empty cells
/// for missing columns, sequences as JSON strings.
pub fn write_xlsx(records: &[Record], path: &Path) -> ExportResult<()> {
    let columns = column_union(records);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, name)?;
    }

    for (row, record) in records.iter().enumerate() {
        for (col, name) in columns.iter().enumerate() {
            let cell = record
                .get(name)
                .map(|value| value.render_cell())
                .unwrap_or_default();
            if !cell.is_empty() {
                worksheet.write_string((row + 1) as u32, col as u16, &cell)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Value;

    #[test]
    fn test_write_xlsx_creates_file() {
        let mut record = Record::new();
        record.insert("title".to_string(), Value::Text("A".to_string()));
        record.insert("count".to_string(), Value::Int(3));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        write_xlsx(&[record], &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_write_xlsx_empty_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_xlsx(&[], &path).unwrap();
        assert!(path.exists());
    }
}
