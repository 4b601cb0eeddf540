use crate::export::{column_union, ExportResult};
use crate::schema::Record;
use std::path::Path;

/// Writes records as CSV.
///
/// The header is the union of keys across all records in first-seen order; a
/// record missing a column renders that cell empty. Sequence values are
/// serialized as their JSON string representation.
pub fn write_csv(records: &[Record], path: &Path) -> ExportResult<()> {
    let columns = column_union(records);

    if columns.is_empty() {
        tracing::warn!("No data to export, writing empty file");
        std::fs::write(path, "")?;
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;

    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| {
                record
                    .get(column)
                    .map(|value| value.render_cell())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}
