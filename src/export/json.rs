use crate::export::ExportResult;
use crate::schema::Record;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Writes records as a pretty-printed JSON array
pub fn write_json(records: &[Record], path: &Path) -> ExportResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    Ok(())
}

/// Reads records back from a JSON array file
pub fn read_json(path: &Path) -> ExportResult<Vec<Record>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
