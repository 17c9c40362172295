use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::error::{Result, ToolError};
use crate::model::{Cell, Table};

/// Outcome of reading one delimited file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadReport {
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Reads a delimited file into a [`Table`]. Malformed rows are skipped
/// rather than aborting the read.
pub fn read_table(path: &Path, delimiter: u8) -> Result<(Table, ReadReport)> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let file = File::open(path)?;
    read_table_from_reader(file, delimiter)
}

/// Reads delimited data from any reader. The first record is the header;
/// empty fields become missing cells. Records wider than the header, or
/// records that fail to decode, are skipped. Narrower records are padded with
/// missing cells.
pub fn read_table_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<(Table, ReadReport)> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut table = Table::new(headers.iter());
    let mut report = ReadReport::default();

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                debug!(line = line + 2, %error, "skipping undecodable row");
                report.rows_skipped += 1;
                continue;
            }
        };

        if record.len() > headers.len() {
            debug!(
                line = line + 2,
                expected = headers.len(),
                found = record.len(),
                "skipping row with too many fields"
            );
            report.rows_skipped += 1;
            continue;
        }

        table.push_row(record_to_cells(&record));
        report.rows_read += 1;
    }

    if report.rows_skipped > 0 {
        warn!(
            skipped = report.rows_skipped,
            read = report.rows_read,
            "malformed rows were skipped"
        );
    }

    Ok((table, report))
}

fn record_to_cells(record: &StringRecord) -> Vec<Cell> {
    record
        .iter()
        .map(|field| {
            if field.is_empty() {
                None
            } else {
                Some(field.to_string())
            }
        })
        .collect()
}
