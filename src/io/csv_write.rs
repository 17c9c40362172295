use std::path::Path;

use csv::WriterBuilder;

use crate::error::Result;
use crate::model::Table;

/// Writes the table as comma-separated values with a header line and no
/// index column. Missing cells are written as empty fields.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(&table.columns)?;

    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes a two-column label/value report. The header's first cell is
/// `index_header`, typically empty.
pub fn write_report<L, V>(
    path: &Path,
    index_header: &str,
    value_header: &str,
    entries: impl IntoIterator<Item = (L, V)>,
) -> Result<()>
where
    L: AsRef<str>,
    V: ToString,
{
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record([index_header, value_header])?;

    for (label, value) in entries {
        writer.write_record([label.as_ref(), value.to_string().as_str()])?;
    }

    writer.flush()?;
    Ok(())
}
