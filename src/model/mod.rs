use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};

/// Column used to join the three sources.
pub const JOIN_KEY: &str = "domain_name";

/// Unified column set every source is normalised onto, in output order.
pub const COMMON_SCHEMA: [&str; 7] = [
    "company_name",
    "domain_name",
    "category",
    "phone_number",
    "country",
    "region",
    "city",
];

/// A single table cell. `None` marks a missing value, which is distinct from
/// an empty string.
pub type Cell = Option<String>;

/// One of the three known business data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Facebook,
    Google,
    Website,
}

impl Source {
    /// All sources in their default priority order.
    pub const ALL: [Source; 3] = [Source::Facebook, Source::Google, Source::Website];

    /// Lowercase tag used in file names and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Facebook => "facebook",
            Source::Google => "google",
            Source::Website => "website",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "facebook" => Ok(Source::Facebook),
            "google" => Ok(Source::Google),
            "website" => Ok(Source::Website),
            other => Err(ToolError::UnknownSource(other.to_string())),
        }
    }
}

/// Fully materialised, row-oriented table of text cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given header.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row, padding with missing cells or truncating so that it
    /// matches the header width.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Like [`Table::column_index`] but fails with a missing-column error
    /// tagged with the stage that needed it.
    pub fn require_column(&self, name: &str, stage: &'static str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| ToolError::MissingColumn {
                column: name.to_string(),
                stage,
            })
    }

    /// Cell at the given row and column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)?.as_deref()
    }

    /// Iterates over the cells of one column.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Returns a copy with columns renamed according to `mapping`. Columns
    /// without an entry keep their name.
    pub fn rename_columns(mut self, mapping: &HashMap<&str, &str>) -> Self {
        for column in &mut self.columns {
            if let Some(target) = mapping.get(column.as_str()) {
                *column = (*target).to_string();
            }
        }
        self
    }

    /// Applies `f` to every cell of the column at `index`.
    pub fn map_column<F>(mut self, index: usize, mut f: F) -> Self
    where
        F: FnMut(Cell) -> Cell,
    {
        for row in &mut self.rows {
            let cell = row[index].take();
            row[index] = f(cell);
        }
        self
    }

    /// Replaces every missing cell with an empty string.
    pub fn fill_missing(mut self) -> Self {
        for cell in self.rows.iter_mut().flatten() {
            if cell.is_none() {
                *cell = Some(String::new());
            }
        }
        self
    }

    /// The first `n` rows as a new table.
    pub fn head(&self, n: usize) -> Table {
        Table {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

impl fmt::Display for Table {
    /// Renders an aligned text preview, showing missing cells as `NaN`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |cell: &Cell| cell.clone().unwrap_or_else(|| "NaN".to_string());
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(render(cell).chars().count());
            }
        }

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(column, &width)| format!("{column:>width$}"))
            .collect();
        writeln!(f, "{}", header.join("  "))?;

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:>width$}", render(cell)))
                .collect();
            writeln!(f, "{}", cells.join("  "))?;
        }
        Ok(())
    }
}
