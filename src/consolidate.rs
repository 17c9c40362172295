use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, ToolError};
use crate::merge::MergedTable;
use crate::model::{Cell, JOIN_KEY, Source, Table};

/// Common schema fields that more than one source provides and that need
/// resolving after the merge.
pub const CONFLICTED_FIELDS: [&str; 6] = [
    "category",
    "phone_number",
    "country",
    "region",
    "city",
    "company_name",
];

/// Order in which sources are consulted when resolving a conflicted field.
/// Every source appears exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Source>", into = "Vec<Source>")]
pub struct Priority(Vec<Source>);

impl Priority {
    pub fn new(order: Vec<Source>) -> Result<Self> {
        for source in Source::ALL {
            let occurrences = order.iter().filter(|s| **s == source).count();
            if occurrences != 1 {
                return Err(ToolError::InvalidConfig(format!(
                    "priority must list '{source}' exactly once, found {occurrences}"
                )));
            }
        }
        Ok(Self(order))
    }

    pub fn iter(&self) -> impl Iterator<Item = Source> + '_ {
        self.0.iter().copied()
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(Source::ALL.to_vec())
    }
}

impl TryFrom<Vec<Source>> for Priority {
    type Error = ToolError;

    fn try_from(order: Vec<Source>) -> Result<Self> {
        Priority::new(order)
    }
}

impl From<Priority> for Vec<Source> {
    fn from(priority: Priority) -> Self {
        priority.0
    }
}

/// The values each source holds for one field of one merged row, ordered by
/// priority.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidates {
    pub field: String,
    pub values: Vec<(Source, Cell)>,
}

impl FieldCandidates {
    /// Number of distinct non-empty values offered across sources.
    pub fn distinct_values(&self) -> usize {
        let mut distinct: Vec<&str> = self
            .values
            .iter()
            .filter_map(|(_, cell)| cell.as_deref())
            .filter(|value| !value.is_empty())
            .collect();
        distinct.sort_unstable();
        distinct.dedup();
        distinct.len()
    }
}

/// First candidate that is neither missing nor empty. A higher-priority
/// source wins outright; values are never combined. When no candidate has
/// content the result is an empty string if any source offered one, and
/// missing otherwise.
pub fn coalesce(candidates: &FieldCandidates) -> Cell {
    let mut fallback = None;
    for (_, cell) in &candidates.values {
        match cell.as_deref() {
            Some("") => fallback = Some(String::new()),
            Some(value) => return Some(value.to_string()),
            None => {}
        }
    }
    fallback
}

/// Collapses the merged sources into one unified table with a single column
/// per field and no source suffixes. The join key comes from the merge; every
/// other column is resolved with [`coalesce`], so a column offered by only one
/// source passes through unchanged.
#[instrument(level = "info", skip_all, fields(rows = merged.len()))]
pub fn consolidate(merged: &MergedTable, priority: &Priority) -> Table {
    let columns = merged.output_columns();
    let mut table = Table::new(columns.iter().cloned());

    for row in merged.rows() {
        let cells = columns
            .iter()
            .map(|column| {
                if column == JOIN_KEY {
                    Some(row.key.clone())
                } else {
                    coalesce(&merged.candidates(row, column, priority))
                }
            })
            .collect();
        table.push_row(cells);
    }

    debug!(columns = table.columns.len(), "merged rows consolidated");
    table
}

/// For each conflicted field, the number of merged rows where sources offer
/// more than one distinct non-empty value.
pub fn conflict_counts(merged: &MergedTable, priority: &Priority) -> Vec<(String, usize)> {
    CONFLICTED_FIELDS
        .iter()
        .map(|field| {
            let conflicts = merged
                .rows()
                .iter()
                .filter(|row| merged.candidates(row, field, priority).distinct_values() > 1)
                .count();
            (field.to_string(), conflicts)
        })
        .collect()
}
