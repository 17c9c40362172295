use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, instrument};

use crate::consolidate::{FieldCandidates, Priority};
use crate::error::Result;
use crate::model::{COMMON_SCHEMA, Cell, JOIN_KEY, Source, Table};

const STAGE: &str = "merging sources";

/// One row of the merged result: the join key plus, per source, the index of
/// the contributing row in that source's table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub key: String,
    slots: [Option<usize>; 3],
}

impl MergedRow {
    fn single(source: Source, index: usize, key: String) -> Self {
        let mut slots = [None; 3];
        slots[slot(source)] = Some(index);
        Self { key, slots }
    }

    /// Row index contributed by `source`, if that source matched.
    pub fn row_of(&self, source: Source) -> Option<usize> {
        self.slots[slot(source)]
    }
}

fn slot(source: Source) -> usize {
    match source {
        Source::Facebook => 0,
        Source::Google => 1,
        Source::Website => 2,
    }
}

/// Outcome of joining the three cleaned sources on `domain_name`. The
/// source tables are kept intact and each merged row points back into them,
/// so the provenance of every value stays explicit.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTable {
    tables: [Table; 3],
    rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn rows(&self) -> &[MergedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The cleaned table contributed by `source`.
    pub fn table(&self, source: Source) -> &Table {
        &self.tables[slot(source)]
    }

    /// Value of `field` from `source` for the given merged row. `None` when
    /// the source did not match the row or does not carry the field.
    pub fn value(&self, row: &MergedRow, source: Source, field: &str) -> Cell {
        let index = row.row_of(source)?;
        self.table(source).value(index, field).map(str::to_string)
    }

    /// Per-source values of one field for one row, in priority order.
    pub fn candidates(&self, row: &MergedRow, field: &str, priority: &Priority) -> FieldCandidates {
        FieldCandidates {
            field: field.to_string(),
            values: priority
                .iter()
                .map(|source| (source, self.value(row, source, field)))
                .collect(),
        }
    }

    /// Columns of the unified output: the common schema followed by any other
    /// source column, in first-seen order across facebook, google, website.
    pub fn output_columns(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = COMMON_SCHEMA.iter().copied().collect();
        let mut columns: Vec<String> = COMMON_SCHEMA.iter().map(|c| c.to_string()).collect();
        for table in &self.tables {
            for column in &table.columns {
                if seen.insert(column.as_str()) {
                    columns.push(column.clone());
                }
            }
        }
        columns
    }

    /// Renders the merge as one wide table with provenance encoded in column
    /// names: columns shared by facebook and google carry `_facebook` and
    /// `_google` suffixes, website columns keep their base name unless that
    /// name is already taken, in which case they get `_website`.
    pub fn suffixed_view(&self) -> Table {
        let [facebook, google, website] = &self.tables;
        let fb_names: HashSet<&str> = facebook.columns.iter().map(String::as_str).collect();
        let google_names: HashSet<&str> = google.columns.iter().map(String::as_str).collect();

        let mut layout: Vec<(String, Option<(Source, String)>)> = Vec::new();
        let mut push_side = |source: Source, table: &Table, suffix: &str, other: &HashSet<&str>| {
            for column in &table.columns {
                if column == JOIN_KEY {
                    if !layout.iter().any(|(name, _)| name == JOIN_KEY) {
                        layout.push((JOIN_KEY.to_string(), None));
                    }
                    continue;
                }
                let name = if other.contains(column.as_str()) {
                    format!("{column}{suffix}")
                } else {
                    column.clone()
                };
                layout.push((name, Some((source, column.clone()))));
            }
        };
        push_side(Source::Facebook, facebook, "_facebook", &google_names);
        push_side(Source::Google, google, "_google", &fb_names);

        let taken: HashSet<String> = layout.iter().map(|(name, _)| name.clone()).collect();
        for column in &website.columns {
            if column == JOIN_KEY {
                if !taken.contains(JOIN_KEY) {
                    layout.push((JOIN_KEY.to_string(), None));
                }
                continue;
            }
            let name = if taken.contains(column) {
                format!("{column}_website")
            } else {
                column.clone()
            };
            layout.push((name, Some((Source::Website, column.clone()))));
        }

        let mut view = Table::new(layout.iter().map(|(name, _)| name.clone()));
        for row in &self.rows {
            let cells = layout
                .iter()
                .map(|(_, origin)| match origin {
                    None => Some(row.key.clone()),
                    Some((source, column)) => self.value(row, *source, column),
                })
                .collect();
            view.push_row(cells);
        }
        view
    }
}

/// Full outer join of the three cleaned sources on `domain_name`: facebook
/// with google first, then the result with website. Every source row appears
/// in the result; keys shared by several rows produce their cross product.
/// Rows are ordered by key, then by left and right input order.
#[instrument(
    level = "info",
    skip_all,
    fields(facebook = facebook.len(), google = google.len(), website = website.len())
)]
pub fn merge(facebook: Table, google: Table, website: Table) -> Result<MergedTable> {
    let facebook_keys = join_keys(&facebook)?;
    let google_keys = join_keys(&google)?;
    let website_keys = join_keys(&website)?;

    let rows = facebook_keys
        .into_iter()
        .enumerate()
        .map(|(index, key)| MergedRow::single(Source::Facebook, index, key))
        .collect();
    let rows = outer_join(rows, Source::Google, google_keys);
    debug!(rows = rows.len(), "facebook and google joined");
    let rows = outer_join(rows, Source::Website, website_keys);
    info!(rows = rows.len(), "sources merged");

    Ok(MergedTable {
        tables: [facebook, google, website],
        rows,
    })
}

/// Join key of every row. Missing keys are treated as empty strings, so they
/// match each other like any other value.
fn join_keys(table: &Table) -> Result<Vec<String>> {
    let index = table.require_column(JOIN_KEY, STAGE)?;
    Ok(table
        .column_values(index)
        .map(|cell| cell.clone().unwrap_or_default())
        .collect())
}

fn outer_join(left: Vec<MergedRow>, source: Source, right_keys: Vec<String>) -> Vec<MergedRow> {
    let mut groups: BTreeMap<String, (Vec<MergedRow>, Vec<usize>)> = BTreeMap::new();
    for row in left {
        groups.entry(row.key.clone()).or_default().0.push(row);
    }
    for (index, key) in right_keys.into_iter().enumerate() {
        groups.entry(key).or_default().1.push(index);
    }

    let mut joined = Vec::new();
    for (key, (lefts, rights)) in groups {
        if rights.is_empty() {
            joined.extend(lefts);
        } else if lefts.is_empty() {
            joined.extend(
                rights
                    .into_iter()
                    .map(|index| MergedRow::single(source, index, key.clone())),
            );
        } else {
            for left_row in &lefts {
                for &index in &rights {
                    let mut row = left_row.clone();
                    row.slots[slot(source)] = Some(index);
                    joined.push(row);
                }
            }
        }
    }
    joined
}
