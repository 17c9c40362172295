use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::error::Result;
use crate::io::write_report;
use crate::model::Table;

/// Frequency of each non-empty value in `column`, most frequent first. Ties
/// keep the order in which values first appear. Absent columns yield no
/// entries.
pub fn value_counts(table: &Table, column: &str) -> Vec<(String, usize)> {
    let Some(index) = table.column_index(column) else {
        return Vec::new();
    };

    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in table.column_values(index).filter_map(|cell| cell.as_deref()) {
        if value.is_empty() {
            continue;
        }
        match positions.get(value) {
            Some(&position) => counts[position].1 += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    counts.sort_by(|lhs, rhs| rhs.1.cmp(&lhs.1));
    counts
}

/// Turns a value distribution into an artefact on disk, such as a bar chart.
pub trait DistributionRenderer {
    /// Renders the distribution of `column` into `output_dir` and returns the
    /// path written.
    fn render(
        &self,
        column: &str,
        counts: &[(String, usize)],
        output_dir: &Path,
    ) -> Result<PathBuf>;
}

/// Renderer writing `{column}_distribution.csv` frequency tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDistributionRenderer;

impl DistributionRenderer for CsvDistributionRenderer {
    fn render(
        &self,
        column: &str,
        counts: &[(String, usize)],
        output_dir: &Path,
    ) -> Result<PathBuf> {
        let path = output_dir.join(format!("{column}_distribution.csv"));
        write_report(
            &path,
            column,
            "count",
            counts.iter().map(|(value, count)| (value.as_str(), *count)),
        )?;
        Ok(path)
    }
}

/// Renders the distribution of every requested column.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub fn render_distributions(
    table: &Table,
    columns: &[String],
    renderer: &dyn DistributionRenderer,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(columns.len());
    for column in columns {
        let counts = value_counts(table, column);
        let path = renderer.render(column, &counts, output_dir)?;
        info!(
            column = %column,
            distinct = counts.len(),
            path = %path.display(),
            "distribution rendered"
        );
        written.push(path);
    }
    Ok(written)
}
