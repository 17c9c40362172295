use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tracing::{info, instrument};

use crate::error::Result;
use crate::io::{write_report, write_table};
use crate::model::{COMMON_SCHEMA, Cell, Table};

/// Statistic labels in the order they appear in a description report.
pub const STATISTICS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// Summary statistics of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Categorical {
        count: usize,
        unique: usize,
        top: Option<String>,
        freq: Option<usize>,
    },
    Numeric {
        count: usize,
        mean: f64,
        std: Option<f64>,
        min: f64,
        q1: f64,
        median: f64,
        q3: f64,
        max: f64,
    },
}

impl ColumnSummary {
    /// Rendered value for one of the [`STATISTICS`] labels; empty when the
    /// statistic does not apply to this column.
    pub fn statistic(&self, label: &str) -> String {
        match self {
            ColumnSummary::Categorical {
                count,
                unique,
                top,
                freq,
            } => match label {
                "count" => count.to_string(),
                "unique" => unique.to_string(),
                "top" => top.clone().unwrap_or_default(),
                "freq" => freq.map(|f| f.to_string()).unwrap_or_default(),
                _ => String::new(),
            },
            ColumnSummary::Numeric {
                count,
                mean,
                std,
                min,
                q1,
                median,
                q3,
                max,
            } => match label {
                "count" => format_float(*count as f64),
                "mean" => format_float(*mean),
                "std" => std.map(format_float).unwrap_or_default(),
                "min" => format_float(*min),
                "25%" => format_float(*q1),
                "50%" => format_float(*median),
                "75%" => format_float(*q3),
                "max" => format_float(*max),
                _ => String::new(),
            },
        }
    }
}

/// Per-column descriptive statistics of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    pub columns: Vec<(String, ColumnSummary)>,
}

impl Description {
    pub fn summary(&self, column: &str) -> Option<&ColumnSummary> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, summary)| summary)
    }

    /// Lays the description out as a table: one row per statistic, one
    /// column per described column, labels in the leading unnamed column.
    pub fn to_table(&self) -> Table {
        let mut header = vec![String::new()];
        header.extend(self.columns.iter().map(|(name, _)| name.clone()));
        let mut table = Table::new(header);

        for label in STATISTICS {
            if !self.is_reported(label) {
                continue;
            }
            let mut row: Vec<Cell> = vec![Some(label.to_string())];
            row.extend(
                self.columns
                    .iter()
                    .map(|(_, summary)| Some(summary.statistic(label))),
            );
            table.push_row(row);
        }
        table
    }

    fn is_reported(&self, label: &str) -> bool {
        self.columns.iter().any(|(_, summary)| {
            matches!(
                (summary, label),
                (_, "count")
                    | (ColumnSummary::Categorical { .. }, "unique" | "top" | "freq")
                    | (
                        ColumnSummary::Numeric { .. },
                        "mean" | "std" | "min" | "25%" | "50%" | "75%" | "max"
                    )
            )
        })
    }
}

/// Paths and headline numbers produced by [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSummary {
    pub name: String,
    pub description_path: PathBuf,
    pub missing_path: PathBuf,
    pub empty_path: PathBuf,
    pub missing_total: usize,
    pub empty_total: usize,
}

/// Builds a text-typed frame from a table. Missing cells become nulls and
/// repeated header names get a numeric suffix so the frame accepts them.
pub fn to_frame(table: &Table) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(table.columns.len());
    for (idx, header) in frame_headers(&table.columns).iter().enumerate() {
        let values: Vec<Option<&str>> = table.column_values(idx).map(|c| c.as_deref()).collect();
        columns.push(Series::new(header.as_str().into(), values).into());
    }
    Ok(DataFrame::new(columns)?)
}

fn frame_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            let count = seen.entry(header.as_str()).or_insert(0);
            *count += 1;
            if *count == 1 {
                header.clone()
            } else {
                format!("{header}__{count}")
            }
        })
        .collect()
}

/// Computes descriptive statistics for every column. Common schema fields
/// are always text. Any other column is numeric when it has at least one
/// value and every value parses as a finite number.
pub fn describe(table: &Table) -> Result<Description> {
    describe_frame(&table.columns, &to_frame(table)?)
}

fn describe_frame(names: &[String], frame: &DataFrame) -> Result<Description> {
    let columns = names
        .iter()
        .zip(frame.get_columns())
        .map(|(name, column)| {
            let series = column.as_materialized_series();
            let summary = if COMMON_SCHEMA.contains(&name.as_str()) {
                summarize_categorical(series)?
            } else {
                summarize(series)?
            };
            Ok((name.clone(), summary))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Description { columns })
}

fn summarize(series: &Series) -> Result<ColumnSummary> {
    let present = series.len() - series.null_count();
    let numbers = series.cast(&DataType::Float64)?;
    let parsed = numbers.f64()?;
    let numeric = present > 0
        && numbers.null_count() == series.null_count()
        && parsed.iter().flatten().all(f64::is_finite);

    if numeric {
        summarize_numeric(parsed)
    } else {
        summarize_categorical(series)
    }
}

fn summarize_categorical(series: &Series) -> Result<ColumnSummary> {
    let values = series.drop_nulls();
    let (top, freq) = most_frequent(&values)?.unzip();

    Ok(ColumnSummary::Categorical {
        count: values.len(),
        unique: values.n_unique()?,
        top,
        freq,
    })
}

/// Most frequent value of a null-free text series. Ties go to the value
/// that appears first.
fn most_frequent(values: &Series) -> Result<Option<(String, usize)>> {
    if values.is_empty() {
        return Ok(None);
    }
    let counts = values
        .clone()
        .with_name("value".into())
        .value_counts(true, false, "count".into(), false)?;
    let [distinct, tallies] = counts.get_columns() else {
        return Ok(None);
    };
    let tallies = tallies.as_materialized_series().idx()?;
    let Some(freq) = tallies.get(0) else {
        return Ok(None);
    };

    let leaders: HashSet<&str> = distinct
        .as_materialized_series()
        .str()?
        .iter()
        .zip(tallies.iter())
        .filter(|(_, tally)| *tally == Some(freq))
        .filter_map(|(value, _)| value)
        .collect();
    let top = values
        .str()?
        .iter()
        .flatten()
        .find(|value| leaders.contains(value));
    Ok(top.map(|value| (value.to_string(), freq as usize)))
}

fn summarize_numeric(parsed: &Float64Chunked) -> Result<ColumnSummary> {
    let count = parsed.len() - parsed.null_count();

    Ok(ColumnSummary::Numeric {
        count,
        mean: required(parsed.mean(), "mean")?,
        std: if count > 1 { parsed.std(1) } else { None },
        min: required(parsed.min(), "min")?,
        q1: required(parsed.quantile(0.25, QuantileMethod::Linear)?, "25%")?,
        median: required(parsed.quantile(0.5, QuantileMethod::Linear)?, "50%")?,
        q3: required(parsed.quantile(0.75, QuantileMethod::Linear)?, "75%")?,
        max: required(parsed.max(), "max")?,
    })
}

fn required(value: Option<f64>, statistic: &str) -> Result<f64> {
    value.ok_or_else(|| PolarsError::NoData(format!("no values for {statistic}").into()).into())
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Number of missing cells per column.
pub fn missing_counts(table: &Table) -> Result<Vec<(String, usize)>> {
    Ok(missing_in(&table.columns, &to_frame(table)?))
}

/// Number of empty-string cells per column.
pub fn empty_counts(table: &Table) -> Result<Vec<(String, usize)>> {
    empty_in(&table.columns, &to_frame(table)?)
}

fn missing_in(names: &[String], frame: &DataFrame) -> Vec<(String, usize)> {
    names
        .iter()
        .zip(frame.get_columns())
        .map(|(name, column)| (name.clone(), column.null_count()))
        .collect()
}

fn empty_in(names: &[String], frame: &DataFrame) -> Result<Vec<(String, usize)>> {
    names
        .iter()
        .zip(frame.get_columns())
        .map(|(name, column)| {
            let empty = column.as_materialized_series().str()?.equal("").num_trues();
            Ok((name.clone(), empty))
        })
        .collect()
}

/// Writes the description, missing-value and empty-value reports for a
/// table. The checks are advisory: nothing here fails on poor data quality.
#[instrument(
    level = "info",
    skip(table, report_dir),
    fields(report_dir = %report_dir.display(), rows = table.len())
)]
pub fn validate(table: &Table, name: &str, report_dir: &Path) -> Result<ValidationSummary> {
    let description_path = report_dir.join(format!("{name}_description.csv"));
    let missing_path = report_dir.join(format!("{name}_missing_values.csv"));
    let empty_path = report_dir.join(format!("{name}_empty_values.csv"));

    let frame = to_frame(table)?;
    write_table(&description_path, &describe_frame(&table.columns, &frame)?.to_table())?;

    let missing = missing_in(&table.columns, &frame);
    write_report(
        &missing_path,
        "",
        "Missing Values",
        missing.iter().map(|(column, n)| (column.as_str(), *n)),
    )?;

    let empty = empty_in(&table.columns, &frame)?;
    write_report(
        &empty_path,
        "",
        "Empty Values",
        empty.iter().map(|(column, n)| (column.as_str(), *n)),
    )?;

    let missing_total: usize = missing.iter().map(|(_, n)| n).sum();
    let empty_total: usize = empty.iter().map(|(_, n)| n).sum();
    info!(missing_total, empty_total, "validation results saved");

    Ok(ValidationSummary {
        name: name.to_string(),
        description_path,
        missing_path,
        empty_path,
        missing_total,
        empty_total,
    })
}
