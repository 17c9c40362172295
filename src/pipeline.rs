use std::io::Write;
use std::path::PathBuf;

use tracing::{info, instrument};

use crate::clean::clean;
use crate::config::PipelineConfig;
use crate::consolidate::{Priority, conflict_counts, consolidate};
use crate::distribution::{CsvDistributionRenderer, DistributionRenderer, render_distributions};
use crate::error::Result;
use crate::io::{ReadReport, read_table, write_table};
use crate::merge::merge;
use crate::model::{Source, Table};
use crate::normalize::normalize;
use crate::validate::{ValidationSummary, validate};

/// What happened to one input dataset during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSummary {
    pub source: Source,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub validation: ValidationSummary,
}

/// Result of a complete pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSummary {
    pub sources: Vec<SourceSummary>,
    pub merged_rows: usize,
    pub output: PathBuf,
    pub distributions: Vec<PathBuf>,
}

/// Runs the whole pipeline with previews on standard output and CSV
/// distribution tables.
pub fn run(config: &PipelineConfig) -> Result<PipelineSummary> {
    let stdout = std::io::stdout();
    let mut preview = stdout.lock();
    run_with(config, &mut preview, &CsvDistributionRenderer)
}

/// Runs the pipeline stage by stage: read, preview, normalise, clean,
/// validate, merge, consolidate, write. Each stage finishes before the next
/// begins; files written by earlier stages are left in place if a later one
/// fails.
#[instrument(level = "info", skip_all, fields(output = %config.output.display()))]
pub fn run_with(
    config: &PipelineConfig,
    preview: &mut dyn Write,
    renderer: &dyn DistributionRenderer,
) -> Result<PipelineSummary> {
    config.validate()?;

    let mut datasets = [
        read_dataset(config, Source::Facebook)?,
        read_dataset(config, Source::Google)?,
        read_dataset(config, Source::Website)?,
    ];

    for dataset in &datasets {
        inspect(preview, dataset.source, &dataset.table, config.preview_rows)?;
    }

    for dataset in &mut datasets {
        dataset.table = normalize(std::mem::take(&mut dataset.table), dataset.source);
    }

    for dataset in &mut datasets {
        dataset.table = clean(std::mem::take(&mut dataset.table))?;
    }

    let mut sources = Vec::with_capacity(datasets.len());
    for dataset in &datasets {
        let validation = validate(&dataset.table, dataset.source.as_str(), &config.report_dir)?;
        sources.push(SourceSummary {
            source: dataset.source,
            rows_read: dataset.report.rows_read,
            rows_skipped: dataset.report.rows_skipped,
            validation,
        });
    }

    let [facebook, google, website] = datasets.map(|dataset| dataset.table);
    let unified = merge_and_consolidate(facebook, google, website, &config.priority)?;
    write_table(&config.output, &unified)?;
    info!(rows = unified.len(), "unified dataset written");

    let distributions = if config.render_distributions {
        render_distributions(
            &unified,
            &config.distribution_columns,
            renderer,
            &config.report_dir,
        )?
    } else {
        Vec::new()
    };

    Ok(PipelineSummary {
        sources,
        merged_rows: unified.len(),
        output: config.output.clone(),
        distributions,
    })
}

/// Runs normalisation, cleaning, merge and consolidation on in-memory tables
/// in their source-specific shape, without touching the filesystem.
pub fn run_tables(
    facebook: Table,
    google: Table,
    website: Table,
    priority: &Priority,
) -> Result<Table> {
    let facebook = clean(normalize(facebook, Source::Facebook))?;
    let google = clean(normalize(google, Source::Google))?;
    let website = clean(normalize(website, Source::Website))?;
    merge_and_consolidate(facebook, google, website, priority)
}

/// One input as it moves through the per-source stages.
struct Dataset {
    source: Source,
    table: Table,
    report: ReadReport,
}

fn read_dataset(config: &PipelineConfig, source: Source) -> Result<Dataset> {
    let input = config.input(source)?;
    let (table, report) = read_table(&input.path, input.delimiter_byte()?)?;
    info!(
        %source,
        path = %input.path.display(),
        rows = report.rows_read,
        skipped = report.rows_skipped,
        "dataset read"
    );
    Ok(Dataset {
        source,
        table,
        report,
    })
}

fn merge_and_consolidate(
    facebook: Table,
    google: Table,
    website: Table,
    priority: &Priority,
) -> Result<Table> {
    let merged = merge(facebook, google, website)?;
    for (field, conflicts) in conflict_counts(&merged, priority) {
        if conflicts > 0 {
            info!(%field, conflicts, "rows with disagreeing sources");
        }
    }
    Ok(consolidate(&merged, priority))
}

fn inspect(out: &mut dyn Write, source: Source, table: &Table, rows: usize) -> Result<()> {
    let title = match source {
        Source::Facebook => "Facebook dataset",
        Source::Google => "Google dataset",
        Source::Website => "Website dataset",
    };
    writeln!(out, "{title}")?;
    write!(out, "{}", table.head(rows))?;
    Ok(())
}
