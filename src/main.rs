use std::path::PathBuf;

use clap::Parser;
use company_unify::config::PipelineConfig;
use company_unify::pipeline;
use company_unify::{Result, ToolError};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    init_tracing()?;

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(base) = &cli.base_dir {
        config = config.with_base_dir(base);
    }
    if cli.render_distributions {
        config.render_distributions = true;
    }

    let summary = pipeline::run(&config)?;
    info!(
        rows = summary.merged_rows,
        output = %summary.output.display(),
        "pipeline finished"
    );
    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ToolError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clean, validate and merge the facebook, google and website company datasets."
)]
struct Cli {
    /// Optional JSON configuration; defaults reproduce the standard file layout.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that relative input and output paths are resolved against.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Also write category and phone number distributions.
    #[arg(long)]
    render_distributions: bool,
}
