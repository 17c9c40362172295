use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consolidate::Priority;
use crate::error::{Result, ToolError};
use crate::model::Source;

/// One input dataset and how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputConfig {
    pub source: Source,
    pub path: PathBuf,
    /// Field delimiter, a single ASCII character.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl InputConfig {
    pub fn new(source: Source, path: impl Into<PathBuf>, delimiter: char) -> Self {
        Self {
            source,
            path: path.into(),
            delimiter,
        }
    }

    /// The delimiter as the byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                ToolError::InvalidConfig(format!(
                    "delimiter {:?} for {} is not a single ASCII character",
                    self.delimiter, self.source
                ))
            })
    }
}

fn default_delimiter() -> char {
    ','
}

/// Everything a pipeline run needs: where the three datasets live, where the
/// results go, and how conflicts are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub inputs: Vec<InputConfig>,
    /// Unified dataset written at the end of the run.
    pub output: PathBuf,
    /// Directory receiving the validation reports and distributions.
    pub report_dir: PathBuf,
    pub render_distributions: bool,
    pub distribution_columns: Vec<String>,
    pub priority: Priority,
    /// Rows shown per dataset when previewing the inputs.
    pub preview_rows: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inputs: vec![
                InputConfig::new(Source::Facebook, "facebook_dataset.csv", ','),
                InputConfig::new(Source::Google, "google_dataset.csv", ','),
                InputConfig::new(Source::Website, "website_dataset.csv", ';'),
            ],
            output: PathBuf::from("merged_companies_dataset.csv"),
            report_dir: PathBuf::from("."),
            render_distributions: false,
            distribution_columns: vec!["category".to_string(), "phone_number".to_string()],
            priority: Priority::default(),
            preview_rows: 5,
        }
    }
}

impl PipelineConfig {
    /// Loads a JSON configuration file. Omitted keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let data = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Re-roots every relative path under `base`.
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        let rebase = |path: &Path| {
            if path.is_relative() {
                base.join(path)
            } else {
                path.to_path_buf()
            }
        };
        for input in &mut self.inputs {
            input.path = rebase(&input.path);
        }
        self.output = rebase(&self.output);
        self.report_dir = rebase(&self.report_dir);
        self
    }

    /// Checks that each source is configured exactly once with a usable
    /// delimiter.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.source) {
                return Err(ToolError::InvalidConfig(format!(
                    "source '{}' is configured more than once",
                    input.source
                )));
            }
            input.delimiter_byte()?;
        }
        for source in Source::ALL {
            if !seen.contains(&source) {
                return Err(ToolError::InvalidConfig(format!(
                    "no input configured for source '{source}'"
                )));
            }
        }
        Ok(())
    }

    /// Input settings for `source`.
    pub fn input(&self, source: Source) -> Result<&InputConfig> {
        self.inputs
            .iter()
            .find(|input| input.source == source)
            .ok_or_else(|| {
                ToolError::InvalidConfig(format!("no input configured for source '{source}'"))
            })
    }
}
