use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::dataset::{CaseTable, DatasetError};
use crate::pipeline::{
    self, DashboardReport, DisplayMode, FilterParams, PipelineConfig, PipelineError, Preset,
};
use crate::policy::{PolicyError, StatusPolicy};

pub const CASE_ID_PLACEHOLDER: &str = "{case_id}";

#[derive(Clone, Debug)]
pub struct Options {
    pub input: PathBuf,
    pub preset: Preset,
    pub policy: Option<StatusPolicy>,
    pub filters: FilterParams,
    pub display_mode: DisplayMode,
    pub record_url_template: Option<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            preset: Preset::default(),
            policy: None,
            filters: FilterParams::default(),
            display_mode: DisplayMode::All,
            record_url_template: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("no case file provided")]
    MissingInput,

    #[error("display mode '{mode}' is not offered by the {preset} dashboard")]
    UnsupportedDisplayMode {
        mode: &'static str,
        preset: &'static str,
    },

    #[error("record url template must contain {{case_id}}: {template}")]
    InvalidUrlTemplate { template: String },

    #[error("invalid status policy: {source}")]
    Policy {
        #[from]
        source: PolicyError,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

#[derive(Clone, Debug)]
pub struct RunResult {
    pub report: DashboardReport,
    pub rows_loaded: usize,
    pub elapsed: Duration,
}

#[derive(Clone, Debug)]
pub struct Runner {
    options: Options,
    config: PipelineConfig,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.input.as_os_str().is_empty() {
            return Err(RunnerError::MissingInput);
        }
        let config = Self::build_config(&options)?;
        Ok(Self { options, config })
    }

    /// Validates everything except the input path. Used when the table is
    /// already in memory.
    pub fn build_config(options: &Options) -> Result<PipelineConfig, RunnerError> {
        let mut config = options.preset.config();
        if let Some(policy) = options.policy.as_ref() {
            policy.validate()?;
            config.policy = policy.clone();
        }
        if let Some(template) = options.record_url_template.as_ref() {
            if !template.contains(CASE_ID_PLACEHOLDER) {
                return Err(RunnerError::InvalidUrlTemplate {
                    template: template.clone(),
                });
            }
            config.record_url_template = template.clone();
        }
        if !config.offers(options.display_mode) {
            return Err(RunnerError::UnsupportedDisplayMode {
                mode: options.display_mode.label(),
                preset: options.preset.name(),
            });
        }
        Ok(config)
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self) -> Result<RunResult, RunnerError> {
        let started = Instant::now();
        let table = CaseTable::load_csv(&self.options.input)?;
        tracing::info!(
            path = %self.options.input.display(),
            rows = table.len(),
            "case file loaded"
        );
        let report = self.run_on(&table)?;
        Ok(RunResult {
            report,
            rows_loaded: table.len(),
            elapsed: started.elapsed(),
        })
    }

    pub fn run_on(&self, table: &CaseTable) -> Result<DashboardReport, RunnerError> {
        Ok(pipeline::run(
            table,
            &self.config,
            &self.options.filters,
            self.options.display_mode,
        )?)
    }
}
