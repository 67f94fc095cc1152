//! Pipeline configuration types.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::patterns::{vio_patterns, PatternSpec};
use crate::validate::ValidationError;
use crate::{CONFIG_SCHEMA_VERSION, DEFAULT_ADMISSION_THRESHOLD};

/// Exclusion substrings applied to trace names before normalization.
pub const DEFAULT_EXCLUSION_RULES: [&str; 2] = ["record_command_buffer", "get fast pose"];

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("config validation failed: {}", format_validation(.0))]
    Invalid(Vec<ValidationError>),
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<ConfigError> for xrt_common::Error {
    fn from(err: ConfigError) -> Self {
        xrt_common::Error::Config(err.to_string())
    }
}

/// Where a run's input files live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RunLayout {
    /// Directories under the input root ending in this suffix are runs.
    pub run_dir_suffix: String,
    /// Text log expected inside a run directory.
    pub log_file_name: String,
    /// Profiler trace export expected inside a run directory.
    pub trace_file_name: String,
    /// Extension of loose log files directly under the input root.
    pub loose_log_extension: String,
}

impl Default for RunLayout {
    fn default() -> Self {
        RunLayout {
            run_dir_suffix: "_nsys".to_string(),
            log_file_name: "illixr.log".to_string(),
            trace_file_name: "illixr_nvtx_pushpop_trace.csv".to_string(),
            loose_log_extension: "log".to_string(),
        }
    }
}

/// Everything the pipeline entry point needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PipelineConfig {
    pub schema_version: String,

    /// Root searched for runs.
    pub input_root: PathBuf,

    /// Root that receives every derived table.
    pub output_root: PathBuf,

    /// Minimum observations for a stage series to be retained (inclusive).
    pub admission_threshold: usize,

    /// Case-insensitive substrings; matching trace rows are dropped.
    pub exclusion_rules: Vec<String>,

    /// Extraction patterns applied to every log line.
    pub patterns: Vec<PatternSpec>,

    pub layout: RunLayout,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let mut patterns = vio_patterns();
        patterns.push(PatternSpec::klt_time());
        PipelineConfig {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            input_root: PathBuf::from("data"),
            output_root: PathBuf::from("data/results"),
            admission_threshold: DEFAULT_ADMISSION_THRESHOLD,
            exclusion_rules: DEFAULT_EXCLUSION_RULES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            patterns,
            layout: RunLayout::default(),
        }
    }
}

impl PipelineConfig {
    /// Append exclusion substrings, skipping ones already present.
    pub fn extend_exclusions<I, S>(&mut self, rules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for rule in rules {
            let rule = rule.into();
            let exists = self
                .exclusion_rules
                .iter()
                .any(|r| r.eq_ignore_ascii_case(&rule));
            if !exists {
                self.exclusion_rules.push(rule);
            }
        }
    }
}
