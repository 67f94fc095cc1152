//! Batch summary written alongside the tables.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use xrt_common::{BatchId, Result, SCHEMA_VERSION};

use crate::pipeline::RunReport;

pub const SUMMARY_FILE: &str = "summary.json";

/// What happened to every run of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub batch_id: BatchId,
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub runs: Vec<RunReport>,
    /// Tables written by this batch.
    pub written: Vec<PathBuf>,
}

impl BatchSummary {
    pub fn new(batch_id: BatchId, runs: Vec<RunReport>, written: Vec<PathBuf>) -> Self {
        BatchSummary {
            batch_id,
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            runs,
            written,
        }
    }

    pub fn warning_count(&self) -> usize {
        self.runs.iter().map(|r| r.warnings.len()).sum()
    }
}

/// Write `summary.json` into `dir`.
pub fn write_summary(dir: &Path, summary: &BatchSummary) -> Result<PathBuf> {
    let path = dir.join(SUMMARY_FILE);
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(&path, json)?;
    Ok(path)
}
