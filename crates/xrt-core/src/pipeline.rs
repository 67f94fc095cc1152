//! Batch driver.
//!
//! Each run is processed independently: log extraction, trace filtering,
//! aggregation, statistics. Problems scoped to one file or one run become
//! [`RunIssue`]s on that run's report and never stop the batch. Only an empty
//! batch is fatal.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use xrt_common::{BatchId, Error, Result, RunId, StageName};
use xrt_config::PipelineConfig;

use crate::collect::{EventMatcher, RawEvent, TraceTable};
use crate::discover::{MissingArtifact, RunInput};
use crate::output::summary::{write_summary, BatchSummary};
use crate::output::tables::{self, write_file, FileNames};
use crate::stage::{Aggregation, DroppedStage, ExclusionPolicy, StageAggregator};
use crate::stats::{compare, share_table, summarize_run, ComparisonTable, Metric, StageShare, StageStats};

/// A recovered problem, kept on the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunIssue {
    pub code: u32,
    pub message: String,
}

impl From<&Error> for RunIssue {
    fn from(err: &Error) -> Self {
        RunIssue {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Per-run record for the batch summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub run: RunId,
    pub log: Option<PathBuf>,
    pub trace: Option<PathBuf>,
    pub missing_inputs: Vec<MissingArtifact>,
    pub events_extracted: usize,
    pub undecodable_lines: usize,
    pub trace_rows_skipped: usize,
    pub trace_rows_excluded: usize,
    pub stages_retained: usize,
    pub stages_dropped: Vec<DroppedStage>,
    pub warnings: Vec<RunIssue>,
}

impl RunReport {
    fn record(&mut self, err: Error) {
        warn!(run = %self.run, code = err.code(), error = %err, "recovered");
        self.warnings.push(RunIssue::from(&err));
    }
}

/// Everything computed for one run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub aggregation: Aggregation,
    pub stats: BTreeMap<StageName, StageStats>,
    /// `None` when the run's total duration is zero.
    pub shares: Option<Vec<StageShare>>,
}

/// Result of a whole batch.
#[derive(Debug)]
pub struct BatchOutcome {
    pub batch_id: BatchId,
    pub runs: Vec<RunOutcome>,
    pub comparison: ComparisonTable,
    pub written: Vec<PathBuf>,
}

impl BatchOutcome {
    pub fn has_warnings(&self) -> bool {
        self.runs.iter().any(|r| !r.report.warnings.is_empty())
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary::new(
            self.batch_id.clone(),
            self.runs.iter().map(|r| r.report.clone()).collect(),
            self.written.clone(),
        )
    }
}

/// Configured pipeline, ready to process runs.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    matcher: EventMatcher,
    policy: ExclusionPolicy,
    aggregator: StageAggregator,
}

fn missing_or(err: Error, run: &RunId, artifact: &str, path: &Path) -> Error {
    match err {
        Error::Io(ref io) if io.kind() == ErrorKind::NotFound => Error::MissingInput {
            run: run.to_string(),
            artifact: artifact.to_string(),
            path: path.to_path_buf(),
        },
        other => other,
    }
}

impl Pipeline {
    /// Compile the configured patterns. Fails on an unusable pattern.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let matcher = EventMatcher::new(&config.patterns)?;
        let policy = ExclusionPolicy::new(&config.exclusion_rules);
        let aggregator = StageAggregator::new(config.admission_threshold);
        debug!(
            patterns = matcher.pattern_count(),
            exclusions = policy.rules().len(),
            threshold = aggregator.threshold(),
            "pipeline ready"
        );
        Ok(Pipeline {
            config,
            matcher,
            policy,
            aggregator,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Process one run. Never fails; problems end up on the report.
    pub fn process_run(&self, input: &RunInput) -> RunOutcome {
        let run = &input.run;
        let mut report = RunReport {
            run: run.clone(),
            log: input.log.clone(),
            trace: input.trace.clone(),
            missing_inputs: input.missing.clone(),
            ..RunReport::default()
        };
        for missing in &input.missing {
            report.record(Error::MissingInput {
                run: run.to_string(),
                artifact: missing.artifact.clone(),
                path: missing.path.clone(),
            });
        }

        let mut events: Vec<RawEvent> = Vec::new();

        if let Some(log) = &input.log {
            match self.matcher.extract_file(log) {
                Ok(extraction) => {
                    report.events_extracted += extraction.events.len();
                    report.undecodable_lines = extraction.undecodable_lines;
                    events.extend(extraction.events);
                }
                Err(e) => report.record(missing_or(e, run, "log", log)),
            }
        }

        if let Some(trace) = &input.trace {
            match TraceTable::from_path(trace) {
                Ok(table) => {
                    report.trace_rows_skipped = table.skipped_rows;
                    let outcome = self.policy.apply(table.rows);
                    report.trace_rows_excluded = outcome.excluded;
                    report.events_extracted += outcome.kept.len();
                    events.extend(outcome.kept.into_iter().map(|row| row.into_event()));
                }
                Err(e) => report.record(missing_or(e, run, "trace", trace)),
            }
        }

        let aggregation = self.aggregator.aggregate(run, events);
        report.stages_retained = aggregation.retained_count();
        report.stages_dropped = aggregation.dropped.clone();

        let stats = summarize_run(aggregation.series.values());
        let shares = match share_table(run, aggregation.series.values()) {
            Ok(shares) => Some(shares),
            Err(e) => {
                report.record(e);
                None
            }
        };

        info!(
            run = %run,
            events = report.events_extracted,
            retained = report.stages_retained,
            dropped = report.stages_dropped.len(),
            warnings = report.warnings.len(),
            "run processed"
        );
        RunOutcome {
            report,
            aggregation,
            stats,
            shares,
        }
    }

    /// Process every run, then write tables and the summary when `output` is
    /// given.
    pub fn run_batch(&self, inputs: &[RunInput], output: Option<&Path>) -> Result<BatchOutcome> {
        if inputs.is_empty() {
            return Err(Error::NoRuns {
                root: self.config.input_root.clone(),
            });
        }
        let batch_id = BatchId::new();
        info!(batch = %batch_id, runs = inputs.len(), "batch started");

        let runs: Vec<RunOutcome> = inputs.iter().map(|input| self.process_run(input)).collect();
        let per_run: BTreeMap<RunId, BTreeMap<StageName, StageStats>> = runs
            .iter()
            .map(|r| (r.report.run.clone(), r.stats.clone()))
            .collect();
        let comparison = compare(&per_run);

        let mut outcome = BatchOutcome {
            batch_id,
            runs,
            comparison,
            written: Vec::new(),
        };
        if let Some(dir) = output {
            write_batch(dir, &mut outcome)?;
        }
        info!(
            batch = %outcome.batch_id,
            rows = outcome.comparison.len(),
            files = outcome.written.len(),
            "batch finished"
        );
        Ok(outcome)
    }
}

/// Write every table of a batch, then the summary, into `dir`.
///
/// A run table that cannot be written becomes a warning on that run's report.
/// The comparison tables and the summary are written regardless.
fn write_batch(dir: &Path, outcome: &mut BatchOutcome) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut names = FileNames::new();
    // batch-wide names first so no run table can take them
    let comparison_name = names.claim(tables::COMPARISON_FILE);
    let pivot_names: Vec<(Metric, String)> = Metric::PIVOTED
        .into_iter()
        .map(|metric| (metric, names.claim(&tables::pivot_file_name(metric))))
        .collect();

    let mut written = Vec::new();
    for run in &mut outcome.runs {
        for result in write_run_tables(dir, run, &mut names) {
            match result {
                Ok(path) => written.push(path),
                Err(e) if e.is_recoverable() => run.report.record(e),
                Err(e) => return Err(e),
            }
        }
    }

    written.push(write_file(dir, &comparison_name, |w| {
        tables::write_comparison(w, &outcome.comparison)
    })?);
    for (metric, name) in &pivot_names {
        let pivot = outcome.comparison.pivot(*metric);
        written.push(write_file(dir, name, |w| tables::write_pivot(w, &pivot))?);
    }

    outcome.written = written;
    let summary = outcome.summary();
    outcome.written.push(write_summary(dir, &summary)?);
    info!(
        batch = %outcome.batch_id,
        warnings = summary.warning_count(),
        "summary written"
    );
    Ok(())
}

/// Write one run's duration, statistics, and share tables, one result per
/// table.
fn write_run_tables(dir: &Path, run: &RunOutcome, names: &mut FileNames) -> Vec<Result<PathBuf>> {
    let id = &run.report.run;
    let mut results = Vec::new();
    for series in run.aggregation.series.values() {
        let name = names.claim(&tables::duration_file_name(&series.stage, id));
        results.push(write_file(dir, &name, |w| tables::write_durations(w, series)));
    }
    let name = names.claim(&tables::stats_file_name(id));
    results.push(write_file(dir, &name, |w| tables::write_stats(w, &run.stats)));
    if let Some(shares) = &run.shares {
        let name = names.claim(&tables::share_file_name(id));
        results.push(write_file(dir, &name, |w| tables::write_shares(w, shares)));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline(threshold: usize) -> Pipeline {
        let config = PipelineConfig {
            admission_threshold: threshold,
            ..PipelineConfig::default()
        };
        Pipeline::new(config).unwrap()
    }

    #[test]
    fn empty_batch_is_fatal() {
        let err = pipeline(1).run_batch(&[], None).unwrap_err();
        assert!(matches!(err, Error::NoRuns { .. }));
    }

    #[test]
    fn absent_log_is_a_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = RunInput::new(RunId::from("r"), Some(dir.path().join("gone.log")), None);
        let outcome = pipeline(1).process_run(&input);
        let codes: Vec<u32> = outcome.report.warnings.iter().map(|i| i.code).collect();
        // missing log, then zero total
        assert_eq!(codes, vec![21, 30]);
        assert!(outcome.shares.is_none());
        assert!(outcome.stats.is_empty());
    }

    #[test]
    fn log_and_trace_merge_into_one_run() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("r.log");
        let trace = dir.path().join("trace.csv");
        std::fs::write(&log, "[TIME]: 2.0 ms for total\n[TIME]: 4.0 ms for total\n").unwrap();
        std::fs::write(
            &trace,
            "Name,Duration (ns)\nRender:a,1000000\nget fast pose,5\nRender:b,3000000\n",
        )
        .unwrap();
        let input = RunInput::new(RunId::from("r"), Some(log), Some(trace));
        let outcome = pipeline(2).process_run(&input);

        assert!(outcome.report.warnings.is_empty());
        assert_eq!(outcome.report.events_extracted, 4);
        assert_eq!(outcome.report.trace_rows_excluded, 1);
        assert_eq!(outcome.stats.len(), 2);
        let render = &outcome.stats[&StageName::from("Render")];
        assert!((render.mean - 2.0).abs() < 1e-12);
        let shares = outcome.shares.unwrap();
        assert_eq!(shares[0].stage.as_str(), "total");
        assert!((shares[0].ratio_pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn schema_error_keeps_log_output() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("r.log");
        let trace = dir.path().join("trace.csv");
        std::fs::write(&log, "[TIME]: 1.0 ms for tracking\n").unwrap();
        std::fs::write(&trace, "Range,Len\nx,1\n").unwrap();
        let input = RunInput::new(RunId::from("r"), Some(log), Some(trace));
        let outcome = pipeline(1).process_run(&input);
        assert_eq!(outcome.report.warnings.len(), 1);
        assert_eq!(outcome.report.warnings[0].code, 22);
        assert_eq!(outcome.report.stages_retained, 1);
    }
}
