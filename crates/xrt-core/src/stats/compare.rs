//! Cross-run comparison.
//!
//! The table holds one row per (stage, run) pair that was actually measured.
//! Absent pairs stay absent: pivots show them as `None`, never as zero.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use xrt_common::{RunId, StageName};

use super::summarize::StageStats;

/// Statistic a comparison is ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Mean,
    Min,
    Max,
    P25,
    P50,
    P75,
    Count,
}

impl Metric {
    /// Metrics exported as pivot tables.
    pub const PIVOTED: [Metric; 4] = [Metric::Mean, Metric::P25, Metric::P50, Metric::P75];

    pub fn value(self, stats: &StageStats) -> f64 {
        match self {
            Metric::Mean => stats.mean,
            Metric::Min => stats.min,
            Metric::Max => stats.max,
            Metric::P25 => stats.p25,
            Metric::P50 => stats.p50,
            Metric::P75 => stats.p75,
            Metric::Count => stats.count as f64,
        }
    }

    /// Column heading used in exported tables.
    pub fn column_name(self) -> &'static str {
        match self {
            Metric::Mean => "mean",
            Metric::Min => "min",
            Metric::Max => "max",
            Metric::P25 => "25%",
            Metric::P50 => "50%",
            Metric::P75 => "75%",
            Metric::Count => "count",
        }
    }

    /// Name used on the command line and in file names.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Mean => "mean",
            Metric::Min => "min",
            Metric::Max => "max",
            Metric::P25 => "p25",
            Metric::P50 => "p50",
            Metric::P75 => "p75",
            Metric::Count => "count",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage × run matrix of one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PivotTable {
    pub metric: Metric,
    /// Column order.
    pub runs: Vec<RunId>,
    /// One entry per stage; cells follow `runs`.
    pub rows: Vec<(StageName, Vec<Option<f64>>)>,
}

/// Statistics keyed by (stage, run).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonTable {
    rows: BTreeMap<(StageName, RunId), StageStats>,
}

/// Merge per-run statistics into one table.
pub fn compare(runs: &BTreeMap<RunId, BTreeMap<StageName, StageStats>>) -> ComparisonTable {
    let mut table = ComparisonTable::default();
    for (run, stages) in runs {
        for (stage, stats) in stages {
            table.rows.insert((stage.clone(), run.clone()), stats.clone());
        }
    }
    table
}

impl ComparisonTable {
    pub fn insert(&mut self, stats: StageStats) {
        self.rows
            .insert((stats.stage.clone(), stats.run.clone()), stats);
    }

    pub fn get(&self, stage: &StageName, run: &RunId) -> Option<&StageStats> {
        self.rows.get(&(stage.clone(), run.clone()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn runs(&self) -> Vec<RunId> {
        let runs: BTreeSet<&RunId> = self.rows.keys().map(|(_, run)| run).collect();
        runs.into_iter().cloned().collect()
    }

    pub fn stages(&self) -> Vec<StageName> {
        let stages: BTreeSet<&StageName> = self.rows.keys().map(|(stage, _)| stage).collect();
        stages.into_iter().cloned().collect()
    }

    /// Rows ordered by `metric` descending; ties by stage, then run.
    pub fn ranked(&self, metric: Metric) -> Vec<&StageStats> {
        let mut rows: Vec<&StageStats> = self.rows.values().collect();
        rows.sort_by(|a, b| {
            metric
                .value(b)
                .total_cmp(&metric.value(a))
                .then_with(|| a.stage.cmp(&b.stage))
                .then_with(|| a.run.cmp(&b.run))
        });
        rows
    }

    /// Stage × run matrix. Runs ascending; stages by their largest value
    /// descending, then by name.
    pub fn pivot(&self, metric: Metric) -> PivotTable {
        let runs = self.runs();
        let mut rows: Vec<(StageName, Vec<Option<f64>>)> = self
            .stages()
            .into_iter()
            .map(|stage| {
                let cells = runs
                    .iter()
                    .map(|run| self.get(&stage, run).map(|s| metric.value(s)))
                    .collect();
                (stage, cells)
            })
            .collect();

        let best = |cells: &[Option<f64>]| {
            cells
                .iter()
                .flatten()
                .copied()
                .max_by(f64::total_cmp)
                .unwrap_or(f64::NEG_INFINITY)
        };
        rows.sort_by(|(sa, ca), (sb, cb)| match best(cb).total_cmp(&best(ca)) {
            Ordering::Equal => sa.cmp(sb),
            other => other,
        });

        PivotTable { metric, runs, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(stage: &str, run: &str, mean: f64) -> StageStats {
        StageStats {
            stage: StageName::from(stage),
            run: RunId::from(run),
            mean,
            min: mean / 2.0,
            max: mean * 2.0,
            p25: mean * 0.75,
            p50: mean,
            p75: mean * 1.25,
            count: 100,
        }
    }

    fn sample() -> ComparisonTable {
        let mut runs: BTreeMap<RunId, BTreeMap<StageName, StageStats>> = BTreeMap::new();
        for s in [
            stats("tracking", "platformer", 2.0),
            stats("total", "platformer", 9.0),
            stats("tracking", "sponza", 3.0),
            stats("render", "sponza", 2.0),
        ] {
            runs.entry(s.run.clone())
                .or_default()
                .insert(s.stage.clone(), s);
        }
        compare(&runs)
    }

    #[test]
    fn only_measured_pairs_are_present() {
        let table = sample();
        assert_eq!(table.len(), 4);
        assert!(table
            .get(&StageName::from("render"), &RunId::from("platformer"))
            .is_none());
        assert_eq!(table.runs(), vec![RunId::from("platformer"), RunId::from("sponza")]);
    }

    #[test]
    fn ranked_descending_with_stage_tiebreak() {
        let table = sample();
        let order: Vec<(&str, &str)> = table
            .ranked(Metric::Mean)
            .iter()
            .map(|s| (s.stage.as_str(), s.run.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("total", "platformer"),
                ("tracking", "sponza"),
                ("render", "sponza"),
                ("tracking", "platformer"),
            ]
        );
    }

    #[test]
    fn equal_metric_and_stage_order_by_run() {
        let mut table = ComparisonTable::default();
        table.insert(stats("x", "b", 1.0));
        table.insert(stats("x", "a", 1.0));
        let runs: Vec<_> = table
            .ranked(Metric::Count)
            .iter()
            .map(|s| s.run.as_str())
            .collect();
        assert_eq!(runs, vec!["a", "b"]);
    }

    #[test]
    fn pivot_leaves_gaps_empty() {
        let pivot = sample().pivot(Metric::Mean);
        assert_eq!(pivot.runs.len(), 2);
        let stages: Vec<_> = pivot.rows.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(stages, vec!["total", "tracking", "render"]);
        let render = &pivot.rows[2].1;
        assert_eq!(render, &vec![None, Some(2.0)]);
    }

    #[test]
    fn metric_names() {
        assert_eq!(Metric::default(), Metric::Mean);
        assert_eq!(Metric::P25.column_name(), "25%");
        assert_eq!(Metric::P75.to_string(), "p75");
        assert_eq!(Metric::Count.value(&stats("s", "r", 1.0)), 100.0);
    }
}
