//! Terminal rendering of statistics and comparisons.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use clap::ValueEnum;
use serde::Serialize;
use xrt_common::{Result, RunId, StageName};

use crate::stats::{ComparisonTable, Metric, PivotTable, StageShare, StageStats};

/// Stdout rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn stage_width<'a>(stages: impl Iterator<Item = &'a StageName>) -> usize {
    stages.map(|s| s.as_str().len()).max().unwrap_or(0).max(5)
}

/// Ranked comparison, one line per (stage, run).
pub fn render_ranked(table: &ComparisonTable, metric: Metric) -> String {
    let rows = table.ranked(metric);
    let width = stage_width(rows.iter().map(|s| &s.stage));
    let run_width = rows
        .iter()
        .map(|s| s.run.as_str().len())
        .max()
        .unwrap_or(0)
        .max(3);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<width$}  {:<run_width$}  {:>7}  {:>10}  {:>10}  {:>10}",
        "Stage",
        "Run",
        "count",
        metric.column_name(),
        "min",
        "max",
    );
    for s in rows {
        let _ = writeln!(
            out,
            "{:<width$}  {:<run_width$}  {:>7}  {:>10.3}  {:>10.3}  {:>10.3}",
            s.stage.as_str(),
            s.run.as_str(),
            s.count,
            metric.value(s),
            s.min,
            s.max,
        );
    }
    out
}

/// Stage × run matrix; gaps print as `-`.
pub fn render_pivot(pivot: &PivotTable) -> String {
    let width = stage_width(pivot.rows.iter().map(|(stage, _)| stage));
    let mut out = String::new();
    let _ = write!(out, "{:<width$}", format!("Stage ({})", pivot.metric.column_name()));
    for run in &pivot.runs {
        let _ = write!(out, "  {:>12}", run.as_str());
    }
    out.push('\n');
    for (stage, cells) in &pivot.rows {
        let _ = write!(out, "{:<width$}", stage.as_str());
        for cell in cells {
            match cell {
                Some(v) => {
                    let _ = write!(out, "  {v:>12.3}");
                }
                None => {
                    let _ = write!(out, "  {:>12}", "-");
                }
            }
        }
        out.push('\n');
    }
    out
}

/// One run's statistics followed by its shares, if any.
pub fn render_run(
    run: &RunId,
    stats: &BTreeMap<StageName, StageStats>,
    shares: Option<&[StageShare]>,
) -> String {
    let width = stage_width(stats.keys());
    let mut out = String::new();
    let _ = writeln!(out, "run {run}: {} stage(s)", stats.len());
    let _ = writeln!(
        out,
        "{:<width$}  {:>7}  {:>10}  {:>10}  {:>10}  {:>10}",
        "Stage", "count", "mean", "25%", "50%", "75%"
    );
    for (stage, s) in stats {
        let _ = writeln!(
            out,
            "{:<width$}  {:>7}  {:>10.3}  {:>10.3}  {:>10.3}  {:>10.3}",
            stage.as_str(),
            s.count,
            s.mean,
            s.p25,
            s.p50,
            s.p75,
        );
    }
    if let Some(shares) = shares {
        out.push('\n');
        let _ = writeln!(out, "{:<width$}  {:>12}  {:>9}", "Stage", "Total (ms)", "Ratio (%)");
        for share in shares {
            let _ = writeln!(
                out,
                "{:<width$}  {:>12.3}  {:>9.3}",
                share.stage.as_str(),
                share.total_ms,
                share.ratio_pct,
            );
        }
    }
    out
}

pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
