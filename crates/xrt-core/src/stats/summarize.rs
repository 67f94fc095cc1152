//! Descriptive statistics and percentage shares per stage.
//!
//! All values are milliseconds. Quartiles follow the interpolated-rank
//! convention of [`xrt_math::describe`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;
use xrt_common::{Error, Result, RunId, StageName};
use xrt_math::{describe, percentage_shares};

use crate::stage::StageSeries;

/// Summary of one (stage, run) series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageStats {
    pub stage: StageName,
    pub run: RunId,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub count: usize,
}

/// Share of a run's total duration spent in one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageShare {
    pub stage: StageName,
    pub total_ms: f64,
    pub ratio_pct: f64,
}

/// Summarize a series. `None` when it has no observations.
pub fn summarize(series: &StageSeries) -> Option<StageStats> {
    let d = describe(&series.observations_ms())?;
    Some(StageStats {
        stage: series.stage.clone(),
        run: series.run.clone(),
        mean: d.mean,
        min: d.min,
        max: d.max,
        p25: d.p25,
        p50: d.p50,
        p75: d.p75,
        count: d.count,
    })
}

/// Summarize every series of a run, keyed by stage.
pub fn summarize_run<'a, I>(series: I) -> BTreeMap<StageName, StageStats>
where
    I: IntoIterator<Item = &'a StageSeries>,
{
    series
        .into_iter()
        .filter_map(summarize)
        .map(|stats| (stats.stage.clone(), stats))
        .collect()
}

/// Percentage of the run total per stage, largest share first.
///
/// Sums are taken over integer nanoseconds. A zero total yields
/// [`Error::EmptyAggregate`] and no shares.
pub fn share_table<'a, I>(run: &RunId, series: I) -> Result<Vec<StageShare>>
where
    I: IntoIterator<Item = &'a StageSeries>,
{
    let series: Vec<&StageSeries> = series.into_iter().collect();
    let totals: Vec<u128> = series.iter().map(|s| s.total_ns()).collect();
    let Some(ratios) = percentage_shares(&totals) else {
        warn!(run = %run, stages = series.len(), "zero total duration; shares skipped");
        return Err(Error::EmptyAggregate {
            run: run.to_string(),
        });
    };

    let mut shares: Vec<StageShare> = series
        .iter()
        .zip(ratios)
        .map(|(s, ratio_pct)| StageShare {
            stage: s.stage.clone(),
            total_ms: s.total_ms(),
            ratio_pct,
        })
        .collect();
    shares.sort_by(|a, b| {
        b.ratio_pct
            .total_cmp(&a.ratio_pct)
            .then_with(|| a.stage.cmp(&b.stage))
    });
    Ok(shares)
}
