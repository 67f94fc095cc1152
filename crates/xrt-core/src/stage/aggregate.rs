//! Grouping events into per-stage series.
//!
//! Every event label is normalized and observations are grouped by canonical
//! stage, keeping input order within a group. A group is retained only when it
//! holds at least `threshold` observations (inclusive). Groups below it are
//! dropped and reported with their size, since low-frequency stages such as
//! initialization-only paths would otherwise skew cross-run comparisons.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;
use xrt_common::{RunId, StageName};
use xrt_math::{ms_from_ns, ms_from_ns_total};

use super::normalize::normalize_label;
use crate::collect::RawEvent;

/// Observations of one stage within one run, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSeries {
    pub stage: StageName,
    pub run: RunId,
    pub observations: Vec<u64>,
}

impl StageSeries {
    pub fn new(stage: StageName, run: RunId, observations: Vec<u64>) -> Self {
        StageSeries {
            stage,
            run,
            observations,
        }
    }

    pub fn count(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Sum of all observations in nanoseconds.
    pub fn total_ns(&self) -> u128 {
        self.observations.iter().map(|&ns| u128::from(ns)).sum()
    }

    pub fn total_ms(&self) -> f64 {
        ms_from_ns_total(self.total_ns())
    }

    pub fn observations_ms(&self) -> Vec<f64> {
        self.observations.iter().map(|&ns| ms_from_ns(ns)).collect()
    }
}

/// A stage group that fell below the admission threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedStage {
    pub stage: StageName,
    pub count: usize,
}

/// Result of aggregating one run's events.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub run: RunId,
    /// Retained series keyed by stage, in stage order.
    pub series: BTreeMap<StageName, StageSeries>,
    /// Groups below the threshold, in stage order.
    pub dropped: Vec<DroppedStage>,
}

impl Aggregation {
    pub fn retained_count(&self) -> usize {
        self.series.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// Observations across retained series.
    pub fn observation_count(&self) -> usize {
        self.series.values().map(StageSeries::count).sum()
    }

    pub fn get(&self, stage: &str) -> Option<&StageSeries> {
        self.series.get(&StageName::from(stage))
    }
}

/// Groups events by canonical stage and applies the admission rule.
#[derive(Debug, Clone, Copy)]
pub struct StageAggregator {
    threshold: usize,
}

impl StageAggregator {
    pub fn new(threshold: usize) -> Self {
        StageAggregator { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn aggregate<I>(&self, run: &RunId, events: I) -> Aggregation
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let mut groups: BTreeMap<StageName, Vec<u64>> = BTreeMap::new();
        for event in events {
            let stage = normalize_label(&event.raw_label, event.kind);
            groups.entry(stage).or_default().push(event.duration_ns);
        }

        let mut aggregation = Aggregation {
            run: run.clone(),
            ..Aggregation::default()
        };
        for (stage, observations) in groups {
            let count = observations.len();
            if count >= self.threshold {
                debug!(run = %run, stage = %stage, count, "stage retained");
                aggregation.series.insert(
                    stage.clone(),
                    StageSeries::new(stage, run.clone(), observations),
                );
            } else {
                debug!(
                    run = %run,
                    stage = %stage,
                    count,
                    threshold = self.threshold,
                    "stage below admission threshold"
                );
                aggregation.dropped.push(DroppedStage { stage, count });
            }
        }
        aggregation
    }
}
