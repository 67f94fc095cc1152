//! XR timing analysis core.
//!
//! Turns instrumentation logs and profiler trace exports into per-stage
//! duration series, summary statistics, and cross-run comparison tables.
//!
//! Data flows leaves-first through:
//! - [`collect`]: timed events from text logs and trace tables
//! - [`stage`]: trace exclusion, label normalization, and stage aggregation
//! - [`stats`]: per-stage statistics, percentage shares, run comparison
//! - [`output`]: CSV tables, the batch summary, and terminal rendering
//!
//! [`pipeline`] wires these together for one batch; [`discover`] finds the
//! runs to feed it.

pub mod collect;
pub mod discover;
pub mod exit_codes;
pub mod logging;
pub mod output;
pub mod pipeline;
pub mod stage;
pub mod stats;

pub use collect::{LabelKind, RawEvent};
pub use discover::{discover_runs, RunInput};
pub use pipeline::{BatchOutcome, Pipeline, RunOutcome, RunReport};
pub use stage::aggregate::{Aggregation, StageAggregator, StageSeries};
pub use stats::compare::{compare, ComparisonTable, Metric};
pub use stats::summarize::{summarize, StageShare, StageStats};
