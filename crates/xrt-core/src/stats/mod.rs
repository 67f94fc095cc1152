//! Per-stage statistics and cross-run comparison.

pub mod compare;
pub mod summarize;

pub use compare::{compare, ComparisonTable, Metric, PivotTable};
pub use summarize::{share_table, summarize, summarize_run, StageShare, StageStats};
