//! Timed event collection from raw inputs.
//!
//! Both sources produce [`RawEvent`]s: one per matched log line entry or per
//! trace table row. Events are consumed straight into stage aggregation.

pub mod log_events;
pub mod trace_table;

pub use log_events::{strip_ansi, EventMatcher, LogExtraction};
pub use trace_table::{TraceRow, TraceTable};

/// Where an event's label came from, which decides how it is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Supplied by a fixed-label pattern.
    Fixed,
    /// Captured verbatim from a log line; may carry parenthetical detail.
    Captured,
    /// `Name` cell of a trace table row.
    Trace,
}

/// A single timed observation before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub raw_label: String,
    pub duration_ns: u64,
    pub kind: LabelKind,
}
