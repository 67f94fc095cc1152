//! From raw events to per-stage series.
//!
//! Trace rows pass the exclusion policy first (on their raw names), then every
//! event label is normalized and events are grouped by canonical stage.

pub mod aggregate;
pub mod filter;
pub mod normalize;

pub use aggregate::{Aggregation, DroppedStage, StageAggregator, StageSeries};
pub use filter::{ExclusionPolicy, FilterOutcome};
pub use normalize::{normalize, normalize_label, UNNAMED_STAGE};
