//! Event pattern specifications.
//!
//! A pattern is a regular expression with a named `ms` capture holding the
//! duration in milliseconds. The stage comes either from the spec itself
//! (fixed-label mode) or from a named `label` capture (captured-label mode).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Capture group holding the duration literal.
pub const MS_GROUP: &str = "ms";

/// Capture group holding a free-text stage label.
pub const LABEL_GROUP: &str = "label";

/// Duration literal accepted by the built-in patterns.
const MS_LITERAL: &str = r"(?P<ms>\d+(?:\.\d+)?)";

/// Stages reported through `[TIME]` lines by the VIO pipeline.
pub const VIO_STAGES: [&str; 7] = [
    "tracking",
    "propagation",
    "MSCKF update",
    "SLAM update",
    "SLAM delayed init",
    "marginalization",
    "total",
];

/// How a matched line is turned into a labelled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode<'a> {
    /// The stage is fixed by the pattern; only the duration is captured.
    Fixed(&'a str),
    /// The stage label is captured from the line.
    Captured,
}

/// One named extraction pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PatternSpec {
    /// Identifier used in diagnostics.
    pub name: String,
    /// Regular expression; must define an `ms` group, and a `label` group when
    /// `stage` is absent.
    pub regex: String,
    /// Fixed stage label. Absent for captured-label patterns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl PatternSpec {
    pub fn mode(&self) -> PatternMode<'_> {
        match &self.stage {
            Some(stage) => PatternMode::Fixed(stage),
            None => PatternMode::Captured,
        }
    }

    /// `[TIME]: <ms> ms for <stage>` with a fixed stage label.
    pub fn fixed_time(stage: &str) -> Self {
        let name = stage.to_lowercase().replace(' ', "_");
        PatternSpec {
            name,
            regex: format!(
                r"\[TIME\]:\s*{MS_LITERAL}\s*ms\s*for\s*{}",
                regex::escape(stage)
            ),
            stage: Some(stage.to_string()),
        }
    }

    /// `[TIME-KLT]: <ms> ms for <label>` with the label captured verbatim.
    pub fn klt_time() -> Self {
        PatternSpec {
            name: "klt".to_string(),
            regex: format!(r"\[TIME-KLT\]:\s*{MS_LITERAL}\s*ms\s*for\s*(?P<label>.+)"),
            stage: None,
        }
    }
}

/// Fixed-label patterns for every VIO stage.
pub fn vio_patterns() -> Vec<PatternSpec> {
    VIO_STAGES.iter().map(|s| PatternSpec::fixed_time(s)).collect()
}
