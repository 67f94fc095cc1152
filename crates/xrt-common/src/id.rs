//! Run, stage, and batch identity types.
//!
//! A measurement is keyed by (stage, run): the stage names a phase of the
//! instrumented pipeline, the run names the scene/hardware configuration it was
//! recorded under.

use serde::{Deserialize, Serialize};
use std::fmt;

/// RunId used when an identifier carries no run suffix.
pub const UNKNOWN_RUN: &str = "unknown";

/// Identifier of one measured application/scene/hardware configuration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(id: impl Into<String>) -> Self {
        RunId(id.into())
    }

    pub fn unknown() -> Self {
        RunId(UNKNOWN_RUN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        RunId::unknown()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RunId {
    fn from(id: &str) -> Self {
        RunId(id.to_string())
    }
}

/// Canonical stage name.
///
/// Case-sensitive. Only produced by label normalization, which collapses the
/// decorated variants of a label onto one name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageName(pub String);

impl StageName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StageName {
    fn from(name: &str) -> Self {
        StageName(name.to_string())
    }
}

/// Split a combined `<stage>_<run>` identifier on its last underscore.
///
/// `OpenVINS_spaceship` gives (`OpenVINS`, `spaceship`). Without an underscore
/// the whole identifier is the stage prefix and the run is `unknown`.
pub fn split_identifier(identifier: &str) -> (String, RunId) {
    match identifier.rsplit_once('_') {
        Some((head, run)) => (head.to_string(), RunId::new(run)),
        None => (identifier.to_string(), RunId::unknown()),
    }
}

/// Batch ID for one invocation of the pipeline.
///
/// Format: `batch-<date>-<time>-<random>`
/// Example: `batch-20260115-143022-abc123`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub String);

impl BatchId {
    /// Generate a new batch ID.
    pub fn new() -> Self {
        let now = chrono::Utc::now();
        let random: String = uuid::Uuid::new_v4()
            .to_string()
            .chars()
            .take(6)
            .collect();
        BatchId(format!("batch-{}-{}", now.format("%Y%m%d-%H%M%S"), random))
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
