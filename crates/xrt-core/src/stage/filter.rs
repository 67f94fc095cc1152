//! Trace row exclusion.
//!
//! Rules are case-insensitive substrings matched against the raw row name,
//! before any normalization. The default pair drops command-buffer recording
//! and fast-pose queries, which dominate row counts without carrying any
//! comparative signal.

use tracing::debug;
use xrt_config::pipeline::DEFAULT_EXCLUSION_RULES;

use crate::collect::TraceRow;

/// Set of exclusion rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    /// Lowercased substrings.
    rules: Vec<String>,
}

/// Rows that survived filtering and how many did not.
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub kept: Vec<TraceRow>,
    pub excluded: usize,
}

impl ExclusionPolicy {
    pub fn new<I, S>(rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = ExclusionPolicy { rules: Vec::new() };
        for rule in rules {
            policy = policy.with_rule(rule.as_ref());
        }
        policy
    }

    pub fn defaults() -> Self {
        Self::new(DEFAULT_EXCLUSION_RULES)
    }

    /// No rules; every row is kept.
    pub fn none() -> Self {
        ExclusionPolicy { rules: Vec::new() }
    }

    /// Add a rule. Blank rules are ignored.
    pub fn with_rule(mut self, rule: &str) -> Self {
        let rule = rule.trim().to_lowercase();
        if !rule.is_empty() && !self.rules.contains(&rule) {
            self.rules.push(rule);
        }
        self
    }

    pub fn rules(&self) -> &[String] {
        &self.rules
    }

    pub fn is_excluded(&self, raw_name: &str) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let name = raw_name.to_lowercase();
        self.rules.iter().any(|rule| name.contains(rule.as_str()))
    }

    /// Lazily drop excluded rows.
    pub fn filter<'a, I>(&'a self, rows: I) -> impl Iterator<Item = TraceRow> + 'a
    where
        I: IntoIterator<Item = TraceRow>,
        I::IntoIter: 'a,
    {
        rows.into_iter().filter(move |row| !self.is_excluded(&row.name))
    }

    /// Filter and count what was dropped.
    pub fn apply(&self, rows: Vec<TraceRow>) -> FilterOutcome {
        let total = rows.len();
        let kept: Vec<TraceRow> = self.filter(rows).collect();
        let excluded = total - kept.len();
        if excluded > 0 {
            debug!(excluded, kept = kept.len(), "trace rows excluded");
        }
        FilterOutcome { kept, excluded }
    }
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self::defaults()
    }
}
