//! Semantic validation of a pipeline configuration.

use std::fmt;

use regex::Regex;
use xrt_common::schema::is_compatible;

use crate::patterns::{PatternMode, LABEL_GROUP, MS_GROUP};
use crate::pipeline::PipelineConfig;
use crate::CONFIG_SCHEMA_VERSION;

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validate a configuration, collecting every problem rather than the first.
pub fn validate(config: &PipelineConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if !is_compatible(CONFIG_SCHEMA_VERSION, &config.schema_version) {
        errors.push(ValidationError::new(
            "schema_version",
            format!(
                "'{}' is not compatible with {CONFIG_SCHEMA_VERSION}",
                config.schema_version
            ),
        ));
    }

    if config.admission_threshold == 0 {
        errors.push(ValidationError::new(
            "admission_threshold",
            "must be at least 1",
        ));
    }

    for (i, rule) in config.exclusion_rules.iter().enumerate() {
        if rule.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("exclusion_rules[{i}]"),
                "empty rule would exclude every row",
            ));
        }
    }

    if config.patterns.is_empty() {
        errors.push(ValidationError::new("patterns", "at least one pattern is required"));
    }

    for (i, spec) in config.patterns.iter().enumerate() {
        let field = format!("patterns[{i}] ({})", spec.name);
        let re = match Regex::new(&spec.regex) {
            Ok(re) => re,
            Err(e) => {
                errors.push(ValidationError::new(field, format!("regex does not compile: {e}")));
                continue;
            }
        };
        let has_group = |group: &str| re.capture_names().flatten().any(|n| n == group);

        if !has_group(MS_GROUP) {
            errors.push(ValidationError::new(
                field.clone(),
                format!("regex lacks a `{MS_GROUP}` capture group"),
            ));
        }
        match spec.mode() {
            PatternMode::Fixed(stage) if stage.trim().is_empty() => {
                errors.push(ValidationError::new(field, "fixed stage label is empty"));
            }
            PatternMode::Fixed(_) => {}
            PatternMode::Captured if !has_group(LABEL_GROUP) => {
                errors.push(ValidationError::new(
                    field,
                    format!("no `stage` given and regex lacks a `{LABEL_GROUP}` capture group"),
                ));
            }
            PatternMode::Captured => {}
        }
    }

    if config.layout.log_file_name.is_empty() {
        errors.push(ValidationError::new("layout.log_file_name", "must not be empty"));
    }
    if config.layout.trace_file_name.is_empty() {
        errors.push(ValidationError::new("layout.trace_file_name", "must not be empty"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
