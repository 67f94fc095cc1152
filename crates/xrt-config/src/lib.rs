//! XR timing analysis configuration loading and validation.
//!
//! This crate provides:
//! - The typed `PipelineConfig` passed into the pipeline entry point
//! - Pattern specifications for fixed-label and captured-label extraction
//! - Config resolution (CLI → env → XDG → defaults)
//! - Structural and regex validation
//! - Configuration presets for the common log flavours

pub mod patterns;
pub mod pipeline;
pub mod preset;
pub mod resolve;
pub mod validate;

pub use patterns::{PatternMode, PatternSpec};
pub use pipeline::{ConfigError, PipelineConfig, RunLayout};
pub use preset::{get_preset, list_presets, PresetInfo, PresetName};
pub use resolve::{load_config_file, resolve_config, ConfigSource, ResolvedConfig};
pub use validate::{validate, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";

/// Minimum observation count for a stage series to be retained.
pub const DEFAULT_ADMISSION_THRESHOLD: usize = 100;
