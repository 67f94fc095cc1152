//! Named configuration presets for the log flavours in circulation.

use std::fmt;
use std::str::FromStr;

use crate::patterns::{vio_patterns, PatternSpec};
use crate::pipeline::{ConfigError, PipelineConfig};

/// Available presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetName {
    /// Every `[TIME]` stage plus `[TIME-KLT]` entries.
    Default,
    /// Fixed-label `[TIME]` stages only.
    Vio,
    /// Captured-label `[TIME-KLT]` entries only.
    Klt,
    /// Only the `[TIME] ... for total` line.
    TotalOnly,
}

impl PresetName {
    pub const ALL: [PresetName; 4] = [
        PresetName::Default,
        PresetName::Vio,
        PresetName::Klt,
        PresetName::TotalOnly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Default => "default",
            PresetName::Vio => "vio",
            PresetName::Klt => "klt",
            PresetName::TotalOnly => "total-only",
        }
    }

    fn description(self) -> &'static str {
        match self {
            PresetName::Default => "all [TIME] stages and [TIME-KLT] entries",
            PresetName::Vio => "fixed-label [TIME] stages",
            PresetName::Klt => "captured-label [TIME-KLT] entries",
            PresetName::TotalOnly => "[TIME] total only",
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PresetName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownPreset(s.to_string()))
    }
}

/// Summary of a preset for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetInfo {
    pub name: PresetName,
    pub description: &'static str,
    pub pattern_count: usize,
}

/// Build the configuration for a preset.
pub fn get_preset(name: PresetName) -> PipelineConfig {
    let patterns = match name {
        PresetName::Default => return PipelineConfig::default(),
        PresetName::Vio => vio_patterns(),
        PresetName::Klt => vec![PatternSpec::klt_time()],
        PresetName::TotalOnly => vec![PatternSpec::fixed_time("total")],
    };
    PipelineConfig {
        patterns,
        ..PipelineConfig::default()
    }
}

pub fn list_presets() -> Vec<PresetInfo> {
    PresetName::ALL
        .into_iter()
        .map(|name| PresetInfo {
            name,
            description: name.description(),
            pattern_count: get_preset(name).patterns.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::validate;

    #[test]
    fn every_preset_validates() {
        for name in PresetName::ALL {
            assert!(validate(&get_preset(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn preset_parsing() {
        assert_eq!("KLT".parse::<PresetName>().unwrap(), PresetName::Klt);
        assert_eq!(
            "total-only".parse::<PresetName>().unwrap(),
            PresetName::TotalOnly
        );
        assert!("fast".parse::<PresetName>().is_err());
    }

    #[test]
    fn listing_counts_patterns() {
        let listed = list_presets();
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].pattern_count, 8);
        assert_eq!(listed[3].pattern_count, 1);
    }
}
