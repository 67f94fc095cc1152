//! Schema versioning and table column names.

/// Current schema version for the batch summary JSON.
///
/// Follows semver: MAJOR.MINOR.PATCH
/// - MAJOR: Breaking changes (field removals, type changes)
/// - MINOR: Additive changes (new optional fields)
/// - PATCH: Bug fixes, documentation
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Event name column of a profiler trace export.
pub const NAME_COLUMN: &str = "Name";

/// Duration column shared by trace exports and per-stage duration tables.
pub const DURATION_COLUMN: &str = "Duration (ns)";

/// Header of the per-run statistics table (milliseconds).
pub const STATS_HEADER: [&str; 5] = ["Stage", "mean", "25%", "50%", "75%"];

/// Header of the per-run percentage share table.
pub const SHARE_HEADER: [&str; 3] = ["Stage", "Total (ms)", "Ratio (%)"];

/// Check if `version` is compatible with `current` (same major).
pub fn is_compatible(current: &str, version: &str) -> bool {
    let major = |v: &str| v.split('.').next().and_then(|s| s.parse::<u32>().ok());
    match (major(current), major(version)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
