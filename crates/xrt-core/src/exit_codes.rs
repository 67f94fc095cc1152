//! Exit codes for the xrt-core CLI.
//!
//! Exit codes communicate the batch outcome without requiring output parsing.

use xrt_common::Error;

/// Exit codes for xrt-core operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Every run processed without issue
    Clean = 0,

    /// Completed, but at least one run recovered from a problem
    CompletedWithWarnings = 1,

    /// No input runs discovered
    NoRuns = 2,

    /// Configuration error
    ConfigError = 10,

    /// I/O error
    IoError = 13,

    /// Internal/unknown error
    InternalError = 99,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Exit code for an error that stopped a command.
    pub fn for_error(err: &Error) -> Self {
        match err {
            Error::NoRuns { .. } => ExitCode::NoRuns,
            Error::Config(_) | Error::InvalidPattern { .. } => ExitCode::ConfigError,
            Error::Io(_)
            | Error::Output { .. }
            | Error::Csv(_)
            | Error::Decode { .. }
            | Error::MissingInput { .. }
            | Error::Schema { .. } => ExitCode::IoError,
            Error::Json(_) | Error::EmptyAggregate { .. } => ExitCode::InternalError,
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}
