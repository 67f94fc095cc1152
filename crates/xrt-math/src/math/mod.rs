//! Core math modules.

pub mod describe;
pub mod share;
pub mod units;
