//! XR timing analysis common types, IDs, and errors.
//!
//! This crate provides foundational types shared across xrt-core modules:
//! - Run and stage identity types
//! - Batch identifiers and schema versioning
//! - Common error types
//! - Column names shared by every exported table

pub mod error;
pub mod id;
pub mod schema;

pub use error::{Error, Result};
pub use id::{split_identifier, BatchId, RunId, StageName};
pub use schema::{DURATION_COLUMN, NAME_COLUMN, SCHEMA_VERSION};
