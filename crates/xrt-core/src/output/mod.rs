//! Derived artifacts: CSV tables, the batch summary, terminal rendering.

pub mod render;
pub mod summary;
pub mod tables;

pub use render::{render_json, render_pivot, render_ranked, render_run, OutputFormat};
pub use summary::{write_summary, BatchSummary, SUMMARY_FILE};
pub use tables::{load_duration_dir, read_duration_table, safe_filename};
