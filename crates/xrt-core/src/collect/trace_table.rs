//! Profiler trace export reader.
//!
//! A trace table is CSV with at least `Name` and `Duration (ns)` columns; other
//! columns are ignored and column order does not matter. Malformed rows are
//! counted and skipped, never fatal. A table missing a required column is a
//! [`Error::Schema`] so the caller can skip trace-derived output for the run.

use std::io::Read;
use std::path::Path;

use tracing::{debug, trace};
use xrt_common::{Error, Result, DURATION_COLUMN, NAME_COLUMN};

use super::{LabelKind, RawEvent};

/// One `Name` / `Duration (ns)` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceRow {
    pub name: String,
    pub duration_ns: u64,
}

impl TraceRow {
    pub fn new(name: impl Into<String>, duration_ns: u64) -> Self {
        TraceRow {
            name: name.into(),
            duration_ns,
        }
    }

    pub fn into_event(self) -> RawEvent {
        RawEvent {
            raw_label: self.name,
            duration_ns: self.duration_ns,
            kind: LabelKind::Trace,
        }
    }
}

/// Parsed trace export.
#[derive(Debug, Default)]
pub struct TraceTable {
    pub rows: Vec<TraceRow>,
    /// Rows dropped for an unreadable record or an unusable duration.
    pub skipped_rows: usize,
}

/// Parse a duration cell in nanoseconds.
///
/// Integers are taken as-is; non-negative decimals (`"1234.0"`, as written by
/// some exporters) are rounded. Empty, negative, or non-numeric cells are
/// `None`.
pub fn parse_duration_cell(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(ns) = cell.parse::<u64>() {
        return Some(ns);
    }
    let value = cell.parse::<f64>().ok()?;
    if !value.is_finite() || value < 0.0 || value > u64::MAX as f64 {
        return None;
    }
    Some(value.round() as u64)
}

/// Locate a header, tolerating surrounding whitespace and a UTF-8 BOM.
pub(crate) fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
}

impl TraceTable {
    /// Read a trace table. `source` is only used for error reporting.
    pub fn from_reader<R: Read>(reader: R, source: &Path) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let name_idx = find_column(&headers, NAME_COLUMN);
        let duration_idx = find_column(&headers, DURATION_COLUMN);
        let (name_idx, duration_idx) = match (name_idx, duration_idx) {
            (Some(n), Some(d)) => (n, d),
            (n, d) => {
                let missing: Vec<&str> = [(n, NAME_COLUMN), (d, DURATION_COLUMN)]
                    .into_iter()
                    .filter(|(idx, _)| idx.is_none())
                    .map(|(_, col)| col)
                    .collect();
                return Err(Error::Schema {
                    path: source.to_path_buf(),
                    missing: missing.join(", "),
                });
            }
        };

        let mut table = TraceTable::default();
        for (line, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    trace!(line, error = %e, "unreadable trace record");
                    table.skipped_rows += 1;
                    continue;
                }
            };
            let name = record.get(name_idx);
            let duration = record.get(duration_idx).and_then(parse_duration_cell);
            match (name, duration) {
                (Some(name), Some(duration_ns)) => table.rows.push(TraceRow::new(name, duration_ns)),
                _ => table.skipped_rows += 1,
            }
        }

        debug!(
            path = %source.display(),
            rows = table.rows.len(),
            skipped = table.skipped_rows,
            "trace table read"
        );
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file), path)
    }
}
