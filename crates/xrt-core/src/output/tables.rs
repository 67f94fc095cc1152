//! CSV table writers and readers.
//!
//! File layout under an output directory:
//! - `{stage}_{run}.csv`: one `Duration (ns)` column per retained series
//! - `{run}_stats.csv`: `Stage,mean,25%,50%,75%` in milliseconds
//! - `{run}_share.csv`: `Stage,Total (ms),Ratio (%)`
//! - `comparison.csv`: every (stage, run) row, ranked by mean
//! - `comparison_{metric}.csv`: stage × run pivot, empty cells for gaps
//!
//! Duration tables can be read back with [`load_duration_dir`], which recovers
//! stage and run from the file stem. Names that clash within one directory are
//! numbered by [`FileNames`].

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};
use xrt_common::schema::{SHARE_HEADER, STATS_HEADER};
use xrt_common::{split_identifier, Error, Result, RunId, StageName, DURATION_COLUMN};

use crate::collect::trace_table::{find_column, parse_duration_cell};
use crate::stage::StageSeries;
use crate::stats::{ComparisonTable, Metric, PivotTable, StageShare, StageStats};

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\-]+").expect("unsafe chars regex"));
static REPEATED_UNDERSCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("underscore regex"));

/// Comparison long-format header.
pub const COMPARISON_HEADER: [&str; 9] = [
    "Stage", "Run", "count", "mean", "min", "max", "25%", "50%", "75%",
];

pub const COMPARISON_FILE: &str = "comparison.csv";

/// Longest file name component produced by [`safe_filename`]. Two of them plus
/// a clash counter and the extension stay under the usual 255-byte name limit.
pub const MAX_NAME_COMPONENT: usize = 96;

/// Make a label usable as a file name component.
pub fn safe_filename(label: &str) -> String {
    let replaced = UNSAFE_CHARS.replace_all(label, "_");
    let collapsed = REPEATED_UNDERSCORE.replace_all(&replaced, "_");
    let mut trimmed = collapsed.trim_matches('_');
    // only ASCII survives the replacement, so any byte index is a boundary
    if trimmed.len() > MAX_NAME_COMPONENT {
        trimmed = trimmed[..MAX_NAME_COMPONENT].trim_end_matches('_');
    }
    if trimmed.is_empty() {
        "unnamed".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File names already taken in one output directory.
///
/// A clashing name is numbered before its last `_` segment, so
/// `Render_gl_sponza.csv` becomes `Render_gl_2_sponza.csv` and still reads
/// back under the same run.
#[derive(Debug, Default)]
pub struct FileNames {
    used: BTreeSet<String>,
}

impl FileNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take `name`, or the first free numbered variant of it.
    pub fn claim(&mut self, name: &str) -> String {
        if self.used.insert(name.to_string()) {
            return name.to_string();
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (name, String::new()),
        };
        let mut n = 2usize;
        loop {
            let candidate = match stem.rsplit_once('_') {
                Some((head, tail)) => format!("{head}_{n}_{tail}{ext}"),
                None => format!("{stem}_{n}{ext}"),
            };
            if self.used.insert(candidate.clone()) {
                warn!(requested = name, renamed = %candidate, "file name clash");
                return candidate;
            }
            n += 1;
        }
    }
}

pub fn duration_file_name(stage: &StageName, run: &RunId) -> String {
    format!("{}_{}.csv", safe_filename(stage.as_str()), safe_filename(run.as_str()))
}

pub fn stats_file_name(run: &RunId) -> String {
    format!("{}_stats.csv", safe_filename(run.as_str()))
}

pub fn share_file_name(run: &RunId) -> String {
    format!("{}_share.csv", safe_filename(run.as_str()))
}

pub fn pivot_file_name(metric: Metric) -> String {
    format!("comparison_{}.csv", metric.as_str())
}

fn ms(value: f64) -> String {
    format!("{value:.3}")
}

/// Write one series as a single-column duration table.
pub fn write_durations<W: Write>(writer: W, series: &StageSeries) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([DURATION_COLUMN])?;
    for ns in &series.observations {
        wtr.write_record([ns.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write a run's per-stage statistics. An empty map gives a header-only table.
pub fn write_stats<W: Write>(writer: W, stats: &BTreeMap<StageName, StageStats>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(STATS_HEADER)?;
    for (stage, s) in stats {
        wtr.write_record([stage.to_string(), ms(s.mean), ms(s.p25), ms(s.p50), ms(s.p75)])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_shares<W: Write>(writer: W, shares: &[StageShare]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(SHARE_HEADER)?;
    for share in shares {
        wtr.write_record([
            share.stage.to_string(),
            ms(share.total_ms),
            format!("{:.3}", share.ratio_pct),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Long-format comparison, ranked by mean.
pub fn write_comparison<W: Write>(writer: W, table: &ComparisonTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COMPARISON_HEADER)?;
    for s in table.ranked(Metric::Mean) {
        wtr.write_record([
            s.stage.to_string(),
            s.run.to_string(),
            s.count.to_string(),
            ms(s.mean),
            ms(s.min),
            ms(s.max),
            ms(s.p25),
            ms(s.p50),
            ms(s.p75),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_pivot<W: Write>(writer: W, pivot: &PivotTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Stage".to_string()];
    header.extend(pivot.runs.iter().map(RunId::to_string));
    wtr.write_record(&header)?;
    for (stage, cells) in &pivot.rows {
        let mut record = vec![stage.to_string()];
        record.extend(cells.iter().map(|cell| cell.map(ms).unwrap_or_default()));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Create `dir/name` and hand a buffered writer to `write`.
pub fn write_file<F>(dir: &Path, name: &str, write: F) -> Result<PathBuf>
where
    F: FnOnce(BufWriter<File>) -> Result<()>,
{
    let path = dir.join(name);
    let file = File::create(&path).map_err(|source| Error::Output {
        path: path.clone(),
        source,
    })?;
    write(BufWriter::new(file))?;
    debug!(path = %path.display(), "table written");
    Ok(path)
}

/// Read the `Duration (ns)` column of a table, skipping unusable cells.
pub fn read_duration_table<R: Read>(reader: R, source: &Path) -> Result<Vec<u64>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let Some(idx) = find_column(&headers, DURATION_COLUMN) else {
        return Err(Error::Schema {
            path: source.to_path_buf(),
            missing: DURATION_COLUMN.to_string(),
        });
    };
    let mut durations = Vec::new();
    for record in rdr.records() {
        let Ok(record) = record else { continue };
        if let Some(ns) = record.get(idx).and_then(parse_duration_cell) {
            durations.push(ns);
        }
    }
    Ok(durations)
}

/// Rebuild series from every duration table directly in `dir`.
///
/// The file stem is split on its last underscore into stage and run. CSV files
/// without a `Duration (ns)` column (statistics, shares, comparisons) are
/// skipped.
pub fn load_duration_dir(dir: &Path) -> Result<BTreeMap<RunId, BTreeMap<StageName, StageSeries>>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    paths.sort();

    let mut runs: BTreeMap<RunId, BTreeMap<StageName, StageSeries>> = BTreeMap::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let observations = match File::open(&path)
            .map_err(Error::from)
            .and_then(|f| read_duration_table(f, &path))
        {
            Ok(obs) => obs,
            Err(Error::Schema { .. }) => {
                debug!(path = %path.display(), "not a duration table");
                continue;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "duration table unreadable; skipped");
                continue;
            }
        };
        let (stage, run) = split_identifier(stem);
        let stage = StageName(stage);
        runs.entry(run.clone())
            .or_default()
            .insert(stage.clone(), StageSeries::new(stage, run, observations));
    }
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;

    fn series(stage: &str, run: &str, obs: Vec<u64>) -> StageSeries {
        StageSeries::new(StageName::from(stage), RunId::from(run), obs)
    }

    fn to_string(write: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        write(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn safe_names() {
        assert_eq!(safe_filename("MSCKF update"), "MSCKF_update");
        assert_eq!(safe_filename("detect new (x)"), "detect_new_x");
        assert_eq!(safe_filename("a/../b"), "a_b");
        assert_eq!(safe_filename("Timewarp_vk"), "Timewarp_vk");
        assert_eq!(safe_filename("(!)"), "unnamed");
        assert_eq!(
            duration_file_name(&StageName::from("SLAM update"), &RunId::from("sponza")),
            "SLAM_update_sponza.csv"
        );
    }

    #[test]
    fn long_labels_are_capped() {
        let name = safe_filename(&"x".repeat(300));
        assert_eq!(name.len(), MAX_NAME_COMPONENT);

        // a cut landing on a separator leaves no trailing underscore
        let label = format!("{} tail", "y".repeat(MAX_NAME_COMPONENT - 1));
        let name = safe_filename(&label);
        assert_eq!(name, "y".repeat(MAX_NAME_COMPONENT - 1));

        let run = RunId::new("r".repeat(300));
        let file = duration_file_name(&StageName(label.repeat(4)), &run);
        assert!(file.len() < 255);
    }

    #[test]
    fn clashing_names_are_numbered() {
        let mut names = FileNames::new();
        assert_eq!(names.claim("Render_gl_sponza.csv"), "Render_gl_sponza.csv");
        assert_eq!(names.claim("Render_gl_sponza.csv"), "Render_gl_2_sponza.csv");
        assert_eq!(names.claim("Render_gl_sponza.csv"), "Render_gl_3_sponza.csv");
        assert_eq!(names.claim("comparison.csv"), "comparison.csv");
        assert_eq!(names.claim("comparison.csv"), "comparison_2.csv");

        // a numbered name taken naturally later is numbered in turn
        assert_eq!(names.claim("Render_gl_2_sponza.csv"), "Render_gl_2_2_sponza.csv");
    }

    #[test]
    fn numbered_names_keep_their_run() {
        let (stage, run) = split_identifier("Render_gl_2_sponza");
        assert_eq!(stage, "Render_gl_2");
        assert_eq!(run.as_str(), "sponza");
    }

    #[test]
    fn unwritable_path_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("taken.csv")).unwrap();
        let err = write_file(dir.path(), "taken.csv", |_| Ok(())).unwrap_err();
        assert_eq!(err.code(), 63);
        assert!(err.to_string().contains("taken.csv"));
    }

    #[test]
    fn duration_table_has_single_column() {
        let s = series("total", "r", vec![12_500_000, 7]);
        let text = to_string(|buf| write_durations(buf, &s));
        assert_eq!(text, "Duration (ns)\n12500000\n7\n");
    }

    #[test]
    fn stats_table_rounds_to_three_decimals() {
        let s = series("total", "r", vec![1_000_000, 2_000_000, 3_000_000, 4_000_000]);
        let mut stats = BTreeMap::new();
        stats.insert(s.stage.clone(), summarize(&s).unwrap());
        let text = to_string(|buf| write_stats(buf, &stats));
        assert_eq!(text, "Stage,mean,25%,50%,75%\ntotal,2.500,1.750,2.500,3.250\n");
    }

    #[test]
    fn empty_stats_table_is_header_only() {
        let text = to_string(|buf| write_stats(buf, &BTreeMap::new()));
        assert_eq!(text, "Stage,mean,25%,50%,75%\n");
    }

    #[test]
    fn pivot_cells_for_gaps_are_empty() {
        let pivot = PivotTable {
            metric: Metric::Mean,
            runs: vec![RunId::from("a"), RunId::from("b")],
            rows: vec![(StageName::from("x"), vec![None, Some(1.5)])],
        };
        let text = to_string(|buf| write_pivot(buf, &pivot));
        assert_eq!(text, "Stage,a,b\nx,,1.500\n");
    }

    #[test]
    fn duration_dir_round_trip_and_skips_other_tables() {
        let dir = tempfile::tempdir().unwrap();
        let s = series("MSCKF_update", "sponza", vec![5, 6, 7]);
        write_file(dir.path(), &duration_file_name(&s.stage, &s.run), |w| {
            write_durations(w, &s)
        })
        .unwrap();
        write_file(dir.path(), "sponza_stats.csv", |w| write_stats(w, &BTreeMap::new())).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let runs = load_duration_dir(dir.path()).unwrap();
        assert_eq!(runs.len(), 1);
        let loaded = &runs[&RunId::from("sponza")][&StageName::from("MSCKF_update")];
        assert_eq!(loaded.observations, vec![5, 6, 7]);
    }

    #[test]
    fn duration_column_required() {
        let err = read_duration_table("a,b\n1,2\n".as_bytes(), Path::new("x.csv")).unwrap_err();
        assert!(matches!(err, Error::Schema { .. }));
    }
}
