//! Run discovery under an input root.
//!
//! Two layouts are recognized:
//! - profiler runs: a directory named `<run><suffix>` whose newest
//!   sub-directory (or the newest one below that) holds the log and the trace
//!   export
//! - loose logs: `<run>.log` files directly under the root, log only
//!
//! Discovery never reads file contents. An expected file that is absent is
//! recorded on the [`RunInput`] so the run can report it.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use tracing::{debug, warn};
use xrt_common::{Error, Result, RunId};
use xrt_config::RunLayout;

/// An expected input file that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingArtifact {
    pub artifact: String,
    pub path: PathBuf,
}

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunInput {
    pub run: RunId,
    pub log: Option<PathBuf>,
    pub trace: Option<PathBuf>,
    pub missing: Vec<MissingArtifact>,
}

impl RunInput {
    pub fn new(run: RunId, log: Option<PathBuf>, trace: Option<PathBuf>) -> Self {
        RunInput {
            run,
            log,
            trace,
            missing: Vec::new(),
        }
    }
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Most recently modified sub-directory; ties go to the larger name.
fn newest_subdir(dir: &Path) -> Option<PathBuf> {
    fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .max_by(|a, b| modified(a).cmp(&modified(b)).then_with(|| a.cmp(b)))
}

fn has_expected_file(dir: &Path, layout: &RunLayout) -> bool {
    dir.join(&layout.log_file_name).is_file() || dir.join(&layout.trace_file_name).is_file()
}

/// Pick the directory holding a profiler run's files, at most two levels down.
fn locate_run_dir(run_dir: &Path, layout: &RunLayout) -> PathBuf {
    let mut dir = run_dir.to_path_buf();
    for _ in 0..2 {
        if has_expected_file(&dir, layout) {
            break;
        }
        match newest_subdir(&dir) {
            Some(next) => dir = next,
            None => break,
        }
    }
    dir
}

fn profiler_run(run: RunId, run_dir: &Path, layout: &RunLayout) -> RunInput {
    let dir = locate_run_dir(run_dir, layout);
    let mut input = RunInput::new(run, None, None);
    let log = dir.join(&layout.log_file_name);
    let trace = dir.join(&layout.trace_file_name);

    if log.is_file() {
        input.log = Some(log);
    } else {
        input.missing.push(MissingArtifact {
            artifact: "log".to_string(),
            path: log,
        });
    }
    if trace.is_file() {
        input.trace = Some(trace);
    } else {
        input.missing.push(MissingArtifact {
            artifact: "trace".to_string(),
            path: trace,
        });
    }
    debug!(
        run = %input.run,
        dir = %dir.display(),
        missing = input.missing.len(),
        "profiler run located"
    );
    input
}

/// Find every run under `root`, sorted by RunId.
///
/// Fails with [`Error::NoRuns`] when the root is absent or holds no run.
pub fn discover_runs(root: &Path, layout: &RunLayout) -> Result<Vec<RunInput>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NoRuns {
                root: root.to_path_buf(),
            });
        }
        Err(e) => return Err(e.into()),
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok().map(|e| e.path())).collect();
    paths.sort();

    let suffix = layout.run_dir_suffix.as_str();
    let mut runs = Vec::new();
    for path in paths {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_dir() {
            if suffix.is_empty() {
                continue;
            }
            if let Some(run) = name.strip_suffix(suffix).filter(|r| !r.is_empty()) {
                runs.push(profiler_run(RunId::from(run), &path, layout));
            }
        } else if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == layout.loose_log_extension.as_str())
        {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                runs.push(RunInput::new(RunId::from(stem), Some(path.clone()), None));
            }
        }
    }

    runs.sort_by(|a, b| a.run.cmp(&b.run));
    let mut seen = BTreeSet::new();
    runs.retain(|input| {
        let fresh = seen.insert(input.run.clone());
        if !fresh {
            warn!(run = %input.run, "duplicate run id; keeping the first");
        }
        fresh
    });

    if runs.is_empty() {
        return Err(Error::NoRuns {
            root: root.to_path_buf(),
        });
    }
    debug!(root = %root.display(), runs = runs.len(), "runs discovered");
    Ok(runs)
}
