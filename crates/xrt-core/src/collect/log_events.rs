//! Pattern-based extraction of timed events from free-text logs.
//!
//! Each line is stripped of ANSI color escapes and then tried against every
//! configured pattern. A fixed-label pattern yields its configured stage; a
//! captured-label pattern yields whatever its `label` group matched.
//!
//! # Graceful Degradation
//! - Lines that are not valid UTF-8 are skipped and counted
//! - A file is only rejected when no line of it decodes
//! - Duration literals that do not convert (overflow) are skipped

use std::borrow::Cow;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};
use xrt_common::{Error, Result};
use xrt_config::patterns::{LABEL_GROUP, MS_GROUP};
use xrt_config::{PatternMode, PatternSpec};
use xrt_math::ns_from_ms_str;

use super::{LabelKind, RawEvent};

/// ESC `[`, parameter bytes, final letter.
static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1B\[[0-9;?]*[A-Za-z]").expect("ansi escape regex"));

/// Remove terminal color escape sequences from a line.
pub fn strip_ansi(line: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(line, "")
}

#[derive(Debug)]
struct CompiledPattern {
    name: String,
    regex: Regex,
    stage: Option<String>,
}

/// Outcome of scanning one log file.
#[derive(Debug, Default)]
pub struct LogExtraction {
    pub events: Vec<RawEvent>,
    pub lines: usize,
    pub undecodable_lines: usize,
}

/// Compiled set of extraction patterns.
#[derive(Debug)]
pub struct EventMatcher {
    patterns: Vec<CompiledPattern>,
}

impl EventMatcher {
    /// Compile pattern specs, rejecting any that cannot produce an event.
    pub fn new(specs: &[PatternSpec]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(specs.len());
        for spec in specs {
            let invalid = |reason: String| Error::InvalidPattern {
                name: spec.name.clone(),
                reason,
            };
            let regex = Regex::new(&spec.regex).map_err(|e| invalid(e.to_string()))?;
            let has_group = |group: &str| regex.capture_names().flatten().any(|n| n == group);
            if !has_group(MS_GROUP) {
                return Err(invalid(format!("missing `{MS_GROUP}` group")));
            }
            let stage = match spec.mode() {
                PatternMode::Fixed(stage) => Some(stage.to_string()),
                PatternMode::Captured if has_group(LABEL_GROUP) => None,
                PatternMode::Captured => {
                    return Err(invalid(format!("missing `{LABEL_GROUP}` group")));
                }
            };
            patterns.push(CompiledPattern {
                name: spec.name.clone(),
                regex,
                stage,
            });
        }
        Ok(EventMatcher { patterns })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// All events on one line, in pattern order.
    pub fn match_line(&self, line: &str) -> Vec<RawEvent> {
        let line = strip_ansi(line);
        let mut events = Vec::new();
        for pattern in &self.patterns {
            for caps in pattern.regex.captures_iter(&line) {
                let Some(duration_ns) = caps.name(MS_GROUP).and_then(|m| ns_from_ms_str(m.as_str()))
                else {
                    trace!(pattern = %pattern.name, "unconvertible duration literal");
                    continue;
                };
                let event = match &pattern.stage {
                    Some(stage) => RawEvent {
                        raw_label: stage.clone(),
                        duration_ns,
                        kind: LabelKind::Fixed,
                    },
                    None => {
                        let Some(label) = caps.name(LABEL_GROUP) else {
                            continue;
                        };
                        RawEvent {
                            raw_label: label.as_str().to_string(),
                            duration_ns,
                            kind: LabelKind::Captured,
                        }
                    }
                };
                events.push(event);
            }
        }
        events
    }

    /// Lazily yield events from a block of text, line by line.
    pub fn events<'a>(&'a self, text: &'a str) -> impl Iterator<Item = RawEvent> + 'a {
        text.lines().flat_map(move |line| self.match_line(line))
    }

    /// Extract from raw bytes, skipping lines that are not valid UTF-8.
    pub fn extract_bytes(&self, bytes: &[u8]) -> LogExtraction {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return LogExtraction {
                events: self.events(text).collect(),
                lines: text.lines().count(),
                undecodable_lines: 0,
            };
        }

        let mut extraction = LogExtraction::default();
        for raw in bytes.split(|&b| b == b'\n') {
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            extraction.lines += 1;
            match std::str::from_utf8(raw) {
                Ok(line) => extraction.events.extend(self.match_line(line)),
                Err(_) => extraction.undecodable_lines += 1,
            }
        }
        // A trailing newline produces one empty tail segment that is not a line.
        if bytes.ends_with(b"\n") {
            extraction.lines -= 1;
        }
        extraction
    }

    /// Read and extract a log file.
    ///
    /// Fails with [`Error::Decode`] only when the file has content and not a
    /// single line of it is text.
    pub fn extract_file(&self, path: &Path) -> Result<LogExtraction> {
        let bytes = std::fs::read(path)?;
        let extraction = self.extract_bytes(&bytes);
        if extraction.undecodable_lines > 0 && extraction.undecodable_lines == extraction.lines {
            return Err(Error::Decode {
                path: path.to_path_buf(),
            });
        }
        debug!(
            path = %path.display(),
            lines = extraction.lines,
            events = extraction.events.len(),
            undecodable = extraction.undecodable_lines,
            "log scanned"
        );
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrt_config::patterns::vio_patterns;

    fn default_matcher() -> EventMatcher {
        let mut specs = vio_patterns();
        specs.push(PatternSpec::klt_time());
        EventMatcher::new(&specs).unwrap()
    }

    #[test]
    fn strips_color_codes() {
        assert_eq!(
            strip_ansi("\x1b[32m[TIME]: 1.0 ms for total\x1b[0m"),
            "[TIME]: 1.0 ms for total"
        );
        assert_eq!(strip_ansi("\x1b[1;31mred"), "red");
        assert!(matches!(strip_ansi("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn fixed_label_lines() {
        let m = default_matcher();
        let events = m.match_line("\x1b[0;33m[TIME]: 12.5 ms for total\x1b[0m");
        assert_eq!(
            events,
            vec![RawEvent {
                raw_label: "total".into(),
                duration_ns: 12_500_000,
                kind: LabelKind::Fixed,
            }]
        );
        let events = m.match_line("[TIME]: 0.125 ms for SLAM delayed init");
        assert_eq!(events[0].raw_label, "SLAM delayed init");
        assert_eq!(events[0].duration_ns, 125_000);
    }

    #[test]
    fn captured_label_lines_keep_detail() {
        let m = default_matcher();
        let events = m.match_line("[TIME-KLT]: 0.412 ms for detect new (152 features)");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].raw_label, "detect new (152 features)");
        assert_eq!(events[0].kind, LabelKind::Captured);
        assert_eq!(events[0].duration_ns, 412_000);
    }

    #[test]
    fn unrelated_lines_yield_nothing() {
        let m = default_matcher();
        assert!(m.match_line("INFO starting plugin").is_empty());
        assert!(m.match_line("[TIME]: fast ms for total").is_empty());
    }

    #[test]
    fn lazy_sequence_over_text() {
        let m = default_matcher();
        let text = "[TIME]: 1.0 ms for tracking\nnoise\n[TIME]: 2.0 ms for total\n";
        let labels: Vec<_> = m.events(text).map(|e| e.raw_label).collect();
        assert_eq!(labels, vec!["tracking", "total"]);
    }

    #[test]
    fn invalid_utf8_lines_are_skipped() {
        let m = default_matcher();
        let mut bytes = b"[TIME]: 1.5 ms for total\r\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b'\n']);
        bytes.extend_from_slice(b"[TIME]: 2.5 ms for total\n");
        let ex = m.extract_bytes(&bytes);
        assert_eq!(ex.lines, 3);
        assert_eq!(ex.undecodable_lines, 1);
        let durations: Vec<_> = ex.events.iter().map(|e| e.duration_ns).collect();
        assert_eq!(durations, vec![1_500_000, 2_500_000]);
    }

    #[test]
    fn fully_binary_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.log");
        std::fs::write(&path, [0xffu8, 0xfe, 0xfd]).unwrap();
        let err = default_matcher().extract_file(&path).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn rejects_pattern_without_label_source() {
        let spec = PatternSpec {
            name: "bad".into(),
            regex: r"(?P<ms>\d+)".into(),
            stage: None,
        };
        let err = EventMatcher::new(&[spec]).unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
