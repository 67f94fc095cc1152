//! Label canonicalization.
//!
//! Rules, in order:
//! 1. strip leading `:` characters
//! 2. cut at the first remaining `:`
//! 3. for captured labels, cut at the first `(`
//! 4. trim whitespace
//! 5. an empty result becomes `unnamed`
//!
//! The output never contains `:` (nor `(` for captured labels) and is trimmed,
//! so applying the rules again is a no-op.

use xrt_common::StageName;

use crate::collect::LabelKind;

/// Stage assigned to labels that normalize to nothing.
pub const UNNAMED_STAGE: &str = "unnamed";

/// Normalize a label with every rule applied.
pub fn normalize(raw_label: &str) -> StageName {
    normalize_label(raw_label, LabelKind::Captured)
}

/// Normalize a label according to where it came from.
///
/// Parenthetical detail is only stripped from captured labels; fixed labels
/// and trace names keep their parentheses.
pub fn normalize_label(raw_label: &str, kind: LabelKind) -> StageName {
    let mut label = raw_label.trim_start_matches(':');
    if let Some((head, _)) = label.split_once(':') {
        label = head;
    }
    if kind == LabelKind::Captured {
        if let Some((head, _)) = label.split_once('(') {
            label = head;
        }
    }
    let label = label.trim();
    if label.is_empty() {
        StageName::from(UNNAMED_STAGE)
    } else {
        StageName::from(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decorated_label() {
        assert_eq!(normalize(":foo:bar(baz)").as_str(), "foo");
    }

    #[test]
    fn trace_names() {
        assert_eq!(normalize_label("Render:y", LabelKind::Trace).as_str(), "Render");
        assert_eq!(
            normalize_label("::Timewarp_vk:submit", LabelKind::Trace).as_str(),
            "Timewarp_vk"
        );
        assert_eq!(
            normalize_label("Hologram (gl)", LabelKind::Trace).as_str(),
            "Hologram (gl)"
        );
    }

    #[test]
    fn captured_label_loses_detail() {
        assert_eq!(
            normalize_label("detect new (152 features)", LabelKind::Captured).as_str(),
            "detect new"
        );
    }

    #[test]
    fn empty_results_are_unnamed() {
        assert_eq!(normalize("").as_str(), UNNAMED_STAGE);
        assert_eq!(normalize(":::").as_str(), UNNAMED_STAGE);
        assert_eq!(normalize("  :after").as_str(), UNNAMED_STAGE);
        assert_eq!(normalize("(only detail)").as_str(), UNNAMED_STAGE);
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(normalize("MSCKF update").as_str(), "MSCKF update");
    }

    #[test]
    fn idempotent_on_examples() {
        for raw in [":foo:bar(baz)", " x ", "a(b):c", "", "unnamed", "Render:y"] {
            for kind in [LabelKind::Fixed, LabelKind::Captured, LabelKind::Trace] {
                let once = normalize_label(raw, kind);
                assert_eq!(normalize_label(once.as_str(), kind), once, "{raw:?}");
            }
        }
    }
}
