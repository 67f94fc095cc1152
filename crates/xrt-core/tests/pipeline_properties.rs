//! Property-based tests for the extraction and statistics invariants.

use proptest::prelude::*;
use xrt_common::{RunId, StageName};
use xrt_core::collect::{LabelKind, RawEvent};
use xrt_core::stage::{normalize, normalize_label, StageSeries};
use xrt_core::stats::{share_table, summarize};
use xrt_core::StageAggregator;
use xrt_math::{ns_from_ms, ns_from_ms_str};

fn kind_strategy() -> impl Strategy<Value = LabelKind> {
    prop_oneof![
        Just(LabelKind::Fixed),
        Just(LabelKind::Captured),
        Just(LabelKind::Trace),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2_000))]

    #[test]
    fn normalize_is_idempotent(raw in ".*", kind in kind_strategy()) {
        let once = normalize_label(&raw, kind);
        let twice = normalize_label(once.as_str(), kind);
        prop_assert_eq!(&twice, &once);
        prop_assert!(!once.as_str().contains(':'));
        prop_assert!(!once.as_str().is_empty());
        prop_assert_eq!(once.as_str().trim(), once.as_str());
    }

    #[test]
    fn normalize_strips_decoration(head in "[A-Za-z][A-Za-z ]{0,11}", tail in "[a-z:()]{0,8}") {
        let raw = format!("::{head}:{tail}");
        let stage = normalize(&raw);
        prop_assert_eq!(stage.as_str(), head.trim());
    }

    #[test]
    fn millisecond_literals_convert_exactly(whole in 0u64..1_000_000, frac in 0u64..1_000) {
        let literal = format!("{whole}.{frac:03}");
        let expected = whole * 1_000_000 + frac * 1_000;
        prop_assert_eq!(ns_from_ms_str(&literal), Some(expected));

        let ms: f64 = literal.parse().unwrap();
        prop_assert_eq!(ns_from_ms(ms), Some((ms * 1_000_000.0).round() as u64));
        prop_assert_eq!(ns_from_ms(ms), Some(expected));
    }

    #[test]
    fn shares_sum_to_one_hundred(totals in prop::collection::vec(0u64..1_000_000_000_000, 1..20)) {
        prop_assume!(totals.iter().any(|&t| t > 0));
        let run = RunId::from("r");
        let series: Vec<StageSeries> = totals
            .iter()
            .enumerate()
            .map(|(i, &t)| StageSeries::new(StageName(format!("s{i:02}")), run.clone(), vec![t]))
            .collect();
        let shares = share_table(&run, &series).unwrap();
        let sum: f64 = shares.iter().map(|s| s.ratio_pct).sum();
        prop_assert!((sum - 100.0).abs() < 1e-9, "sum = {}", sum);
        for pair in shares.windows(2) {
            prop_assert!(pair[0].ratio_pct >= pair[1].ratio_pct);
        }
    }

    #[test]
    fn statistics_are_ordered(obs in prop::collection::vec(0u64..10_000_000_000, 1..200)) {
        let series = StageSeries::new(StageName::from("s"), RunId::from("r"), obs.clone());
        let stats = summarize(&series).unwrap();
        prop_assert_eq!(stats.count, obs.len());
        let tol = 1e-9;
        prop_assert!(stats.min <= stats.p25 + tol);
        prop_assert!(stats.p25 <= stats.p50 + tol);
        prop_assert!(stats.p50 <= stats.p75 + tol);
        prop_assert!(stats.p75 <= stats.max + tol);
        prop_assert!(stats.mean >= stats.min - tol && stats.mean <= stats.max + tol);
    }

    #[test]
    fn aggregation_accounts_for_every_event(
        labels in prop::collection::vec(prop::sample::select(vec!["a", "b:x", ":b", "c(1)", "d"]), 0..400),
        threshold in 1usize..120,
    ) {
        let events: Vec<RawEvent> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| RawEvent {
                raw_label: label.to_string(),
                duration_ns: i as u64,
                kind: LabelKind::Captured,
            })
            .collect();
        let agg = StageAggregator::new(threshold).aggregate(&RunId::from("r"), events);
        let dropped: usize = agg.dropped.iter().map(|d| d.count).sum();
        prop_assert_eq!(agg.observation_count() + dropped, labels.len());
        for series in agg.series.values() {
            prop_assert!(series.count() >= threshold);
            prop_assert!(series.observations.windows(2).all(|w| w[0] < w[1]));
        }
        for d in &agg.dropped {
            prop_assert!(d.count < threshold);
        }
    }
}
