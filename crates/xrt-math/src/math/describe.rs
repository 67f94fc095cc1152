//! Descriptive statistics over a sample.
//!
//! Quantiles use linear interpolation between closest ranks: for sorted values
//! `v` of length `n`, the `p`-quantile sits at rank `p * (n - 1)`. This is the
//! convention of the usual `describe` helpers in data-frame libraries, so
//! numbers line up with tables produced elsewhere.

use serde::{Deserialize, Serialize};

/// Summary of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Describe {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

/// Interpolated quantile of already sorted values.
///
/// `p` is clamped to `[0, 1]`. Returns `None` for an empty slice.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }
    let p = if p.is_nan() { 0.5 } else { p.clamp(0.0, 1.0) };
    let rank = p * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Describe a sample. Returns `None` when it is empty.
///
/// NaN values sort last and therefore poison `max`; callers feed durations,
/// which are never NaN.
pub fn describe(values: &[f64]) -> Option<Describe> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let mean = sorted.iter().sum::<f64>() / count as f64;

    Some(Describe {
        count,
        mean,
        min: sorted[0],
        max: sorted[count - 1],
        p25: quantile_sorted(&sorted, 0.25)?,
        p50: quantile_sorted(&sorted, 0.50)?,
        p75: quantile_sorted(&sorted, 0.75)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn even_length_sample() {
        let d = describe(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(d.count, 4);
        assert!(approx_eq(d.mean, 2.5, 1e-12));
        assert!(approx_eq(d.p50, 2.5, 1e-12));
        assert!(approx_eq(d.p25, 1.75, 1e-12));
        assert!(approx_eq(d.p75, 3.25, 1e-12));
        assert_eq!(d.min, 1.0);
        assert_eq!(d.max, 4.0);
    }

    #[test]
    fn odd_length_median_is_middle_value() {
        let d = describe(&[5.0, 1.0, 4.0, 2.0, 3.0]).unwrap();
        assert!(approx_eq(d.p50, 3.0, 1e-12));
        assert!(approx_eq(d.p25, 2.0, 1e-12));
        assert!(approx_eq(d.p75, 4.0, 1e-12));
    }

    #[test]
    fn single_value() {
        let d = describe(&[7.5]).unwrap();
        assert_eq!(d.p25, 7.5);
        assert_eq!(d.p75, 7.5);
        assert_eq!(d.mean, 7.5);
    }

    #[test]
    fn empty_sample() {
        assert!(describe(&[]).is_none());
        assert!(quantile_sorted(&[], 0.5).is_none());
    }

    proptest::proptest! {
        #[test]
        fn quartiles_are_ordered(values in proptest::collection::vec(0.0f64..1e6, 1..200)) {
            let d = describe(&values).unwrap();
            proptest::prop_assert!(d.min <= d.p25);
            proptest::prop_assert!(d.p25 <= d.p50);
            proptest::prop_assert!(d.p50 <= d.p75);
            proptest::prop_assert!(d.p75 <= d.max);
            proptest::prop_assert!(d.min <= d.mean + 1e-9 && d.mean <= d.max + 1e-9);
        }
    }

    #[test]
    fn quantile_endpoints() {
        let v = [10.0, 20.0, 30.0];
        assert_eq!(quantile_sorted(&v, 0.0), Some(10.0));
        assert_eq!(quantile_sorted(&v, 1.0), Some(30.0));
        assert_eq!(quantile_sorted(&v, 1.5), Some(30.0));
    }
}
