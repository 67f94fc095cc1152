//! Percentage-of-total shares.

/// Percentage share of each total in their sum.
///
/// Totals are integer nanoseconds summed without overflow risk. Returns `None`
/// when the sum is zero (including an empty input): there is no meaningful
/// share to report and callers skip the share table instead of dividing by
/// zero.
pub fn percentage_shares(totals: &[u128]) -> Option<Vec<f64>> {
    let sum: u128 = totals.iter().sum();
    if sum == 0 {
        return None;
    }
    let denom = sum as f64;
    Some(totals.iter().map(|&t| t as f64 / denom * 100.0).collect())
}
