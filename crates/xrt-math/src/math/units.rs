//! Duration unit conversion.
//!
//! Integer nanoseconds are the canonical unit. Logs report fractional
//! milliseconds; tables report milliseconds as `f64`.

/// Nanoseconds per millisecond.
pub const NS_PER_MS: u64 = 1_000_000;

/// Digits of a millisecond value representable in whole nanoseconds.
const NS_FRACTION_DIGITS: usize = 6;

/// Convert a decimal millisecond literal (e.g. `"12.5"`) to nanoseconds.
///
/// The conversion is done on the digits, not through `f64`, so it is exact for
/// up to six fractional digits. Further digits are truncated. Returns `None`
/// for anything that is not `digits[.digits]` or that overflows `u64`.
pub fn ns_from_ms_str(literal: &str) -> Option<u64> {
    let literal = literal.trim();
    let (whole, fraction) = match literal.split_once('.') {
        Some((w, f)) => (w, f),
        None => (literal, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let whole_ns = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().ok()?.checked_mul(NS_PER_MS)?
    };

    let mut fraction_ns = 0u64;
    for i in 0..NS_FRACTION_DIGITS {
        let digit = fraction.as_bytes().get(i).map_or(0, |b| u64::from(b - b'0'));
        fraction_ns = fraction_ns * 10 + digit;
    }

    whole_ns.checked_add(fraction_ns)
}

/// Convert floating-point milliseconds to nanoseconds.
///
/// Rounds to the nearest nanosecond so binary representation error in values
/// like `0.3` cannot shave a nanosecond off. `None` for negative or non-finite
/// input.
pub fn ns_from_ms(ms: f64) -> Option<u64> {
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    let ns = (ms * NS_PER_MS as f64).round();
    if ns > u64::MAX as f64 {
        return None;
    }
    Some(ns as u64)
}

/// Convert nanoseconds to floating-point milliseconds.
pub fn ms_from_ns(ns: u64) -> f64 {
    ns as f64 / NS_PER_MS as f64
}

/// Convert a nanosecond total (which may exceed `u64`) to milliseconds.
pub fn ms_from_ns_total(ns: u128) -> f64 {
    ns as f64 / NS_PER_MS as f64
}
