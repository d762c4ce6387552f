// Epsilon-tolerant comparisons for bounds, values and integrality

use std::cmp::Ordering;

/// Absolute tolerance used for every bound, value and integrality check.
pub const EPSILON: f64 = 1e-6;

/// Compares two doubles, treating values within [`EPSILON`] as equal.
///
/// Equal infinities compare equal. A NaN never compares equal to anything.
pub fn compare_to_eps(a: f64, b: f64) -> Ordering {
    if a == b || (a - b).abs() <= EPSILON {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    compare_to_eps(a, b) == Ordering::Equal
}

/// `lower <= value <= upper`, inclusive and within tolerance.
pub fn is_between(value: f64, lower: f64, upper: f64) -> bool {
    compare_to_eps(value, lower) != Ordering::Less
        && compare_to_eps(value, upper) != Ordering::Greater
}

pub fn is_integer(value: f64) -> bool {
    value.is_finite() && (value - value.round()).abs() <= EPSILON
}
