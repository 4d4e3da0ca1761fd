//! Closed-form check of the final array contents.
//!
//! Starting from `A = 1`, `B = 2`, `C = 0`, every repeat of the four kernels
//! transforms each element the same way, so element 0 can be predicted with
//! a scalar recurrence and compared against what the workers produced.

use crate::config::{StreamElement, SCALAR, VALIDATION_EPSILON};

/// Outcome of comparing the arrays with the recurrence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Validation {
    pub expected: (StreamElement, StreamElement, StreamElement),
    pub actual: (StreamElement, StreamElement, StreamElement),
    /// Largest relative error over `a`, `b`, `c`.
    pub max_rel_error: f64,
    pub passed: bool,
}

/// Expected `(a, b, c)` after `ntimes` Copy-Scale-Add-Triad cycles.
pub fn expected_values(ntimes: usize) -> (StreamElement, StreamElement, StreamElement) {
    let mut aj: StreamElement = 1.0;
    let mut bj: StreamElement = 2.0;
    let mut cj: StreamElement = 0.0;

    for _ in 0..ntimes {
        cj = aj;
        bj = SCALAR * cj;
        cj = aj + bj;
        aj = bj + SCALAR * cj;
    }

    (aj, bj, cj)
}

fn rel_error(actual: StreamElement, expected: StreamElement) -> f64 {
    let diff = (actual as f64 - expected as f64).abs();
    if expected != 0.0 {
        diff / (expected as f64).abs()
    } else {
        diff
    }
}

/// Compare element 0 of each array with the recurrence after `ntimes` repeats.
pub fn validate(
    actual: (StreamElement, StreamElement, StreamElement),
    ntimes: usize,
) -> Validation {
    let expected = expected_values(ntimes);
    let max_rel_error = rel_error(actual.0, expected.0)
        .max(rel_error(actual.1, expected.1))
        .max(rel_error(actual.2, expected.2));

    Validation {
        expected,
        actual,
        max_rel_error,
        // NaN never validates.
        passed: max_rel_error < VALIDATION_EPSILON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_values_single_cycle() {
        // c = 1, b = 3, c = 4, a = 3 + 12
        assert_eq!(expected_values(1), (15.0, 3.0, 4.0));
    }

    #[test]
    fn test_expected_values_zero_cycles() {
        assert_eq!(expected_values(0), (1.0, 2.0, 0.0));
    }

    #[test]
    fn test_validate_accepts_exact_match() {
        let v = validate(expected_values(10), 10);
        assert!(v.passed);
        assert_eq!(v.max_rel_error, 0.0);
    }

    #[test]
    fn test_validate_rejects_drift() {
        let (a, b, c) = expected_values(3);
        let v = validate((a * 1.001, b, c), 3);
        assert!(!v.passed);
        assert!(v.max_rel_error > 1e-4);
    }

    #[test]
    fn test_validate_rejects_nan() {
        let (_, b, c) = expected_values(2);
        assert!(!validate((StreamElement::NAN, b, c), 2).passed);
    }
}
