//! Test assertions for recorded traces.

use super::Trace;

/// Asserts that the trace holds exactly `expected`, in order.
pub fn assert_trace(trace: &Trace, expected: &[&str]) {
    let actual = trace.labels();
    assert_eq!(
        actual, expected,
        "Trace mismatch: expected {expected:?}, got {actual:?}"
    );
}

/// Asserts that `first` was recorded, and recorded before `second`.
pub fn assert_before(trace: &Trace, first: &str, second: &str) {
    let labels = trace.labels();
    let a = trace.position(first);
    let b = trace.position(second);
    match (a, b) {
        (Some(a), Some(b)) => assert!(
            a < b,
            "Expected '{first}' before '{second}', got {labels:?}"
        ),
        (None, _) => panic!("'{first}' was never recorded. Trace: {labels:?}"),
        (Some(_), None) => panic!("'{second}' was never recorded. Trace: {labels:?}"),
    }
}

/// Asserts that `label` was recorded exactly `expected` times.
pub fn assert_count(trace: &Trace, label: &str, expected: usize) {
    let actual = trace.count(label);
    assert_eq!(
        actual, expected,
        "Expected '{label}' {expected} time(s), got {actual}. Trace: {:?}",
        trace.labels()
    );
}
