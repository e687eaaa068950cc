use crate::{DataValue, Dataset, Quartiles, TimeFrame, Value};

/// A difference between an expected and an actual dataset.
#[derive(Clone, Debug, PartialEq)]
pub enum Mismatch {
    /// A header field differs
    Header {
        /// Field name
        field: &'static str,

        /// Expected value
        expected: String,

        /// Actual value
        actual: String,
    },

    /// The datasets have a different number of windows
    Length {
        /// Expected number of items
        expected: usize,

        /// Actual number of items
        actual: usize,
    },

    /// An item covers a different window
    TimeFrame {
        /// Item index
        index: usize,

        /// Expected window
        expected: TimeFrame,

        /// Actual window
        actual: TimeFrame,
    },

    /// An item's value differs by more than the tolerance
    Value {
        /// Item index
        index: usize,

        /// Expected value
        expected: DataValue,

        /// Actual value
        actual: DataValue,
    },
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Header {
                field,
                expected,
                actual,
            } => write!(f, "header {field}: expected {expected}, got {actual}"),
            Self::Length { expected, actual } => {
                write!(f, "expected {expected} items, got {actual}")
            }
            Self::TimeFrame {
                index,
                expected,
                actual,
            } => write!(f, "item {index}: expected window {expected}, got {actual}"),
            Self::Value {
                index,
                expected,
                actual,
            } => write!(f, "item {index}: expected {expected:?}, got {actual:?}"),
        }
    }
}

/// Outcome of comparing two datasets.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comparison {
    /// Every difference found
    pub mismatches: Vec<Mismatch>,
}

impl Comparison {
    /// Returns `true` if no difference was found.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.mismatches.is_empty()
    }
}

fn close(a: Value, b: Value, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

fn quartiles_close(a: &Quartiles, b: &Quartiles, tolerance: f64) -> bool {
    close(a.first, b.first, tolerance)
        && close(a.second, b.second, tolerance)
        && close(a.third, b.third, tolerance)
}

fn values_close(expected: &DataValue, actual: &DataValue, tolerance: f64) -> bool {
    match (expected, actual) {
        (DataValue::Scalar(a), DataValue::Scalar(b)) => close(*a, *b, tolerance),
        (DataValue::Quartiles(a), DataValue::Quartiles(b)) => quartiles_close(a, b, tolerance),
        (DataValue::Vector(a), DataValue::Vector(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| close(*a, *b, tolerance))
        }
        (DataValue::VectorQuartiles(a), DataValue::VectorQuartiles(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b)
                    .all(|(a, b)| quartiles_close(a, b, tolerance))
        }
        _ => false,
    }
}

/// Compares a dataset computed from raw samples against one served by a backend.
///
/// Headers must agree on subject, source, sensor, statistic, window width and effective
/// time frame; items must cover the same windows in the same order, with values equal
/// within `tolerance`.
#[must_use]
pub fn compare(expected: &Dataset, actual: &Dataset, tolerance: f64) -> Comparison {
    let mut mismatches = vec![];

    let (e, a) = (&expected.header, &actual.header);

    for (field, expected, actual) in [
        ("subjectId", e.subject_id.clone(), a.subject_id.clone()),
        ("sourceId", e.source_id.clone(), a.source_id.clone()),
        ("sourceDataName", e.sensor.clone(), a.sensor.clone()),
        ("statistic", e.statistic.to_string(), a.statistic.to_string()),
        ("timeWindow", e.time_window.to_string(), a.time_window.to_string()),
        (
            "effectiveTimeFrame",
            e.effective_time_frame.to_string(),
            a.effective_time_frame.to_string(),
        ),
    ] {
        if expected != actual {
            mismatches.push(Mismatch::Header {
                field,
                expected,
                actual,
            });
        }
    }

    if expected.items.len() != actual.items.len() {
        mismatches.push(Mismatch::Length {
            expected: expected.items.len(),
            actual: actual.items.len(),
        });
    }

    for (index, (e, a)) in expected.items.iter().zip(&actual.items).enumerate() {
        if e.time_frame != a.time_frame {
            mismatches.push(Mismatch::TimeFrame {
                index,
                expected: e.time_frame,
                actual: a.time_frame,
            });
        }

        if !values_close(&e.value, &a.value, tolerance) {
            mismatches.push(Mismatch::Value {
                index,
                expected: e.value.clone(),
                actual: a.value.clone(),
            });
        }
    }

    for mismatch in &mismatches {
        log::warn!(
            "{} {} of {}: {mismatch}",
            expected.header.sensor,
            expected.header.statistic,
            expected.header.subject_id
        );
    }

    Comparison { mismatches }
}
