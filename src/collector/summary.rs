use super::{Quartiles, Statistics};
use crate::Value;

/// Aggregates of one axis of a window, without the raw samples.
///
/// Answers every statistic a [`ValueCollector`](super::ValueCollector) answers,
/// which is what the store persists per window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    /// Number of samples
    pub count: usize,

    /// Sum of all samples
    pub sum: Value,

    /// Smallest sample
    pub min: Option<Value>,

    /// Largest sample
    pub max: Option<Value>,

    /// Exact quartiles
    pub quartiles: Option<Quartiles>,
}

impl Statistics for Summary {
    fn count(&self) -> usize {
        self.count
    }

    fn sum(&self) -> Value {
        self.sum
    }

    fn min(&self) -> Option<Value> {
        self.min
    }

    fn max(&self) -> Option<Value> {
        self.max
    }

    fn quartiles(&self) -> Option<Quartiles> {
        self.quartiles
    }
}
