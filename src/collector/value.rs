use super::{Quartiles, Statistics, Summary};
use crate::Value;
use std::cell::OnceCell;

/// Accumulates scalar samples of one window.
///
/// Count, sum, min and max are kept as running aggregates. The samples themselves are
/// retained so quartiles are exact; they are sorted at most once per batch of `add`s.
#[derive(Clone, Debug)]
pub struct ValueCollector {
    values: Vec<Value>,
    sum: Value,
    min: Value,
    max: Value,

    /// Computed on first quartile query, reset by `add`
    quartiles: OnceCell<Option<Quartiles>>,
}

impl Default for ValueCollector {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            sum: 0.0,
            min: Value::INFINITY,
            max: Value::NEG_INFINITY,
            quartiles: OnceCell::new(),
        }
    }
}

impl ValueCollector {
    /// Adds a sample.
    pub fn add(&mut self, value: Value) {
        self.values.push(value);
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        // NOTE: Invalidate sorted view
        self.quartiles.take();
    }

    /// Samples in insertion order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Snapshot of the aggregates, suitable for storage.
    #[must_use]
    pub fn summary(&self) -> Summary {
        Summary {
            count: self.count(),
            sum: self.sum,
            min: self.min(),
            max: self.max(),
            quartiles: self.quartiles(),
        }
    }
}

impl Statistics for ValueCollector {
    fn count(&self) -> usize {
        self.values.len()
    }

    fn sum(&self) -> Value {
        self.sum
    }

    fn min(&self) -> Option<Value> {
        (!self.values.is_empty()).then_some(self.min)
    }

    fn max(&self) -> Option<Value> {
        (!self.values.is_empty()).then_some(self.max)
    }

    fn quartiles(&self) -> Option<Quartiles> {
        *self.quartiles.get_or_init(|| {
            let mut sorted = self.values.clone();
            sorted.sort_unstable_by(Value::total_cmp);
            Quartiles::from_sorted(&sorted)
        })
    }
}
