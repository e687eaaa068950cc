use super::{compose, Statistics, ValueCollector};
use crate::{DataValue, Error, SensorShape, Statistic, Value};

/// Accumulates fixed-arity vector samples (e.g. x/y/z acceleration) of one window.
///
/// Every axis is an independent [`ValueCollector`]; all axes see the same number of samples.
#[derive(Clone, Debug)]
pub struct ArrayCollector {
    components: Vec<ValueCollector>,
}

impl ArrayCollector {
    /// Creates an empty collector for vectors of `arity` axes.
    #[must_use]
    pub fn new(arity: usize) -> Self {
        Self {
            components: vec![ValueCollector::default(); arity],
        }
    }

    /// Number of axes.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.components.len()
    }

    /// Adds a vector sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityMismatch`] if the sample does not have exactly `arity` values,
    /// in which case no axis is modified.
    pub fn add(&mut self, values: &[Value]) -> crate::Result<()> {
        if values.len() != self.arity() {
            return Err(Error::ArityMismatch {
                expected: self.arity(),
                actual: values.len(),
            });
        }

        for (component, value) in self.components.iter_mut().zip(values) {
            component.add(*value);
        }

        Ok(())
    }

    /// Per-axis collectors, in axis order.
    #[must_use]
    pub fn components(&self) -> &[ValueCollector] {
        &self.components
    }

    /// Number of vector samples added.
    #[must_use]
    pub fn count(&self) -> usize {
        self.components.first().map_or(0, Statistics::count)
    }

    /// Queries every axis and composes the results into one vector value.
    ///
    /// # Errors
    ///
    /// See [`Statistics::get`].
    pub fn get(&self, statistic: Statistic) -> crate::Result<DataValue> {
        compose(
            SensorShape::Vector(self.arity()),
            &self.components,
            statistic,
        )
    }
}
