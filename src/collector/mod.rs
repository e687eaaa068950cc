mod array;
mod summary;
mod value;

pub use array::ArrayCollector;
pub use summary::Summary;
pub use value::ValueCollector;

use crate::{DataValue, Error, Sample, SensorShape, Statistic, Value};
use serde::{Deserialize, Serialize};

/// First, second (median) and third quartile of a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    /// 25th percentile
    pub first: Value,

    /// 50th percentile
    pub second: Value,

    /// 75th percentile
    pub third: Value,
}

impl Quartiles {
    /// Computes the quartiles of an ascending slice.
    ///
    /// Uses linear interpolation between order statistics (R-7): for quantile `p`,
    /// `h = (n - 1) * p` and `q = s[floor(h)] + (h - floor(h)) * (s[ceil(h)] - s[floor(h)])`.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn from_sorted(sorted: &[Value]) -> Option<Self> {
        Some(Self {
            first: quantile(sorted, 0.25)?,
            second: quantile(sorted, 0.5)?,
            third: quantile(sorted, 0.75)?,
        })
    }

    /// Third minus first quartile.
    #[must_use]
    pub fn interquartile_range(&self) -> Value {
        self.third - self.first
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantile(sorted: &[Value], p: f64) -> Option<Value> {
    let last = sorted.len().checked_sub(1)?;

    let h = last as f64 * p;
    let lower_idx = h.floor();
    let fraction = h - lower_idx;

    let lower = *sorted.get(lower_idx as usize)?;
    let upper = *sorted.get(h.ceil() as usize)?;

    Some(lower + fraction * (upper - lower))
}

/// Result of querying a single axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Measure {
    /// A single number
    Value(Value),

    /// A quartile triple
    Quartiles(Quartiles),
}

impl Measure {
    /// Returns the scalar, or the median for a quartile triple.
    #[must_use]
    pub fn scalar(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Quartiles(quartiles) => quartiles.second,
        }
    }
}

/// Descriptive statistics of one axis of a window.
///
/// Implementors provide the raw aggregates, `get` derives every [`Statistic`] from them.
pub trait Statistics {
    /// Number of samples.
    fn count(&self) -> usize;

    /// Sum of all samples (0 if empty).
    fn sum(&self) -> Value;

    /// Smallest sample.
    fn min(&self) -> Option<Value>;

    /// Largest sample.
    fn max(&self) -> Option<Value>;

    /// Exact quartiles of all samples.
    fn quartiles(&self) -> Option<Quartiles>;

    /// Returns the requested statistic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCollector`] if the statistic needs at least one sample,
    /// and [`Error::UnsupportedStatistic`] for statistics that are only derived
    /// at the dataset level.
    fn get(&self, statistic: Statistic) -> crate::Result<Measure> {
        let value = match statistic {
            Statistic::Count => self.count() as Value,
            Statistic::Sum => self.sum(),
            Statistic::Minimum => self.min().ok_or(Error::EmptyCollector)?,
            Statistic::Maximum => self.max().ok_or(Error::EmptyCollector)?,
            Statistic::Average => {
                if self.count() == 0 {
                    return Err(Error::EmptyCollector);
                }
                self.sum() / self.count() as Value
            }
            Statistic::Quartiles => {
                return self
                    .quartiles()
                    .map(Measure::Quartiles)
                    .ok_or(Error::EmptyCollector);
            }
            Statistic::Median => self.quartiles().ok_or(Error::EmptyCollector)?.second,
            Statistic::InterquartileRange => self
                .quartiles()
                .ok_or(Error::EmptyCollector)?
                .interquartile_range(),
            Statistic::ReceivedMessages => return Err(Error::UnsupportedStatistic(statistic)),
        };

        Ok(Measure::Value(value))
    }
}

/// Builds the per-window value of a statistic from the axes of a window.
///
/// A scalar window yields a bare value, or a quartile triple for [`Statistic::Quartiles`].
/// A vector window yields one value per axis, or one quartile triple per axis.
pub(crate) fn compose<S: Statistics>(
    shape: SensorShape,
    axes: &[S],
    statistic: Statistic,
) -> crate::Result<DataValue> {
    match shape {
        SensorShape::Scalar => {
            let [axis] = axes else {
                return Err(Error::ArityMismatch {
                    expected: 1,
                    actual: axes.len(),
                });
            };

            Ok(match axis.get(statistic)? {
                Measure::Value(value) => DataValue::Scalar(value),
                Measure::Quartiles(quartiles) => DataValue::Quartiles(quartiles),
            })
        }
        SensorShape::Vector(arity) => {
            if arity != axes.len() {
                return Err(Error::ArityMismatch {
                    expected: arity,
                    actual: axes.len(),
                });
            }

            if statistic == Statistic::Quartiles {
                let quartiles = axes
                    .iter()
                    .map(|axis| axis.quartiles().ok_or(Error::EmptyCollector))
                    .collect::<crate::Result<Vec<_>>>()?;

                Ok(DataValue::VectorQuartiles(quartiles))
            } else {
                let values = axes
                    .iter()
                    .map(|axis| axis.get(statistic).map(Measure::scalar))
                    .collect::<crate::Result<Vec<_>>>()?;

                Ok(DataValue::Vector(values))
            }
        }
    }
}

/// The collector of a single window, shaped like the sensor it aggregates.
#[derive(Debug)]
pub enum Collector {
    /// One axis
    Scalar(ValueCollector),

    /// Several independent axes
    Vector(ArrayCollector),
}

impl Collector {
    /// Creates an empty collector for the given sensor shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] for a zero-arity vector shape.
    pub fn for_shape(shape: SensorShape) -> crate::Result<Self> {
        match shape {
            SensorShape::Scalar => Ok(Self::Scalar(ValueCollector::default())),
            SensorShape::Vector(0) => Err(Error::UnsupportedShape),
            SensorShape::Vector(arity) => Ok(Self::Vector(ArrayCollector::new(arity))),
        }
    }

    /// Shape this collector was created for.
    #[must_use]
    pub fn shape(&self) -> SensorShape {
        match self {
            Self::Scalar(_) => SensorShape::Scalar,
            Self::Vector(collector) => SensorShape::Vector(collector.arity()),
        }
    }

    /// Adds a sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] if the sample is scalar but the collector is not
    /// (or vice versa), and [`Error::ArityMismatch`] if a vector sample has the wrong length.
    pub fn add(&mut self, sample: &Sample) -> crate::Result<()> {
        match (self, sample) {
            (Self::Scalar(collector), Sample::Scalar(value)) => {
                collector.add(*value);
                Ok(())
            }
            (Self::Vector(collector), Sample::Vector(values)) => collector.add(values),
            _ => Err(Error::UnsupportedShape),
        }
    }

    /// Number of samples added.
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::Scalar(collector) => collector.count(),
            Self::Vector(collector) => collector.count(),
        }
    }

    /// Returns the requested statistic, shaped like the collector.
    ///
    /// # Errors
    ///
    /// See [`Statistics::get`].
    pub fn get(&self, statistic: Statistic) -> crate::Result<DataValue> {
        match self {
            Self::Scalar(collector) => {
                compose(SensorShape::Scalar, std::slice::from_ref(collector), statistic)
            }
            Self::Vector(collector) => collector.get(statistic),
        }
    }

    /// Snapshot of the aggregates of each axis.
    #[must_use]
    pub fn summaries(&self) -> Vec<Summary> {
        match self {
            Self::Scalar(collector) => vec![collector.summary()],
            Self::Vector(collector) => collector
                .components()
                .iter()
                .map(ValueCollector::summary)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn quartiles_r7() {
        let sorted = (1..=10).map(Value::from).collect::<Vec<_>>();
        let quartiles = Quartiles::from_sorted(&sorted);

        assert_eq!(
            Some(Quartiles {
                first: 3.25,
                second: 5.5,
                third: 7.75,
            }),
            quartiles
        );
    }

    #[test_log::test]
    fn quartiles_small() {
        assert_eq!(None, Quartiles::from_sorted(&[]));

        assert_eq!(
            Some(Quartiles {
                first: 4.0,
                second: 4.0,
                third: 4.0,
            }),
            Quartiles::from_sorted(&[4.0])
        );

        assert_eq!(
            Some(Quartiles {
                first: 1.5,
                second: 2.0,
                third: 2.5,
            }),
            Quartiles::from_sorted(&[1.0, 3.0])
        );

        assert_eq!(
            Some(Quartiles {
                first: 2.0,
                second: 3.0,
                third: 4.0,
            }),
            Quartiles::from_sorted(&[1.0, 2.0, 3.0, 4.0, 5.0])
        );
    }

    #[test_log::test]
    fn collector_shape_mismatch() -> crate::Result<()> {
        let mut scalar = Collector::for_shape(SensorShape::Scalar)?;
        assert!(matches!(
            scalar.add(&Sample::Vector(vec![1.0, 2.0])),
            Err(Error::UnsupportedShape)
        ));

        let mut vector = Collector::for_shape(SensorShape::Vector(3))?;
        assert!(matches!(
            vector.add(&Sample::Scalar(1.0)),
            Err(Error::UnsupportedShape)
        ));
        assert!(matches!(
            vector.add(&Sample::Vector(vec![1.0, 2.0])),
            Err(Error::ArityMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(0, vector.count());

        assert!(matches!(
            Collector::for_shape(SensorShape::Vector(0)),
            Err(Error::UnsupportedShape)
        ));

        Ok(())
    }

    #[test_log::test]
    fn collector_scalar_values() -> crate::Result<()> {
        let mut collector = Collector::for_shape(SensorShape::Scalar)?;
        collector.add(&Sample::Scalar(2.0))?;
        collector.add(&Sample::Scalar(4.0))?;

        assert_eq!(DataValue::Scalar(3.0), collector.get(Statistic::Average)?);
        assert_eq!(
            DataValue::Quartiles(Quartiles {
                first: 2.5,
                second: 3.0,
                third: 3.5,
            }),
            collector.get(Statistic::Quartiles)?
        );
        assert_eq!(1, collector.summaries().len());

        Ok(())
    }
}
