//! Windowed descriptive statistics for wearable sensor streams.
//!
//! Raw timestamped samples (scalar readings like heart rate, or fixed-arity vectors
//! like 3-axis acceleration) are folded into disjoint, fixed-width time windows.
//! Every window keeps enough state to answer any of the supported statistics:
//! count, sum, min, max, average, median, quartiles and interquartile range.
//!
//! Quartiles are exact: each window retains its samples and interpolates between
//! order statistics (R-7), so results match a producer that does the same.
//!
//! ```
//! use wearstat::{DataValue, ExpectedValue, Header, Sample, Statistic, TimeWindow};
//!
//! let mut expected = ExpectedValue::builder()
//!     .time_window(TimeWindow::TenSecond)
//!     .build();
//!
//! for (idx, value) in (1..=10).enumerate() {
//!     expected.add(idx as u64 * 1_000, Sample::Scalar(f64::from(value)))?;
//! }
//!
//! let header = Header::new("subject-1", "source-1", "E4", "HEART_RATE", "BEATS_PER_MIN");
//! let dataset = expected.dataset(Statistic::Median, header)?;
//!
//! assert_eq!(1, dataset.items.len());
//! assert_eq!(DataValue::Scalar(5.5), dataset.items[0].value);
//!
//! # Ok::<(), wearstat::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::cargo)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::indexing_slicing)]
#![warn(clippy::pedantic, clippy::nursery)]
#![warn(clippy::expect_used)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_precision_loss)]
#![warn(clippy::multiple_crate_versions)]
#![warn(clippy::result_unit_err)]

mod collector;
mod compare;
mod dataset;
mod duration;
mod error;
mod expected;
mod generator;
mod parser;
mod query;
mod record;
mod sensor;
mod series_key;
mod statistic;
mod store;
mod time;
mod window;

type HashMap<K, V> = std::collections::HashMap<K, V, rustc_hash::FxBuildHasher>;

pub use collector::{
    ArrayCollector, Collector, Measure, Quartiles, Statistics, Summary, ValueCollector,
};
pub use compare::{compare, Comparison, Mismatch};
pub use dataset::{expected_count, DataValue, Dataset, Header, Item, TimeFrame};
pub use duration::Duration;
pub use error::{Error, Result};
pub use expected::{Builder as ExpectedValueBuilder, ExpectedValue, ExpectedValues, StreamKey};
pub use generator::Generator;
pub use query::DatasetQuery;
pub use record::{read_records, write_records, Record};
pub use sensor::{SensorName, SensorRegistry, SensorShape, SensorSpec};
pub use series_key::SeriesKey;
pub use statistic::Statistic;
pub use store::{Builder as StoreBuilder, Store};
pub use time::{format_timestamp, seconds_to_millis, timestamp};
pub use window::{window_start, TimeWindow};

/// Value of a single sample axis.
pub type Value = f64;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// A single observation of a sensor.
#[derive(Clone, Debug, PartialEq)]
pub enum Sample {
    /// A one-dimensional reading (e.g. heart rate).
    Scalar(Value),

    /// A fixed-arity reading (e.g. x/y/z acceleration).
    Vector(Vec<Value>),
}

impl From<Value> for Sample {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<Value>> for Sample {
    fn from(values: Vec<Value>) -> Self {
        Self::Vector(values)
    }
}
