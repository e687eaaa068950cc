use crate::{time::format_timestamp, Error, Quartiles, Statistic, TimeWindow, Timestamp, Value};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Number of samples a sensor sampling at `frequency_hz` sends in a window of `window_seconds`.
#[must_use]
pub fn expected_count(window_seconds: u64, frequency_hz: f64) -> f64 {
    window_seconds as f64 * frequency_hz
}

fn round_to_hundredths(value: Value) -> Value {
    (value * 100.0).round() / 100.0
}

/// Half-open time span `[start, end)` in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
#[derive(Serialize, Deserialize)]
#[serde(into = "WireTimeFrame", try_from = "WireTimeFrame")]
pub struct TimeFrame {
    /// Inclusive start
    pub start: Timestamp,

    /// Exclusive end
    pub end: Timestamp,
}

impl TimeFrame {
    /// Creates a time frame.
    #[must_use]
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `ts` lies inside the time frame.
    #[must_use]
    pub fn contains(&self, ts: Timestamp) -> bool {
        self.start <= ts && ts < self.end
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} - {})",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTimeFrame {
    start_date_time: String,
    end_date_time: String,
}

impl From<TimeFrame> for WireTimeFrame {
    fn from(value: TimeFrame) -> Self {
        Self {
            start_date_time: format_timestamp(value.start),
            end_date_time: format_timestamp(value.end),
        }
    }
}

impl TryFrom<WireTimeFrame> for TimeFrame {
    type Error = Error;

    fn try_from(value: WireTimeFrame) -> Result<Self, Self::Error> {
        let parse = |s: &str| -> crate::Result<Timestamp> {
            let dt = DateTime::parse_from_rfc3339(s).map_err(|_| Error::InvalidQuery)?;
            Timestamp::try_from(dt.timestamp_millis()).map_err(|_| Error::InvalidQuery)
        };

        Ok(Self {
            start: parse(&value.start_date_time)?,
            end: parse(&value.end_date_time)?,
        })
    }
}

/// Value of one statistic for one window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// Scalar sensor, any statistic except quartiles
    Scalar(Value),

    /// Scalar sensor, quartiles
    Quartiles(Quartiles),

    /// Vector sensor, one value per axis
    Vector(Vec<Value>),

    /// Vector sensor, one quartile triple per axis
    VectorQuartiles(Vec<Quartiles>),
}

/// Describes what a dataset contains.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    /// Subject (participant) identifier
    pub subject_id: String,

    /// Source (device) identifier
    pub source_id: String,

    /// Device type, e.g. `EMPATICA_E4`
    pub source_type: String,

    /// Sensor the data comes from
    #[serde(rename = "sourceDataName")]
    pub sensor: String,

    /// Statistic the items hold
    pub statistic: Statistic,

    /// Measurement unit of the items
    pub unit: String,

    /// Width of each item's window
    pub time_window: TimeWindow,

    /// Span from the first window's start to the last window's end
    pub effective_time_frame: TimeFrame,
}

impl Header {
    /// Creates a header template; statistic, window and time frame are filled in
    /// when a dataset is built.
    #[must_use]
    pub fn new(subject_id: &str, source_id: &str, source_type: &str, sensor: &str, unit: &str) -> Self {
        Self {
            subject_id: subject_id.to_owned(),
            source_id: source_id.to_owned(),
            source_type: source_type.to_owned(),
            sensor: sensor.to_owned(),
            statistic: Statistic::Count,
            unit: unit.to_owned(),
            time_window: TimeWindow::default(),
            effective_time_frame: TimeFrame::default(),
        }
    }
}

/// Statistic value of one window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// The statistic's value
    pub value: DataValue,

    /// The window the value was computed over
    pub time_frame: TimeFrame,
}

/// Per-window values of one statistic, in ascending time order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// What the dataset contains
    pub header: Header,

    /// One item per non-empty window
    #[serde(rename = "dataset")]
    pub items: Vec<Item>,
}

impl Dataset {
    /// Builds a dataset from `(window start, value)` pairs in ascending window order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] if there are no windows, and [`Error::TimestampOverflow`]
    /// if a window ends past the last representable timestamp.
    pub fn build(
        mut header: Header,
        statistic: Statistic,
        time_window: TimeWindow,
        values: Vec<(Timestamp, DataValue)>,
    ) -> crate::Result<Self> {
        let (Some(&(first, _)), Some(&(last, _))) = (values.first(), values.last()) else {
            return Err(Error::NoData);
        };

        header.statistic = statistic;
        header.time_window = time_window;
        header.effective_time_frame = TimeFrame::new(first, time_window.end_of(last)?);

        let items = values
            .into_iter()
            .map(|(start, value)| {
                Ok(Item {
                    value,
                    time_frame: TimeFrame::new(start, time_window.end_of(start)?),
                })
            })
            .collect::<crate::Result<_>>()?;

        Ok(Self { header, items })
    }

    /// Derives the received-message ratio from a [`Statistic::Count`] dataset.
    ///
    /// Every count is divided by the number of samples a sensor sampling at
    /// `frequency_hz` should have sent in the window, rounded to 2 decimals.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedStatistic`] if this is not a count dataset or the
    /// frequency is not positive, and [`Error::UnsupportedShape`] for quartile items.
    pub fn received_messages(&self, frequency_hz: f64) -> crate::Result<Self> {
        if self.header.statistic != Statistic::Count {
            return Err(Error::UnsupportedStatistic(self.header.statistic));
        }

        let expected = expected_count(self.header.time_window.seconds(), frequency_hz);
        if expected <= 0.0 || !expected.is_finite() {
            return Err(Error::UnsupportedStatistic(Statistic::ReceivedMessages));
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                // NOTE: All axes of a vector window have the same count
                let count = match &item.value {
                    DataValue::Scalar(count) => *count,
                    DataValue::Vector(counts) => counts.first().copied().unwrap_or_default(),
                    DataValue::Quartiles(_) | DataValue::VectorQuartiles(_) => {
                        return Err(Error::UnsupportedShape);
                    }
                };

                Ok(Item {
                    value: DataValue::Scalar(round_to_hundredths(count / expected)),
                    time_frame: item.time_frame,
                })
            })
            .collect::<crate::Result<Vec<_>>>()?;

        let mut header = self.header.clone();
        header.statistic = Statistic::ReceivedMessages;
        header.unit = "PERCENTAGE".to_owned();

        Ok(Self { header, items })
    }

    /// Renders the dataset in its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a dataset from its JSON wire format.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
