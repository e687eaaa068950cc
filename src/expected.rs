use crate::{
    collector::Collector, DataValue, Dataset, Error, Header, Sample, SensorShape, Statistic,
    TimeWindow, Timestamp,
};
use std::collections::BTreeMap;

/// Builder for [`ExpectedValue`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Builder {
    shape: SensorShape,
    time_window: TimeWindow,
}

impl Builder {
    /// Sets the shape of the samples that will be added.
    ///
    /// Default = [`SensorShape::Scalar`]
    #[must_use]
    pub fn shape(mut self, shape: SensorShape) -> Self {
        self.shape = shape;
        self
    }

    /// Sets the window width.
    ///
    /// Default = [`TimeWindow::TenSecond`]
    #[must_use]
    pub fn time_window(mut self, time_window: TimeWindow) -> Self {
        self.time_window = time_window;
        self
    }

    /// Creates the aggregator.
    #[must_use]
    pub fn build(self) -> ExpectedValue {
        ExpectedValue {
            shape: self.shape,
            time_window: self.time_window,
            series: BTreeMap::new(),
            last_timestamp: None,
            last_value: None,
        }
    }
}

/// Aggregates the samples of one (subject, source, sensor) stream into fixed windows,
/// computing the statistics a pipeline is expected to produce for them.
///
/// Samples are expected in non-decreasing timestamp order; queries are meant to run
/// once ingestion is done.
#[derive(Debug)]
pub struct ExpectedValue {
    shape: SensorShape,
    time_window: TimeWindow,

    /// Window start -> collector; windows without samples are absent
    series: BTreeMap<Timestamp, Collector>,

    last_timestamp: Option<Timestamp>,
    last_value: Option<Sample>,
}

impl Default for ExpectedValue {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ExpectedValue {
    /// Returns a builder with default settings.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Shape of the samples this aggregator accepts.
    #[must_use]
    pub fn shape(&self) -> SensorShape {
        self.shape
    }

    /// Window width.
    #[must_use]
    pub fn time_window(&self) -> TimeWindow {
        self.time_window
    }

    /// Timestamp of the most recent sample.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.last_timestamp
    }

    /// The most recent sample.
    #[must_use]
    pub fn last_value(&self) -> Option<&Sample> {
        self.last_value.as_ref()
    }

    /// Number of non-empty windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns `true` if no sample was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Iterates the windows in ascending order of their start.
    pub fn windows(&self) -> impl Iterator<Item = (Timestamp, &Collector)> + '_ {
        self.series.iter().map(|(&start, collector)| (start, collector))
    }

    /// Adds a sample to the window containing `ts`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedShape`] if the sample is not of the declared shape, and
    /// [`Error::ArityMismatch`] if a vector sample has the wrong number of values.
    pub fn add(&mut self, ts: Timestamp, sample: Sample) -> crate::Result<()> {
        if let Some(last) = self.last_timestamp {
            if ts < last {
                log::warn!("sample at {ts} arrived after sample at {last}");
            }
        }

        let key = self.time_window.start_of(ts);

        let collector = match self.series.entry(key) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                log::trace!("creating {:?} window at {key}", self.shape);
                entry.insert(Collector::for_shape(self.shape)?)
            }
        };

        if let Err(e) = collector.add(&sample) {
            // NOTE: Don't leave behind a window that never received a sample
            if collector.count() == 0 {
                self.series.remove(&key);
            }
            return Err(e);
        }

        self.last_timestamp = Some(ts);
        self.last_value = Some(sample);

        Ok(())
    }

    /// Returns `(first window start, last window end)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] if no sample was added, and [`Error::TimestampOverflow`]
    /// if the last window ends past the last representable timestamp.
    pub fn effective_time_frame(&self) -> crate::Result<(Timestamp, Timestamp)> {
        let (Some((&first, _)), Some((&last, _))) =
            (self.series.first_key_value(), self.series.last_key_value())
        else {
            return Err(Error::NoData);
        };

        Ok((first, self.time_window.end_of(last)?))
    }

    /// Computes a statistic for every window, in ascending window order.
    ///
    /// # Errors
    ///
    /// Returns an error if any window cannot answer the statistic; there are no partial results.
    pub fn dataset_values(&self, statistic: Statistic) -> crate::Result<Vec<(Timestamp, DataValue)>> {
        self.series
            .iter()
            .map(|(&start, collector)| Ok((start, collector.get(statistic)?)))
            .collect()
    }

    /// Builds the dataset of a statistic.
    ///
    /// [`Statistic::ReceivedMessages`] is not answered by any window; derive it from a
    /// [`Statistic::Count`] dataset with [`Dataset::received_messages`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoData`] if no sample was added, or any error of [`Self::dataset_values`].
    pub fn dataset(&self, statistic: Statistic, header: Header) -> crate::Result<Dataset> {
        log::debug!(
            "building {statistic} dataset of {}/{} over {} windows",
            header.subject_id,
            header.sensor,
            self.series.len()
        );

        Dataset::build(
            header,
            statistic,
            self.time_window,
            self.dataset_values(statistic)?,
        )
    }
}

/// Identifies one aggregated stream.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
pub struct StreamKey {
    /// Subject identifier
    pub subject_id: String,

    /// Source identifier
    pub source_id: String,

    /// Sensor name
    pub sensor: String,
}

impl StreamKey {
    /// Creates a stream key.
    #[must_use]
    pub fn new(subject_id: &str, source_id: &str, sensor: &str) -> Self {
        Self {
            subject_id: subject_id.to_owned(),
            source_id: source_id.to_owned(),
            sensor: sensor.to_owned(),
        }
    }
}

/// One independent [`ExpectedValue`] per stream.
#[derive(Debug, Default)]
pub struct ExpectedValues {
    streams: crate::HashMap<StreamKey, ExpectedValue>,
}

impl ExpectedValues {
    /// Creates an empty set of streams.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the aggregator of a stream, creating it with `builder` if needed.
    pub fn get_or_create(&mut self, key: StreamKey, builder: Builder) -> &mut ExpectedValue {
        self.streams.entry(key).or_insert_with(|| builder.build())
    }

    /// Returns the aggregator of a stream.
    #[must_use]
    pub fn get(&self, key: &StreamKey) -> Option<&ExpectedValue> {
        self.streams.get(key)
    }

    /// Iterates all streams, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (&StreamKey, &ExpectedValue)> {
        let mut streams = self.streams.iter().collect::<Vec<_>>();
        streams.sort_by(|(a, _), (b, _)| a.cmp(b));
        streams.into_iter()
    }

    /// Number of streams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Returns `true` if there are no streams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Quartiles;

    fn header() -> Header {
        Header::new("sub-1", "src-1", "EMPATICA_E4", "HEART_RATE", "BEATS_PER_MIN")
    }

    fn values(dataset: &Dataset) -> Vec<DataValue> {
        dataset.items.iter().map(|item| item.value.clone()).collect()
    }

    #[test_log::test]
    fn one_window_of_ten() -> crate::Result<()> {
        let mut expected = ExpectedValue::default();
        for (idx, value) in (1..=10).enumerate() {
            expected.add(idx as u64 * 900, Sample::Scalar(f64::from(value)))?;
        }

        assert_eq!(1, expected.len());

        for (statistic, value) in [
            (Statistic::Count, 10.0),
            (Statistic::Sum, 55.0),
            (Statistic::Average, 5.5),
            (Statistic::Minimum, 1.0),
            (Statistic::Maximum, 10.0),
            (Statistic::Median, 5.5),
            (Statistic::InterquartileRange, 4.5),
        ] {
            let dataset = expected.dataset(statistic, header())?;
            assert_eq!(vec![DataValue::Scalar(value)], values(&dataset));
        }

        let quartiles = expected.dataset(Statistic::Quartiles, header())?;
        assert_eq!(
            vec![DataValue::Quartiles(Quartiles {
                first: 3.25,
                second: 5.5,
                third: 7.75,
            })],
            values(&quartiles)
        );

        Ok(())
    }

    #[test_log::test]
    fn two_windows() -> crate::Result<()> {
        let mut expected = ExpectedValue::default();
        expected.add(0, Sample::Scalar(1.0))?;
        expected.add(15_000, Sample::Scalar(2.0))?;

        assert_eq!(
            vec![(0, DataValue::Scalar(1.0)), (10_000, DataValue::Scalar(1.0))],
            expected.dataset_values(Statistic::Count)?
        );
        assert_eq!((0, 20_000), expected.effective_time_frame()?);
        assert_eq!(Some(15_000), expected.last_timestamp());
        assert_eq!(Some(&Sample::Scalar(2.0)), expected.last_value());

        Ok(())
    }

    #[test_log::test]
    fn sparse_windows_not_materialized() -> crate::Result<()> {
        let mut expected = ExpectedValue::default();
        expected.add(1_000, Sample::Scalar(1.0))?;
        expected.add(95_000, Sample::Scalar(2.0))?;

        let dataset = expected.dataset(Statistic::Sum, header())?;
        assert_eq!(2, dataset.items.len());
        assert_eq!(
            crate::TimeFrame::new(0, 100_000),
            dataset.header.effective_time_frame
        );

        Ok(())
    }

    #[test_log::test]
    fn vector_quartiles() -> crate::Result<()> {
        let mut expected = ExpectedValue::builder()
            .shape(SensorShape::Vector(3))
            .build();
        expected.add(0, Sample::Vector(vec![1.0, 2.0, 3.0]))?;

        let dataset = expected.dataset(Statistic::Quartiles, header())?;

        let triple = |value| Quartiles {
            first: value,
            second: value,
            third: value,
        };

        assert_eq!(
            vec![DataValue::VectorQuartiles(vec![
                triple(1.0),
                triple(2.0),
                triple(3.0)
            ])],
            values(&dataset)
        );

        Ok(())
    }

    #[test_log::test]
    fn empty_aggregator() {
        let expected = ExpectedValue::default();

        assert!(matches!(expected.effective_time_frame(), Err(Error::NoData)));
        assert!(matches!(
            expected.dataset(Statistic::Count, header()),
            Err(Error::NoData)
        ));
    }

    #[test_log::test]
    fn arity_mismatch_leaves_no_window() -> crate::Result<()> {
        let mut expected = ExpectedValue::builder()
            .shape(SensorShape::Vector(3))
            .build();

        assert!(matches!(
            expected.add(0, Sample::Vector(vec![1.0, 2.0])),
            Err(Error::ArityMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(expected.is_empty());
        assert_eq!(None, expected.last_timestamp());

        assert!(matches!(
            expected.add(0, Sample::Scalar(1.0)),
            Err(Error::UnsupportedShape)
        ));

        expected.add(0, Sample::Vector(vec![1.0, 2.0, 3.0]))?;
        assert_eq!(SensorShape::Vector(3), expected.shape());
        assert!(expected
            .windows()
            .all(|(_, collector)| collector.shape() == expected.shape()));

        Ok(())
    }

    #[test_log::test]
    fn last_representable_window() -> crate::Result<()> {
        let mut expected = ExpectedValue::default();
        expected.add(u64::MAX - 1, Sample::Scalar(1.0))?;

        let start = u64::MAX - u64::MAX % 10_000;
        assert_eq!(
            vec![(start, DataValue::Scalar(1.0))],
            expected.dataset_values(Statistic::Count)?
        );
        assert!(matches!(
            expected.effective_time_frame(),
            Err(Error::TimestampOverflow(ts)) if ts == start
        ));
        assert!(matches!(
            expected.dataset(Statistic::Count, header()),
            Err(Error::TimestampOverflow(_))
        ));

        Ok(())
    }

    #[test_log::test]
    fn zero_arity_shape() {
        let mut expected = ExpectedValue::builder()
            .shape(SensorShape::Vector(0))
            .build();

        assert!(matches!(
            expected.add(0, Sample::Vector(vec![])),
            Err(Error::UnsupportedShape)
        ));
    }

    #[test_log::test]
    fn received_messages_not_a_window_statistic() -> crate::Result<()> {
        let mut expected = ExpectedValue::default();
        expected.add(0, Sample::Scalar(1.0))?;

        assert!(matches!(
            expected.dataset(Statistic::ReceivedMessages, header()),
            Err(Error::UnsupportedStatistic(Statistic::ReceivedMessages))
        ));

        let ratio = expected
            .dataset(Statistic::Count, header())?
            .received_messages(1.0)?;
        assert_eq!(vec![DataValue::Scalar(0.1)], values(&ratio));

        Ok(())
    }

    #[test_log::test]
    fn count_per_window_and_idempotent_reads() -> crate::Result<()> {
        let mut expected = ExpectedValue::builder()
            .time_window(TimeWindow::OneMinute)
            .build();

        let mut routed = std::collections::BTreeMap::<Timestamp, f64>::new();

        for idx in 0..500_u64 {
            let ts = idx * 731;
            expected.add(ts, Sample::Scalar((idx % 17) as f64))?;
            *routed.entry(ts - ts % 60_000).or_default() += 1.0;
        }

        let dataset = expected.dataset(Statistic::Count, header())?;
        for idx in 0..500_u64 {
            let ts = idx * 731;
            assert!(dataset.header.effective_time_frame.contains(ts));
            assert_eq!(
                1,
                dataset
                    .items
                    .iter()
                    .filter(|item| item.time_frame.contains(ts))
                    .count()
            );
        }

        let counts = expected.dataset_values(Statistic::Count)?;
        assert_eq!(
            routed
                .into_iter()
                .map(|(start, count)| (start, DataValue::Scalar(count)))
                .collect::<Vec<_>>(),
            counts
        );

        for statistic in [Statistic::Quartiles, Statistic::Average] {
            assert_eq!(
                expected.dataset(statistic, header())?.to_json()?,
                expected.dataset(statistic, header())?.to_json()?
            );
        }

        for (_, value) in expected.dataset_values(Statistic::Quartiles)? {
            let DataValue::Quartiles(quartiles) = value else {
                panic!("expected quartiles");
            };
            assert!(quartiles.first <= quartiles.second);
            assert!(quartiles.second <= quartiles.third);
        }

        Ok(())
    }

    #[test_log::test]
    fn streams_are_independent() -> crate::Result<()> {
        let mut streams = ExpectedValues::new();
        let builder = ExpectedValue::builder();

        streams
            .get_or_create(StreamKey::new("a", "src", "HEART_RATE"), builder)
            .add(0, Sample::Scalar(1.0))?;
        streams
            .get_or_create(StreamKey::new("b", "src", "HEART_RATE"), builder)
            .add(0, Sample::Scalar(2.0))?;
        streams
            .get_or_create(StreamKey::new("a", "src", "HEART_RATE"), builder)
            .add(1, Sample::Scalar(3.0))?;

        assert_eq!(2, streams.len());

        let a = streams
            .get(&StreamKey::new("a", "src", "HEART_RATE"))
            .ok_or(Error::NoData)?;
        assert_eq!(
            vec![(0, DataValue::Scalar(2.0))],
            a.dataset_values(Statistic::Count)?
        );

        let keys = streams
            .iter()
            .map(|(key, _)| key.subject_id.clone())
            .collect::<Vec<_>>();
        assert_eq!(vec!["a", "b"], keys);

        Ok(())
    }

    #[test_log::test]
    fn repeated_runs_are_identical() -> crate::Result<()> {
        let registry = crate::SensorRegistry::wearables();
        let spec = registry.get("ACCELEROMETER").ok_or(Error::NoData)?;

        let records = crate::Generator::new("sub-1", "src-1", spec)
            .start(1_700_000_003_000)
            .duration_ms(45_000)
            .drop_rate(0.1)
            .seed(11)
            .generate();

        let run = || -> crate::Result<Vec<String>> {
            let mut expected = ExpectedValue::builder().shape(spec.shape).build();
            for record in &records {
                expected.add(record.time, record.sample(spec.shape)?)?;
            }

            Statistic::ALL
                .into_iter()
                .filter(|statistic| *statistic != Statistic::ReceivedMessages)
                .map(|statistic| expected.dataset(statistic, header())?.to_json())
                .collect()
        };

        assert_eq!(run()?, run()?);

        Ok(())
    }
}
