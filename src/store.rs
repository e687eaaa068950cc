use crate::{
    collector::{compose, Summary},
    DataValue, Dataset, DatasetQuery, Error, ExpectedValue, Header, Quartiles, SensorRegistry,
    SeriesKey, Statistic, Timestamp, Value,
};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use fjall::{CompressionType, PartitionCreateOptions, TxKeyspace, TxPartition};
use std::path::Path;

const WINDOWS_PARTITION_NAME: &str = "_wearstat#v1#windows";
const META_PARTITION_NAME: &str = "_wearstat#v1#meta";

/// Builder for [`Store`].
pub struct Builder {
    cache_size_mib: u64,
}

impl Builder {
    pub(crate) fn new() -> Self {
        Self { cache_size_mib: 64 }
    }

    /// Sets the cache size in MiB.
    ///
    /// Default = 64 MiB
    #[must_use]
    pub fn cache_size_mib(mut self, mib: u64) -> Self {
        self.cache_size_mib = mib;
        self
    }

    /// Opens or recovers a statistics store.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open<P: AsRef<Path>>(self, path: P) -> crate::Result<Store> {
        let keyspace = fjall::Config::new(path)
            .cache_size(self.cache_size_mib * 1_024 * 1_024)
            .open_transactional()?;

        Store::from_keyspace(keyspace)
    }

    /// Uses an existing `fjall` keyspace to open a statistics store.
    ///
    /// Partitions are prefixed with `_wearstat#` to avoid name clashes with other applications.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn open_in_keyspace(self, keyspace: TxKeyspace) -> crate::Result<Store> {
        Store::from_keyspace(keyspace)
    }
}

/// Persists pre-aggregated windows and serves datasets of any statistic from them.
///
/// Each window is stored as per-axis aggregates (count, sum, min, max, quartiles),
/// which is enough to answer every statistic without the raw samples.
pub struct Store {
    keyspace: TxKeyspace,

    /// Series key + window start -> per-axis aggregates
    windows: TxPartition,

    /// Series key -> source type
    meta: TxPartition,
}

impl Store {
    /// Returns a builder with default settings.
    #[must_use]
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Opens or recovers a statistics store with default settings.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn new<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Self::builder().open(path)
    }

    pub(crate) fn from_keyspace(keyspace: TxKeyspace) -> crate::Result<Self> {
        let opts = PartitionCreateOptions::default()
            .block_size(4_096)
            .compression(CompressionType::Lz4)
            .max_memtable_size(8_000_000);

        let windows = keyspace.open_partition(WINDOWS_PARTITION_NAME, opts)?;
        let meta = keyspace.open_partition(META_PARTITION_NAME, PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            windows,
            meta,
        })
    }

    fn serialize_window(summaries: &[Summary]) -> crate::Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(1 + summaries.len() * 56);

        let arity = u8::try_from(summaries.len()).map_err(|_| Error::UnsupportedShape)?;
        bytes.write_u8(arity)?;

        for summary in summaries {
            let quartiles = summary.quartiles.unwrap_or(Quartiles {
                first: Value::NAN,
                second: Value::NAN,
                third: Value::NAN,
            });

            bytes.write_u64::<BigEndian>(summary.count as u64)?;
            bytes.write_f64::<BigEndian>(summary.sum)?;
            bytes.write_f64::<BigEndian>(summary.min.unwrap_or(Value::NAN))?;
            bytes.write_f64::<BigEndian>(summary.max.unwrap_or(Value::NAN))?;
            bytes.write_f64::<BigEndian>(quartiles.first)?;
            bytes.write_f64::<BigEndian>(quartiles.second)?;
            bytes.write_f64::<BigEndian>(quartiles.third)?;
        }

        Ok(bytes)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn deserialize_window(mut reader: &[u8]) -> crate::Result<Vec<Summary>> {
        let arity = reader.read_u8()?;
        let mut summaries = Vec::with_capacity(usize::from(arity));

        for _ in 0..arity {
            let count = reader.read_u64::<BigEndian>()? as usize;
            let sum = reader.read_f64::<BigEndian>()?;
            let min = reader.read_f64::<BigEndian>()?;
            let max = reader.read_f64::<BigEndian>()?;
            let first = reader.read_f64::<BigEndian>()?;
            let second = reader.read_f64::<BigEndian>()?;
            let third = reader.read_f64::<BigEndian>()?;

            let is_empty = count == 0;

            summaries.push(Summary {
                count,
                sum,
                min: (!is_empty).then_some(min),
                max: (!is_empty).then_some(max),
                quartiles: (!is_empty).then_some(Quartiles {
                    first,
                    second,
                    third,
                }),
            });
        }

        Ok(summaries)
    }

    /// Stores every window of an aggregator in one transaction, replacing windows
    /// with the same start.
    ///
    /// `header` names the series (subject, source, source type and sensor).
    ///
    /// Returns the number of windows written.
    ///
    /// # Errors
    ///
    /// Returns error if an I/O error occurred.
    pub fn write(&self, header: &Header, expected: &ExpectedValue) -> crate::Result<usize> {
        let series_key = SeriesKey::new(
            &header.sensor,
            expected.time_window(),
            &header.subject_id,
            &header.source_id,
        );

        let mut tx = self.keyspace.write_tx();

        tx.insert(&self.meta, series_key.as_bytes(), header.source_type.as_bytes());

        let mut written = 0;

        for (start, collector) in expected.windows() {
            let value = Self::serialize_window(&collector.summaries())?;
            tx.insert(&self.windows, series_key.window_key(start), value);
            written += 1;
        }

        tx.commit()?;

        log::debug!("stored {written} windows of {series_key}");

        Ok(written)
    }

    fn read_windows<I, K, V>(
        series_key: &SeriesKey,
        iter: I,
    ) -> crate::Result<Vec<(Timestamp, Vec<Summary>)>>
    where
        I: Iterator<Item = fjall::Result<(K, V)>>,
        K: std::ops::Deref<Target = [u8]>,
        V: std::ops::Deref<Target = [u8]>,
    {
        let mut windows = vec![];

        for kv in iter {
            let (key, value) = kv?;

            let Some(start) = series_key.parse_window_key(&key) else {
                log::warn!("skipping foreign key in series {series_key}");
                continue;
            };

            windows.push((start, Self::deserialize_window(&value)?));
        }

        Ok(windows)
    }

    /// Rebuilds the dataset a query asks for.
    ///
    /// Returns `Ok(None)` if the series has no stored window in the queried range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the sensor is not registered, or an error
    /// if the statistic cannot be computed for some window.
    pub fn dataset(
        &self,
        query: &DatasetQuery,
        registry: &SensorRegistry,
    ) -> crate::Result<Option<Dataset>> {
        let spec = registry.get(&query.sensor).ok_or(Error::InvalidQuery)?;

        let series_key = SeriesKey::new(
            &query.sensor,
            query.time_window,
            &query.subject_id,
            &query.source_id,
        );

        let Some(source_type) = self.meta.get(series_key.as_bytes())? else {
            log::debug!("series {series_key} does not exist");
            return Ok(None);
        };
        let source_type = String::from_utf8_lossy(&source_type).into_owned();

        log::debug!(
            "querying {} of {series_key} [{:?}..{:?}]",
            query.statistic,
            query.start,
            query.end
        );

        let read_tx = self.keyspace.read_tx();

        let windows = if query.start.is_some() || query.end.is_some() {
            let lo = series_key.window_key(query.start.unwrap_or(Timestamp::MIN));
            let hi = series_key.window_key(query.end.unwrap_or(Timestamp::MAX));
            Self::read_windows(&series_key, read_tx.range(&self.windows, lo..hi))?
        } else {
            Self::read_windows(&series_key, read_tx.prefix(&self.windows, series_key.as_bytes()))?
        };

        if windows.is_empty() {
            return Ok(None);
        }

        let header = Header::new(
            &query.subject_id,
            &query.source_id,
            &source_type,
            &query.sensor,
            &spec.unit,
        );

        let statistic = match query.statistic {
            Statistic::ReceivedMessages => Statistic::Count,
            statistic => statistic,
        };

        let values = windows
            .into_iter()
            .map(|(start, summaries)| Ok((start, compose(spec.shape, &summaries, statistic)?)))
            .collect::<crate::Result<Vec<(Timestamp, DataValue)>>>()?;

        let dataset = Dataset::build(header, statistic, query.time_window, values)?;

        if query.statistic == Statistic::ReceivedMessages {
            dataset.received_messages(spec.frequency_hz).map(Some)
        } else {
            Ok(Some(dataset))
        }
    }
}
