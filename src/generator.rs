use crate::{Record, SensorSpec, Timestamp, Value};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Generates synthetic, deterministic sample rows for one (subject, source, sensor).
///
/// Rows are spaced at the sensor's nominal frequency; a drop rate removes rows at
/// random to simulate lossy delivery.
///
/// ```
/// use wearstat::{Generator, SensorRegistry};
///
/// let registry = SensorRegistry::wearables();
/// let spec = registry.get("HEART_RATE").unwrap();
///
/// let records = Generator::new("sub-1", "src-1", spec)
///     .duration_ms(60_000)
///     .seed(7)
///     .generate();
///
/// assert_eq!(60, records.len());
/// ```
#[derive(Clone, Debug)]
pub struct Generator {
    user_id: String,
    source_id: String,
    spec: SensorSpec,
    start: Timestamp,
    duration_ms: u64,
    drop_rate: f64,
    min_value: Value,
    max_value: Value,
    seed: u64,
}

impl Generator {
    /// Creates a generator with a 1 minute span starting at the epoch,
    /// values in `[0, 100)` and no dropped rows.
    #[must_use]
    pub fn new(user_id: &str, source_id: &str, spec: &SensorSpec) -> Self {
        Self {
            user_id: user_id.to_owned(),
            source_id: source_id.to_owned(),
            spec: spec.clone(),
            start: 0,
            duration_ms: 60_000,
            drop_rate: 0.0,
            min_value: 0.0,
            max_value: 100.0,
            seed: 0,
        }
    }

    /// Time of the first row.
    #[must_use]
    pub fn start(mut self, ts: Timestamp) -> Self {
        self.start = ts;
        self
    }

    /// Length of the generated span.
    #[must_use]
    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    /// Probability in `[0, 1]` of a row being dropped.
    #[must_use]
    pub fn drop_rate(mut self, drop_rate: f64) -> Self {
        self.drop_rate = drop_rate.clamp(0.0, 1.0);
        self
    }

    /// Range values are drawn from.
    #[must_use]
    pub fn value_range(mut self, min: Value, max: Value) -> Self {
        self.min_value = min.min(max);
        self.max_value = max.max(min);
        self
    }

    /// Seed of the random number generator.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generates rows in strictly increasing time order.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn generate(&self) -> Vec<Record> {
        let mut rng = StdRng::seed_from_u64(self.seed);

        let interval_ms = 1_000.0 / self.spec.frequency_hz;
        let end = self.start.saturating_add(self.duration_ms);
        let arity = self.spec.shape.arity();

        let mut records = vec![];
        let mut last_time = None;

        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            log::warn!("{} has no positive sample rate", self.spec.name);
            return records;
        }

        for idx in 0_u64.. {
            let offset = (idx as f64 * interval_ms).round() as u64;
            let mut time = self.start.saturating_add(offset);

            if time >= end {
                break;
            }

            // NOTE: Keep times strictly increasing for rates above 1 kHz
            if let Some(last) = last_time {
                time = time.max(last + 1);
            }
            last_time = Some(time);

            let values = (0..arity)
                .map(|_| {
                    if self.min_value < self.max_value {
                        rng.gen_range(self.min_value..self.max_value)
                    } else {
                        self.min_value
                    }
                })
                .collect::<Vec<_>>();

            if self.drop_rate > 0.0 && rng.gen_bool(self.drop_rate) {
                continue;
            }

            records.push(Record {
                user_id: self.user_id.clone(),
                source_id: self.source_id.clone(),
                time_received: time.saturating_add(rng.gen_range(0..500)),
                time,
                values,
            });
        }

        log::debug!(
            "generated {} {} rows for {}/{}",
            records.len(),
            self.spec.name,
            self.user_id,
            self.source_id
        );

        records
    }
}
