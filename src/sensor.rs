use crate::{Error, HashMap};

const SENSOR_NAME_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// A sensor's name, e.g. `HEART_RATE`.
///
/// Characters supported: A-Z 0-9 _
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash, Debug)]
pub struct SensorName(String);

impl std::fmt::Display for SensorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for SensorName {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.is_empty() || value.chars().any(|c| !SENSOR_NAME_CHARS.contains(c)) {
            Err(Error::InvalidQuery)
        } else {
            Ok(Self(value.to_owned()))
        }
    }
}

impl std::ops::Deref for SensorName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SensorName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Shape of the samples a sensor emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, std::hash::Hash)]
pub enum SensorShape {
    /// One value per sample
    #[default]
    Scalar,

    /// A fixed number of values per sample
    Vector(usize),
}

impl SensorShape {
    /// Number of values per sample.
    #[must_use]
    pub fn arity(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vector(arity) => arity,
        }
    }
}

/// Static description of a sensor.
#[derive(Clone, Debug, PartialEq)]
pub struct SensorSpec {
    /// Sensor name
    pub name: SensorName,

    /// Sample shape
    pub shape: SensorShape,

    /// Measurement unit, e.g. `BEATS_PER_MIN`
    pub unit: String,

    /// Nominal sample rate
    pub frequency_hz: f64,
}

impl SensorSpec {
    /// Creates a sensor description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the name contains unsupported characters.
    pub fn new(name: &str, shape: SensorShape, unit: &str, frequency_hz: f64) -> crate::Result<Self> {
        Ok(Self {
            name: SensorName::try_from(name)?,
            shape,
            unit: unit.to_owned(),
            frequency_hz,
        })
    }
}

/// Registry of known sensors, constructed once and passed to whoever needs it.
#[derive(Clone, Debug, Default)]
pub struct SensorRegistry {
    sensors: HashMap<SensorName, SensorSpec>,
}

impl SensorRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the sensors of a wrist-worn research wearable.
    #[must_use]
    pub fn wearables() -> Self {
        let mut registry = Self::new();

        for (name, shape, unit, frequency_hz) in [
            ("ACCELEROMETER", SensorShape::Vector(3), "G", 32.0),
            ("BATTERY", SensorShape::Scalar, "PERCENTAGE", 1.0),
            ("BLOOD_VOLUME_PULSE", SensorShape::Scalar, "NANOWATT", 64.0),
            ("ELECTRODERMAL_ACTIVITY", SensorShape::Scalar, "MICROSIEMENS", 4.0),
            ("HEART_RATE", SensorShape::Scalar, "BEATS_PER_MIN", 1.0),
            ("INTER_BEAT_INTERVAL", SensorShape::Scalar, "BEATS_PER_MIN", 1.0),
            ("THERMOMETER", SensorShape::Scalar, "CELSIUS", 4.0),
        ] {
            registry.register(SensorSpec {
                name: SensorName(name.to_owned()),
                shape,
                unit: unit.to_owned(),
                frequency_hz,
            });
        }

        registry
    }

    /// Registers a sensor, replacing any sensor with the same name.
    pub fn register(&mut self, spec: SensorSpec) {
        log::trace!("registering sensor {} ({:?})", spec.name, spec.shape);
        self.sensors.insert(spec.name.clone(), spec);
    }

    /// Looks up a sensor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SensorSpec> {
        self.sensors.get(name)
    }

    /// Iterates all sensors, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &SensorSpec> {
        let mut sensors = self.sensors.values().collect::<Vec<_>>();
        sensors.sort_by(|a, b| a.name.cmp(&b.name));
        sensors.into_iter()
    }

    /// Number of registered sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns `true` if no sensor is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}
