use serde::{Deserialize, Serialize};

/// A statistic that can be computed for each window.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash, Debug)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Statistic {
    /// Arithmetic mean
    Average,

    /// Number of samples
    Count,

    /// Largest sample
    Maximum,

    /// Second quartile
    Median,

    /// Smallest sample
    Minimum,

    /// Sum of all samples
    Sum,

    /// First, second and third quartile
    Quartiles,

    /// Third minus first quartile
    InterquartileRange,

    /// Received samples relative to the samples the sensor should have sent.
    ///
    /// Only derived from a [`Statistic::Count`] dataset.
    ReceivedMessages,
}

impl Statistic {
    /// All statistics, in wire-name order.
    pub const ALL: [Self; 9] = [
        Self::Average,
        Self::Count,
        Self::Maximum,
        Self::Median,
        Self::Minimum,
        Self::Sum,
        Self::Quartiles,
        Self::InterquartileRange,
        Self::ReceivedMessages,
    ];

    /// Name used in request paths and dataset headers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "AVERAGE",
            Self::Count => "COUNT",
            Self::Maximum => "MAXIMUM",
            Self::Median => "MEDIAN",
            Self::Minimum => "MINIMUM",
            Self::Sum => "SUM",
            Self::Quartiles => "QUARTILES",
            Self::InterquartileRange => "INTERQUARTILE_RANGE",
            Self::ReceivedMessages => "RECEIVED_MESSAGES",
        }
    }
}

impl std::fmt::Display for Statistic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for Statistic {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|statistic| statistic.as_str() == value)
            .ok_or(crate::Error::InvalidQuery)
    }
}
