use crate::{Duration, Error, Timestamp};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;

/// Returns the inclusive start of the window that contains `ts`.
///
/// Windows are half-open: `[start, start + duration)`.
#[must_use]
pub fn window_start(ts: Timestamp, duration: NonZeroU64) -> Timestamp {
    (ts / duration) * duration.get()
}

/// Fixed window widths that statistics are aggregated over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
#[derive(Serialize, Deserialize)]
pub enum TimeWindow {
    /// 10 seconds
    #[default]
    #[serde(rename = "TEN_SECOND")]
    TenSecond,

    /// 1 minute
    #[serde(rename = "ONE_MIN")]
    OneMinute,

    /// 10 minutes
    #[serde(rename = "TEN_MIN")]
    TenMinutes,

    /// 1 hour
    #[serde(rename = "ONE_HOUR")]
    OneHour,

    /// 1 day
    #[serde(rename = "ONE_DAY")]
    OneDay,

    /// 1 week
    #[serde(rename = "ONE_WEEK")]
    OneWeek,
}

impl TimeWindow {
    /// All supported windows, from narrowest to widest.
    pub const ALL: [Self; 6] = [
        Self::TenSecond,
        Self::OneMinute,
        Self::TenMinutes,
        Self::OneHour,
        Self::OneDay,
        Self::OneWeek,
    ];

    /// Window width in milliseconds.
    #[must_use]
    pub fn duration(self) -> u64 {
        match self {
            Self::TenSecond => Duration::seconds(10.0),
            Self::OneMinute => Duration::minutes(1.0),
            Self::TenMinutes => Duration::minutes(10.0),
            Self::OneHour => Duration::hours(1.0),
            Self::OneDay => Duration::days(1.0),
            Self::OneWeek => Duration::weeks(1.0),
        }
    }

    /// Window width in whole seconds.
    #[must_use]
    pub fn seconds(self) -> u64 {
        self.duration() / 1_000
    }

    fn width(self) -> NonZeroU64 {
        NonZeroU64::new(self.duration()).unwrap_or(NonZeroU64::MIN)
    }

    /// Start of the window of this width that contains `ts`.
    #[must_use]
    pub fn start_of(self, ts: Timestamp) -> Timestamp {
        window_start(ts, self.width())
    }

    /// Exclusive end of the window starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`] if the end does not fit in a [`Timestamp`].
    pub fn end_of(self, start: Timestamp) -> crate::Result<Timestamp> {
        start
            .checked_add(self.duration())
            .ok_or(Error::TimestampOverflow(start))
    }

    /// Name used in request paths, store keys and dataset headers.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TenSecond => "TEN_SECOND",
            Self::OneMinute => "ONE_MIN",
            Self::TenMinutes => "TEN_MIN",
            Self::OneHour => "ONE_HOUR",
            Self::OneDay => "ONE_DAY",
            Self::OneWeek => "ONE_WEEK",
        }
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<&str> for TimeWindow {
    type Error = crate::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|window| window.as_str() == value)
            .ok_or(crate::Error::InvalidQuery)
    }
}
