use crate::{Statistic, Timestamp};

/// Error type
#[derive(Debug)]
pub enum Error {
    /// An IO error.
    Io(std::io::Error),

    /// Error in storage engine.
    Storage(fjall::Error),

    /// A dataset could not be (de)serialized as JSON.
    Json(serde_json::Error),

    /// A sample CSV file could not be read or written.
    Csv(csv::Error),

    /// A statistic that needs at least one sample was requested from an empty collector.
    EmptyCollector,

    /// A vector sample did not have the arity the collector was built for.
    ArityMismatch {
        /// Arity of the collector
        expected: usize,

        /// Arity of the offending sample
        actual: usize,
    },

    /// The statistic has no defined computation in this context.
    UnsupportedStatistic(Statistic),

    /// The sample shape does not match the declared sensor shape.
    UnsupportedShape,

    /// A time frame was requested from an aggregator without any windows.
    NoData,

    /// The window starting at this timestamp ends past the last representable timestamp.
    TimestampOverflow(Timestamp),

    /// A CSV sample row could not be parsed.
    InvalidRecord {
        /// 1-based line number
        line: usize,

        /// What went wrong
        reason: String,
    },

    /// An invalid dataset request path was used.
    InvalidQuery,
}

impl From<fjall::Error> for Error {
    fn from(value: fjall::Error) -> Self {
        Self::Storage(value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => {
                write!(f, "{e}")
            }
            Self::Io(e) => {
                write!(f, "{e}")
            }
            Self::Json(e) => {
                write!(f, "{e}")
            }
            Self::Csv(e) => {
                write!(f, "{e}")
            }
            Self::EmptyCollector => {
                write!(f, "EmptyCollector")
            }
            Self::ArityMismatch { expected, actual } => {
                write!(f, "ArityMismatch: expected {expected} values, got {actual}")
            }
            Self::UnsupportedStatistic(statistic) => {
                write!(f, "UnsupportedStatistic: {statistic}")
            }
            Self::UnsupportedShape => {
                write!(f, "UnsupportedShape")
            }
            Self::NoData => {
                write!(f, "NoData")
            }
            Self::TimestampOverflow(start) => {
                write!(f, "TimestampOverflow: window starting at {start} has no end")
            }
            Self::InvalidRecord { line, reason } => {
                write!(f, "InvalidRecord at line {line}: {reason}")
            }
            Self::InvalidQuery => {
                write!(f, "InvalidQuery")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Storage(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Csv(e) => Some(e),
            _ => None,
        }
    }
}

/// Result helper type
pub type Result<T> = std::result::Result<T, Error>;
