/// Helpers for calculating window durations in milliseconds
///
/// ```
/// use wearstat::{Duration, ExpectedValue, Sample};
///
/// let mut expected = ExpectedValue::builder().build();
///
/// expected.add(Duration::seconds(3.0), Sample::Scalar(72.0))?;
/// expected.add(Duration::seconds(12.5), Sample::Scalar(75.0))?;
///
/// let (start, end) = expected.effective_time_frame()?;
/// assert_eq!(0, start);
/// assert_eq!(Duration::seconds(20.0), end);
///
/// # Ok::<(), wearstat::Error>(())
/// ```
pub struct Duration;

impl Duration {
    /// Formats N weeks as millisecond time frame.
    #[must_use]
    pub fn weeks(n: f64) -> u64 {
        Self::days(n) * 7
    }

    /// Formats N days as millisecond time frame.
    #[must_use]
    pub fn days(n: f64) -> u64 {
        Self::hours(n) * 24
    }

    /// Formats N hours as millisecond time frame.
    #[must_use]
    pub fn hours(n: f64) -> u64 {
        Self::minutes(n) * 60
    }

    /// Formats N minutes as millisecond time frame.
    #[must_use]
    pub fn minutes(n: f64) -> u64 {
        Self::seconds(n) * 60
    }

    /// Formats N seconds as millisecond time frame.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn seconds(n: f64) -> u64 {
        (n * 1_000.0) as u64
    }

    /// Formats N milliseconds as millisecond time frame.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn millis(n: f64) -> u64 {
        n as u64
    }
}
