use crate::{TimeWindow, Timestamp};

/// Identifies the stored windows of one (sensor, window width, subject, source) series.
///
/// Formatted as `SENSOR#WINDOW#source:..;subject:..#`; window keys append the
/// big-endian window start, so a prefix scan yields the windows in time order.
#[derive(Clone, Debug, PartialEq, Eq, std::hash::Hash)]
pub struct SeriesKey(String);

impl SeriesKey {
    #[doc(hidden)]
    #[must_use]
    pub fn allocate_string_for_tags(tags: &[(&str, &str)], extra_len: usize) -> String {
        let total_len = tags
            .iter()
            .map(|(key, value)| key.len() + value.len() + 1) // +1 for the ':' between key and value
            .sum::<usize>()
            + tags.len().saturating_sub(1); // Add space for the semicolons

        String::with_capacity(total_len + extra_len)
    }

    #[doc(hidden)]
    pub fn join_tags(buf: &mut String, tags: &[(&str, &str)]) {
        let mut tags = tags.iter().collect::<Vec<_>>();
        tags.sort();

        for (idx, (key, value)) in tags.iter().enumerate() {
            if idx > 0 {
                buf.push(';');
            }
            buf.push_str(key);
            buf.push(':');
            buf.push_str(value);
        }
    }

    /// Creates the key of a series.
    #[must_use]
    pub fn new(sensor: &str, time_window: TimeWindow, subject_id: &str, source_id: &str) -> Self {
        let tags = [("subject", subject_id), ("source", source_id)];
        let window = time_window.as_str();

        let mut str = Self::allocate_string_for_tags(&tags, sensor.len() + window.len() + 3);
        str.push_str(sensor);
        str.push('#');
        str.push_str(window);
        str.push('#');
        Self::join_tags(&mut str, &tags);
        str.push('#');

        Self(str)
    }

    /// Storage key of one window of the series.
    #[must_use]
    pub fn window_key(&self, start: Timestamp) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.0.len() + std::mem::size_of::<Timestamp>());
        key.extend_from_slice(self.0.as_bytes());
        key.extend_from_slice(&start.to_be_bytes());
        key
    }

    /// Recovers the window start from a storage key of this series.
    #[must_use]
    pub fn parse_window_key(&self, key: &[u8]) -> Option<Timestamp> {
        let ts = key.strip_prefix(self.0.as_bytes())?;
        Some(Timestamp::from_be_bytes(ts.try_into().ok()?))
    }
}

impl SeriesKey {
    /// Key prefix shared by all windows of the series.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
