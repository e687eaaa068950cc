use crate::{
    parser::{error_position, identifier, Parse, ParseResult, Position, RawSpan},
    Error, SensorName, Statistic, TimeWindow, Timestamp,
};
use chrono::DateTime;
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{all_consuming, opt},
    multi::separated_list1,
    sequence::{preceded, separated_pair},
};
use nom_locate::position;

/// A request for the dataset of one statistic of one series, as addressed by
/// `/data/{sensor}/{statistic}/{timeWindow}/{project}/{subject}/{source}`.
///
/// An optional query string `?startTime=..&endTime=..` (ISO-8601 instants)
/// restricts the windows by their start.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetQuery {
    /// Project the subject belongs to
    pub project: String,

    /// Subject identifier
    pub subject_id: String,

    /// Source identifier
    pub source_id: String,

    /// Sensor name
    pub sensor: SensorName,

    /// Requested statistic
    pub statistic: Statistic,

    /// Window width
    pub time_window: TimeWindow,

    /// Inclusive lower bound of window starts
    pub start: Option<Timestamp>,

    /// Exclusive upper bound of window starts
    pub end: Option<Timestamp>,
}

#[derive(Debug, Eq, PartialEq)]
struct RawPath<'a> {
    sensor: &'a str,
    statistic: &'a str,
    time_window: &'a str,
    project: &'a str,
    subject: &'a str,
    source: &'a str,
    params: Vec<(&'a str, &'a str)>,
    position: Position,
}

fn segment(input: RawSpan<'_>) -> ParseResult<'_, &str> {
    preceded(char('/'), identifier)(input)
}

fn param(input: RawSpan<'_>) -> ParseResult<'_, (&str, &str)> {
    let (input, (key, value)) = separated_pair(
        identifier,
        char('='),
        take_while1(|x: char| x != '&'),
    )(input)?;
    Ok((input, (key, *value.fragment())))
}

impl<'a> Parse<'a> for RawPath<'a> {
    fn parse(input: RawSpan<'a>) -> ParseResult<'a, Self> {
        let (input, pos) = position(input)?;

        let (input, _) = tag("/data")(input)?;
        let (input, sensor) = segment(input)?;
        let (input, statistic) = segment(input)?;
        let (input, time_window) = segment(input)?;
        let (input, project) = segment(input)?;
        let (input, subject) = segment(input)?;
        let (input, source) = segment(input)?;
        let (input, params) = opt(preceded(char('?'), separated_list1(char('&'), param)))(input)?;

        Ok((
            input,
            Self {
                sensor,
                statistic,
                time_window,
                project,
                subject,
                source,
                params: params.unwrap_or_default(),
                position: pos.into(),
            },
        ))
    }
}

fn parse_instant(value: &str) -> crate::Result<Timestamp> {
    let dt = DateTime::parse_from_rfc3339(value).map_err(|_| Error::InvalidQuery)?;
    Timestamp::try_from(dt.timestamp_millis()).map_err(|_| Error::InvalidQuery)
}

impl DatasetQuery {
    /// Parses a request path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidQuery`] if the path is malformed or names an unknown
    /// statistic, window width or invalid sensor name.
    pub fn parse(path: &str) -> crate::Result<Self> {
        let (_, raw) = all_consuming(RawPath::parse)(RawSpan::new(path)).map_err(|e| {
            log::debug!(
                "invalid dataset path {path:?} at {}",
                error_position(&e).unwrap_or_default()
            );
            Error::InvalidQuery
        })?;

        log::trace!("parsed dataset path at {}: {raw:?}", raw.position);

        let mut query = Self {
            project: raw.project.to_owned(),
            subject_id: raw.subject.to_owned(),
            source_id: raw.source.to_owned(),
            sensor: SensorName::try_from(raw.sensor)?,
            statistic: Statistic::try_from(raw.statistic)?,
            time_window: TimeWindow::try_from(raw.time_window)?,
            start: None,
            end: None,
        };

        for (key, value) in raw.params {
            match key {
                "startTime" => query.start = Some(parse_instant(value)?),
                "endTime" => query.end = Some(parse_instant(value)?),
                _ => return Err(Error::InvalidQuery),
            }
        }

        Ok(query)
    }

    /// Renders the query as a request path.
    #[must_use]
    pub fn path(&self) -> String {
        let mut path = format!(
            "/data/{}/{}/{}/{}/{}/{}",
            self.sensor,
            self.statistic,
            self.time_window,
            self.project,
            self.subject_id,
            self.source_id
        );

        let params = [("startTime", self.start), ("endTime", self.end)]
            .into_iter()
            .filter_map(|(key, ts)| ts.map(|ts| format!("{key}={}", crate::format_timestamp(ts))))
            .collect::<Vec<_>>();

        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.join("&"));
        }

        path
    }
}
