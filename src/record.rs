use crate::{time::seconds_to_millis, Error, Sample, SensorShape, Timestamp, Value};
use std::io::{Read, Write};

const HEADER: [&str; 4] = ["userId", "sourceId", "timeReceived", "time"];

/// One row of a sample CSV file:
/// `userId,sourceId,timeReceived,time,value...` with times in decimal epoch seconds.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Subject identifier
    pub user_id: String,

    /// Source identifier
    pub source_id: String,

    /// When the sample reached the backend (ms)
    pub time_received: Timestamp,

    /// When the sample was taken (ms)
    pub time: Timestamp,

    /// Value columns
    pub values: Vec<Value>,
}

impl Record {
    /// Converts one CSV row; `line` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRecord`] if the row is malformed or a time is negative.
    pub fn from_row(row: &csv::StringRecord, line: usize) -> crate::Result<Self> {
        let invalid = |reason: String| Error::InvalidRecord { line, reason };

        if row.len() <= HEADER.len() {
            return Err(invalid(format!(
                "expected at least {} columns, got {}",
                HEADER.len() + 1,
                row.len()
            )));
        }

        let id = |column: usize| match row.get(column) {
            Some(id) if !id.is_empty() => Ok(id.to_owned()),
            _ => Err(invalid(format!("empty {}", HEADER[column]))),
        };

        let number = |column: usize| {
            let field = row.get(column).unwrap_or_default();
            field
                .parse::<Value>()
                .map_err(|_| invalid(format!("invalid number {field:?} in column {}", column + 1)))
        };

        let time = |column: usize| -> crate::Result<Timestamp> {
            let seconds = number(column)?;
            seconds_to_millis(seconds).ok_or_else(|| invalid(format!("invalid time {seconds}")))
        };

        Ok(Self {
            user_id: id(0)?,
            source_id: id(1)?,
            time_received: time(2)?,
            time: time(3)?,
            values: (HEADER.len()..row.len())
                .map(&number)
                .collect::<crate::Result<_>>()?,
        })
    }

    /// Extracts the sample, shaped like the sensor it came from.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArityMismatch`] if the row has the wrong number of value columns.
    pub fn sample(&self, shape: SensorShape) -> crate::Result<Sample> {
        if self.values.len() != shape.arity() {
            return Err(Error::ArityMismatch {
                expected: shape.arity(),
                actual: self.values.len(),
            });
        }

        Ok(match (shape, self.values.as_slice()) {
            (SensorShape::Scalar, [value]) => Sample::Scalar(*value),
            _ => Sample::Vector(self.values.clone()),
        })
    }

    fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(HEADER.len() + self.values.len());
        row.push(self.user_id.clone());
        row.push(self.source_id.clone());
        row.push(format_seconds(self.time_received));
        row.push(format_seconds(self.time));
        row.extend(self.values.iter().map(ToString::to_string));
        row
    }
}

fn format_seconds(ts: Timestamp) -> String {
    format!("{}.{:03}", ts / 1_000, ts % 1_000)
}

/// Writes records as CSV, with a header naming the value columns.
///
/// Fields are quoted where needed, so ids may contain commas or quotes.
///
/// # Errors
///
/// Returns error if an I/O error occurred, or a record does not have one value per
/// value column.
pub fn write_records<'a, W, I>(writer: W, value_columns: &[&str], records: I) -> crate::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(HEADER.iter().chain(value_columns))?;

    let mut written = 0;

    for record in records {
        writer.write_record(record.to_row())?;
        written += 1;
    }

    writer.flush()?;

    Ok(written)
}

/// Reads all records of a CSV file with a header line, skipping blank lines.
///
/// # Errors
///
/// Returns [`Error::InvalidRecord`] if a row is malformed or its `time` does not strictly
/// increase, [`Error::Csv`] if rows differ in length, or an I/O error.
pub fn read_records<R: Read>(reader: R) -> crate::Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records: Vec<Record> = vec![];

    for row in reader.records() {
        let row = row?;
        let line = row
            .position()
            .and_then(|pos| usize::try_from(pos.line()).ok())
            .unwrap_or_default();

        let record = Record::from_row(&row, line)?;

        if let Some(last) = records.last() {
            if record.time <= last.time {
                return Err(Error::InvalidRecord {
                    line,
                    reason: format!("time {} does not follow {}", record.time, last.time),
                });
            }
        }

        records.push(record);
    }

    log::debug!("read {} records", records.len());

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn row(fields: &[&str]) -> csv::StringRecord {
        csv::StringRecord::from(fields.to_vec())
    }

    #[test]
    fn scalar_row() -> crate::Result<()> {
        let record = Record::from_row(
            &row(&["sub-1", "src-1", "1700000000.5", "1700000000.25", "72.5"]),
            2,
        )?;

        assert_eq!(
            Record {
                user_id: "sub-1".into(),
                source_id: "src-1".into(),
                time_received: 1_700_000_000_500,
                time: 1_700_000_000_250,
                values: vec![72.5],
            },
            record
        );
        assert_eq!(Sample::Scalar(72.5), record.sample(SensorShape::Scalar)?);

        Ok(())
    }

    #[test]
    fn vector_row() -> crate::Result<()> {
        let record = Record::from_row(
            &row(&["sub-1", "src-1", "10.0", "9.969", "0.1", "-0.98", "0.05"]),
            1,
        )?;

        assert_eq!(9_969, record.time);
        assert_eq!(
            Sample::Vector(vec![0.1, -0.98, 0.05]),
            record.sample(SensorShape::Vector(3))?
        );
        assert!(matches!(
            record.sample(SensorShape::Scalar),
            Err(Error::ArityMismatch {
                expected: 1,
                actual: 3
            })
        ));

        Ok(())
    }

    #[test]
    fn malformed_rows() {
        for fields in [
            &["sub-1", "src-1", "10.0"][..],
            &["sub-1", "src-1", "10.0", "9.5"],
            &["sub-1", "src-1", "ten", "9.5", "1.0"],
            &["sub-1", "src-1", "10.0", "9.5", "1.0", ""],
            &["sub-1", "src-1", "10.0", "-9.5", "1.0"],
            &["", "src-1", "10.0", "9.5", "1.0"],
        ] {
            assert!(
                matches!(
                    Record::from_row(&row(fields), 7),
                    Err(Error::InvalidRecord { line: 7, .. })
                ),
                "{fields:?} should be rejected"
            );
        }
    }

    #[test]
    fn write_then_read() -> crate::Result<()> {
        let records = (0..5_u64)
            .map(|idx| Record {
                user_id: "sub-1".into(),
                source_id: "src-1".into(),
                time_received: 1_000 + idx * 250 + 40,
                time: 1_000 + idx * 250,
                values: vec![idx as f64 * 0.5, -1.0, 2.25],
            })
            .collect::<Vec<_>>();

        let mut buf = vec![];
        assert_eq!(5, write_records(&mut buf, &["x", "y", "z"], &records)?);

        let csv = String::from_utf8_lossy(&buf);
        assert!(csv.starts_with("userId,sourceId,timeReceived,time,x,y,z\n"));
        assert!(csv.contains("sub-1,src-1,1.040,1.000,0,-1,2.25\n"));

        assert_eq!(records, read_records(buf.as_slice())?);

        Ok(())
    }

    #[test]
    fn ids_are_quoted() -> crate::Result<()> {
        let records = vec![Record {
            user_id: "sub,1".into(),
            source_id: r#"src "a""#.into(),
            time_received: 2_000,
            time: 1_500,
            values: vec![36.6],
        }];

        let mut buf = vec![];
        write_records(&mut buf, &["value"], &records)?;

        let csv = String::from_utf8_lossy(&buf);
        assert!(csv.contains(r#""sub,1","src ""a""",2.000,1.500,36.6"#));

        assert_eq!(records, read_records(buf.as_slice())?);

        Ok(())
    }

    #[test]
    fn read_skips_blank_lines() -> crate::Result<()> {
        let csv = "userId,sourceId,timeReceived,time,value\r\n\
                   \r\n\
                   sub-1,src-1,1.0,1.0,5\r\n\
                   sub-1,src-1,2.0,2.0,6\r\n";

        let records = read_records(csv.as_bytes())?;
        assert_eq!(
            vec![1_000, 2_000],
            records.iter().map(|record| record.time).collect::<Vec<_>>()
        );

        Ok(())
    }

    #[test]
    fn read_rejects_non_increasing_time() {
        let csv = "userId,sourceId,timeReceived,time,value\n\
                   sub-1,src-1,1.0,1.0,5\n\
                   sub-1,src-1,2.0,1.0,6\n";

        assert!(matches!(
            read_records(csv.as_bytes()),
            Err(Error::InvalidRecord { line: 3, .. })
        ));
    }

    #[test]
    fn read_rejects_ragged_rows() {
        let csv = "userId,sourceId,timeReceived,time,x,y,z\n\
                   sub-1,src-1,1.0,1.0,5,6\n";

        assert!(matches!(read_records(csv.as_bytes()), Err(Error::Csv(_))));
    }
}
