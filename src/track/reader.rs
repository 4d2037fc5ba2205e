use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter, Trim};
use serde::Deserialize;

use crate::error::{Result, TrackError};
use crate::models::Sample;

pub const REQUIRED_COLUMNS: [&str; 6] = ["HorseID", "Date_Time", "Hour", "Minute", "X_UTM", "Y_UTM"];

/// One CSV row as exported by the collar software. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "HorseID")]
    horse_id: String,
    #[serde(rename = "Date_Time")]
    date: String,
    #[serde(rename = "Hour")]
    hour: u32,
    #[serde(rename = "Minute")]
    minute: u32,
    #[serde(rename = "X_UTM")]
    x: f64,
    #[serde(rename = "Y_UTM")]
    y: f64,
}

/// Lazy, finite sample source over a tracking CSV.
///
/// The timestamp of each sample is the row's date at midnight plus its hour
/// and minute offsets. End of input is `None`; a bad row is yielded as a
/// `MalformedRecord` error and the caller decides whether to stop.
pub struct TrackReader<R: Read> {
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
}

impl TrackReader<File> {
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_reader(File::open(path)?)
    }
}

impl<R: Read> TrackReader<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
        let headers = reader.headers()?.clone();

        if let Some(missing) = REQUIRED_COLUMNS
            .iter()
            .find(|column| !headers.iter().any(|h| h == **column))
        {
            return Err(TrackError::MalformedRecord {
                line: 1,
                reason: format!("missing column {missing}"),
            });
        }

        Ok(Self {
            headers,
            records: reader.into_records(),
        })
    }

    fn parse(&self, record: &StringRecord) -> Result<Sample> {
        let line = record.position().map_or(0, |p| p.line());
        let malformed = |reason: String| TrackError::MalformedRecord { line, reason };

        let row: RawRow = record
            .deserialize(Some(&self.headers))
            .map_err(|err| malformed(err.to_string()))?;

        if row.horse_id.is_empty() {
            return Err(malformed("empty HorseID".into()));
        }
        if !row.x.is_finite() || !row.y.is_finite() {
            return Err(malformed(format!("non-finite coordinate ({}, {})", row.x, row.y)));
        }

        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .map_err(|err| malformed(format!("bad date '{}': {err}", row.date)))?;
        if row.hour > 23 || row.minute > 59 {
            return Err(malformed(format!(
                "time of day {}:{} out of range",
                row.hour, row.minute
            )));
        }
        let offset = Duration::hours(i64::from(row.hour)) + Duration::minutes(i64::from(row.minute));
        let timestamp = date
            .and_time(NaiveTime::default())
            .checked_add_signed(offset)
            .ok_or_else(|| malformed(format!("timestamp overflow on {}", row.date)))?;

        Ok(Sample::new(row.horse_id, timestamp, row.x, row.y))
    }
}

impl<R: Read> Iterator for TrackReader<R> {
    type Item = Result<Sample>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(err) => return Some(Err(err.into())),
        };
        Some(self.parse(&record))
    }
}
