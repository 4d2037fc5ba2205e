use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Identifies one fixed-length slice of one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalKey {
    pub date: NaiveDate,
    pub index: u32,
}

impl IntervalKey {
    pub fn new(date: NaiveDate, index: u32) -> Self {
        Self { date, index }
    }

    /// Key of the interval containing `timestamp`.
    pub fn of(timestamp: NaiveDateTime, interval_length_secs: u32) -> Self {
        let seconds = timestamp.time().num_seconds_from_midnight();
        Self {
            date: timestamp.date(),
            index: seconds / interval_length_secs,
        }
    }

    pub fn start(&self, interval_length_secs: u32) -> NaiveDateTime {
        self.date.and_time(NaiveTime::default())
            + Duration::seconds(i64::from(self.index) * i64::from(interval_length_secs))
    }

    /// Exclusive end. For the last interval of a day this is midnight of the
    /// following day.
    pub fn end(&self, interval_length_secs: u32) -> NaiveDateTime {
        self.start(interval_length_secs) + Duration::seconds(i64::from(interval_length_secs))
    }

    /// The interval immediately after this one, rolling over to index 0 of
    /// the next calendar day after the last interval.
    pub fn next(&self, interval_count: u32) -> Option<IntervalKey> {
        if self.index + 1 < interval_count {
            Some(IntervalKey::new(self.date, self.index + 1))
        } else {
            self.date.succ_opt().map(|date| IntervalKey::new(date, 0))
        }
    }
}

/// One output row: movement metrics for a single interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSummary {
    pub horse_id: String,
    pub date: NaiveDate,
    pub interval: u32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Path length over the accumulated points, meters.
    pub distance: f64,
    pub area: Option<f64>,
    pub max_displacement: Option<f64>,
    pub spay_group: Option<String>,
    /// Points the metrics were computed from, synthetic boundary points included.
    pub point_count: usize,
}

impl IntervalSummary {
    pub fn key(&self) -> IntervalKey {
        IntervalKey::new(self.date, self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 5, day)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn test_key_of_timestamp() {
        // 6 intervals of 4h
        let len = 4 * 3600;
        assert_eq!(IntervalKey::of(at(1, 0, 0), len).index, 0);
        assert_eq!(IntervalKey::of(at(1, 3, 59), len).index, 0);
        assert_eq!(IntervalKey::of(at(1, 4, 0), len).index, 1);
        assert_eq!(IntervalKey::of(at(1, 23, 59), len).index, 5);
    }

    #[test]
    fn test_key_bounds() {
        let len = 4 * 3600;
        let key = IntervalKey::new(at(1, 0, 0).date(), 2);
        assert_eq!(key.start(len), at(1, 8, 0));
        assert_eq!(key.end(len), at(1, 12, 0));

        let last = IntervalKey::new(at(1, 0, 0).date(), 5);
        assert_eq!(last.end(len), at(2, 0, 0));
    }

    #[test]
    fn test_next_rolls_over_day() {
        let date = at(1, 0, 0).date();
        assert_eq!(
            IntervalKey::new(date, 3).next(6),
            Some(IntervalKey::new(date, 4))
        );
        assert_eq!(
            IntervalKey::new(date, 5).next(6),
            Some(IntervalKey::new(at(2, 0, 0).date(), 0))
        );
    }
}
