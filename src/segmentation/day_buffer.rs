use chrono::NaiveDate;

use crate::models::IntervalSummary;
use crate::segmentation::config::DayCompleteness;

/// Result of closing out one day.
#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    /// Enough intervals: the summaries are released in interval order.
    Complete {
        date: NaiveDate,
        summaries: Vec<IntervalSummary>,
    },
    /// Too few intervals: everything buffered for the day is dropped.
    Incomplete {
        date: NaiveDate,
        held: usize,
        required: usize,
    },
    /// No day was open.
    Idle,
}

/// Interval summaries of the day in progress, pending an all-or-nothing
/// completeness decision.
#[derive(Debug, Default)]
pub struct DayBuffer {
    date: Option<NaiveDate>,
    summaries: Vec<IntervalSummary>,
}

impl DayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `date`. A day is open once its first interval starts,
    /// even if none of its intervals end up in the buffer.
    pub fn open(&mut self, date: NaiveDate) {
        if self.date != Some(date) {
            self.summaries.clear();
            self.date = Some(date);
        }
    }

    pub fn push(&mut self, summary: IntervalSummary) {
        self.date.get_or_insert(summary.date);
        self.summaries.push(summary);
    }

    /// Decide the open day and reset the buffer.
    pub fn close(&mut self, policy: DayCompleteness, interval_count: u32) -> DayOutcome {
        let Some(date) = self.date.take() else {
            return DayOutcome::Idle;
        };
        let summaries = std::mem::take(&mut self.summaries);

        if policy.is_satisfied(summaries.len(), interval_count) {
            DayOutcome::Complete { date, summaries }
        } else {
            DayOutcome::Incomplete {
                date,
                held: summaries.len(),
                required: policy.required_intervals(interval_count),
            }
        }
    }

    pub fn clear(&mut self) {
        self.date = None;
        self.summaries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 5, 1).unwrap()
    }

    fn summary(interval: u32) -> IntervalSummary {
        let start = date().and_hms_opt(interval * 6, 0, 0).unwrap();
        IntervalSummary {
            horse_id: "H1".into(),
            date: date(),
            interval,
            start_time: start,
            end_time: start,
            distance: 1.0,
            area: None,
            max_displacement: None,
            spay_group: None,
            point_count: 2,
        }
    }

    #[test]
    fn test_complete_day_is_released() {
        let mut buffer = DayBuffer::new();
        buffer.open(date());
        for i in 0..4 {
            buffer.push(summary(i));
        }

        match buffer.close(DayCompleteness::Strict, 4) {
            DayOutcome::Complete { date: d, summaries } => {
                assert_eq!(d, date());
                assert_eq!(summaries.len(), 4);
            }
            other => panic!("expected complete day, got {other:?}"),
        }
        assert_eq!(buffer.close(DayCompleteness::Strict, 4), DayOutcome::Idle);
    }

    #[test]
    fn test_short_day_is_dropped() {
        let mut buffer = DayBuffer::new();
        buffer.open(date());
        for i in 0..3 {
            buffer.push(summary(i));
        }

        assert_eq!(
            buffer.close(DayCompleteness::Strict, 4),
            DayOutcome::Incomplete {
                date: date(),
                held: 3,
                required: 4
            }
        );
        assert_eq!(buffer.close(DayCompleteness::Strict, 4), DayOutcome::Idle);
    }

    #[test]
    fn test_lenient_tolerates_one_missing() {
        let mut buffer = DayBuffer::new();
        buffer.open(date());
        for i in 0..3 {
            buffer.push(summary(i));
        }
        assert!(matches!(
            buffer.close(DayCompleteness::Lenient, 4),
            DayOutcome::Complete { .. }
        ));
    }

    #[test]
    fn test_open_day_without_intervals() {
        let mut buffer = DayBuffer::new();
        assert_eq!(buffer.close(DayCompleteness::Strict, 4), DayOutcome::Idle);

        buffer.open(date());
        assert_eq!(
            buffer.close(DayCompleteness::Strict, 4),
            DayOutcome::Incomplete {
                date: date(),
                held: 0,
                required: 4
            }
        );
    }
}
