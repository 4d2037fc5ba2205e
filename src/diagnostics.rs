//! Audit trail of accept/reject decisions made while segmenting a track.
//!
//! Diagnostics never influence control flow. The segmenter reports every
//! decision to a [`DiagnosticsSink`]; the binary writes them to a trace file
//! next to the input and mirrors them to the `log` facade at debug level.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::models::IntervalKey;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    SampleUsed {
        timestamp: NaiveDateTime,
        previous: NaiveDateTime,
    },
    SampleSkipped {
        timestamp: NaiveDateTime,
        last_accepted: NaiveDateTime,
        threshold_secs: i64,
    },
    BoundaryInterpolated {
        key: IntervalKey,
        boundary: NaiveDateTime,
        fraction: f64,
    },
    BoundaryGapTooLarge {
        key: IntervalKey,
        last_accepted: NaiveDateTime,
        next: NaiveDateTime,
    },
    IntervalClosed {
        key: IntervalKey,
        distance: f64,
        points: usize,
    },
    IntervalTooSparse {
        key: IntervalKey,
        points: usize,
        required: usize,
    },
    DayEmitted {
        date: NaiveDate,
        intervals: usize,
    },
    DayIncomplete {
        date: NaiveDate,
        intervals: usize,
        required: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SampleUsed {
                timestamp,
                previous,
            } => write!(
                f,
                "Using {} and {}",
                previous.format("%Y-%m-%d %H:%M"),
                timestamp.format("%Y-%m-%d %H:%M")
            ),
            Diagnostic::SampleSkipped {
                timestamp,
                last_accepted,
                threshold_secs,
            } => write!(
                f,
                "Skipping {}: within {}s of {}",
                timestamp.format("%Y-%m-%d %H:%M"),
                threshold_secs,
                last_accepted.format("%H:%M")
            ),
            Diagnostic::BoundaryInterpolated {
                key,
                boundary,
                fraction,
            } => write!(
                f,
                "{} Interval {}: boundary point at {} ({:.3} of crossing segment)",
                key.date,
                key.index,
                boundary.format("%Y-%m-%d %H:%M"),
                fraction
            ),
            Diagnostic::BoundaryGapTooLarge {
                key,
                last_accepted,
                next,
            } => write!(
                f,
                "{} Interval {}: gap {} -> {} too large, crossing distance not attributed",
                key.date,
                key.index,
                last_accepted.format("%Y-%m-%d %H:%M"),
                next.format("%Y-%m-%d %H:%M")
            ),
            Diagnostic::IntervalClosed {
                key,
                distance,
                points,
            } => write!(
                f,
                "{} Interval {}: {} meters over {} points",
                key.date, key.index, distance, points
            ),
            Diagnostic::IntervalTooSparse {
                key,
                points,
                required,
            } => write!(
                f,
                "Insufficient number of datapoints on {} Interval {} ({} of {})",
                key.date, key.index, points, required
            ),
            Diagnostic::DayEmitted { date, intervals } => {
                write!(f, "{}: wrote {} intervals", date, intervals)
            }
            Diagnostic::DayIncomplete {
                date,
                intervals,
                required,
            } => write!(
                f,
                "{}: discarded, only {} of {} required intervals",
                date, intervals, required
            ),
        }
    }
}

/// Receives decisions as they are made.
pub trait DiagnosticsSink {
    fn record(&mut self, diagnostic: Diagnostic);
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl DiagnosticsSink for NullDiagnostics {
    fn record(&mut self, _diagnostic: Diagnostic) {}
}

/// Forwards decisions to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl DiagnosticsSink for LogDiagnostics {
    fn record(&mut self, diagnostic: Diagnostic) {
        log_debug!("{diagnostic}");
    }
}

impl DiagnosticsSink for Vec<Diagnostic> {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticsSink + ?Sized> DiagnosticsSink for &mut S {
    fn record(&mut self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}

impl<A: DiagnosticsSink, B: DiagnosticsSink> DiagnosticsSink for (A, B) {
    fn record(&mut self, diagnostic: Diagnostic) {
        self.0.record(diagnostic.clone());
        self.1.record(diagnostic);
    }
}

/// One line per decision, written to any `Write`.
///
/// Write failures are logged once and then ignored; a broken trace file must
/// not stop the analysis.
pub struct TraceFile<W: Write> {
    writer: W,
    failed: bool,
}

impl TraceFile<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TraceFile<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failed: false,
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DiagnosticsSink for TraceFile<W> {
    fn record(&mut self, diagnostic: Diagnostic) {
        if self.failed {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{diagnostic}") {
            log_warn!("trace log write failed, further decisions not recorded: {err}");
            self.failed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> IntervalKey {
        IntervalKey::new(NaiveDate::from_ymd_opt(2019, 5, 1).unwrap(), 3)
    }

    #[test]
    fn test_trace_file_writes_one_line_per_decision() {
        let mut trace = TraceFile::new(Vec::<u8>::new());
        trace.record(Diagnostic::IntervalTooSparse {
            key: key(),
            points: 1,
            required: 2,
        });
        trace.record(Diagnostic::DayIncomplete {
            date: key().date,
            intervals: 20,
            required: 24,
        });

        let text = String::from_utf8(trace.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Insufficient number of datapoints on 2019-05-01 Interval 3 (1 of 2)"
        );
        assert_eq!(
            lines[1],
            "2019-05-01: discarded, only 20 of 24 required intervals"
        );
    }

    #[test]
    fn test_pair_sink_fans_out() {
        let mut sink: (Vec<Diagnostic>, Vec<Diagnostic>) = (Vec::new(), Vec::new());
        sink.record(Diagnostic::DayEmitted {
            date: key().date,
            intervals: 4,
        });
        assert_eq!(sink.0.len(), 1);
        assert_eq!(sink.0, sink.1);
    }
}
