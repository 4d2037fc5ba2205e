use std::collections::VecDeque;

use chrono::{Duration, NaiveDateTime};

use crate::diagnostics::{Diagnostic, DiagnosticsSink, NullDiagnostics};
use crate::error::{Result, TrackError};
use crate::models::{IntervalKey, IntervalSummary, Sample, TrackPoint};
use crate::segmentation::config::{BoundaryGap, SegmentationConfig};
use crate::segmentation::day_buffer::{DayBuffer, DayOutcome};
use crate::segmentation::interpolate::{boundary_point, time_fraction};
use crate::segmentation::metrics::{convex_hull_area, max_displacement, path_length};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// What happens to one incoming sample, relative to the open interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDecision {
    /// Same interval, far enough from the last accepted sample.
    Accept,
    /// Same interval, too close to the last accepted sample.
    Skip,
    /// The sample belongs to a later interval; the open one must be closed.
    CrossBoundary(IntervalKey),
}

/// Points gathered for the interval being built.
#[derive(Debug, Clone)]
struct IntervalAccumulator {
    key: IntervalKey,
    /// Last real sample taken into this interval; spacing anchor.
    last_accepted: TrackPoint,
    /// Time-ordered, may start and/or end with a synthetic boundary point.
    points: Vec<TrackPoint>,
    accepted_count: usize,
}

impl IntervalAccumulator {
    fn open(key: IntervalKey, first: TrackPoint, seed: Option<TrackPoint>) -> Self {
        let mut points = Vec::with_capacity(8);
        if let Some(seed) = seed {
            points.push(seed);
        }
        points.push(first);
        Self {
            key,
            last_accepted: first,
            points,
            accepted_count: 1,
        }
    }

    fn accept(&mut self, point: TrackPoint) {
        self.points.push(point);
        self.last_accepted = point;
        self.accepted_count += 1;
    }
}

/// Single-pass interval segmentation of one subject's track.
///
/// Feed samples in time order with [`push`](Self::push); each call returns the
/// summaries released by that sample (a whole day at a time). Call
/// [`finish`](Self::finish) at end of input to close the last interval and day.
///
/// A contract violation (second subject, non-increasing timestamp) aborts the
/// stream: pending summaries are dropped and every later `push` fails.
pub struct IntervalSegmenter<S: DiagnosticsSink = NullDiagnostics> {
    config: SegmentationConfig,
    interval_length_secs: u32,
    spay_group: Option<String>,
    subject: Option<String>,
    previous_timestamp: Option<NaiveDateTime>,
    current: Option<IntervalAccumulator>,
    day: DayBuffer,
    aborted: bool,
    sink: S,
}

impl IntervalSegmenter<NullDiagnostics> {
    pub fn new(config: SegmentationConfig) -> Result<Self> {
        Self::with_diagnostics(config, NullDiagnostics)
    }
}

impl<S: DiagnosticsSink> IntervalSegmenter<S> {
    pub fn with_diagnostics(config: SegmentationConfig, sink: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            interval_length_secs: config.interval_length_secs(),
            config,
            spay_group: None,
            subject: None,
            previous_timestamp: None,
            current: None,
            day: DayBuffer::new(),
            aborted: false,
            sink,
        })
    }

    /// Label copied verbatim into every summary.
    pub fn with_spay_group(mut self, label: Option<String>) -> Self {
        self.spay_group = label;
        self
    }

    pub fn diagnostics(&self) -> &S {
        &self.sink
    }

    pub fn diagnostics_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_diagnostics(self) -> S {
        self.sink
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Process the next sample.
    pub fn push(&mut self, sample: Sample) -> Result<Vec<IntervalSummary>> {
        if self.aborted {
            return Err(TrackError::Aborted);
        }
        if let Err(err) = self.check_contract(&sample) {
            self.abort(&err);
            return Err(err);
        }
        self.previous_timestamp = Some(sample.timestamp);

        let incoming = sample.point();
        let Some(mut current) = self.current.take() else {
            let key = IntervalKey::of(incoming.timestamp, self.interval_length_secs);
            self.day.open(key.date);
            self.current = Some(IntervalAccumulator::open(key, incoming, None));
            return Ok(Vec::new());
        };

        let mut released = Vec::new();
        match self.classify(&current, &incoming) {
            SampleDecision::Accept => {
                self.sink.record(Diagnostic::SampleUsed {
                    timestamp: incoming.timestamp,
                    previous: current.last_accepted.timestamp,
                });
                current.accept(incoming);
                self.current = Some(current);
            }
            SampleDecision::Skip => {
                self.sink.record(Diagnostic::SampleSkipped {
                    timestamp: incoming.timestamp,
                    last_accepted: current.last_accepted.timestamp,
                    threshold_secs: self.config.spacing_threshold_secs(),
                });
                self.current = Some(current);
            }
            SampleDecision::CrossBoundary(next_key) => {
                let cut = self.boundary_cut(&current, next_key, &incoming);
                if let Some(point) = cut {
                    current.points.push(point);
                }

                let ended_date = current.key.date;
                self.close_interval(current);
                if next_key.date != ended_date {
                    released = self.close_day();
                    self.day.open(next_key.date);
                }

                // A fix sitting exactly on the boundary already is the cut point.
                let seed = cut.filter(|point| point.timestamp != incoming.timestamp);
                self.current = Some(IntervalAccumulator::open(next_key, incoming, seed));
            }
        }

        Ok(released)
    }

    /// Close the open interval and day with the data gathered so far.
    /// No boundary point is synthesized at end of input.
    pub fn finish(mut self) -> (Vec<IntervalSummary>, S) {
        let mut released = Vec::new();
        if !self.aborted {
            if let Some(current) = self.current.take() {
                self.close_interval(current);
            }
            released = self.close_day();
        }
        (released, self.sink)
    }

    fn check_contract(&mut self, sample: &Sample) -> Result<()> {
        let expected = self
            .subject
            .get_or_insert_with(|| sample.horse_id.clone());
        if *expected != sample.horse_id {
            return Err(TrackError::SubjectMismatch {
                expected: expected.clone(),
                found: sample.horse_id.clone(),
                timestamp: sample.timestamp,
            });
        }

        if let Some(previous) = self.previous_timestamp {
            if sample.timestamp <= previous {
                return Err(TrackError::OutOfOrder {
                    previous,
                    current: sample.timestamp,
                });
            }
        }
        Ok(())
    }

    fn abort(&mut self, err: &TrackError) {
        log_warn!(
            "aborting track for {}: {err}",
            self.subject.as_deref().unwrap_or("<unknown>")
        );
        self.aborted = true;
        self.current = None;
        self.day.clear();
    }

    fn classify(&self, current: &IntervalAccumulator, incoming: &TrackPoint) -> SampleDecision {
        let key = IntervalKey::of(incoming.timestamp, self.interval_length_secs);
        if key != current.key {
            return SampleDecision::CrossBoundary(key);
        }

        let elapsed = incoming.timestamp - current.last_accepted.timestamp;
        if elapsed > Duration::seconds(self.config.spacing_threshold_secs()) {
            SampleDecision::Accept
        } else {
            SampleDecision::Skip
        }
    }

    /// Synthetic point where the segment from the last accepted fix to
    /// `incoming` crosses the end of `current`, if the gap is small enough.
    fn boundary_cut(
        &mut self,
        current: &IntervalAccumulator,
        next_key: IntervalKey,
        incoming: &TrackPoint,
    ) -> Option<TrackPoint> {
        let last = current.last_accepted;
        let within_reach = match self.config.boundary_gap {
            BoundaryGap::AdjacentInterval => {
                current.key.next(self.config.interval_count) == Some(next_key)
            }
            BoundaryGap::WithinIntervalLength => {
                (incoming.timestamp - last.timestamp).num_seconds()
                    <= i64::from(self.interval_length_secs)
            }
        };

        if !within_reach {
            log_debug!(
                "no boundary point after {} interval {}: next fix at {}",
                current.key.date,
                current.key.index,
                incoming.timestamp
            );
            self.sink.record(Diagnostic::BoundaryGapTooLarge {
                key: current.key,
                last_accepted: last.timestamp,
                next: incoming.timestamp,
            });
            return None;
        }

        let boundary = current.key.end(self.interval_length_secs);
        self.sink.record(Diagnostic::BoundaryInterpolated {
            key: current.key,
            boundary,
            fraction: time_fraction(last.timestamp, incoming.timestamp, boundary),
        });
        Some(boundary_point(&last, incoming, boundary))
    }

    fn close_interval(&mut self, acc: IntervalAccumulator) {
        let required = self.config.min_points_per_interval;
        if acc.points.len() < required {
            log_debug!(
                "dropping {} interval {}: {} points ({} accepted), need {}",
                acc.key.date,
                acc.key.index,
                acc.points.len(),
                acc.accepted_count,
                required
            );
            self.sink.record(Diagnostic::IntervalTooSparse {
                key: acc.key,
                points: acc.points.len(),
                required,
            });
            return;
        }

        let summary = self.summarize(acc);
        self.sink.record(Diagnostic::IntervalClosed {
            key: summary.key(),
            distance: summary.distance,
            points: summary.point_count,
        });
        self.day.push(summary);
    }

    fn close_day(&mut self) -> Vec<IntervalSummary> {
        match self
            .day
            .close(self.config.day_completeness, self.config.interval_count)
        {
            DayOutcome::Complete { date, summaries } => {
                self.sink.record(Diagnostic::DayEmitted {
                    date,
                    intervals: summaries.len(),
                });
                summaries
            }
            DayOutcome::Incomplete {
                date,
                held,
                required,
            } => {
                log_info!(
                    "discarding {date} for {}: {held} of {required} intervals",
                    self.subject.as_deref().unwrap_or("<unknown>")
                );
                self.sink.record(Diagnostic::DayIncomplete {
                    date,
                    intervals: held,
                    required,
                });
                Vec::new()
            }
            DayOutcome::Idle => Vec::new(),
        }
    }

    fn summarize(&self, acc: IntervalAccumulator) -> IntervalSummary {
        let start_time = acc
            .points
            .first()
            .map_or(acc.last_accepted.timestamp, |p| p.timestamp);
        let end_time = acc
            .points
            .last()
            .map_or(acc.last_accepted.timestamp, |p| p.timestamp);

        IntervalSummary {
            horse_id: self.subject.clone().unwrap_or_default(),
            date: acc.key.date,
            interval: acc.key.index,
            start_time,
            end_time,
            distance: path_length(&acc.points),
            area: self
                .config
                .compute_area
                .then(|| convex_hull_area(&acc.points)),
            max_displacement: self
                .config
                .compute_max_displacement
                .then(|| max_displacement(&acc.points)),
            spay_group: self.spay_group.clone(),
            point_count: acc.points.len(),
        }
    }
}

/// Lazy adapter from a sample source to a summary stream.
///
/// Summaries are yielded as soon as the segmenter releases them. The first
/// error (from the source or a contract violation) is yielded once and ends
/// the stream; nothing buffered at that point is emitted.
pub struct Segmented<I, S: DiagnosticsSink> {
    source: I,
    segmenter: Option<IntervalSegmenter<S>>,
    ready: VecDeque<IntervalSummary>,
    retired: Option<S>,
}

impl<I, S> Segmented<I, S>
where
    I: Iterator<Item = Result<Sample>>,
    S: DiagnosticsSink,
{
    pub fn new(source: I, segmenter: IntervalSegmenter<S>) -> Self {
        Self {
            source,
            segmenter: Some(segmenter),
            ready: VecDeque::new(),
            retired: None,
        }
    }

    pub fn diagnostics(&self) -> Option<&S> {
        match &self.segmenter {
            Some(segmenter) => Some(segmenter.diagnostics()),
            None => self.retired.as_ref(),
        }
    }

    pub fn diagnostics_mut(&mut self) -> Option<&mut S> {
        match &mut self.segmenter {
            Some(segmenter) => Some(segmenter.diagnostics_mut()),
            None => self.retired.as_mut(),
        }
    }

    fn retire(&mut self) {
        self.retired = self.segmenter.take().map(IntervalSegmenter::into_diagnostics);
    }
}

impl<I, S> Iterator for Segmented<I, S>
where
    I: Iterator<Item = Result<Sample>>,
    S: DiagnosticsSink,
{
    type Item = Result<IntervalSummary>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(summary) = self.ready.pop_front() {
                return Some(Ok(summary));
            }

            let segmenter = self.segmenter.as_mut()?;
            match self.source.next() {
                Some(Ok(sample)) => match segmenter.push(sample) {
                    Ok(released) => self.ready.extend(released),
                    Err(err) => {
                        self.retire();
                        return Some(Err(err));
                    }
                },
                Some(Err(err)) => {
                    log_warn!("sample source failed: {err}");
                    self.retire();
                    return Some(Err(err));
                }
                None => {
                    let segmenter = self.segmenter.take()?;
                    let (released, sink) = segmenter.finish();
                    self.ready.extend(released);
                    self.retired = Some(sink);
                }
            }
        }
    }
}

/// `samples.segment_intervals(segmenter)` on any fallible sample iterator.
pub trait SegmentExt: Iterator<Item = Result<Sample>> + Sized {
    fn segment_intervals<S: DiagnosticsSink>(
        self,
        segmenter: IntervalSegmenter<S>,
    ) -> Segmented<Self, S> {
        Segmented::new(self, segmenter)
    }
}

impl<I: Iterator<Item = Result<Sample>>> SegmentExt for I {}

/// Segment an in-memory track in one call.
pub fn segment_track(
    samples: Vec<Sample>,
    config: &SegmentationConfig,
) -> Result<Vec<IntervalSummary>> {
    let segmenter = IntervalSegmenter::new(config.clone())?;
    samples.into_iter().map(Ok).segment_intervals(segmenter).collect()
}
