//! Synthetic positions at interval edges.
//!
//! When the path crosses an interval boundary between two fixes, the crossing
//! segment is cut at the boundary instant. The cut point is a linear
//! interpolation in time between the two fixes, so the part of the segment
//! before the edge counts towards the ending interval and the rest towards the
//! next one.

use chrono::NaiveDateTime;

use crate::models::TrackPoint;

/// Fraction of the way from `from` to `to` that `at` lies, clamped to [0, 1].
/// A zero or negative span yields 0.
pub fn time_fraction(from: NaiveDateTime, to: NaiveDateTime, at: NaiveDateTime) -> f64 {
    let span_ms = (to - from).num_milliseconds();
    if span_ms <= 0 {
        return 0.0;
    }
    let elapsed_ms = (at - from).num_milliseconds();
    (elapsed_ms as f64 / span_ms as f64).clamp(0.0, 1.0)
}

/// Position on the segment `from -> to` at instant `at`.
///
/// The returned timestamp is `at` clamped into `[from, to]`.
pub fn boundary_point(from: &TrackPoint, to: &TrackPoint, at: NaiveDateTime) -> TrackPoint {
    if to.timestamp <= from.timestamp {
        return *from;
    }
    let fraction = time_fraction(from.timestamp, to.timestamp, at);
    TrackPoint::new(
        at.clamp(from.timestamp, to.timestamp),
        from.position.lerp(&to.position, fraction),
    )
}
