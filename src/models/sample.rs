//! Input side of the pipeline: one position fix for one subject.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Planar projected coordinate (UTM easting/northing) in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point `fraction` of the way from `self` towards `other`.
    pub fn lerp(&self, other: &Position, fraction: f64) -> Position {
        Position {
            x: self.x + fraction * (other.x - self.x),
            y: self.y + fraction * (other.y - self.y),
        }
    }
}

/// A timestamped position, either a real fix or a synthetic boundary point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub timestamp: NaiveDateTime,
    pub position: Position,
}

impl TrackPoint {
    pub fn new(timestamp: NaiveDateTime, position: Position) -> Self {
        Self {
            timestamp,
            position,
        }
    }
}

/// One parsed input record. The timestamp is already composed from the
/// separate date/hour/minute fields by the row source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub horse_id: String,
    pub timestamp: NaiveDateTime,
    pub position: Position,
}

impl Sample {
    pub fn new(horse_id: impl Into<String>, timestamp: NaiveDateTime, x: f64, y: f64) -> Self {
        Self {
            horse_id: horse_id.into(),
            timestamp,
            position: Position::new(x, y),
        }
    }

    pub fn point(&self) -> TrackPoint {
        TrackPoint::new(self.timestamp, self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_pythagorean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((b.distance_to(&a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Position::new(10.0, -2.0);
        let b = Position::new(20.0, 8.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 15.0).abs() < 1e-12);
        assert!((mid.y - 3.0).abs() < 1e-12);
    }
}
