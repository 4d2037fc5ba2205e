use geo::{Area, ConvexHull, MultiPoint, Point};

use crate::models::TrackPoint;

/// Sum of straight-line distances between consecutive points, in order.
pub fn path_length(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| pair[0].position.distance_to(&pair[1].position))
        .sum()
}

/// Area of the convex hull around the points, square meters.
/// Fewer than three points, or collinear points, enclose nothing.
pub fn convex_hull_area(points: &[TrackPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let cloud: MultiPoint<f64> = points
        .iter()
        .map(|p| Point::new(p.position.x, p.position.y))
        .collect();
    cloud.convex_hull().unsigned_area()
}

/// Largest distance between any two points. O(k²), k is small per interval.
pub fn max_displacement(points: &[TrackPoint]) -> f64 {
    let mut max = 0.0_f64;
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            max = max.max(a.position.distance_to(&b.position));
        }
    }
    max
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Position;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn track(coords: &[(f64, f64)]) -> Vec<TrackPoint> {
        let start: NaiveDateTime = NaiveDate::from_ymd_opt(2019, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| {
                TrackPoint::new(start + Duration::minutes(30 * i as i64), Position::new(x, y))
            })
            .collect()
    }

    #[test]
    fn test_path_length_single_segment() {
        assert!((path_length(&track(&[(0.0, 0.0), (3.0, 4.0)])) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_path_length_follows_order() {
        // out and back: 10 + 10, not the 0 net displacement
        let points = track(&[(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)]);
        assert!((path_length(&points) - 20.0).abs() < 1e-12);
        assert_eq!(path_length(&points[..1]), 0.0);
        assert_eq!(path_length(&[]), 0.0);
    }

    #[test]
    fn test_hull_area_square() {
        let points = track(&[(0.0, 0.0), (10.0, 0.0), (5.0, 5.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!((convex_hull_area(&points) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_hull_area_degenerate() {
        assert_eq!(convex_hull_area(&track(&[(0.0, 0.0), (1.0, 1.0)])), 0.0);
        let line = track(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(convex_hull_area(&line).abs() < 1e-9);
    }

    #[test]
    fn test_max_displacement_all_pairs() {
        // farthest pair is first and third, not consecutive
        let points = track(&[(0.0, 0.0), (1.0, 0.0), (6.0, 8.0), (5.0, 8.0)]);
        assert!((max_displacement(&points) - 10.0).abs() < 1e-12);
        assert_eq!(max_displacement(&points[..1]), 0.0);
    }
}
