//! Extending the flight line to the map edges

use glam::Vec2;

/// Intersections closer than this are the same point (a corner hit)
const MERGE_DISTANCE: f32 = 0.5;
const EDGE_TOLERANCE: f32 = 1e-3;

/// Extend the line through `p0` and `p1` to the edges of the
/// `[0, bounds.x] × [0, bounds.y]` rectangle.
///
/// Returns the two edge points ordered in the direction of travel, or
/// `None` when the line is vertical, degenerate, or does not cross the
/// rectangle at exactly two distinct points.
pub fn extend_to_bounds(p0: Vec2, p1: Vec2, bounds: Vec2) -> Option<[Vec2; 2]> {
    let delta = p1 - p0;
    if delta.x.abs() <= f32::EPSILON {
        return None;
    }

    // y = m·x + b
    let m = delta.y / delta.x;
    let b = p0.y - m * p0.x;

    let mut candidates = vec![
        Vec2::new(0.0, b),
        Vec2::new(bounds.x, m * bounds.x + b),
    ];
    if m.abs() > f32::EPSILON {
        candidates.push(Vec2::new(-b / m, 0.0));
        candidates.push(Vec2::new((bounds.y - b) / m, bounds.y));
    }

    let mut hits: Vec<Vec2> = Vec::with_capacity(4);
    for point in candidates {
        let inside = (-EDGE_TOLERANCE..=bounds.x + EDGE_TOLERANCE).contains(&point.x)
            && (-EDGE_TOLERANCE..=bounds.y + EDGE_TOLERANCE).contains(&point.y);
        if inside && hits.iter().all(|h| h.distance(point) > MERGE_DISTANCE) {
            hits.push(point.clamp(Vec2::ZERO, bounds));
        }
    }

    let &[entry, exit] = hits.as_slice() else {
        return None;
    };
    if (exit - entry).dot(delta) >= 0.0 {
        Some([entry, exit])
    } else {
        Some([exit, entry])
    }
}

/// Flight line across the whole map from the aircraft samples.
///
/// Uses the first sample and the next one at a different position.
pub fn plane_line(samples: &[Vec2], bounds: Vec2) -> Option<[Vec2; 2]> {
    let Some(&first) = samples.first() else {
        log::debug!("No aircraft samples, skipping plane path");
        return None;
    };
    let Some(&second) = samples.iter().find(|p| **p != first) else {
        log::debug!("Aircraft never moved between samples, skipping plane path");
        return None;
    };

    let line = extend_to_bounds(first, second, bounds);
    if line.is_none() {
        log::warn!(
            "Plane path through {first} and {second} does not cross the {}x{} map at two points, skipping",
            bounds.x,
            bounds.y
        );
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(100.0, 100.0);

    #[test]
    fn test_extends_to_left_and_right_edges() {
        let line = extend_to_bounds(Vec2::new(10.0, 10.0), Vec2::new(20.0, 15.0), BOUNDS);
        assert_eq!(line, Some([Vec2::new(0.0, 5.0), Vec2::new(100.0, 55.0)]));
    }

    #[test]
    fn test_keeps_direction_of_travel() {
        let line = extend_to_bounds(Vec2::new(20.0, 15.0), Vec2::new(10.0, 10.0), BOUNDS);
        assert_eq!(line, Some([Vec2::new(100.0, 55.0), Vec2::new(0.0, 5.0)]));
    }

    #[test]
    fn test_horizontal_line() {
        let line = extend_to_bounds(Vec2::new(10.0, 30.0), Vec2::new(50.0, 30.0), BOUNDS);
        assert_eq!(line, Some([Vec2::new(0.0, 30.0), Vec2::new(100.0, 30.0)]));
    }

    #[test]
    fn test_steep_line_uses_top_and_bottom() {
        let line = extend_to_bounds(Vec2::new(40.0, 20.0), Vec2::new(45.0, 30.0), BOUNDS).unwrap();
        assert_eq!(line[0], Vec2::new(30.0, 0.0));
        assert_eq!(line[1], Vec2::new(80.0, 100.0));
    }

    #[test]
    fn test_vertical_line_is_skipped() {
        assert_eq!(extend_to_bounds(Vec2::new(10.0, 10.0), Vec2::new(10.0, 50.0), BOUNDS), None);
    }

    #[test]
    fn test_corner_diagonal_merges_duplicate_hits() {
        let line = extend_to_bounds(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0), BOUNDS);
        assert_eq!(line, Some([Vec2::ZERO, Vec2::new(100.0, 100.0)]));
    }

    #[test]
    fn test_line_missing_the_map() {
        assert_eq!(
            extend_to_bounds(Vec2::new(10.0, 200.0), Vec2::new(20.0, 210.0), BOUNDS),
            None
        );
    }

    #[test]
    fn test_plane_line_needs_two_distinct_samples() {
        assert_eq!(plane_line(&[], BOUNDS), None);
        assert_eq!(plane_line(&[Vec2::ONE, Vec2::ONE], BOUNDS), None);
        assert!(plane_line(&[Vec2::ONE, Vec2::ONE, Vec2::new(5.0, 3.0)], BOUNDS).is_some());
    }
}
