//! Path smoothing, dashing and stroking
//!
//! Paths are built from raw samples as a chain of quadratic curves: each
//! sample is the control point, and each curve ends halfway to the next
//! sample. The result passes near every sample without the faceted look of
//! a plain polyline. Strokes are turned into polygons (one quad per segment
//! plus round joins) and handed to the rasterizer.

use glam::Vec2;

use super::raster::Canvas;
use super::shapes::circle;
use crate::settings::StrokeStyle;

/// Target length of one flattened curve step, in pixels
const FLATTEN_STEP: f32 = 3.0;
const MAX_CURVE_STEPS: u32 = 32;
const JOIN_SEGMENTS: u32 = 10;

/// Where a smoothed path stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathEnd {
    /// Straight run from the last curve to the last sample
    LastSample,
    /// Stop where the last curve ends, halfway between the final two samples
    LastMidpoint,
}

/// Flatten the midpoint-smoothed curve through `points`, starting on the
/// first sample
pub fn smooth(points: &[Vec2], end: PathEnd) -> Vec<Vec2> {
    let Some((&first, _)) = points.split_first() else {
        return Vec::new();
    };

    let mut line = vec![first];
    let mut cursor = first;

    for pair in points.windows(2) {
        let control = pair[0];
        let end = (pair[0] + pair[1]) * 0.5;
        flatten_quad(cursor, control, end, &mut line);
        cursor = end;
    }

    if end == PathEnd::LastSample {
        if let Some(&last) = points.last() {
            if points.len() > 1 && last != cursor {
                line.push(last);
            }
        }
    }

    line
}

fn flatten_quad(from: Vec2, control: Vec2, to: Vec2, out: &mut Vec<Vec2>) {
    let hull = from.distance(control) + control.distance(to);
    let steps = ((hull / FLATTEN_STEP).ceil() as u32).clamp(1, MAX_CURVE_STEPS);
    for i in 1..=steps {
        let t = i as f32 / steps as f32;
        let mt = 1.0 - t;
        out.push(from * (mt * mt) + control * (2.0 * mt * t) + to * (t * t));
    }
}

/// Split a polyline into dashes. Odd-length patterns repeat twice, like
/// canvas line dashes. An empty pattern returns the line unchanged.
pub fn dash(polyline: &[Vec2], pattern: &[f32]) -> Vec<Vec<Vec2>> {
    if polyline.len() < 2 || pattern.iter().sum::<f32>() <= 0.0 {
        return vec![polyline.to_vec()];
    }

    let pattern: Vec<f32> = if pattern.len() % 2 == 1 {
        pattern.iter().chain(pattern).copied().collect()
    } else {
        pattern.to_vec()
    };

    let mut dashes = Vec::new();
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut on = true;
    let mut current = vec![polyline[0]];

    for segment in polyline.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let len = a.distance(b);
        if len <= f32::EPSILON {
            continue;
        }
        let dir = (b - a) / len;
        let mut pos = 0.0;

        while len - pos > f32::EPSILON {
            let step = remaining.min(len - pos);
            pos += step;
            remaining -= step;
            let p = a + dir * pos;
            if on {
                current.push(p);
            }

            if remaining <= f32::EPSILON {
                if on && current.len() >= 2 {
                    dashes.push(std::mem::take(&mut current));
                }
                on = !on;
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
                current = if on { vec![p] } else { Vec::new() };
            }
        }
    }

    if on && current.len() >= 2 {
        dashes.push(current);
    }
    dashes
}

/// Outline polygons for an open polyline: butt caps, round joins
pub fn stroke(polyline: &[Vec2], width: f32) -> Vec<Vec<Vec2>> {
    let half = width * 0.5;
    if half <= 0.0 {
        return Vec::new();
    }

    let mut polygons = Vec::with_capacity(polyline.len() * 2);
    for segment in polyline.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let dir = (b - a).normalize_or_zero();
        if dir == Vec2::ZERO {
            continue;
        }
        let n = dir.perp() * half;
        polygons.push(vec![a + n, b + n, b - n, a - n]);
    }

    for joint in polyline.windows(3) {
        let before = (joint[1] - joint[0]).normalize_or_zero();
        let after = (joint[2] - joint[1]).normalize_or_zero();
        // Straight continuations need no join
        if before.dot(after) < 0.999 {
            polygons.push(circle(joint[1], half, JOIN_SEGMENTS));
        }
    }

    polygons
}

/// Outline polygons for a closed polygon's border
pub fn stroke_closed(polygon: &[Vec2], width: f32) -> Vec<Vec<Vec2>> {
    if polygon.len() < 2 {
        return Vec::new();
    }
    let mut ring = polygon.to_vec();
    ring.push(polygon[0]);
    ring.push(polygon[1]);
    stroke(&ring, width)
}

impl Canvas {
    /// Draw a smoothed path through `points`: halo first, then the styled
    /// (optionally dashed) stroke on top
    pub fn stroke_path(&mut self, points: &[Vec2], style: &StrokeStyle, end: PathEnd) {
        let line = smooth(points, end);
        if line.len() < 2 {
            return;
        }

        if style.halo_width > 0.0 {
            let halo = stroke(&line, style.width + style.halo_width);
            self.fill_polygons(&halo, style.halo_color);
        }

        let body: Vec<Vec<Vec2>> = dash(&line, &style.dash)
            .iter()
            .flat_map(|piece| stroke(piece, style.width))
            .collect();
        self.fill_polygons(&body, style.color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::color::Rgba;

    #[test]
    fn test_smooth_passes_through_endpoints() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(30.0, 0.0), Vec2::new(30.0, 30.0)];
        let line = smooth(&points, PathEnd::LastSample);
        assert_eq!(line.first(), Some(&points[0]));
        assert_eq!(line.last(), Some(&points[2]));
        // The corner is cut: no flattened point lands on (30, 0)
        assert!(line.iter().all(|p| p.distance(points[1]) > 1.0));
        // ...but the curve stays close to it
        assert!(line.iter().any(|p| p.distance(points[1]) < 10.0));
    }

    #[test]
    fn test_smooth_can_stop_at_last_midpoint() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(30.0, 0.0), Vec2::new(30.0, 30.0)];
        let line = smooth(&points, PathEnd::LastMidpoint);
        assert_eq!(line.first(), Some(&points[0]));
        assert_eq!(line.last(), Some(&Vec2::new(30.0, 15.0)));
        assert!(line.iter().all(|p| p.y <= 15.0));
        // Same curve up to that point
        let full = smooth(&points, PathEnd::LastSample);
        assert_eq!(&full[..line.len()], line.as_slice());
        assert_eq!(full.len(), line.len() + 1);
    }

    #[test]
    fn test_smooth_single_point() {
        assert_eq!(smooth(&[Vec2::ONE], PathEnd::LastSample), vec![Vec2::ONE]);
        assert_eq!(smooth(&[Vec2::ONE], PathEnd::LastMidpoint), vec![Vec2::ONE]);
        assert!(smooth(&[], PathEnd::LastSample).is_empty());
    }

    #[test]
    fn test_dash_splits_by_length() {
        let line = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)];
        let dashes = dash(&line, &[2.5]);
        assert_eq!(dashes.len(), 2);
        assert_eq!(dashes[0], vec![Vec2::new(0.0, 0.0), Vec2::new(2.5, 0.0)]);
        assert_eq!(dashes[1], vec![Vec2::new(5.0, 0.0), Vec2::new(7.5, 0.0)]);
    }

    #[test]
    fn test_dash_continues_across_segments() {
        let line = [Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(2.0, 4.0)];
        let dashes = dash(&line, &[3.0, 1.0]);
        assert_eq!(dashes[0], vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0), Vec2::new(2.0, 1.0)]);
        assert_eq!(dashes[1], vec![Vec2::new(2.0, 2.0), Vec2::new(2.0, 4.0)]);
    }

    #[test]
    fn test_empty_pattern_is_solid() {
        let line = vec![Vec2::ZERO, Vec2::new(5.0, 5.0)];
        assert_eq!(dash(&line, &[]), vec![line]);
    }

    #[test]
    fn test_stroke_quads_and_joins() {
        let line = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let polygons = stroke(&line, 2.0);
        // two quads + one join
        assert_eq!(polygons.len(), 3);
        assert_eq!(polygons[0][0], Vec2::new(0.0, 1.0));
        assert_eq!(polygons[0][3], Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_stroke_path_draws_halo_then_body() {
        let mut canvas = Canvas::new(40, 20, Rgba::rgb(255, 255, 255));
        let style = StrokeStyle {
            color: Rgba::rgb(255, 0, 0),
            width: 2.0,
            dash: Vec::new(),
            halo_width: 4.0,
            halo_color: Rgba::rgb(0, 0, 0),
        };
        canvas.stroke_path(&[Vec2::new(5.0, 10.0), Vec2::new(35.0, 10.0)], &style, PathEnd::LastSample);
        // centre of the line is the stroke color
        assert_eq!(canvas.pixel(20, 9), Some(Rgba::rgb(255, 0, 0)));
        // just outside the body but inside the halo
        assert_eq!(canvas.pixel(20, 11), Some(Rgba::rgb(0, 0, 0)));
        // far away untouched
        assert_eq!(canvas.pixel(20, 1), Some(Rgba::rgb(255, 255, 255)));
    }
}
