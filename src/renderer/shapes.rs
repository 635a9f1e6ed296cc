//! Shape generation and the marker drawing primitives

use glam::Vec2;
use std::f32::consts::{FRAC_1_SQRT_2, PI};

use super::color::Rgba;
use super::path::stroke_closed;
use super::raster::Canvas;
use crate::consts::CIRCLE_SEGMENTS;
use crate::settings::MarkerStyle;

/// Arm half-thickness of the cross glyph relative to its size
const CROSS_ARM_RATIO: f32 = 0.14;

/// Outline of a circle as a polygon
pub fn circle(center: Vec2, radius: f32, segments: u32) -> Vec<Vec2> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let theta = (i as f32 / segments as f32) * 2.0 * PI;
            Vec2::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            )
        })
        .collect()
}

/// Enough segments that the chord error stays under a pixel
fn segments_for(radius: f32) -> u32 {
    ((radius * 0.5) as u32).clamp(CIRCLE_SEGMENTS, 720)
}

/// The 12-point "X" glyph: a plus sign with arms of half-thickness `t`
/// rotated by 45°, scaled so its bounding box is the square
/// `[origin, origin + size]`.
pub fn cross_glyph(origin: Vec2, size: f32) -> Vec<Vec2> {
    let t = size * CROSS_ARM_RATIO;
    // Arm tip corner (h, t) rotates to ((h - t), (h + t)) / sqrt(2); make
    // the outermost extent land on the bounding box
    let h = size * 0.5 / FRAC_1_SQRT_2 - t;
    let plus = [
        Vec2::new(t, -h),
        Vec2::new(t, -t),
        Vec2::new(h, -t),
        Vec2::new(h, t),
        Vec2::new(t, t),
        Vec2::new(t, h),
        Vec2::new(-t, h),
        Vec2::new(-t, t),
        Vec2::new(-h, t),
        Vec2::new(-h, -t),
        Vec2::new(-t, -t),
        Vec2::new(-t, -h),
    ];
    let center = origin + Vec2::splat(size * 0.5);
    plus.iter()
        .map(|p| center + Vec2::new(p.x - p.y, p.x + p.y) * FRAC_1_SQRT_2)
        .collect()
}

/// Top-left corner for a `size` box centred on `center`, kept on the
/// surface's top and left edges
pub fn clamp_origin(center: Vec2, size: Vec2) -> Vec2 {
    (center - (size * 0.5).round()).max(Vec2::ZERO)
}

impl Canvas {
    /// Tint everything outside the circle; the inside stays untouched.
    ///
    /// Equivalent to filling the circle, then filling the whole surface in
    /// a mode that only paints where the circle did not.
    pub fn mask_outside_circle(&mut self, center: Vec2, radius: f32, tint: Rgba, opacity: f32) {
        let hole = if radius > 0.0 {
            vec![circle(center, radius, segments_for(radius))]
        } else {
            Vec::new()
        };
        self.fill_outside(&hole, tint.fade(opacity));
    }

    /// Filled and outlined cross glyph centred on `center`
    pub fn draw_cross_glyph(&mut self, center: Vec2, style: &MarkerStyle) {
        let origin = clamp_origin(center, Vec2::splat(style.size));
        let glyph = cross_glyph(origin, style.size);
        self.fill_polygons(std::slice::from_ref(&glyph), style.fill);
        if style.outline_width > 0.0 {
            self.fill_polygons(&stroke_closed(&glyph, style.outline_width), style.outline);
        }
    }

    /// Filled and outlined disc centred on `center`
    pub fn draw_disc(&mut self, center: Vec2, style: &MarkerStyle) {
        let origin = clamp_origin(center, Vec2::splat(style.size));
        let radius = style.size * 0.5;
        let outline = circle(origin + Vec2::splat(radius), radius, CIRCLE_SEGMENTS);
        self.fill_polygons(std::slice::from_ref(&outline), style.fill);
        if style.outline_width > 0.0 {
            self.fill_polygons(&stroke_closed(&outline, style.outline_width), style.outline);
        }
    }
}
