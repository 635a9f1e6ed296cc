//! CPU raster surface
//!
//! Polygons are scan converted with signed-area accumulation (the approach
//! of font-rs): every edge deposits its coverage delta into a row buffer,
//! and a running sum along each row yields antialiased coverage. All
//! polygons in one fill are normalized to the same winding, so overlapping
//! pieces of a stroke add up instead of cancelling. Large fills are
//! processed in bands of rows so scratch memory stays bounded.

use std::ops::Range;

use glam::Vec2;

use super::color::Rgba;
use crate::error::{PipelineError, Result};

/// Rows rasterized per pass
const BAND_ROWS: usize = 64;

/// A decoded RGBA image supplied by the asset loader
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Image {
    /// Wrap raw RGBA8 bytes, row-major, no padding
    pub fn from_rgba(name: &str, width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if bytes.len() != expected {
            return Err(PipelineError::AssetSize {
                name: name.to_string(),
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: bytemuck::cast_slice::<u8, Rgba>(bytes).to_vec(),
        })
    }

    /// Single-color image
    pub fn solid(width: u32, height: u32, color: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn get(&self, x: u32, y: u32) -> Rgba {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// The surface a match is composited onto
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Start from a copy of a background image
    pub fn from_image(image: &Image) -> Self {
        Self {
            width: image.width,
            height: image.height,
            pixels: image.pixels.clone(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Raw RGBA8 bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Fill the union of `polygons` with `color`
    pub fn fill_polygons(&mut self, polygons: &[Vec<Vec2>], color: Rgba) {
        let (width, height) = (self.width, self.height);
        Rasterizer::fill_bands(polygons, width, height, |mask| self.compose(mask, color));
    }

    /// Blend `color` everywhere the union of `polygons` does not cover
    pub fn fill_outside(&mut self, polygons: &[Vec<Vec2>], color: Rgba) {
        let (width, height) = (self.width, self.height);
        let mut next_row = 0;
        Rasterizer::fill_bands(polygons, width, height, |mask| {
            self.tint_rows(next_row..mask.origin_y, color);
            self.compose_inverse(mask, color);
            next_row = mask.origin_y + mask.height;
        });
        self.tint_rows(next_row..height as usize, color);
    }

    /// Blend `color` through a coverage mask
    pub(crate) fn compose(&mut self, mask: &Mask, color: Rgba) {
        for y in 0..mask.height {
            let row = (mask.origin_y + y) * self.width as usize + mask.origin_x;
            for x in 0..mask.width {
                let coverage = mask.coverage_at(x, y);
                if coverage > 0.0 {
                    let px = &mut self.pixels[row + x];
                    *px = px.blend(color, coverage);
                }
            }
        }
    }

    /// Blend `color` across the mask's rows, weighted by `1 - mask` inside
    /// its columns and fully outside them
    pub(crate) fn compose_inverse(&mut self, mask: &Mask, color: Rgba) {
        let width = self.width as usize;
        for y in mask.origin_y..mask.origin_y + mask.height {
            for x in 0..width {
                let coverage = 1.0 - mask.coverage_global(x, y);
                if coverage > 0.0 {
                    let px = &mut self.pixels[y * width + x];
                    *px = px.blend(color, coverage);
                }
            }
        }
    }

    fn tint_rows(&mut self, rows: Range<usize>, color: Rgba) {
        let width = self.width as usize;
        for px in &mut self.pixels[rows.start * width..rows.end * width] {
            *px = px.blend(color, 1.0);
        }
    }

    /// Draw `image` scaled to `size` with its top-left at `origin`.
    /// Nearest-neighbour sampling; anything past the surface edge is dropped.
    pub fn draw_image(&mut self, image: &Image, origin: Vec2, size: Vec2) {
        if image.width == 0 || image.height == 0 || size.x <= 0.0 || size.y <= 0.0 {
            return;
        }
        let x_start = origin.x.floor().max(0.0) as u32;
        let y_start = origin.y.floor().max(0.0) as u32;
        let x_end = ((origin.x + size.x).ceil().max(0.0) as u32).min(self.width);
        let y_end = ((origin.y + size.y).ceil().max(0.0) as u32).min(self.height);

        for y in y_start..y_end {
            let v = (y as f32 + 0.5 - origin.y) / size.y;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let sy = ((v * image.height as f32) as u32).min(image.height - 1);
            for x in x_start..x_end {
                let u = (x as f32 + 0.5 - origin.x) / size.x;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let sx = ((u * image.width as f32) as u32).min(image.width - 1);
                let idx = (y * self.width + x) as usize;
                self.pixels[idx] = self.pixels[idx].blend(image.get(sx, sy), 1.0);
            }
        }
    }
}

/// Coverage values for a rectangular region of a canvas
#[derive(Debug, Clone)]
pub struct Mask {
    origin_x: usize,
    origin_y: usize,
    width: usize,
    height: usize,
    coverage: Vec<f32>,
}

impl Mask {
    /// Coverage at a position relative to the mask origin
    #[inline]
    pub fn coverage_at(&self, x: usize, y: usize) -> f32 {
        self.coverage[y * self.width + x]
    }

    /// Coverage at a canvas position; zero outside the mask
    pub fn coverage_global(&self, x: usize, y: usize) -> f32 {
        if x < self.origin_x || y < self.origin_y {
            return 0.0;
        }
        let (lx, ly) = (x - self.origin_x, y - self.origin_y);
        if lx < self.width && ly < self.height {
            self.coverage_at(lx, ly)
        } else {
            0.0
        }
    }
}

/// Accumulation buffer for one band of a fill
#[derive(Debug, Clone)]
pub struct Rasterizer {
    origin: Vec2,
    width: usize,
    height: usize,
    /// Two spare columns catch edges that lie right of the region
    stride: usize,
    buffer: Vec<f32>,
}

impl Rasterizer {
    /// Rasterize polygons clipped to a `canvas_width × canvas_height` surface,
    /// top to bottom in bands of at most `BAND_ROWS` rows. `visit` sees each
    /// band's coverage in turn; it is never called when nothing lands on the
    /// surface.
    pub fn fill_bands(
        polygons: &[Vec<Vec2>],
        canvas_width: u32,
        canvas_height: u32,
        mut visit: impl FnMut(&Mask),
    ) {
        let Some((lo, hi)) = clipped_bounds(polygons, canvas_width, canvas_height) else {
            return;
        };

        let width = (hi.x - lo.x) as usize;
        let (top, bottom) = (lo.y as usize, hi.y as usize);
        let rows = BAND_ROWS.min(bottom - top);
        let stride = width + 3;

        // One buffer and one mask, reused for every band
        let mut rasterizer = Self {
            origin: lo,
            width,
            height: rows,
            stride,
            buffer: vec![0.0; stride * rows],
        };
        let mut mask = Mask {
            origin_x: lo.x as usize,
            origin_y: top,
            width,
            height: rows,
            coverage: vec![0.0; width * rows],
        };

        for band_top in (top..bottom).step_by(BAND_ROWS) {
            let height = BAND_ROWS.min(bottom - band_top);
            rasterizer.origin.y = band_top as f32;
            rasterizer.height = height;
            rasterizer.buffer[..stride * height].fill(0.0);
            for polygon in polygons {
                rasterizer.add_polygon(polygon);
            }

            mask.origin_y = band_top;
            mask.height = height;
            rasterizer.accumulate(&mut mask.coverage[..width * height]);
            visit(&mask);
        }
    }

    fn add_polygon(&mut self, polygon: &[Vec2]) {
        if polygon.len() < 3 {
            return;
        }
        let reversed = signed_area(polygon) < 0.0;
        let n = polygon.len();
        for i in 0..n {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            let (from, to) = if reversed { (b, a) } else { (a, b) };
            self.draw_line(from - self.origin, to - self.origin);
        }
    }

    /// Deposit the coverage of one edge
    fn draw_line(&mut self, from: Vec2, to: Vec2) {
        // Horizontal edges add no coverage
        if (from.y - to.y).abs() <= f32::EPSILON {
            return;
        }

        let (direction, from, to) = if from.y < to.y {
            (1.0, from, to)
        } else {
            (-1.0, to, from)
        };

        let top = from.y.max(0.0);
        let bottom = to.y.min(self.height as f32);
        if top >= bottom {
            return;
        }

        let slope = (to.x - from.x) / (to.y - from.y);
        let max_x = (self.width + 1) as f32;
        let mut x = from.x + (top - from.y) * slope;

        let y_start = top as usize;
        let y_end = (bottom.ceil() as usize).min(self.height);

        for y in y_start..y_end {
            let row = y * self.stride;
            let dy = ((y + 1) as f32).min(bottom) - (y as f32).max(top);
            let x_next = x + slope * dy;
            let d = dy * direction;

            let (x0, x1) = if x < x_next { (x, x_next) } else { (x_next, x) };
            let x0 = x0.clamp(0.0, max_x);
            let x1 = x1.clamp(0.0, max_x);

            let x0_floor = x0.floor();
            let x0i = x0_floor as usize;
            let x1_ceil = x1.ceil();
            let x1i = x1_ceil as usize;

            if x1i <= x0i + 1 {
                let xmf = 0.5 * (x0 + x1) - x0_floor;
                self.buffer[row + x0i] += d - d * xmf;
                self.buffer[row + x0i + 1] += d * xmf;
            } else {
                let s = (x1 - x0).recip();
                let x0f = x0 - x0_floor;
                let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
                let x1f = x1 - x1_ceil + 1.0;
                let am = 0.5 * s * x1f * x1f;
                self.buffer[row + x0i] += d * a0;
                if x1i == x0i + 2 {
                    self.buffer[row + x0i + 1] += d * (1.0 - a0 - am);
                } else {
                    let a1 = s * (1.5 - x0f);
                    self.buffer[row + x0i + 1] += d * (a1 - a0);
                    for xi in x0i + 2..x1i - 1 {
                        self.buffer[row + xi] += d * s;
                    }
                    let a2 = a1 + (x1i - x0i - 3) as f32 * s;
                    self.buffer[row + x1i - 1] += d * (1.0 - a2 - am);
                }
                self.buffer[row + x1i] += d * am;
            }

            x = x_next;
        }
    }

    /// Running sum along each row of the band
    fn accumulate(&self, coverage: &mut [f32]) {
        for y in 0..self.height {
            let mut acc = 0.0;
            let row = y * self.stride;
            for x in 0..self.width {
                acc += self.buffer[row + x];
                coverage[y * self.width + x] = acc.abs().min(1.0);
            }
        }
    }
}

/// Pixel-aligned bounding box of `polygons` on the surface; `None` if empty
fn clipped_bounds(
    polygons: &[Vec<Vec2>],
    canvas_width: u32,
    canvas_height: u32,
) -> Option<(Vec2, Vec2)> {
    let (min, max) = polygons.iter().flatten().fold(
        (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
        |(min, max), p| (min.min(*p), max.max(*p)),
    );
    if !min.is_finite() || !max.is_finite() {
        return None;
    }

    let lo = min.floor().max(Vec2::ZERO);
    let hi = max
        .ceil()
        .min(Vec2::new(canvas_width as f32, canvas_height as f32));
    (hi.x > lo.x && hi.y > lo.y).then_some((lo, hi))
}

/// Shoelace area; positive for clockwise polygons in y-down space
pub fn signed_area(polygon: &[Vec2]) -> f32 {
    let n = polygon.len();
    (0..n)
        .map(|i| {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            a.x * b.y - b.x * a.y
        })
        .sum::<f32>()
        * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ]
    }

    #[test]
    fn test_fill_square_is_solid() {
        let mut canvas = Canvas::new(20, 20, Rgba::rgb(0, 0, 0));
        canvas.fill_polygons(&[square(5.0, 5.0, 10.0)], Rgba::rgb(255, 0, 0));
        assert_eq!(canvas.pixel(10, 10), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(14, 14), Some(Rgba::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(4, 10), Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(canvas.pixel(15, 10), Some(Rgba::rgb(0, 0, 0)));
    }

    #[test]
    fn test_opposite_windings_do_not_cancel() {
        let mut ccw = square(2.0, 2.0, 8.0);
        ccw.reverse();
        let mut canvas = Canvas::new(16, 16, Rgba::rgb(0, 0, 0));
        canvas.fill_polygons(&[square(2.0, 2.0, 8.0), ccw], Rgba::rgb(0, 255, 0));
        assert_eq!(canvas.pixel(6, 6), Some(Rgba::rgb(0, 255, 0)));
    }

    #[test]
    fn test_polygon_past_edges_is_clipped() {
        let mut canvas = Canvas::new(10, 10, Rgba::rgb(0, 0, 0));
        canvas.fill_polygons(&[square(-20.0, -20.0, 25.0)], Rgba::rgb(0, 0, 255));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(4, 4), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::rgb(0, 0, 0)));

        let mut canvas = Canvas::new(10, 10, Rgba::rgb(0, 0, 0));
        canvas.fill_polygons(&[square(6.0, 6.0, 50.0)], Rgba::rgb(0, 0, 255));
        assert_eq!(canvas.pixel(9, 9), Some(Rgba::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(5, 9), Some(Rgba::rgb(0, 0, 0)));
    }

    #[test]
    fn test_fully_offscreen_polygon_is_ignored() {
        let mut canvas = Canvas::new(10, 10, Rgba::rgb(0, 0, 0));
        canvas.fill_polygons(&[square(50.0, 50.0, 5.0)], Rgba::rgb(255, 255, 255));
        assert!(canvas.as_bytes().chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn test_fill_spans_several_bands() {
        let mut canvas = Canvas::new(12, 200, Rgba::rgb(0, 0, 0));
        canvas.fill_polygons(&[square(2.0, 10.0, 150.0)], Rgba::rgb(255, 0, 0));
        // Rows on both sides of each band boundary
        for y in [10, 73, 74, 137, 138, 159] {
            assert_eq!(canvas.pixel(5, y), Some(Rgba::rgb(255, 0, 0)), "row {y}");
        }
        assert_eq!(canvas.pixel(5, 9), Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(canvas.pixel(5, 160), Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(canvas.pixel(1, 100), Some(Rgba::rgb(0, 0, 0)));
    }

    #[test]
    fn test_bands_reuse_one_mask_size() {
        let mut heights = Vec::new();
        Rasterizer::fill_bands(&[square(0.0, 0.0, 150.0)], 150, 150, |mask| {
            assert_eq!(mask.coverage.len(), 150 * BAND_ROWS);
            heights.push((mask.origin_y, mask.height));
        });
        assert_eq!(heights, vec![(0, 64), (64, 64), (128, 22)]);
    }

    #[test]
    fn test_fill_outside_tints_rows_around_bands() {
        let mut canvas = Canvas::new(10, 300, Rgba::rgb(0, 0, 0));
        canvas.fill_outside(&[square(2.0, 100.0, 6.0)], Rgba::rgb(255, 255, 255));
        assert_eq!(canvas.pixel(5, 103), Some(Rgba::rgb(0, 0, 0)));
        assert_eq!(canvas.pixel(0, 103), Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(canvas.pixel(5, 50), Some(Rgba::rgb(255, 255, 255)));
        assert_eq!(canvas.pixel(5, 299), Some(Rgba::rgb(255, 255, 255)));

        let mut canvas = Canvas::new(4, 4, Rgba::rgb(0, 0, 0));
        canvas.fill_outside(&[], Rgba::rgb(255, 255, 255));
        assert!(canvas.as_bytes().chunks(4).all(|px| px == [255, 255, 255, 255]));
    }

    #[test]
    fn test_image_size_is_checked() {
        assert!(Image::from_rgba("map", 2, 2, &[0; 16]).is_ok());
        assert!(matches!(
            Image::from_rgba("map", 2, 2, &[0; 15]),
            Err(PipelineError::AssetSize { expected: 16, actual: 15, .. })
        ));
    }

    #[test]
    fn test_draw_image_scales_and_clips() {
        let icon = Image::solid(2, 2, Rgba::rgb(9, 9, 9));
        let mut canvas = Canvas::new(8, 8, Rgba::rgb(0, 0, 0));
        canvas.draw_image(&icon, Vec2::new(6.0, 6.0), Vec2::new(4.0, 4.0));
        assert_eq!(canvas.pixel(6, 6), Some(Rgba::rgb(9, 9, 9)));
        assert_eq!(canvas.pixel(7, 7), Some(Rgba::rgb(9, 9, 9)));
        assert_eq!(canvas.pixel(5, 5), Some(Rgba::rgb(0, 0, 0)));
    }

    #[test]
    fn test_bytes_are_rgba_rows() {
        let canvas = Canvas::new(3, 2, Rgba::new(1, 2, 3, 4));
        let bytes = canvas.as_bytes();
        assert_eq!(bytes.len(), 3 * 2 * 4);
        assert_eq!(&bytes[..4], &[1, 2, 3, 4]);
    }
}
