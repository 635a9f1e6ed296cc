//! Pixel color type and the default palette

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// 8-bit RGBA pixel, straight (non-premultiplied) alpha
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Same color with alpha multiplied by `factor` (0-1)
    pub fn fade(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Composite `src` over `self` with the given coverage (0-1)
    pub fn blend(self, src: Rgba, coverage: f32) -> Rgba {
        let sa = src.a as f32 / 255.0 * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return self;
        }
        let da = self.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Rgba::TRANSPARENT;
        }

        let mix = |s: u8, d: u8| -> u8 {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };

        Rgba {
            r: mix(src.r, self.r),
            g: mix(src.g, self.g),
            b: mix(src.b, self.b),
            a: (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        }
    }
}

/// Colors for map layers
pub mod colors {
    use super::Rgba;

    pub const PLAYER_PATH: Rgba = Rgba::new(255, 0, 0, 230);
    pub const PARACHUTE_PATH: Rgba = Rgba::new(255, 255, 255, 230);
    pub const PLANE_PATH: Rgba = Rgba::new(200, 200, 200, 179);
    /// Drawn under every path so it reads on any terrain
    pub const HALO: Rgba = Rgba::new(12, 12, 12, 160);
    pub const MARKER_FILL: Rgba = Rgba::rgb(255, 221, 0);
    pub const MARKER_OUTLINE: Rgba = Rgba::rgb(0, 0, 0);
    pub const DEATH_FILL: Rgba = Rgba::rgb(230, 30, 30);
    pub const ZONE_TINT: Rgba = Rgba::rgb(235, 240, 255);
    /// Fallback background when no map image is supplied
    pub const BLANK_MAP: Rgba = Rgba::rgb(46, 64, 44);
}
