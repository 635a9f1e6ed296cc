//! Map catalogue and the world → pixel transform

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::CM_PER_KM;
use crate::error::{PipelineError, Result};
use crate::telemetry::Location;

/// The maps the renderer knows the physical size of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapName {
    Erangel,
    Miramar,
    Sanhok,
    Vikendi,
}

impl MapName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapName::Erangel => "Erangel",
            MapName::Miramar => "Miramar",
            MapName::Sanhok => "Sanhok",
            MapName::Vikendi => "Vikendi",
        }
    }

    /// Edge length of the playable square in kilometers
    pub fn diameter_km(&self) -> f64 {
        match self {
            MapName::Erangel => 8.0,
            MapName::Miramar => 8.0,
            MapName::Sanhok => 4.0,
            MapName::Vikendi => 6.0,
        }
    }

    /// Resolve a display name or an internal asset name (`Savage_Main`, ...)
    pub fn resolve(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "erangel" | "erangel_main" | "baltic_main" => Ok(MapName::Erangel),
            "miramar" | "desert_main" => Ok(MapName::Miramar),
            "sanhok" | "savage_main" => Ok(MapName::Sanhok),
            "vikendi" | "dihorotok_main" => Ok(MapName::Vikendi),
            _ => Err(PipelineError::UnsupportedMap(name.to_string())),
        }
    }
}

impl FromStr for MapName {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}

impl fmt::Display for MapName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel geometry of one map image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapProjection {
    pub map: MapName,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub diameter_km: f64,
}

impl MapProjection {
    pub fn new(map: MapName, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            map,
            pixel_width,
            pixel_height,
            diameter_km: map.diameter_km(),
        }
    }

    /// Pixels per world centimeter
    #[inline]
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_width as f64 / (CM_PER_KM * self.diameter_km)
    }

    /// Largest addressable pixel coordinate on each axis
    pub fn bounds(&self) -> Vec2 {
        Vec2::new(self.pixel_width as f32, self.pixel_height as f32)
    }
}

/// Anything with a world position that can be projected, plus optional tags
pub trait WorldPoint {
    fn location(&self) -> Location;

    /// `common.isGame` at the time of the sample, if known
    fn state(&self) -> Option<f64> {
        None
    }

    fn vehicle_type(&self) -> Option<&str> {
        None
    }
}

impl WorldPoint for Location {
    fn location(&self) -> Location {
        *self
    }
}

/// A projected point. Coordinates may be negative or past the image edge;
/// clamping happens when drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
    pub z: f64,
    pub state: Option<f64>,
    pub vehicle_type: Option<String>,
}

impl PixelPoint {
    #[inline]
    pub fn to_vec2(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Project a world point onto the map image.
///
/// Rounds half away from zero and carries the point's tags through.
pub fn world_to_pixel<P: WorldPoint + ?Sized>(point: &P, projection: &MapProjection) -> PixelPoint {
    let ratio = projection.pixel_ratio();
    let loc = point.location();
    PixelPoint {
        x: (loc.x * ratio).round() as i64,
        y: (loc.y * ratio).round() as i64,
        z: loc.z,
        state: point.state(),
        vehicle_type: point.vehicle_type().map(str::to_string),
    }
}
