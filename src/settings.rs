//! Render settings
//!
//! Stroke and marker styling for every map layer. Loadable from JSON so a
//! caller can restyle output without rebuilding.

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEATH_MARKER_SIZE, KILL_MARKER_SIZE, LANDING_MARKER_SIZE, PLANE_LEAVE_MARKER_SIZE,
};
use crate::error::{PipelineError, Result};
use crate::renderer::color::{Rgba, colors};

/// How a path is stroked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub color: Rgba,
    /// Line width in pixels
    pub width: f32,
    /// Alternating on/off lengths; empty draws a solid line
    pub dash: Vec<f32>,
    /// Extra width of the dark outline drawn under the stroke (0 = none)
    pub halo_width: f32,
    pub halo_color: Rgba,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: colors::PLAYER_PATH,
            width: 2.5,
            dash: Vec::new(),
            halo_width: 2.0,
            halo_color: colors::HALO,
        }
    }
}

/// How a point marker is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Edge length of the marker's bounding square
    pub size: f32,
    pub fill: Rgba,
    pub outline: Rgba,
    /// 0 disables the outline
    pub outline_width: f32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: LANDING_MARKER_SIZE,
            fill: colors::MARKER_FILL,
            outline: colors::MARKER_OUTLINE,
            outline_width: 1.5,
        }
    }
}

/// Styling for a whole match render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    // === Paths ===
    pub player_path: StrokeStyle,
    /// Aircraft exit to touchdown
    pub parachute_path: StrokeStyle,
    /// Flight line, extended across the map
    pub plane_path: StrokeStyle,

    // === Markers ===
    pub landing_marker: MarkerStyle,
    pub plane_leave_marker: MarkerStyle,
    pub kill_marker: MarkerStyle,
    pub death_marker: MarkerStyle,

    // === Zones ===
    /// Color laid over the area outside each blue-zone circle
    pub zone_tint: Rgba,

    // === Background ===
    /// Canvas size used when no map image is available
    pub blank_map_size: u32,
    pub blank_map_color: Rgba,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            // Paths
            player_path: StrokeStyle::default(),
            parachute_path: StrokeStyle {
                color: colors::PARACHUTE_PATH,
                width: 2.0,
                dash: vec![2.5],
                ..Default::default()
            },
            plane_path: StrokeStyle {
                color: colors::PLANE_PATH,
                width: 2.0,
                dash: vec![8.0, 6.0],
                ..Default::default()
            },

            // Markers
            landing_marker: MarkerStyle::default(),
            plane_leave_marker: MarkerStyle {
                size: PLANE_LEAVE_MARKER_SIZE,
                fill: colors::PARACHUTE_PATH,
                ..Default::default()
            },
            kill_marker: MarkerStyle {
                size: KILL_MARKER_SIZE,
                outline_width: 1.0,
                ..Default::default()
            },
            death_marker: MarkerStyle {
                size: DEATH_MARKER_SIZE,
                fill: colors::DEATH_FILL,
                ..Default::default()
            },

            // Zones
            zone_tint: colors::ZONE_TINT,

            // Background
            blank_map_size: 1024,
            blank_map_color: colors::BLANK_MAP,
        }
    }
}

impl RenderSettings {
    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| PipelineError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        log::info!("Loaded render settings");
        Ok(settings)
    }

    /// Reject styles the rasterizer cannot draw
    pub fn validate(&self) -> Result<()> {
        let strokes = [
            ("player_path", &self.player_path),
            ("parachute_path", &self.parachute_path),
            ("plane_path", &self.plane_path),
        ];
        for (name, style) in strokes {
            if !(style.width > 0.0) {
                return Err(PipelineError::InvalidSettings(format!(
                    "{name}.width must be positive, got {}",
                    style.width
                )));
            }
            if style.halo_width < 0.0 {
                return Err(PipelineError::InvalidSettings(format!(
                    "{name}.halo_width must not be negative"
                )));
            }
            if style.dash.iter().any(|d| !(*d >= 0.0)) {
                return Err(PipelineError::InvalidSettings(format!(
                    "{name}.dash entries must not be negative"
                )));
            }
        }

        let markers = [
            ("landing_marker", &self.landing_marker),
            ("plane_leave_marker", &self.plane_leave_marker),
            ("kill_marker", &self.kill_marker),
            ("death_marker", &self.death_marker),
        ];
        for (name, style) in markers {
            if !(style.size > 0.0) {
                return Err(PipelineError::InvalidSettings(format!(
                    "{name}.size must be positive, got {}",
                    style.size
                )));
            }
            if style.outline_width < 0.0 {
                return Err(PipelineError::InvalidSettings(format!(
                    "{name}.outline_width must not be negative"
                )));
            }
        }

        if self.blank_map_size == 0 {
            return Err(PipelineError::InvalidSettings(
                "blank_map_size must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
