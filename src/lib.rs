//! Drop Trace - match telemetry aggregation and map rendering
//!
//! Core modules:
//! - `telemetry`: Wire types for the match telemetry feed
//! - `classify`: Single-pass sorting of events into per-player buckets
//! - `model`: Per-match data model (buckets, placements, zone phases)
//! - `map`: Map catalogue and the world → pixel transform
//! - `renderer`: CPU raster surface and the layered map composite
//! - `summary`: Structured per-player results for report formatting
//! - `settings`: Stroke and marker styling

pub mod classify;
pub mod error;
pub mod map;
pub mod model;
pub mod renderer;
pub mod settings;
pub mod summary;
pub mod telemetry;

pub use classify::{MatchInfo, classify};
pub use error::{PipelineError, Result};
pub use map::{MapName, MapProjection, PixelPoint, world_to_pixel};
pub use model::{MatchAggregate, Placement, PlayerMatchBucket};
pub use renderer::{Canvas, MapAssets, MatchRenderer};
pub use settings::RenderSettings;
pub use summary::PlayerSummary;
pub use telemetry::{TelemetryEvent, decode_events};

/// Fixed constants of the telemetry feed
pub mod consts {
    /// World units per kilometer. Slightly more than 100 000 to line up
    /// telemetry coordinates with the published map images.
    pub const CM_PER_KM: f64 = 102_000.0;

    /// Vehicle type of the aircraft players jump from
    pub const TRANSPORT_AIRCRAFT: &str = "TransportAircraft";

    /// `common.isGame` from which a player counts as landed
    pub const LANDED_STATE: f64 = 1.0;

    /// Damage category and causer reported for blue zone deaths
    pub const ZONE_DAMAGE_CATEGORY: &str = "Damage_BlueZone";
    pub const ZONE_DAMAGE_CAUSER: &str = "BlueZone";

    /// Warning circles closer than this are the same phase
    pub const ZONE_CHANGE_EPSILON_CM: f64 = 1.0;

    /// Segments used to approximate a circle outline
    pub const CIRCLE_SEGMENTS: u32 = 48;

    /// Default marker sizes, in pixels
    pub const LANDING_MARKER_SIZE: f32 = 8.0;
    pub const PLANE_LEAVE_MARKER_SIZE: f32 = 8.0;
    pub const KILL_MARKER_SIZE: f32 = 9.0;
    pub const DEATH_MARKER_SIZE: f32 = 16.0;
}
