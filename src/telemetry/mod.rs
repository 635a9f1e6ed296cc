//! Telemetry wire types
//!
//! Mirrors the shape of the match telemetry feed. Nothing here interprets
//! the records; see [`crate::classify`] for that.

pub mod events;
pub mod objects;

pub use events::{
    DamageEvent, MatchEnd, MatchStart, ParachuteLanding, PlayerAttack, PlayerKill, PlayerPosition,
    TelemetryEvent, VehicleTrip, decode_events,
};
pub use objects::{Character, Common, GameState, Location, Vehicle};
