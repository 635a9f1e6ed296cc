//! Shared objects embedded in telemetry records
//!
//! Every field is defaulted: the feed routinely omits fields, and a missing
//! field on an object nobody reads must never reject the record.

use serde::{Deserialize, Serialize};

/// A point in world space, in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Scale all three axes
    pub fn scaled(self, k: f64) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

/// Game-phase marker carried on most records
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Common {
    /// 0 = lobby, 0.1 = aircraft, 0.5 = parachute, >= 1 once landed
    pub is_game: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    pub team_id: i32,
    pub health: f64,
    pub location: Location,
    pub ranking: u32,
    pub account_id: String,
    pub zone: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    pub item_id: String,
    pub stack_count: u32,
    pub category: String,
    pub sub_category: String,
    pub attached_items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vehicle {
    pub vehicle_type: String,
    pub vehicle_id: String,
    pub health_percent: f64,
    #[serde(alias = "feulPercent")]
    pub fuel_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemPackage {
    pub item_package_id: String,
    pub location: Location,
    pub items: Vec<Item>,
}

/// Snapshot of the zone state emitted every few seconds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameState {
    pub elapsed_time: f64,
    pub num_alive_teams: u32,
    pub num_join_players: u32,
    pub num_start_players: u32,
    pub num_alive_players: u32,
    pub safety_zone_position: Location,
    pub safety_zone_radius: f64,
    pub poison_gas_warning_position: Location,
    pub poison_gas_warning_radius: f64,
    pub red_zone_position: Location,
    pub red_zone_radius: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Stats {
    pub kill_count: u32,
    pub distance_on_foot: f64,
    pub distance_on_swim: f64,
    pub distance_on_vehicle: f64,
    pub distance_on_parachute: f64,
    pub distance_on_freefall: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameResult {
    pub rank: u32,
    pub game_result: String,
    pub team_id: i32,
    pub stats: Stats,
    pub account_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_tolerates_missing_fields() {
        let c: Character = serde_json::from_str(r#"{"name":"Alpha"}"#).unwrap();
        assert_eq!(c.name, "Alpha");
        assert_eq!(c.location, Location::default());
        assert_eq!(c.ranking, 0);
    }

    #[test]
    fn test_vehicle_accepts_misspelled_fuel() {
        let v: Vehicle =
            serde_json::from_str(r#"{"vehicleType":"TransportAircraft","feulPercent":42}"#)
                .unwrap();
        assert_eq!(v.vehicle_type, "TransportAircraft");
        assert_eq!(v.fuel_percent, 42.0);
    }
}
