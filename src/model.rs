//! Per-match data model
//!
//! Everything the classifier produces. Built once per match, read by the
//! renderer and the summary builder, never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::consts::{LANDED_STATE, TRANSPORT_AIRCRAFT, ZONE_DAMAGE_CATEGORY, ZONE_DAMAGE_CAUSER};
use crate::error::Result;
use crate::map::{MapName, WorldPoint};
use crate::telemetry::{Location, ParachuteLanding, PlayerAttack, PlayerKill, VehicleTrip};

/// One position sample, reduced to what the renderer needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub location: Location,
    /// `common.isGame` when the sample was taken
    pub state: f64,
    /// Vehicle the player was in, if any
    pub vehicle_type: Option<String>,
    pub elapsed_time: f64,
}

impl PositionSample {
    pub fn in_aircraft(&self) -> bool {
        self.vehicle_type.as_deref() == Some(TRANSPORT_AIRCRAFT)
    }

    /// On the ground (or in a ground vehicle)
    pub fn is_landed(&self) -> bool {
        !self.in_aircraft() && self.state >= LANDED_STATE
    }

    /// Left the aircraft but not yet on the ground
    pub fn is_descending(&self) -> bool {
        !self.in_aircraft() && self.state < LANDED_STATE
    }
}

impl WorldPoint for PositionSample {
    fn location(&self) -> Location {
        self.location
    }

    fn state(&self) -> Option<f64> {
        Some(self.state)
    }

    fn vehicle_type(&self) -> Option<&str> {
        self.vehicle_type.as_deref()
    }
}

/// All records attributed to one tracked player
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerMatchBucket {
    pub name: String,
    /// Kills caused by this player, in match order
    pub kills: Vec<PlayerKill>,
    /// The kill record naming this player as victim
    pub death: Option<PlayerKill>,
    pub attacks: Vec<PlayerAttack>,
    pub positions: Vec<PositionSample>,
    pub landing: Option<ParachuteLanding>,
    /// Leaving the transport aircraft
    pub plane_leave: Option<VehicleTrip>,
}

impl PlayerMatchBucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn landed_positions(&self) -> impl Iterator<Item = &PositionSample> {
        self.positions.iter().filter(|p| p.is_landed())
    }

    pub fn descent_positions(&self) -> impl Iterator<Item = &PositionSample> {
        self.positions.iter().filter(|p| p.is_descending())
    }

    pub fn aircraft_positions(&self) -> impl Iterator<Item = &PositionSample> {
        self.positions.iter().filter(|p| p.in_aircraft())
    }

    pub fn landing_location(&self) -> Option<Location> {
        self.landing
            .as_ref()
            .and_then(|l| l.character.as_ref())
            .map(|c| c.location)
    }

    pub fn plane_leave_location(&self) -> Option<Location> {
        self.plane_leave
            .as_ref()
            .and_then(|l| l.character.as_ref())
            .map(|c| c.location)
    }

    /// Why this player died, if they did
    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death.as_ref().map(|kill| DeathCause::of(kill, &self.name))
    }
}

/// How a death came about, as far as marker placement cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Killed by the blue zone
    Zone,
    /// Killer is the victim (grenade, fall, vehicle crash, ...)
    SelfInflicted,
    /// Killed by another player
    Player,
    /// No killer recorded and not zone damage
    Unknown,
}

impl DeathCause {
    pub fn of(kill: &PlayerKill, victim: &str) -> Self {
        if is_zone_damage(kill) {
            DeathCause::Zone
        } else {
            match kill.killer_name() {
                Some(killer) if killer == victim => DeathCause::SelfInflicted,
                Some(killer) if !killer.is_empty() => DeathCause::Player,
                _ => DeathCause::Unknown,
            }
        }
    }

    /// Reported victim location is unreliable for these causes
    pub fn uses_last_known_position(&self) -> bool {
        matches!(self, DeathCause::Zone | DeathCause::SelfInflicted)
    }
}

/// True if the kill record names blue zone damage
pub fn is_zone_damage(kill: &PlayerKill) -> bool {
    kill.damage_type_category == ZONE_DAMAGE_CATEGORY || kill.damage_causer_name == ZONE_DAMAGE_CAUSER
}

/// Final placement of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Ranked(u32),
    Unknown,
}

impl Placement {
    pub fn rank(&self) -> Option<u32> {
        match self {
            Placement::Ranked(rank) => Some(*rank),
            Placement::Unknown => None,
        }
    }
}

/// One blue-zone phase circle, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneCircle {
    pub center: Location,
    pub radius: f64,
}

/// Everything known about one match after classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAggregate {
    /// Map name as reported (display or internal asset name). Resolved
    /// only when drawing, so unsupported maps still classify.
    pub map_name: String,
    pub game_mode: String,
    /// Player name → final rank; empty when the match-end record was missing
    pub placements: HashMap<String, u32>,
    /// Phase number (1-based) → warning circle announced for that phase
    pub blue_zones: BTreeMap<u32, ZoneCircle>,
    /// Buckets for tracked players that appeared in the telemetry,
    /// in the order the players were listed
    pub players: Vec<PlayerMatchBucket>,
}

impl MatchAggregate {
    /// The supported map this match was played on
    pub fn map(&self) -> Result<MapName> {
        MapName::resolve(&self.map_name)
    }

    pub fn placement(&self, name: &str) -> Placement {
        self.placements
            .get(name)
            .map(|rank| Placement::Ranked(*rank))
            .unwrap_or(Placement::Unknown)
    }

    pub fn player(&self, name: &str) -> Option<&PlayerMatchBucket> {
        self.players.iter().find(|p| p.name == name)
    }

    /// True if at least one tracked player has a position sample
    pub fn has_positions(&self) -> bool {
        self.players.iter().any(|p| !p.positions.is_empty())
    }
}
