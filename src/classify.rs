//! Event classification
//!
//! A single fold over the telemetry stream that sorts records into
//! per-player buckets and collects match-wide data (placements, zones).
//! The stream is only assumed to be chronological; records for one player
//! may be interleaved with anything else, and the match-end roster may show
//! up anywhere.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Instant;

use crate::consts::{TRANSPORT_AIRCRAFT, ZONE_CHANGE_EPSILON_CM};
use crate::error::{PipelineError, Result};
use crate::map::MapName;
use crate::model::{MatchAggregate, PlayerMatchBucket, PositionSample, ZoneCircle};
use crate::telemetry::{GameState, Location, TelemetryEvent};

/// Match metadata that comes from the match record rather than telemetry
#[derive(Debug, Clone, Default)]
pub struct MatchInfo {
    /// Map name from the match record; falls back to `LogMatchStart`
    pub map_name: Option<String>,
    pub game_mode: String,
}

/// Classify a match's telemetry for the given players
pub fn classify<S: AsRef<str>>(
    events: &[TelemetryEvent],
    tracked_players: &[S],
    info: &MatchInfo,
) -> Result<MatchAggregate> {
    if events.is_empty() {
        return Err(PipelineError::NoTelemetry);
    }

    let start = Instant::now();
    let tracked: Vec<&str> = tracked_players.iter().map(AsRef::as_ref).collect();

    let acc = events
        .iter()
        .fold(Accumulator::new(&tracked), Accumulator::absorb);

    let map_name = info
        .map_name
        .clone()
        .or(acc.start_map)
        .unwrap_or_default();
    if let Err(e) = MapName::resolve(&map_name) {
        log::warn!("{e}; the match can be summarized but not drawn");
    }

    let mut buckets = acc.buckets;
    let players: Vec<PlayerMatchBucket> = tracked
        .iter()
        .filter_map(|name| buckets.remove(*name))
        .collect();

    log::debug!(
        "Classified {} events into {} player buckets, {} zone phases",
        events.len(),
        players.len(),
        acc.zones.phases.len()
    );
    log::info!(
        "Processed telemetry in {:.1}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(MatchAggregate {
        map_name,
        game_mode: info.game_mode.clone(),
        placements: acc.placements.unwrap_or_default(),
        blue_zones: acc.zones.phases,
        players,
    })
}

/// Running state of the classification fold
struct Accumulator<'a> {
    tracked: HashSet<&'a str>,
    buckets: HashMap<String, PlayerMatchBucket>,
    placements: Option<HashMap<String, u32>>,
    zones: ZoneTracker,
    start_map: Option<String>,
}

impl<'a> Accumulator<'a> {
    fn new(tracked: &[&'a str]) -> Self {
        Self {
            tracked: tracked.iter().copied().collect(),
            buckets: HashMap::new(),
            placements: None,
            zones: ZoneTracker::default(),
            start_map: None,
        }
    }

    /// Bucket for `name`, created on first use; `None` if not tracked
    fn bucket(&mut self, name: Option<&str>) -> Option<&mut PlayerMatchBucket> {
        let name = name?;
        if !self.tracked.contains(name) {
            return None;
        }
        Some(
            self.buckets
                .entry(name.to_string())
                .or_insert_with(|| PlayerMatchBucket::new(name)),
        )
    }

    fn absorb(mut self, event: &TelemetryEvent) -> Self {
        match event {
            TelemetryEvent::PlayerPosition(pos) => {
                if pos.common.is_game > 0.0 {
                    let character = pos.character.as_ref();
                    if let Some(bucket) = self.bucket(character.map(|c| c.name.as_str())) {
                        bucket.positions.push(PositionSample {
                            location: character.map(|c| c.location).unwrap_or_default(),
                            state: pos.common.is_game,
                            vehicle_type: pos
                                .vehicle
                                .as_ref()
                                .map(|v| v.vehicle_type.clone())
                                .filter(|t| !t.is_empty()),
                            elapsed_time: pos.elapsed_time,
                        });
                    }
                }
            }
            TelemetryEvent::PlayerAttack(attack) => {
                let attacker = attack.attacker.as_ref().map(|c| c.name.as_str());
                if let Some(bucket) = self.bucket(attacker) {
                    bucket.attacks.push(attack.clone());
                }
            }
            TelemetryEvent::PlayerKill(kill) => {
                if let Some(bucket) = self.bucket(kill.killer_name()) {
                    bucket.kills.push(kill.clone());
                }
                if let Some(bucket) = self.bucket(kill.victim_name()) {
                    if bucket.death.is_some() {
                        log::warn!("{} has more than one death record; keeping the last", bucket.name);
                    }
                    bucket.death = Some(kill.clone());
                }
            }
            TelemetryEvent::MatchEnd(end) => {
                if self.placements.is_some() {
                    log::warn!("Ignoring repeated match-end roster");
                } else {
                    self.placements = Some(
                        end.characters
                            .iter()
                            .map(|c| (c.name.clone(), c.ranking))
                            .collect(),
                    );
                }
            }
            TelemetryEvent::ParachuteLanding(landing) => {
                let name = landing.character.as_ref().map(|c| c.name.as_str());
                if let Some(bucket) = self.bucket(name) {
                    bucket.landing = Some(landing.clone());
                }
            }
            TelemetryEvent::VehicleLeave(trip) => {
                if trip.vehicle_type() == Some(TRANSPORT_AIRCRAFT) {
                    let name = trip.character.as_ref().map(|c| c.name.as_str());
                    if let Some(bucket) = self.bucket(name) {
                        bucket.plane_leave = Some(trip.clone());
                    }
                }
            }
            TelemetryEvent::GameStatePeriodic(periodic) => {
                self.zones.observe(&periodic.game_state);
            }
            TelemetryEvent::MatchStart(start) => {
                if !start.map_name.is_empty() {
                    self.start_map = Some(start.map_name.clone());
                }
            }
            TelemetryEvent::ArmorDestroy(_)
            | TelemetryEvent::CarePackageLand(_)
            | TelemetryEvent::CarePackageSpawn(_)
            | TelemetryEvent::Heal(_)
            | TelemetryEvent::ItemAttach(_)
            | TelemetryEvent::ItemDetach(_)
            | TelemetryEvent::ItemDrop(_)
            | TelemetryEvent::ItemEquip(_)
            | TelemetryEvent::ItemPickup(_)
            | TelemetryEvent::ItemPickupFromCarepackage(_)
            | TelemetryEvent::ItemPickupFromLootbox(_)
            | TelemetryEvent::ItemUnequip(_)
            | TelemetryEvent::ItemUse(_)
            | TelemetryEvent::MatchDefinition(_)
            | TelemetryEvent::ObjectDestroy(_)
            | TelemetryEvent::PlayerCreate(_)
            | TelemetryEvent::PlayerLogin(_)
            | TelemetryEvent::PlayerLogout(_)
            | TelemetryEvent::PlayerMakeGroggy(_)
            | TelemetryEvent::PlayerRevive(_)
            | TelemetryEvent::PlayerTakeDamage(_)
            | TelemetryEvent::RedZoneEnded(_)
            | TelemetryEvent::SwimEnd(_)
            | TelemetryEvent::SwimStart(_)
            | TelemetryEvent::VaultStart(_)
            | TelemetryEvent::VehicleDestroy(_)
            | TelemetryEvent::VehicleRide(_)
            | TelemetryEvent::WeaponFireCount(_)
            | TelemetryEvent::WheelDestroy(_)
            | TelemetryEvent::Unknown => {}
        }
        self
    }
}

/// Numbers blue-zone phases by watching the announced warning circle.
/// Every new non-empty warning circle opens the next phase.
#[derive(Debug, Default)]
struct ZoneTracker {
    phases: BTreeMap<u32, ZoneCircle>,
    current: Option<ZoneCircle>,
}

impl ZoneTracker {
    fn observe(&mut self, state: &GameState) {
        let radius = state.poison_gas_warning_radius;
        if radius <= 0.0 {
            return;
        }
        let circle = ZoneCircle {
            center: state.poison_gas_warning_position,
            radius,
        };
        let changed = match &self.current {
            Some(current) => !same_circle(current, &circle),
            None => true,
        };
        if changed {
            let phase = self.phases.len() as u32 + 1;
            log::debug!("Blue zone phase {phase}: radius {radius:.0}cm");
            self.phases.insert(phase, circle);
            self.current = Some(circle);
        }
    }
}

fn same_circle(a: &ZoneCircle, b: &ZoneCircle) -> bool {
    (a.radius - b.radius).abs() <= ZONE_CHANGE_EPSILON_CM
        && distance_2d(a.center, b.center) <= ZONE_CHANGE_EPSILON_CM
}

fn distance_2d(a: Location, b: Location) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}
