//! Draw plan for one match
//!
//! Each layer of the map is turned into projected, ready-to-paint commands
//! before anything touches pixels. The list order is the paint order.

use glam::Vec2;
use serde::Serialize;

use super::clip::plane_line;
use crate::map::{MapProjection, world_to_pixel};
use crate::model::{MatchAggregate, PlayerMatchBucket};

/// Which stroke style a path uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PathKind {
    Parachute,
    Player,
    Plane,
}

/// Which marker style (or icon) a point uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MarkerKind {
    Landing,
    PlaneLeave,
    Kill,
    Death,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Map image, or the blank fallback
    Background,
    /// Tint outside one blue-zone circle
    ZoneMask {
        phase: u32,
        center: Vec2,
        radius: f32,
        opacity: f32,
    },
    Path {
        kind: PathKind,
        player: String,
        points: Vec<Vec2>,
    },
    Marker {
        kind: MarkerKind,
        player: String,
        center: Vec2,
    },
}

/// Ordered draw commands in pixel space
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Paths of one kind, in paint order
    pub fn paths(&self, kind: PathKind) -> impl Iterator<Item = (&str, &[Vec2])> {
        self.commands.iter().filter_map(move |command| match command {
            DrawCommand::Path {
                kind: k,
                player,
                points,
            } if *k == kind => Some((player.as_str(), points.as_slice())),
            _ => None,
        })
    }

    /// Marker positions of one kind, in paint order
    pub fn markers(&self, kind: MarkerKind) -> impl Iterator<Item = Vec2> + '_ {
        self.commands.iter().filter_map(move |command| match command {
            DrawCommand::Marker { kind: k, center, .. } if *k == kind => Some(*center),
            _ => None,
        })
    }

    fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn background(&mut self) {
        self.push(DrawCommand::Background);
    }

    fn path(&mut self, kind: PathKind, player: &str, points: Vec<Vec2>) {
        if points.len() < 2 {
            log::debug!("Skipping {kind:?} path for {player}: {} point(s)", points.len());
            return;
        }
        self.push(DrawCommand::Path {
            kind,
            player: player.to_string(),
            points,
        });
    }

    fn marker(&mut self, kind: MarkerKind, player: &str, center: Vec2) {
        self.push(DrawCommand::Marker {
            kind,
            player: player.to_string(),
            center,
        });
    }

    /// One mask per phase, outermost first
    pub fn zones(&mut self, aggregate: &MatchAggregate, projection: &MapProjection) {
        let ratio = projection.pixel_ratio();
        for (&phase, circle) in &aggregate.blue_zones {
            self.push(DrawCommand::ZoneMask {
                phase,
                center: world_to_pixel(&circle.center, projection).to_vec2(),
                radius: (circle.radius * ratio) as f32,
                opacity: zone_opacity(phase),
            });
        }
    }

    /// Touchdown points, plus where each player left the aircraft
    pub fn landing_markers(&mut self, players: &[PlayerMatchBucket], projection: &MapProjection) {
        for bucket in players {
            if let Some(location) = bucket.plane_leave_location() {
                let center = world_to_pixel(&location, projection).to_vec2();
                self.marker(MarkerKind::PlaneLeave, &bucket.name, center);
            }
            match bucket.landing_location() {
                Some(location) => {
                    let center = world_to_pixel(&location, projection).to_vec2();
                    self.marker(MarkerKind::Landing, &bucket.name, center);
                }
                None => log::debug!("No landing recorded for {}", bucket.name),
            }
        }
    }

    /// Aircraft exit through the descent samples to the first landed sample.
    /// Needs both ends.
    pub fn parachute_path(&mut self, bucket: &PlayerMatchBucket, projection: &MapProjection) {
        let (Some(leave), Some(touchdown)) =
            (bucket.plane_leave_location(), bucket.landed_positions().next())
        else {
            log::debug!("Incomplete descent for {}, skipping parachute path", bucket.name);
            return;
        };

        let points = std::iter::once(world_to_pixel(&leave, projection).to_vec2())
            .chain(
                bucket
                    .descent_positions()
                    .map(|p| world_to_pixel(p, projection).to_vec2()),
            )
            .chain(std::iter::once(world_to_pixel(touchdown, projection).to_vec2()))
            .collect();
        self.path(PathKind::Parachute, &bucket.name, points);
    }

    /// Everything after touchdown
    pub fn player_path(&mut self, bucket: &PlayerMatchBucket, projection: &MapProjection) {
        let points = bucket
            .landed_positions()
            .map(|p| world_to_pixel(p, projection).to_vec2())
            .collect();
        self.path(PathKind::Player, &bucket.name, points);
    }

    /// Flight line across the map from this player's aircraft samples
    pub fn plane_path(&mut self, bucket: &PlayerMatchBucket, projection: &MapProjection) {
        let samples: Vec<Vec2> = bucket
            .aircraft_positions()
            .map(|p| world_to_pixel(p, projection).to_vec2())
            .collect();
        if let Some([entry, exit]) = plane_line(&samples, projection.bounds()) {
            self.path(PathKind::Plane, &bucket.name, vec![entry, exit]);
        }
    }

    /// An X at every victim location
    pub fn kill_markers(&mut self, players: &[PlayerMatchBucket], projection: &MapProjection) {
        for bucket in players {
            for kill in &bucket.kills {
                match kill.victim_location() {
                    Some(location) => {
                        let center = world_to_pixel(&location, projection).to_vec2();
                        self.marker(MarkerKind::Kill, &bucket.name, center);
                    }
                    None => log::debug!("Kill by {} has no victim location", bucket.name),
                }
            }
        }
    }

    /// Where each tracked player died.
    ///
    /// Zone and self-inflicted deaths report a victim location that does not
    /// match the path, so those use the last landed sample instead.
    pub fn death_markers(&mut self, players: &[PlayerMatchBucket], projection: &MapProjection) {
        for bucket in players {
            let (Some(kill), Some(cause)) = (&bucket.death, bucket.death_cause()) else {
                continue;
            };

            let last_known = bucket
                .landed_positions()
                .last()
                .or_else(|| bucket.positions.last())
                .map(|p| world_to_pixel(p, projection).to_vec2());
            let reported = kill
                .victim_location()
                .map(|location| world_to_pixel(&location, projection).to_vec2());

            let center = if cause.uses_last_known_position() {
                last_known.or(reported)
            } else {
                reported.or(last_known)
            };

            match center {
                Some(center) => self.marker(MarkerKind::Death, &bucket.name, center),
                None => log::debug!("No usable death location for {}", bucket.name),
            }
        }
    }
}

/// Tint opacity for a zone phase; later, smaller circles get lighter
pub fn zone_opacity(phase: u32) -> f32 {
    (1.0 / phase.max(1) as f32).powf(1.5) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::TRANSPORT_AIRCRAFT;
    use crate::map::MapName;
    use crate::model::{PositionSample, ZoneCircle};
    use crate::telemetry::{Character, Location, PlayerKill, VehicleTrip};

    fn projection() -> MapProjection {
        // 1 px per 1000 world units
        MapProjection::new(MapName::Erangel, 816, 816)
    }

    fn sample(x: f64, y: f64, state: f64, vehicle: Option<&str>) -> PositionSample {
        PositionSample {
            location: Location::new(x, y, 0.0),
            state,
            vehicle_type: vehicle.map(str::to_string),
            elapsed_time: 0.0,
        }
    }

    fn at(name: &str, x: f64, y: f64) -> Character {
        Character {
            name: name.to_string(),
            location: Location::new(x, y, 0.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_zone_opacity_decreases() {
        assert!((zone_opacity(1) - 1.0 / 3.0).abs() < 1e-6);
        assert!((1..9).all(|p| zone_opacity(p + 1) < zone_opacity(p)));
    }

    #[test]
    fn test_zone_masks_are_projected() {
        let mut aggregate = MatchAggregate {
            map_name: "Erangel".to_string(),
            game_mode: String::new(),
            placements: Default::default(),
            blue_zones: Default::default(),
            players: Vec::new(),
        };
        aggregate.blue_zones.insert(
            1,
            ZoneCircle {
                center: Location::new(408_000.0, 204_000.0, 0.0),
                radius: 100_000.0,
            },
        );
        let mut list = DisplayList::default();
        list.zones(&aggregate, &projection());
        assert_eq!(
            list.commands(),
            &[DrawCommand::ZoneMask {
                phase: 1,
                center: Vec2::new(408.0, 204.0),
                radius: 100.0,
                opacity: zone_opacity(1),
            }]
        );
    }

    #[test]
    fn test_parachute_path_runs_from_exit_to_touchdown() {
        let mut bucket = PlayerMatchBucket::new("alice");
        bucket.plane_leave = Some(VehicleTrip {
            character: Some(at("alice", 10_000.0, 10_000.0)),
            ..Default::default()
        });
        bucket.positions = vec![
            sample(0.0, 0.0, 0.1, Some(TRANSPORT_AIRCRAFT)),
            sample(20_000.0, 20_000.0, 0.5, None),
            sample(30_000.0, 30_000.0, 0.5, None),
            sample(40_000.0, 40_000.0, 1.0, None),
            sample(50_000.0, 50_000.0, 1.0, None),
        ];
        let mut list = DisplayList::default();
        list.parachute_path(&bucket, &projection());
        let (_, points) = list.paths(PathKind::Parachute).next().unwrap();
        assert_eq!(
            points,
            &[
                Vec2::new(10.0, 10.0),
                Vec2::new(20.0, 20.0),
                Vec2::new(30.0, 30.0),
                Vec2::new(40.0, 40.0)
            ]
        );
    }

    #[test]
    fn test_parachute_path_needs_aircraft_exit() {
        let mut bucket = PlayerMatchBucket::new("alice");
        bucket.positions = vec![sample(0.0, 0.0, 1.0, None), sample(1.0, 1.0, 1.0, None)];
        let mut list = DisplayList::default();
        list.parachute_path(&bucket, &projection());
        assert!(list.is_empty());
    }

    #[test]
    fn test_plane_path_spans_the_map() {
        let mut bucket = PlayerMatchBucket::new("alice");
        bucket.positions = vec![
            sample(100_000.0, 100_000.0, 0.1, Some(TRANSPORT_AIRCRAFT)),
            sample(200_000.0, 150_000.0, 0.1, Some(TRANSPORT_AIRCRAFT)),
        ];
        let mut list = DisplayList::default();
        list.plane_path(&bucket, &projection());
        let (_, points) = list.paths(PathKind::Plane).next().unwrap();
        assert_eq!(points, &[Vec2::new(0.0, 50.0), Vec2::new(816.0, 458.0)]);
    }

    #[test]
    fn test_vertical_plane_path_is_skipped() {
        let mut bucket = PlayerMatchBucket::new("alice");
        bucket.positions = vec![
            sample(100_000.0, 100_000.0, 0.1, Some(TRANSPORT_AIRCRAFT)),
            sample(100_000.0, 300_000.0, 0.1, Some(TRANSPORT_AIRCRAFT)),
        ];
        let mut list = DisplayList::default();
        list.plane_path(&bucket, &projection());
        assert!(list.is_empty());
    }

    #[test]
    fn test_death_marker_placement() {
        let mut zone_victim = PlayerMatchBucket::new("alice");
        zone_victim.positions = vec![sample(5_000.0, 5_000.0, 1.0, None), sample(7_000.0, 9_000.0, 1.0, None)];
        zone_victim.death = Some(PlayerKill {
            victim: Some(at("alice", 300_000.0, 300_000.0)),
            damage_type_category: "Damage_BlueZone".to_string(),
            ..Default::default()
        });

        let mut shot = PlayerMatchBucket::new("bob");
        shot.positions = vec![sample(5_000.0, 5_000.0, 1.0, None)];
        shot.death = Some(PlayerKill {
            killer: Some(at("carol", 0.0, 0.0)),
            victim: Some(at("bob", 60_000.0, 70_000.0)),
            ..Default::default()
        });

        let mut list = DisplayList::default();
        list.death_markers(&[zone_victim, shot], &projection());
        let markers: Vec<Vec2> = list.markers(MarkerKind::Death).collect();
        assert_eq!(markers, vec![Vec2::new(7.0, 9.0), Vec2::new(60.0, 70.0)]);
    }

    #[test]
    fn test_self_kill_uses_last_position() {
        let mut bucket = PlayerMatchBucket::new("alice");
        bucket.positions = vec![sample(12_000.0, 3_000.0, 1.0, None)];
        bucket.death = Some(PlayerKill {
            killer: Some(at("alice", 0.0, 0.0)),
            victim: Some(at("alice", 500_000.0, 500_000.0)),
            ..Default::default()
        });
        let mut list = DisplayList::default();
        list.death_markers(&[bucket], &projection());
        assert_eq!(list.markers(MarkerKind::Death).collect::<Vec<_>>(), vec![Vec2::new(12.0, 3.0)]);
    }

    #[test]
    fn test_kill_markers_at_victims() {
        let mut bucket = PlayerMatchBucket::new("alice");
        bucket.kills = vec![
            PlayerKill {
                killer: Some(at("alice", 0.0, 0.0)),
                victim: Some(at("bob", 1_000.0, 2_000.0)),
                ..Default::default()
            },
            PlayerKill {
                killer: Some(at("alice", 0.0, 0.0)),
                victim: None,
                ..Default::default()
            },
        ];
        let mut list = DisplayList::default();
        list.kill_markers(&[bucket], &projection());
        assert_eq!(list.markers(MarkerKind::Kill).collect::<Vec<_>>(), vec![Vec2::new(1.0, 2.0)]);
    }
}
