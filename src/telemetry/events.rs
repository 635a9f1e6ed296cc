//! Telemetry event records
//!
//! One variant per `_T` tag. Payload structs are shared between tags that
//! carry the same shape (e.g. every item pickup/drop/equip record).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::objects::{Character, Common, GameResult, GameState, Item, ItemPackage, Location, Vehicle};
use crate::error::Result;

/// A single telemetry record, discriminated by its `_T` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_T")]
pub enum TelemetryEvent {
    #[serde(rename = "LogArmorDestroy")]
    ArmorDestroy(DamageEvent),
    #[serde(rename = "LogCarePackageLand")]
    CarePackageLand(CarePackage),
    #[serde(rename = "LogCarePackageSpawn")]
    CarePackageSpawn(CarePackage),
    #[serde(rename = "LogGameStatePeriodic")]
    GameStatePeriodic(GameStatePeriodic),
    #[serde(rename = "LogHeal")]
    Heal(Heal),
    #[serde(rename = "LogItemAttach")]
    ItemAttach(ItemAttachment),
    #[serde(rename = "LogItemDetach")]
    ItemDetach(ItemAttachment),
    #[serde(rename = "LogItemDrop")]
    ItemDrop(ItemAction),
    #[serde(rename = "LogItemEquip")]
    ItemEquip(ItemAction),
    #[serde(rename = "LogItemPickup")]
    ItemPickup(ItemAction),
    #[serde(rename = "LogItemPickupFromCarepackage")]
    ItemPickupFromCarepackage(ItemAction),
    #[serde(rename = "LogItemPickupFromLootbox")]
    ItemPickupFromLootbox(ItemAction),
    #[serde(rename = "LogItemUnequip")]
    ItemUnequip(ItemAction),
    #[serde(rename = "LogItemUse")]
    ItemUse(ItemAction),
    #[serde(rename = "LogMatchDefinition")]
    MatchDefinition(MatchDefinition),
    #[serde(rename = "LogMatchEnd")]
    MatchEnd(MatchEnd),
    #[serde(rename = "LogMatchStart")]
    MatchStart(MatchStart),
    #[serde(rename = "LogObjectDestroy")]
    ObjectDestroy(ObjectDestroy),
    #[serde(rename = "LogParachuteLanding")]
    ParachuteLanding(ParachuteLanding),
    #[serde(rename = "LogPlayerAttack")]
    PlayerAttack(PlayerAttack),
    #[serde(rename = "LogPlayerCreate")]
    PlayerCreate(CharacterAction),
    #[serde(rename = "LogPlayerKill")]
    PlayerKill(PlayerKill),
    #[serde(rename = "LogPlayerLogin")]
    PlayerLogin(AccountEvent),
    #[serde(rename = "LogPlayerLogout")]
    PlayerLogout(AccountEvent),
    #[serde(rename = "LogPlayerMakeGroggy")]
    PlayerMakeGroggy(DamageEvent),
    #[serde(rename = "LogPlayerPosition")]
    PlayerPosition(PlayerPosition),
    #[serde(rename = "LogPlayerRevive")]
    PlayerRevive(PlayerRevive),
    #[serde(rename = "LogPlayerTakeDamage")]
    PlayerTakeDamage(DamageEvent),
    #[serde(rename = "LogRedZoneEnded")]
    RedZoneEnded(RedZoneEnded),
    #[serde(rename = "LogSwimEnd")]
    SwimEnd(SwimEnd),
    #[serde(rename = "LogSwimStart")]
    SwimStart(CharacterAction),
    #[serde(rename = "LogVaultStart")]
    VaultStart(CharacterAction),
    #[serde(rename = "LogVehicleDestroy")]
    VehicleDestroy(VehicleDamage),
    #[serde(rename = "LogVehicleLeave")]
    VehicleLeave(VehicleTrip),
    #[serde(rename = "LogVehicleRide")]
    VehicleRide(VehicleTrip),
    #[serde(rename = "LogWeaponFireCount")]
    WeaponFireCount(WeaponFireCount),
    #[serde(rename = "LogWheelDestroy")]
    WheelDestroy(VehicleDamage),
    /// Any tag this crate does not model, or a record that failed to decode
    #[serde(other)]
    Unknown,
}

impl TelemetryEvent {
    /// Wire tag of this record
    pub fn tag(&self) -> &'static str {
        match self {
            Self::ArmorDestroy(_) => "LogArmorDestroy",
            Self::CarePackageLand(_) => "LogCarePackageLand",
            Self::CarePackageSpawn(_) => "LogCarePackageSpawn",
            Self::GameStatePeriodic(_) => "LogGameStatePeriodic",
            Self::Heal(_) => "LogHeal",
            Self::ItemAttach(_) => "LogItemAttach",
            Self::ItemDetach(_) => "LogItemDetach",
            Self::ItemDrop(_) => "LogItemDrop",
            Self::ItemEquip(_) => "LogItemEquip",
            Self::ItemPickup(_) => "LogItemPickup",
            Self::ItemPickupFromCarepackage(_) => "LogItemPickupFromCarepackage",
            Self::ItemPickupFromLootbox(_) => "LogItemPickupFromLootbox",
            Self::ItemUnequip(_) => "LogItemUnequip",
            Self::ItemUse(_) => "LogItemUse",
            Self::MatchDefinition(_) => "LogMatchDefinition",
            Self::MatchEnd(_) => "LogMatchEnd",
            Self::MatchStart(_) => "LogMatchStart",
            Self::ObjectDestroy(_) => "LogObjectDestroy",
            Self::ParachuteLanding(_) => "LogParachuteLanding",
            Self::PlayerAttack(_) => "LogPlayerAttack",
            Self::PlayerCreate(_) => "LogPlayerCreate",
            Self::PlayerKill(_) => "LogPlayerKill",
            Self::PlayerLogin(_) => "LogPlayerLogin",
            Self::PlayerLogout(_) => "LogPlayerLogout",
            Self::PlayerMakeGroggy(_) => "LogPlayerMakeGroggy",
            Self::PlayerPosition(_) => "LogPlayerPosition",
            Self::PlayerRevive(_) => "LogPlayerRevive",
            Self::PlayerTakeDamage(_) => "LogPlayerTakeDamage",
            Self::RedZoneEnded(_) => "LogRedZoneEnded",
            Self::SwimEnd(_) => "LogSwimEnd",
            Self::SwimStart(_) => "LogSwimStart",
            Self::VaultStart(_) => "LogVaultStart",
            Self::VehicleDestroy(_) => "LogVehicleDestroy",
            Self::VehicleLeave(_) => "LogVehicleLeave",
            Self::VehicleRide(_) => "LogVehicleRide",
            Self::WeaponFireCount(_) => "LogWeaponFireCount",
            Self::WheelDestroy(_) => "LogWheelDestroy",
            Self::Unknown => "Unknown",
        }
    }
}

/// Records that only name the acting character
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterAction {
    pub character: Option<Character>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AccountEvent {
    pub account_id: String,
}

/// Shared shape of armor-destroy, knock-down and take-damage records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DamageEvent {
    pub attack_id: i64,
    pub attacker: Option<Character>,
    pub victim: Option<Character>,
    pub damage_type_category: String,
    pub damage_reason: String,
    pub damage_causer_name: String,
    pub damage: f64,
    pub distance: f64,
    pub item: Option<Item>,
    pub is_attacker_in_vehicle: bool,
    #[serde(rename = "dBNOId")]
    pub dbno_id: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarePackage {
    pub item_package: Option<ItemPackage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameStatePeriodic {
    pub game_state: GameState,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Heal {
    pub character: Option<Character>,
    pub item: Option<Item>,
    pub heal_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemAttachment {
    pub character: Option<Character>,
    pub parent_item: Option<Item>,
    pub child_item: Option<Item>,
}

/// Pickup, drop, equip, unequip and use records
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ItemAction {
    pub character: Option<Character>,
    pub item: Option<Item>,
    /// Only present on lootbox pickups
    pub owner_team_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchDefinition {
    #[serde(rename = "MatchId")]
    pub match_id: String,
    #[serde(rename = "PingQuality")]
    pub ping_quality: String,
    #[serde(rename = "SeasonState")]
    pub season_state: String,
}

/// Final roster; each character carries its placement in `ranking`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchEnd {
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchStart {
    pub map_name: String,
    pub weather_id: String,
    pub characters: Vec<Character>,
    pub camera_view_behaviour: String,
    pub team_size: u32,
    pub is_custom_game: bool,
    pub is_event_mode: bool,
    pub blue_zone_custom_options: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectDestroy {
    pub character: Option<Character>,
    pub object_type: String,
    pub object_location: Location,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParachuteLanding {
    pub character: Option<Character>,
    pub distance: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerAttack {
    pub attack_id: i64,
    pub fire_weapon_stack_count: u32,
    pub attacker: Option<Character>,
    pub attack_type: String,
    pub weapon: Option<Item>,
    pub vehicle: Option<Vehicle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerKill {
    #[serde(rename = "_D")]
    pub timestamp: Option<String>,
    pub attack_id: i64,
    pub killer: Option<Character>,
    pub victim: Option<Character>,
    pub assistant: Option<Character>,
    #[serde(rename = "dBNOId")]
    pub dbno_id: i64,
    pub damage_type_category: String,
    pub damage_causer_name: String,
    pub damage_causer_additional_info: Vec<String>,
    pub damage_reason: String,
    /// Centimeters between killer and victim
    pub distance: f64,
    pub victim_game_result: Option<GameResult>,
}

impl PlayerKill {
    pub fn killer_name(&self) -> Option<&str> {
        self.killer.as_ref().map(|c| c.name.as_str())
    }

    pub fn victim_name(&self) -> Option<&str> {
        self.victim.as_ref().map(|c| c.name.as_str())
    }

    pub fn victim_location(&self) -> Option<Location> {
        self.victim.as_ref().map(|c| c.location)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerPosition {
    #[serde(rename = "_D")]
    pub timestamp: Option<String>,
    pub common: Common,
    pub character: Option<Character>,
    pub vehicle: Option<Vehicle>,
    pub elapsed_time: f64,
    pub num_alive_players: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerRevive {
    pub reviver: Option<Character>,
    pub victim: Option<Character>,
    #[serde(rename = "dBNOId")]
    pub dbno_id: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RedZoneEnded {
    pub drivers: Vec<Character>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwimEnd {
    pub character: Option<Character>,
    pub swim_distance: f64,
    pub max_swim_depth_of_water: f64,
}

/// Vehicle and wheel destruction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleDamage {
    pub attack_id: i64,
    pub attacker: Option<Character>,
    pub vehicle: Option<Vehicle>,
    pub damage_type_category: String,
    pub damage_causer_name: String,
    pub distance: f64,
}

/// Boarding and leaving a vehicle, including the transport aircraft
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VehicleTrip {
    pub character: Option<Character>,
    pub vehicle: Option<Vehicle>,
    pub ride_distance: f64,
    pub seat_index: i32,
    pub max_speed: f64,
}

impl VehicleTrip {
    pub fn vehicle_type(&self) -> Option<&str> {
        self.vehicle.as_ref().map(|v| v.vehicle_type.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WeaponFireCount {
    pub character: Option<Character>,
    pub weapon_id: String,
    pub fire_count: u32,
}

/// Decode a telemetry payload (a JSON array of records)
///
/// Each record is decoded on its own; a record that does not fit its tag's
/// shape becomes [`TelemetryEvent::Unknown`] instead of failing the match.
/// An explicit `null` is read the same as a missing field.
pub fn decode_events(json: &str) -> Result<Vec<TelemetryEvent>> {
    let records: Vec<Value> = serde_json::from_str(json)?;
    let mut rejected = 0usize;

    let events: Vec<TelemetryEvent> = records
        .into_iter()
        .map(|mut record| {
            drop_nulls(&mut record);
            record
        })
        .map(|record| match serde_json::from_value(record) {
            Ok(event) => event,
            Err(e) => {
                log::debug!("Undecodable telemetry record: {e}");
                rejected += 1;
                TelemetryEvent::Unknown
            }
        })
        .collect();

    if rejected > 0 {
        log::info!("{rejected} of {} telemetry records could not be decoded", events.len());
    }
    log::debug!("Decoded {} telemetry events", events.len());

    Ok(events)
}

/// Remove `null` members so field defaults apply to them
fn drop_nulls(value: &mut Value) {
    match value {
        Value::Object(members) => {
            members.retain(|_, v| !v.is_null());
            members.values_mut().for_each(drop_nulls);
        }
        Value::Array(items) => {
            items.retain(|v| !v.is_null());
            items.iter_mut().for_each(drop_nulls);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_and_unknown_tags() {
        let json = r#"[
            {"_T":"LogMatchDefinition","MatchId":"match.bro.official.1"},
            {"_T":"LogSomethingNew","foo":1},
            {"_T":"LogPlayerPosition","_D":"2019-01-01T00:00:00Z",
             "common":{"isGame":1.0},
             "character":{"name":"Alpha","location":{"x":1.0,"y":2.0,"z":3.0}},
             "vehicle":null,"elapsedTime":12.5}
        ]"#;
        let events = decode_events(json).unwrap();
        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], TelemetryEvent::MatchDefinition(d) if d.match_id == "match.bro.official.1"));
        assert_eq!(events[1], TelemetryEvent::Unknown);
        match &events[2] {
            TelemetryEvent::PlayerPosition(p) => {
                assert_eq!(p.common.is_game, 1.0);
                assert!(p.vehicle.is_none());
                assert_eq!(p.character.as_ref().unwrap().location.y, 2.0);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_malformed_record_is_not_fatal() {
        // `distance` as a string cannot decode into a kill record
        let json = r#"[{"_T":"LogPlayerKill","distance":"far"},{"_T":"LogMatchEnd","characters":[]}]"#;
        let events = decode_events(json).unwrap();
        assert_eq!(events[0], TelemetryEvent::Unknown);
        assert_eq!(events[1].tag(), "LogMatchEnd");
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let json = r#"[
            {"_T":"LogPlayerKill","killer":{"name":"Bravo","zone":null},
             "victim":{"name":"Alpha","location":{"x":5,"y":6,"z":7},"accountId":null},
             "damageReason":null,"damageCauserName":null,
             "damageCauserAdditionalInfo":null,"distance":1500},
            {"_T":"LogPlayerPosition","common":{"isGame":null},
             "character":{"name":"Alpha","location":{"x":1,"y":2,"z":null}},
             "elapsedTime":null,"numAlivePlayers":null}
        ]"#;
        let events = decode_events(json).unwrap();
        let TelemetryEvent::PlayerKill(kill) = &events[0] else {
            panic!("expected kill record, got {:?}", events[0]);
        };
        assert_eq!(kill.killer_name(), Some("Bravo"));
        assert_eq!(kill.damage_reason, "");
        assert!(kill.damage_causer_additional_info.is_empty());
        assert_eq!(kill.distance, 1500.0);

        let TelemetryEvent::PlayerPosition(pos) = &events[1] else {
            panic!("expected position record, got {:?}", events[1]);
        };
        assert_eq!(pos.common.is_game, 0.0);
        assert_eq!(pos.elapsed_time, 0.0);
        assert_eq!(pos.character.as_ref().unwrap().location, Location::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_non_array_payload_is_fatal() {
        assert!(decode_events(r#"{"_T":"LogMatchEnd"}"#).is_err());
    }

    #[test]
    fn test_zone_kill_has_null_killer() {
        let json = r#"[{"_T":"LogPlayerKill","killer":null,
            "victim":{"name":"Alpha","location":{"x":5,"y":6,"z":7}},
            "damageTypeCategory":"Damage_BlueZone","damageCauserName":"BlueZone","distance":0}]"#;
        let events = decode_events(json).unwrap();
        let TelemetryEvent::PlayerKill(kill) = &events[0] else {
            panic!("expected kill record");
        };
        assert_eq!(kill.killer_name(), None);
        assert_eq!(kill.victim_name(), Some("Alpha"));
        assert_eq!(kill.victim_location(), Some(Location::new(5.0, 6.0, 7.0)));
    }
}
