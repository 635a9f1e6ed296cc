//! Per-player match results for report formatting

use serde::Serialize;

use crate::model::{DeathCause, MatchAggregate, Placement, PlayerMatchBucket};

const CM_PER_M: f64 = 100.0;

/// How a tracked player died
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum DeathSummary {
    Zone,
    SelfInflicted,
    Player {
        killer: String,
        weapon: String,
        distance_m: f64,
    },
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub name: String,
    pub kill_count: usize,
    /// Longest kill distance, meters
    pub longest_kill_m: Option<f64>,
    pub attack_count: usize,
    pub placement: Placement,
    /// `None` if the player survived
    pub death: Option<DeathSummary>,
    pub landed: bool,
}

impl PlayerSummary {
    pub fn new(bucket: &PlayerMatchBucket, aggregate: &MatchAggregate) -> Self {
        let longest_kill_m = bucket
            .kills
            .iter()
            .map(|kill| kill.distance / CM_PER_M)
            .fold(None, |best: Option<f64>, d| Some(best.map_or(d, |b| b.max(d))));

        let death = bucket.death.as_ref().zip(bucket.death_cause()).map(|(kill, cause)| match cause {
            DeathCause::Zone => DeathSummary::Zone,
            DeathCause::SelfInflicted => DeathSummary::SelfInflicted,
            DeathCause::Player => DeathSummary::Player {
                killer: kill.killer_name().unwrap_or_default().to_string(),
                weapon: kill.damage_causer_name.clone(),
                distance_m: kill.distance / CM_PER_M,
            },
            DeathCause::Unknown => DeathSummary::Unknown,
        });

        Self {
            name: bucket.name.clone(),
            kill_count: bucket.kills.len(),
            longest_kill_m,
            attack_count: bucket.attacks.len(),
            placement: aggregate.placement(&bucket.name),
            death,
            landed: bucket.landing.is_some() || bucket.landed_positions().next().is_some(),
        }
    }

    /// Summaries for every tracked player, in tracking order
    pub fn for_match(aggregate: &MatchAggregate) -> Vec<Self> {
        aggregate
            .players
            .iter()
            .map(|bucket| Self::new(bucket, aggregate))
            .collect()
    }
}
