use crate::error::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning knobs for path search. Costs are in halite.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathingConfig {
    /// Multiplier on remaining distance added to the search priority.
    pub heuristic_weight: u64,
    /// Added to the edge cost of stepping onto an unsafe cell near the source.
    pub unsafe_penalty: u64,
    /// Cells further than this from the source carry no safety penalty.
    pub unsafe_radius: i32,
    /// Enemy-occupied cells inside this radius of the source are not expanded at all.
    pub prune_radius: i32,
    /// Returning ships pay this per enemy ship near a cell, blockaders per enemy ship more than allies.
    pub presence_penalty: u64,
    /// Suicide runs ignore enemies once this few turns remain.
    pub suicide_ignore_turns: u32,
    /// Suicide runs ignore enemies this close to their base.
    pub suicide_ignore_radius: i32,
}

impl Default for PathingConfig {
    fn default() -> PathingConfig {
        PathingConfig {
            heuristic_weight: 1,
            unsafe_penalty: 9_999_999,
            unsafe_radius: 4,
            prune_radius: 4,
            presence_penalty: 25,
            suicide_ignore_turns: 8,
            suicide_ignore_radius: 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub smoothing_radius: i32,
    /// Cells below this much halite are scored as halite^2 / threshold.
    pub crumb_threshold: u32,
    pub inspiration_boost: bool,
    pub threat_radius: i32,
    /// Fraction of enemy cargo value kept per step of distance.
    pub threat_decay: f64,
    pub presence_radius: i32,
    pub placement_radius: i32,
    pub placement_min_base_distance: i32,
    pub placement_max_base_distance: i32,
    pub placement_enemy_base_distance: i32,
}

impl Default for ScoringConfig {
    fn default() -> ScoringConfig {
        ScoringConfig {
            smoothing_radius: 3,
            crumb_threshold: 100,
            inspiration_boost: true,
            threat_radius: 4,
            threat_decay: 0.5,
            presence_radius: 4,
            placement_radius: 5,
            placement_min_base_distance: 9,
            placement_max_base_distance: 18,
            placement_enemy_base_distance: 7,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    /// Fraction of capacity at which a ship heads home.
    pub return_fullness: f64,
    /// Lowered threshold used when the ship is crowded or contested.
    pub return_fullness_congested: f64,
    pub congestion_radius: i32,
    /// Ships of any owner within `congestion_radius` that count as crowded.
    pub congestion_ship_count: usize,
    /// Enemy ships within `congestion_radius` that count as contested in a four player game.
    pub contested_enemy_count: usize,
    /// Cargo a ship aims to fill up to when scoring extraction cells.
    pub cargo_target: u32,
    /// Radius around a claimed cell whose yield is decremented.
    pub claim_radius: i32,
    pub claim_area_discount: f64,
    /// Added to twice the distance home before comparing with the turns remaining.
    pub suicide_margin: i32,
    pub dropoff_ship_thresholds: [usize; 3],
    pub dropoff_turn_gap: u32,
    pub dropoff_min_turns_remaining: u32,
    /// Construction cost is reserved once the builder is this close to the site.
    pub dropoff_reserve_distance: i32,
    /// A site this close, with these funds, is treated as a base for returning ships.
    pub dropoff_planned_distance: i32,
    pub dropoff_planned_funds: u32,
    pub dropoff_build_range: i32,
    pub blockade_enabled: bool,
    pub blockade_max_cargo: u32,
    pub blockade_range: i32,
    pub blockade_ally_weight: f64,
    pub blockade_offaxis_weight: f64,
    pub blockade_claim_decrement: f64,
    pub attack_enabled: bool,
    pub attack_radius: i32,
    pub attack_max_cargo: u32,
    pub attack_min_victim_cargo: u32,
    /// How strongly cargo carried by the victim's nearby teammates lowers our chance of collecting the wreck.
    pub attack_escort_weight: f64,
}

impl Default for ObjectiveConfig {
    fn default() -> ObjectiveConfig {
        ObjectiveConfig {
            return_fullness: 0.9,
            return_fullness_congested: 0.75,
            congestion_radius: 3,
            congestion_ship_count: 7,
            contested_enemy_count: 2,
            cargo_target: 950,
            claim_radius: 4,
            claim_area_discount: 1.0,
            suicide_margin: 0,
            dropoff_ship_thresholds: [20, 40, 40],
            dropoff_turn_gap: 80,
            dropoff_min_turns_remaining: 75,
            dropoff_reserve_distance: 10,
            dropoff_planned_distance: 5,
            dropoff_planned_funds: 3000,
            dropoff_build_range: 2,
            blockade_enabled: true,
            blockade_max_cargo: 100,
            blockade_range: 6,
            blockade_ally_weight: 500.0,
            blockade_offaxis_weight: 0.5,
            blockade_claim_decrement: 500.0,
            attack_enabled: true,
            attack_radius: 4,
            attack_max_cargo: 300,
            attack_min_victim_cargo: 500,
            attack_escort_weight: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Fleets up to this size search six steps ahead.
    pub reach_small_fleet: usize,
    /// Fleets up to this size search five steps ahead, larger ones four.
    pub reach_medium_fleet: usize,
    /// Score penalty per step of net drift away from the objective.
    pub drift_weight: f64,
    /// Extra drift allowance for the single retry after every sequence was rejected.
    pub drift_relax: i32,
    /// A returning ship stays an extra turn when mining would gain at least this much.
    pub return_stay_min_gain: u32,
    pub collision_iteration_cap: usize,
    pub base_exchange_min_turns: u32,
}

impl Default for MovementConfig {
    fn default() -> MovementConfig {
        MovementConfig {
            reach_small_fleet: 8,
            reach_medium_fleet: 20,
            drift_weight: 10.0,
            drift_relax: 2,
            return_stay_min_gain: 60,
            collision_iteration_cap: 50,
            base_exchange_min_turns: 10,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    /// Stop building ships once less than this fraction of the game remains.
    pub min_turn_fraction: f64,
}

impl Default for SpawnConfig {
    fn default() -> SpawnConfig {
        SpawnConfig { min_turn_fraction: 0.33 }
    }
}

/// Read-only strategy configuration shared by every stage of a turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub pathing: PathingConfig,
    pub scoring: ScoringConfig,
    pub objectives: ObjectiveConfig,
    pub movement: MovementConfig,
    pub spawn: SpawnConfig,
    pub long_turn_warn_ms: u64,
}

impl Default for StrategyConfig {
    fn default() -> StrategyConfig {
        StrategyConfig {
            pathing: PathingConfig::default(),
            scoring: ScoringConfig::default(),
            objectives: ObjectiveConfig::default(),
            movement: MovementConfig::default(),
            spawn: SpawnConfig::default(),
            long_turn_warn_ms: 1500,
        }
    }
}

impl StrategyConfig {
    pub fn from_json(text: &str) -> Result<StrategyConfig, BotError> {
        serde_json::from_str(text).map_err(BotError::Config)
    }

    /// Loads overrides from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<StrategyConfig, BotError> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;

                StrategyConfig::from_json(&text)
            }
            None => Ok(StrategyConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config = StrategyConfig::from_json(r#"{ "objectives": { "return_fullness": 0.8 }, "long_turn_warn_ms": 900 }"#).unwrap();

        assert_eq!(config.objectives.return_fullness, 0.8);
        assert_eq!(config.objectives.cargo_target, 950);
        assert_eq!(config.scoring, ScoringConfig::default());
        assert_eq!(config.long_turn_warn_ms, 900);
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(StrategyConfig::from_json("{ nope"), Err(BotError::Config(_))));
    }
}
