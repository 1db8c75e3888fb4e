use serde::Deserialize;

/// Game rules sent by the engine as the first line of the init payload.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConstants {
    #[serde(rename = "MAX_ENERGY")]
    pub max_cargo: u32,
    #[serde(rename = "NEW_ENTITY_ENERGY_COST")]
    pub ship_cost: u32,
    #[serde(rename = "DROPOFF_COST")]
    pub dropoff_cost: u32,
    #[serde(rename = "MAX_TURNS")]
    pub max_turns: u32,
    #[serde(rename = "EXTRACT_RATIO")]
    pub extract_ratio: u32,
    #[serde(rename = "MOVE_COST_RATIO")]
    pub move_cost_ratio: u32,
    #[serde(rename = "INSPIRATION_ENABLED")]
    pub inspiration_enabled: bool,
    #[serde(rename = "INSPIRATION_RADIUS")]
    pub inspiration_radius: i32,
    #[serde(rename = "INSPIRATION_SHIP_COUNT")]
    pub inspiration_ship_count: usize,
    #[serde(rename = "INSPIRED_BONUS_MULTIPLIER")]
    pub inspired_bonus_multiplier: f64,
    #[serde(rename = "INSPIRED_EXTRACT_RATIO")]
    pub inspired_extract_ratio: u32,
    #[serde(rename = "INSPIRED_MOVE_COST_RATIO")]
    pub inspired_move_cost_ratio: u32,
    #[serde(rename = "game_seed")]
    pub game_seed: u64,
}

impl Default for GameConstants {
    fn default() -> GameConstants {
        GameConstants {
            max_cargo: 1000,
            ship_cost: 1000,
            dropoff_cost: 4000,
            max_turns: 400,
            extract_ratio: 4,
            move_cost_ratio: 10,
            inspiration_enabled: true,
            inspiration_radius: 4,
            inspiration_ship_count: 2,
            inspired_bonus_multiplier: 2.0,
            inspired_extract_ratio: 4,
            inspired_move_cost_ratio: 10,
            game_seed: 0,
        }
    }
}

impl GameConstants {
    pub fn from_json(line: &str) -> Result<GameConstants, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Halite a ship mines by staying one turn on a cell holding `halite`.
    pub fn extracted(&self, halite: u32) -> u32 {
        self.extracted_when(halite, false)
    }

    /// Halite removed from the cell by a stay. Inspired ships use their own ratio.
    pub fn extracted_when(&self, halite: u32, inspired: bool) -> u32 {
        let ratio = if inspired { self.inspired_extract_ratio } else { self.extract_ratio };

        halite.div_ceil(ratio.max(1))
    }

    /// Halite burned to leave a cell holding `halite`.
    pub fn move_cost(&self, halite: u32) -> u32 {
        self.move_cost_when(halite, false)
    }

    pub fn move_cost_when(&self, halite: u32, inspired: bool) -> u32 {
        let ratio = if inspired { self.inspired_move_cost_ratio } else { self.move_cost_ratio };

        halite / ratio.max(1)
    }

    /// Extra cargo an inspired ship receives on top of `extracted`.
    pub fn inspiration_bonus(&self, extracted: u32) -> u32 {
        (extracted as f64 * self.inspired_bonus_multiplier) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_engine_constants() {
        let line = r#"{"CAPTURE_ENABLED":false,"DROPOFF_COST":4000,"EXTRACT_RATIO":4,"MAX_ENERGY":1000,"MAX_TURNS":426,"MOVE_COST_RATIO":10,"NEW_ENTITY_ENERGY_COST":1000,"INSPIRATION_ENABLED":true,"game_seed":1542}"#;
        let constants = GameConstants::from_json(line).unwrap();

        assert_eq!(constants.max_turns, 426);
        assert_eq!(constants.game_seed, 1542);
        assert_eq!(constants.inspiration_radius, 4);
    }

    #[test]
    fn extraction_rounds_up_and_fuel_rounds_down() {
        let constants = GameConstants::default();

        assert_eq!(constants.extracted(9), 3);
        assert_eq!(constants.move_cost(99), 9);
        assert_eq!(constants.extracted(0), 0);
    }

    #[test]
    fn inspired_ratios_apply_only_when_inspired() {
        let constants = GameConstants::from_json(r#"{"INSPIRED_EXTRACT_RATIO":2,"INSPIRED_MOVE_COST_RATIO":20}"#).unwrap();

        assert_eq!(constants.extracted_when(9, false), 3);
        assert_eq!(constants.extracted_when(9, true), 5);
        assert_eq!(constants.move_cost_when(99, false), 9);
        assert_eq!(constants.move_cost_when(99, true), 4);
    }
}
