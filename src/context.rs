use crate::config::*;
use crate::constants::*;
use crate::world::*;
use rand::rngs::SmallRng;

/// Per-turn state threaded explicitly through every stage of the pipeline.
pub struct TurnContext<'a> {
    pub turn: u32,
    pub turns_remaining: u32,
    pub player_count: usize,
    pub config: &'a StrategyConfig,
    pub constants: GameConstants,
    pub rng: &'a mut SmallRng,
}

impl<'a> TurnContext<'a> {
    pub fn for_world(world: &World, config: &'a StrategyConfig, rng: &'a mut SmallRng) -> TurnContext<'a> {
        TurnContext {
            turn: world.turn,
            turns_remaining: world.turns_remaining(),
            player_count: world.player_count(),
            config,
            constants: world.constants.clone(),
            rng,
        }
    }

    pub fn is_two_player(&self) -> bool {
        self.player_count == 2
    }

    pub fn turn_fraction_remaining(&self) -> f64 {
        if self.constants.max_turns == 0 {
            0.0
        } else {
            self.turns_remaining as f64 / self.constants.max_turns as f64
        }
    }
}
