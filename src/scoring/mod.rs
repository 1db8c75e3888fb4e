pub mod blockade;
pub mod placement;
pub mod safety;
pub mod threatmap;
pub mod yields;

pub use self::blockade::*;
pub use self::placement::*;
pub use self::safety::*;
pub use self::threatmap::*;
pub use self::yields::*;

use crate::config::*;
use crate::world::*;
use log::*;

/// Every derived grid for one turn. Only constructible from the current world, and dropped at the end of the
/// turn, so nothing can read a grid from a previous frame.
pub struct TurnGrids {
    pub safety: SafetyGrid,
    pub yields: YieldGrid,
    pub placement: PlacementGrid,
    pub inspiration: InspirationGrid,
    pub threats: ThreatMap,
    pub blockade: BlockadeScores,
    pub halite_total: u64,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl TurnGrids {
    pub fn compute(world: &World, config: &StrategyConfig) -> TurnGrids {
        let inspiration = InspirationGrid::compute(world);
        let yields = YieldGrid::compute(world, &inspiration, &config.scoring);
        let halite_total = world.map.total_halite();

        debug!(
            "Turn {} scoring: {} halite on map ({:.1}% of initial)",
            world.turn,
            halite_total,
            100.0 * halite_total as f64 / world.initial_halite.max(1) as f64
        );

        TurnGrids {
            safety: SafetyGrid::compute(world),
            yields,
            placement: PlacementGrid::compute(world, &config.scoring),
            inspiration,
            threats: ThreatMap::compute(world, &config.scoring),
            blockade: BlockadeScores::compute(world, &config.objectives),
            halite_total,
        }
    }
}
