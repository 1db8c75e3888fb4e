pub mod blockade;
pub mod dropoff;
pub mod extract;
pub mod homebound;

pub use self::blockade::*;
pub use self::dropoff::*;
pub use self::extract::*;
pub use self::homebound::*;

use crate::context::*;
use crate::economy::*;
use crate::error::*;
use crate::geometry::*;
use crate::objective::*;
use crate::pathing::*;
use crate::scoring::*;
use crate::world::*;
use itertools::Itertools;
use log::*;

/// What the assignment pass hands on to movement and spawning.
pub struct TurnPlan {
    /// Our bases, plus the planned dropoff site once it is close enough to count.
    pub bases: Vec<Position>,
    pub distances: BaseDistances,
    pub treasury: Treasury,
    pub dropoff: Option<DropoffPlan>,
}

/// Gives every ship of ours exactly one objective per turn. Remembers when the last dropoff went up so
/// construction is spaced out.
#[derive(Debug, Default)]
pub struct ObjectiveManager {
    last_dropoff_turn: u32,
    known_dropoffs: usize,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl ObjectiveManager {
    pub fn new() -> ObjectiveManager {
        ObjectiveManager::default()
    }

    pub fn assign(&mut self, world: &mut World, grids: &mut TurnGrids, ctx: &TurnContext) -> Result<TurnPlan, BotError> {
        let built = world.me().dropoffs.len();

        if built > self.known_dropoffs {
            self.last_dropoff_turn = world.turn;
        }

        self.known_dropoffs = built;

        release_stale_objectives(world);

        let mut treasury = Treasury::new(world.me().halite);
        let dropoff = assign_dropoff(world, grids, ctx, &mut treasury, self.last_dropoff_turn);

        let mut bases = world.my_bases();

        if let Some(plan) = dropoff.filter(|plan| plan.counts_as_base) {
            bases.push(plan.site);
        }

        let distances = BaseDistances::compute(world.torus(), &bases);

        assign_blockades(world, grids, ctx);
        assign_suicides(world, &distances, ctx);
        assign_returns(world, &distances, ctx);
        assign_extraction(world, grids, &distances, ctx);

        for key in world.my_ships() {
            let ship = world.ship(key);

            if ship.objective.is_none() {
                return Err(BotError::MissingObjective(ship.id));
            }
        }

        debug!(
            "Turn {} objectives: {}",
            world.turn,
            world
                .my_ships()
                .into_iter()
                .filter_map(|key| world.ship(key).objective.map(|objective| objective.kind()))
                .counts()
                .into_iter()
                .sorted()
                .map(|(kind, count)| format!("{:?}={}", kind, count))
                .join(" ")
        );

        Ok(TurnPlan {
            bases,
            distances,
            treasury,
            dropoff,
        })
    }
}

/// Drops objectives that are re-decided every turn, and homeward runs that have arrived.
fn release_stale_objectives(world: &mut World) {
    let keys: Vec<_> = world.ships().map(|(key, _)| key).collect();

    for key in keys {
        let at_base = world.is_my_base(world.ship(key).position);
        let ship = world.ship_mut(key);

        ship.assigned = false;
        ship.targeted = false;
        ship.objective = match ship.objective {
            Some(Objective::ReturnToBase { .. }) if at_base => None,
            Some(objective) if objective.is(ObjectiveKindFlags::PERSISTENT) => Some(objective),
            _ => None,
        };
    }
}
