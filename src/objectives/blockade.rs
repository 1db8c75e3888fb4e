use crate::context::*;
use crate::objective::*;
use crate::scoring::*;
use crate::world::*;
use log::*;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Ships close to an enemy base with little cargo to lose, plus ships already blockading.
pub fn blockade_candidates(world: &World, ctx: &TurnContext) -> Vec<ShipKey> {
    let config = &ctx.config.objectives;
    let torus = world.torus();
    let enemy_bases: Vec<_> = world.opponents().flat_map(|player| player.bases()).collect();

    world
        .my_ships()
        .into_iter()
        .filter(|key| {
            let ship = world.ship(*key);

            if ship.assigned {
                return false;
            }

            let blockading = matches!(ship.objective, Some(objective) if objective.is(ObjectiveKindFlags::BLOCK_ENEMY_BASE));
            let near_enemy_base = enemy_bases.iter().any(|base| torus.distance(*base, ship.position) <= config.blockade_range);

            blockading || (ship.cargo <= config.blockade_max_cargo && near_enemy_base)
        })
        .collect()
}

/// Lightest ships choose first. Each claim lowers the claimed cell so the next ship favours another side.
pub fn assign_blockades(world: &mut World, grids: &mut TurnGrids, ctx: &TurnContext) {
    let config = &ctx.config.objectives;

    if !config.blockade_enabled {
        return;
    }

    let torus = world.torus();

    let mut queue: BinaryHeap<_> = blockade_candidates(world, ctx)
        .into_iter()
        .map(|key| Reverse((world.ship(key).cargo, key)))
        .collect();

    while let Some(Reverse((_, key))) = queue.pop() {
        let position = world.ship(key).position;

        let best = grids
            .blockade
            .cells
            .iter()
            .map(|candidate| {
                let distance = torus.distance(position, candidate.cell).max(1);

                (candidate.cell, candidate.score / distance as f64)
            })
            .filter(|(_, value)| *value > 0.0)
            .fold(None, |best: Option<(_, f64)>, (cell, value)| match best {
                Some((_, best_value)) if best_value >= value => best,
                _ => Some((cell, value)),
            });

        let ship = world.ship_mut(key);

        match best {
            Some((cell, score)) => {
                debug!("Ship {} blockades {} (score {:.1})", ship.id, cell, score);

                ship.objective = Some(Objective::BlockEnemyBase { cell, score });
                ship.assigned = true;

                grids.blockade.claim(cell, config.blockade_claim_decrement);
            }
            None => {
                if matches!(ship.objective, Some(Objective::BlockEnemyBase { .. })) {
                    ship.objective = None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use crate::geometry::*;
    use crate::testkit::*;

    #[test]
    fn light_ships_near_enemy_base_blockade_distinct_sides() {
        let mut world = WorldBuilder::new(32, 32)
            .halite_everywhere(200)
            .ship(0, 1, Position::new(22, 21), 0)
            .ship(0, 2, Position::new(23, 22), 50)
            .ship(0, 3, Position::new(8, 8), 0)
            .ship(1, 10, Position::new(20, 24), 1000)
            .ship(1, 11, Position::new(24, 28), 600)
            .build();
        let config = StrategyConfig::default();
        let mut rng = seeded_rng();
        let ctx = TurnContext::for_world(&world, &config, &mut rng);
        let mut grids = TurnGrids::compute(&world, &config);

        assign_blockades(&mut world, &mut grids, &ctx);

        let targets: Vec<_> = world
            .my_ships()
            .into_iter()
            .filter_map(|key| match world.ship(key).objective {
                Some(Objective::BlockEnemyBase { cell, .. }) => Some(cell),
                _ => None,
            })
            .collect();

        assert_eq!(targets.len(), 2);
        assert_ne!(targets[0], targets[1]);
        assert!(world.ship(world.my_ships()[2]).objective.is_none());
    }

    #[test]
    fn disabled_blockade_assigns_nothing() {
        let mut world = WorldBuilder::new(32, 32).ship(0, 1, Position::new(23, 23), 0).build();
        let mut config = StrategyConfig::default();
        config.objectives.blockade_enabled = false;
        let mut rng = seeded_rng();
        let ctx = TurnContext::for_world(&world, &config, &mut rng);
        let mut grids = TurnGrids::compute(&world, &config);

        assign_blockades(&mut world, &mut grids, &ctx);

        assert!(world.ship(world.my_ships()[0]).objective.is_none());
    }
}
