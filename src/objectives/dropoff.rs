use crate::config::*;
use crate::context::*;
use crate::economy::*;
use crate::findnearest::*;
use crate::geometry::*;
use crate::objective::*;
use crate::scoring::*;
use crate::world::*;
use log::*;

/// Dropoff construction chosen for this turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropoffPlan {
    pub site: Position,
    pub builder: ShipKey,
    /// The builder is close and funded, so returning ships may already head for the site.
    pub counts_as_base: bool,
}

const DROPOFF_TABLE_WIDTHS: [i32; 5] = [32, 40, 48, 56, 64];

/// Dropoff count worth building on a map: a table by size and player count, limited by how much halite the map
/// started with (one per full 100k above the first 100k).
pub fn max_allowed_dropoffs(width: i32, players: usize, initial_halite: u64) -> usize {
    let nearest_width = DROPOFF_TABLE_WIDTHS
        .iter()
        .copied()
        .min_by_key(|table_width| (table_width - width).abs())
        .unwrap_or(32);

    let table = match nearest_width {
        32 => usize::from(players == 2),
        40 => 1,
        48 => 2,
        _ => {
            if players == 2 {
                3
            } else {
                2
            }
        }
    };

    let tranches = (initial_halite.saturating_sub(100_000) / 100_000) as usize;

    tranches.min(table)
}

pub fn should_plan_dropoff(world: &World, ctx: &TurnContext, last_dropoff_turn: u32) -> bool {
    let config = &ctx.config.objectives;
    let built = world.me().dropoffs.len();
    let allowed = max_allowed_dropoffs(world.torus().width, world.player_count(), world.initial_halite);

    if built >= allowed || ctx.turns_remaining < config.dropoff_min_turns_remaining {
        return false;
    }

    let ships = world.me().ships.len();
    let required = config.dropoff_ship_thresholds[built.min(config.dropoff_ship_thresholds.len() - 1)];

    if ships < required {
        return false;
    }

    built == 0 || world.turn.saturating_sub(last_dropoff_turn) >= config.dropoff_turn_gap
}

/// Whether `key` can turn into a dropoff right where it stands this turn.
pub fn can_construct(world: &World, key: ShipKey, treasury: &Treasury, config: &ObjectiveConfig) -> bool {
    let ship = world.ship(key);

    let Some(Objective::BuildDropoff { site }) = ship.objective else {
        return false;
    };

    let cell = world.map.cell(ship.position);
    let funds = treasury.halite as u64 + ship.cargo as u64 + cell.halite as u64;

    world.torus().distance(ship.position, site) <= config.dropoff_build_range
        && cell.structure.is_none()
        && funds >= world.constants.dropoff_cost as u64
}

/// Picks this turn's dropoff site and hands it to the closest ship, reserving the construction cost once the
/// builder is near.
pub fn assign_dropoff(world: &mut World, grids: &TurnGrids, ctx: &TurnContext, treasury: &mut Treasury, last_dropoff_turn: u32) -> Option<DropoffPlan> {
    let config = &ctx.config.objectives;

    if !should_plan_dropoff(world, ctx, last_dropoff_turn) {
        return None;
    }

    let (site, score) = grids.placement.best()?;
    let torus = world.torus();

    let builder = world
        .my_ships()
        .into_iter()
        .filter(|key| !world.ship(*key).assigned)
        .find_nearest_linear_by(torus, site, |key| world.ship(*key).position)?;

    let (distance, cargo, under) = {
        let ship = world.ship(builder);

        (torus.distance(ship.position, site), ship.cargo, world.map.halite(ship.position))
    };

    if distance <= config.dropoff_reserve_distance {
        treasury.reserve(ctx.constants.dropoff_cost.saturating_sub(cargo + under));
    }

    let counts_as_base = distance <= config.dropoff_planned_distance && treasury.halite + cargo + under >= config.dropoff_planned_funds;

    let ship = world.ship_mut(builder);
    ship.objective = Some(Objective::BuildDropoff { site });
    ship.assigned = true;

    info!(
        "Dropoff site {} (score {:.0}) assigned to ship {} at distance {}, reserved {}",
        site, score, ship.id, distance, treasury.reserved
    );

    Some(DropoffPlan {
        site,
        builder,
        counts_as_base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;

    #[test]
    fn allowance_is_capped_by_map_halite() {
        assert_eq!(max_allowed_dropoffs(32, 2, 400_000), 1);
        assert_eq!(max_allowed_dropoffs(32, 4, 400_000), 0);
        assert_eq!(max_allowed_dropoffs(64, 2, 250_000), 1);
        assert_eq!(max_allowed_dropoffs(64, 2, 900_000), 3);
        assert_eq!(max_allowed_dropoffs(50, 4, 900_000), 2);
        assert_eq!(max_allowed_dropoffs(48, 2, 90_000), 0);
    }

    fn fleet(ships: u32) -> World {
        let mut builder = WorldBuilder::new(32, 32).halite_everywhere(300).player_halite(0, 5000);

        for id in 0..ships {
            builder = builder.ship(0, id, Position::new(id as i32 % 10, 2 + id as i32 / 10), 0);
        }

        builder.build()
    }

    #[test]
    fn twentieth_ship_unlocks_a_dropoff() {
        let config = StrategyConfig::default();
        let mut rng = seeded_rng();

        let mut small = fleet(19);
        let ctx = TurnContext::for_world(&small, &config, &mut rng);
        let grids = TurnGrids::compute(&small, &config);
        let mut treasury = Treasury::new(5000);

        assert!(assign_dropoff(&mut small, &grids, &ctx, &mut treasury, 0).is_none());

        let mut world = fleet(20);
        let grids = TurnGrids::compute(&world, &config);
        let plan = assign_dropoff(&mut world, &grids, &ctx, &mut treasury, 0).unwrap();

        assert_eq!(world.ship(plan.builder).objective, Some(Objective::BuildDropoff { site: plan.site }));
        assert!(world.torus().distance(plan.site, Position::new(8, 8)) >= config.scoring.placement_min_base_distance);
    }

    #[test]
    fn construction_needs_range_and_funds() {
        let mut world = WorldBuilder::new(32, 32)
            .halite(Position::new(20, 8), 500)
            .ship(0, 1, Position::new(20, 8), 600)
            .build();
        let key = world.my_ships()[0];
        let config = ObjectiveConfig::default();

        world.ship_mut(key).objective = Some(Objective::BuildDropoff { site: Position::new(21, 9) });

        assert!(can_construct(&world, key, &Treasury::new(2900), &config));
        assert!(!can_construct(&world, key, &Treasury::new(2800), &config));

        world.ship_mut(key).objective = Some(Objective::BuildDropoff { site: Position::new(24, 9) });

        assert!(!can_construct(&world, key, &Treasury::new(5000), &config));
    }
}
