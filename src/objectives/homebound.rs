use crate::context::*;
use crate::objective::*;
use crate::pathing::*;
use crate::world::*;
use log::*;

/// Ships that can only just make it home before the game ends commit to crashing into a base to bank their cargo.
pub fn assign_suicides(world: &mut World, distances: &BaseDistances, ctx: &TurnContext) {
    let margin = ctx.config.objectives.suicide_margin;

    for key in world.my_ships() {
        let ship = world.ship(key);

        if ship.assigned {
            continue;
        }

        let distance = distances.distance(ship.position);
        let suiciding = matches!(ship.objective, Some(Objective::SuicideAtBase { .. }));

        if suiciding || 2 * distance + margin >= ctx.turns_remaining as i32 {
            let base = distances.nearest_base(ship.position);
            let ship = world.ship_mut(key);

            if !suiciding {
                info!("Ship {} starts endgame run to {} ({} turns left)", ship.id, base, ctx.turns_remaining);
            }

            ship.objective = Some(Objective::SuicideAtBase { base });
            ship.assigned = true;
        }
    }
}

/// Fraction of capacity at which `key` turns for home. Lower when the ship is crowded, or in a four player game
/// when opponents are close.
pub fn return_threshold(world: &World, key: ShipKey, ctx: &TurnContext) -> f64 {
    let config = &ctx.config.objectives;
    let torus = world.torus();
    let position = world.ship(key).position;

    let (neighbours, enemies) = world
        .ships()
        .filter(|(other, ship)| *other != key && torus.distance(ship.position, position) <= config.congestion_radius)
        .fold((0, 0), |(neighbours, enemies), (_, ship)| {
            (neighbours + 1, enemies + usize::from(ship.owner != world.my_id))
        });

    let crowded = neighbours >= config.congestion_ship_count;
    let contested = ctx.player_count >= 4 && enemies >= config.contested_enemy_count;

    if crowded || contested {
        config.return_fullness_congested
    } else {
        config.return_fullness
    }
}

pub fn assign_returns(world: &mut World, distances: &BaseDistances, ctx: &TurnContext) {
    let max_cargo = ctx.constants.max_cargo as f64;

    for key in world.my_ships() {
        let ship = world.ship(key);

        if ship.assigned {
            continue;
        }

        let returning = matches!(ship.objective, Some(Objective::ReturnToBase { .. }));

        if returning || ship.cargo as f64 >= return_threshold(world, key, ctx) * max_cargo {
            let base = distances.nearest_base(ship.position);
            let ship = world.ship_mut(key);

            ship.objective = Some(Objective::ReturnToBase { base });
            ship.assigned = true;
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
    fn suicide_starts_exactly_at_the_boundary() {
        let mut world = WorldBuilder::new(32, 32)
            .max_turns(400)
            .turn(380)
            .ship(0, 1, Position::new(18, 8), 300)
            .ship(0, 2, Position::new(17, 8), 300)
            .build();
        let config = StrategyConfig::default();
        let mut rng = seeded_rng();
        let ctx = TurnContext::for_world(&world, &config, &mut rng);
        let distances = BaseDistances::compute(world.torus(), &world.my_bases());

        assign_suicides(&mut world, &distances, &ctx);

        let keys = world.my_ships();

        assert_eq!(ctx.turns_remaining, 20);
        assert_eq!(distances.distance(world.ship(keys[0]).position), 10);
        assert_eq!(world.ship(keys[0]).objective, Some(Objective::SuicideAtBase { base: Position::new(8, 8) }));
        assert!(world.ship(keys[1]).objective.is_none());
    }

    #[test]
    fn returns_when_nearly_full() {
        let mut world = WorldBuilder::new(32, 32)
            .ship(0, 1, Position::new(12, 12), 910)
            .ship(0, 2, Position::new(14, 12), 890)
            .build();
        let config = StrategyConfig::default();
        let mut rng = seeded_rng();
        let ctx = TurnContext::for_world(&world, &config, &mut rng);
        let distances = BaseDistances::compute(world.torus(), &world.my_bases());

        assign_returns(&mut world, &distances, &ctx);

        let keys = world.my_ships();

        assert_eq!(world.ship(keys[0]).objective, Some(Objective::ReturnToBase { base: Position::new(8, 8) }));
        assert!(world.ship(keys[1]).objective.is_none());
    }

    #[test]
    fn crowding_lowers_the_return_threshold() {
        let mut builder = WorldBuilder::new(32, 32).ship(0, 1, Position::new(16, 16), 780);

        let crowd = [(14, 17), (15, 17), (16, 17), (17, 17), (18, 17), (16, 14), (16, 15)];

        for (id, (x, y)) in (2..).zip(crowd) {
            builder = builder.ship(0, id, Position::new(x, y), 0);
        }

        let world = builder.build();
        let config = StrategyConfig::default();
        let mut rng = seeded_rng();
        let ctx = TurnContext::for_world(&world, &config, &mut rng);

        assert_eq!(return_threshold(&world, world.my_ships()[0], &ctx), 0.75);
    }
}
