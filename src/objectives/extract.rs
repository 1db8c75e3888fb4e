use crate::context::*;
use crate::geometry::*;
use crate::objective::*;
use crate::pathing::*;
use crate::scoring::*;
use crate::world::*;
use log::*;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Claim {
    Cell { target: Position, score: f64 },
    Attack { victim: ShipKey, cell: Position, score: f64 },
    Home { base: Position },
}

impl Claim {
    fn score(&self) -> f64 {
        match *self {
            Claim::Cell { score, .. } | Claim::Attack { score, .. } => score,
            Claim::Home { .. } => 0.0,
        }
    }
}

/// Best unclaimed cell for `ship`: smoothed yield capped at the cargo it still wants, over the length of the
/// round trip. The first cell in scan order wins ties.
pub fn best_extraction(
    yields: &YieldGrid,
    claimed: &Grid<bool>,
    distances: &BaseDistances,
    ship: &Ship,
    cargo_target: u32,
) -> Option<(Position, f64)> {
    let torus = claimed.torus();
    let wanted = cargo_target.saturating_sub(ship.cargo) as f64;

    yields
        .iter()
        .filter(|(pos, _)| !claimed[*pos])
        .map(|(pos, value)| {
            let trip = 1 + torus.distance(ship.position, pos) + distances.distance(pos);

            (pos, value.min(wanted) / trip as f64)
        })
        .fold(None, |best, (pos, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((pos, score)),
        })
}

/// Most profitable untargeted enemy to ram: the wreck's cargo weighted by our chance of collecting it, less the
/// cargo we give up, over the distance to the victim. Loaded teammates around the victim lower that chance.
pub fn best_attack(world: &World, grids: &TurnGrids, key: ShipKey, ctx: &TurnContext) -> Option<(ShipKey, Position, f64)> {
    let config = &ctx.config.objectives;
    let torus = world.torus();
    let ship = world.ship(key);

    if ship.cargo > config.attack_max_cargo {
        return None;
    }

    world
        .enemy_ships()
        .filter(|(_, enemy)| !enemy.targeted && enemy.cargo >= config.attack_min_victim_cargo && !world.is_enemy_base(enemy.position))
        .filter_map(|(victim, enemy)| {
            let distance = torus.distance(ship.position, enemy.position);

            if distance > config.attack_radius {
                return None;
            }

            let escort = (grids.threats.threat(enemy.owner, enemy.position) - enemy.cargo as f64).max(0.0);
            let recovery = grids.threats.recovery_probability(enemy.position, true)
                / (1.0 + config.attack_escort_weight * escort / world.constants.max_cargo.max(1) as f64);
            let gain = recovery * (enemy.cargo + ship.cargo) as f64 - ship.cargo as f64;

            (gain > 0.0).then(|| (victim, enemy.position, gain / (1 + distance) as f64))
        })
        .fold(None, |best, (victim, cell, score)| match best {
            Some((_, _, best_score)) if best_score >= score => best,
            _ => Some((victim, cell, score)),
        })
}

/// Greedy global assignment: every round the single best (ship, claim) pair over all waiting ships is committed,
/// then the yield around a claimed cell is lowered so the fleet spreads out. Equal scores go to the ship with less
/// cargo.
pub fn assign_extraction(world: &mut World, grids: &mut TurnGrids, distances: &BaseDistances, ctx: &TurnContext) {
    let config = &ctx.config.objectives;
    let torus = world.torus();
    let attacks_allowed = config.attack_enabled && ctx.is_two_player();

    let mut claimed = Grid::new(torus, false);
    let mut pending: Vec<ShipKey> = world.my_ships().into_iter().filter(|key| !world.ship(*key).assigned).collect();
    let mut cached: Vec<_> = pending
        .iter()
        .map(|key| best_extraction(&grids.yields, &claimed, distances, world.ship(*key), config.cargo_target))
        .collect();

    while !pending.is_empty() {
        let mut choice: Option<(usize, Claim)> = None;

        for (index, key) in pending.iter().enumerate() {
            let ship = world.ship(*key);

            let mut claim = match cached[index] {
                Some((target, score)) => Claim::Cell { target, score },
                None => Claim::Home {
                    base: distances.nearest_base(ship.position),
                },
            };

            if attacks_allowed {
                if let Some((victim, cell, score)) = best_attack(world, grids, *key, ctx) {
                    if score > claim.score() {
                        claim = Claim::Attack { victim, cell, score };
                    }
                }
            }

            let better = match choice {
                None => true,
                Some((best_index, best)) => {
                    let best_key = pending[best_index];

                    claim.score() > best.score()
                        || (claim.score() == best.score() && (ship.cargo, *key) < (world.ship(best_key).cargo, best_key))
                }
            };

            if better {
                choice = Some((index, claim));
            }
        }

        let Some((index, claim)) = choice else {
            break;
        };

        let key = pending.swap_remove(index);
        cached.swap_remove(index);

        let objective = match claim {
            Claim::Cell { target, score } => {
                let wanted = config.cargo_target.saturating_sub(world.ship(key).cargo) as f64;

                claimed[target] = true;
                grids.yields.decrement_around(target, config.claim_radius, wanted / config.claim_area_discount);

                for (entry, other) in cached.iter_mut().zip(pending.iter()) {
                    if matches!(entry, Some((cell, _)) if torus.distance(*cell, target) <= config.claim_radius) {
                        *entry = best_extraction(&grids.yields, &claimed, distances, world.ship(*other), config.cargo_target);
                    }
                }

                Objective::Extract { target, score }
            }
            Claim::Attack { victim, cell, score } => {
                let victim_ship = world.ship_mut(victim);
                victim_ship.targeted = true;

                info!("Ship {} attacks ship {} carrying {}", world.ship(key).id, world.ship(victim).id, world.ship(victim).cargo);

                Objective::Attack {
                    victim: world.ship(victim).id,
                    cell,
                    score,
                }
            }
            Claim::Home { base } => {
                warn!("No unclaimed cell left for ship {}, sending it home", world.ship(key).id);

                Objective::ReturnToBase { base }
            }
        };

        let ship = world.ship_mut(key);
        ship.objective = Some(objective);
        ship.assigned = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::*;
    use crate::testkit::*;

    fn assign(world: &mut World, config: &StrategyConfig) {
        let mut rng = seeded_rng();
        let ctx = TurnContext::for_world(world, config, &mut rng);
        let mut grids = TurnGrids::compute(world, config);
        let distances = BaseDistances::compute(world.torus(), &world.my_bases());

        assign_extraction(world, &mut grids, &distances, &ctx);
    }

    #[test]
    fn ships_never_share_a_target() {
        let mut world = WorldBuilder::new(32, 32)
            .halite(Position::new(12, 12), 1000)
            .ship(0, 1, Position::new(11, 12), 0)
            .ship(0, 2, Position::new(13, 12), 0)
            .ship(0, 3, Position::new(12, 14), 400)
            .build();

        assign(&mut world, &StrategyConfig::default());

        let targets: Vec<_> = world
            .my_ships()
            .into_iter()
            .map(|key| match world.ship(key).objective {
                Some(Objective::Extract { target, .. }) => target,
                other => panic!("unexpected objective {:?}", other),
            })
            .collect();

        assert_eq!(targets.len(), 3);
        assert!(targets.iter().enumerate().all(|(i, a)| targets[i + 1..].iter().all(|b| a != b)));
    }

    #[test]
    fn two_player_ships_ram_loaded_enemies() {
        let mut world = WorldBuilder::new(32, 32)
            .ship(0, 1, Position::new(10, 10), 0)
            .ship(0, 2, Position::new(11, 11), 0)
            .ship(1, 7, Position::new(12, 10), 800)
            .build();

        assign(&mut world, &StrategyConfig::default());

        let keys = world.my_ships();
        let victim = world.find_ship(ShipId(7)).unwrap();

        assert!(matches!(
            world.ship(keys[0]).objective,
            Some(Objective::Attack { victim: ShipId(7), cell, .. }) if cell == Position::new(12, 10)
        ));
        assert!(matches!(world.ship(keys[1]).objective, Some(Objective::Extract { .. })));
        assert!(world.ship(victim).targeted);
    }

    fn attack_near_escort(escort_cargo: u32) -> World {
        let mut world = WorldBuilder::new(32, 32)
            .ship(0, 1, Position::new(10, 10), 250)
            .ship(0, 2, Position::new(11, 11), 250)
            .ship(1, 7, Position::new(12, 10), 600)
            .ship(1, 8, Position::new(13, 10), escort_cargo)
            .build();

        assign(&mut world, &StrategyConfig::default());

        world
    }

    fn attacks_on(world: &World, victim: ShipId) -> usize {
        world
            .my_ships()
            .into_iter()
            .filter(|key| matches!(world.ship(*key).objective, Some(Objective::Attack { victim: target, .. }) if target == victim))
            .count()
    }

    #[test]
    fn loaded_escorts_shield_their_teammate() {
        let unescorted = attack_near_escort(0);

        assert_eq!(attacks_on(&unescorted, ShipId(7)), 1);

        let escorted = attack_near_escort(1000);
        let victim = escorted.find_ship(ShipId(7)).unwrap();

        assert_eq!(attacks_on(&escorted, ShipId(7)), 0);
        assert!(!escorted.ship(victim).targeted);
    }

    #[test]
    fn four_player_games_do_not_attack() {
        let mut world = WorldBuilder::new(32, 32)
            .players(4)
            .ship(0, 1, Position::new(10, 10), 0)
            .ship(0, 2, Position::new(11, 11), 0)
            .ship(1, 7, Position::new(12, 10), 800)
            .build();

        assign(&mut world, &StrategyConfig::default());

        assert!(world
            .my_ships()
            .into_iter()
            .all(|key| matches!(world.ship(key).objective, Some(Objective::Extract { .. }))));
    }
}
