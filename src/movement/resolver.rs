use super::*;
use crate::error::*;
use crate::objective::*;
use crate::scoring::*;
use itertools::Itertools;
use std::collections::BTreeSet;

/// How much work collision resolution took this turn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub iterations: usize,
    pub exchanges: usize,
    pub base_exchanges: usize,
}

/// Repairs independently planned proposals into a command set without friendly collisions. One ship is changed
/// per pass, and the number of passes is capped.
pub struct CollisionResolver<'a> {
    evaluator: &'a MoveEvaluator<'a>,
    config: &'a MovementConfig,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl<'a> CollisionResolver<'a> {
    pub fn new(evaluator: &'a MoveEvaluator<'a>, config: &'a MovementConfig) -> CollisionResolver<'a> {
        CollisionResolver { evaluator, config }
    }

    fn world(&self) -> &World {
        self.evaluator.world()
    }

    pub fn resolve(&self, proposals: &mut Proposals, safety: &mut SafetyGrid) -> Result<ResolutionReport, BotError> {
        let mut report = ResolutionReport::default();

        while let Some(colliding) = self.collisions(proposals).into_iter().next() {
            if report.iterations >= self.config.collision_iteration_cap || !self.resolve_collision(&colliding, proposals, safety) {
                return Err(BotError::UnresolvedCollisions {
                    remaining: self.collisions(proposals).len(),
                    iterations: report.iterations,
                });
            }

            report.iterations += 1;
        }

        report.exchanges = self.exchange_pass(proposals, safety);
        report.base_exchanges = self.base_exchange_pass(proposals, safety);

        self.validate(proposals)?;

        if report.iterations > 0 {
            debug!(
                "Collision resolution: {} passes, {} exchanges, {} base exchanges",
                report.iterations, report.exchanges, report.base_exchanges
            );
        }

        Ok(report)
    }

    /// Several of our ships may share a base cell when at most one of them is not crashing in at the end of the
    /// game.
    fn is_legitimate_base_arrival(&self, destination: Position, keys: &[ShipKey]) -> bool {
        let world = self.world();

        world.is_my_base(destination)
            && keys
                .iter()
                .filter(|key| !matches!(world.ship(**key).objective, Some(Objective::SuicideAtBase { .. })))
                .count()
                <= 1
    }

    /// Friendly same-destination collisions first, then single ships walking onto an enemy.
    pub fn collisions(&self, proposals: &Proposals) -> Vec<Vec<ShipKey>> {
        let world = self.world();

        let friendly = proposals
            .arrivals()
            .into_iter()
            .filter(|(destination, keys)| keys.len() > 1 && !self.is_legitimate_base_arrival(*destination, keys))
            .map(|(_, keys)| keys);

        let enemy = proposals
            .iter()
            .filter(|(key, destination)| {
                let occupied_by_enemy = matches!(world.ship_at(**destination), Some(other) if !world.is_mine(other));
                let attacking = matches!(world.ship(**key).objective, Some(Objective::Attack { cell, .. }) if cell == **destination);

                occupied_by_enemy && !attacking && !world.is_my_base(**destination)
            })
            .map(|(key, _)| vec![*key]);

        friendly.chain(enemy).collect()
    }

    fn is_swapping(&self, key: ShipKey, proposals: &Proposals) -> bool {
        let world = self.world();
        let ship = world.ship(key);

        match proposals.get(&key) {
            Some(destination) => proposals
                .iter()
                .any(|(other, other_destination)| *other != key && *other_destination == ship.position && world.ship(*other).position == *destination),
            None => false,
        }
    }

    fn is_adjustable(&self, key: ShipKey, proposals: &Proposals) -> bool {
        let world = self.world();
        let ship = world.ship(key);

        let Some(destination) = proposals.get(&key).copied() else {
            return false;
        };

        let arriving_to_die = matches!(ship.objective, Some(Objective::SuicideAtBase { .. })) && world.is_my_base(destination);

        world.is_mine(key)
            && self.evaluator.can_move(key)
            && destination != ship.position
            && !arriving_to_die
            && !self.is_swapping(key, proposals)
    }

    /// Changes the proposal of exactly one ship in `colliding`. Returns false when none could be changed.
    fn resolve_collision(&self, colliding: &[ShipKey], proposals: &mut Proposals, safety: &mut SafetyGrid) -> bool {
        let world = self.world();
        let ordered: Vec<ShipKey> = colliding.iter().copied().sorted_by_key(|key| (world.ship(*key).cargo, *key)).collect();

        if let Some(key) = ordered.iter().copied().find(|key| self.is_adjustable(*key, proposals)) {
            let blocked = proposals[&key];

            if ordered.len() == 2 && self.evaluator.stand_still_score(key, safety) <= 0.0 {
                let alternative = self.evaluator.best_alternative(key, &[blocked], safety);

                debug!("Ship {} escapes to {} instead of {}", world.ship(key).id, alternative, blocked);

                self.evaluator.redirect(key, alternative, proposals, safety);
            } else {
                let replanned = self.evaluator.replan(key, proposals, safety);

                debug!("Ship {} replanned to {} instead of {}", world.ship(key).id, replanned, blocked);
            }

            return true;
        }

        let forced = ordered
            .iter()
            .copied()
            .find(|key| world.is_mine(*key) && proposals.get(key).is_some_and(|destination| *destination != world.ship(*key).position));

        match forced {
            Some(key) => {
                warn!("Forcing ship {} to stay to break a collision", world.ship(key).id);

                self.evaluator.redirect(key, world.ship(key).position, proposals, safety);

                true
            }
            None => false,
        }
    }

    /// Adjacent stationary ships that would each be closer to their objective in the other's cell trade places.
    fn exchange_pass(&self, proposals: &mut Proposals, safety: &mut SafetyGrid) -> usize {
        let world = self.world();
        let torus = world.torus();

        let stationary: Vec<ShipKey> = proposals
            .iter()
            .filter(|(key, destination)| **destination == world.ship(**key).position && self.evaluator.can_move(**key))
            .map(|(key, _)| *key)
            .collect();

        let mut exchanged = BTreeSet::new();

        for (index, a) in stationary.iter().enumerate() {
            for b in &stationary[index + 1..] {
                if exchanged.contains(a) || exchanged.contains(b) {
                    continue;
                }

                let (first, second) = (world.ship(*a), world.ship(*b));

                if torus.distance(first.position, second.position) != 1 {
                    continue;
                }

                let (Some(first_objective), Some(second_objective)) = (first.objective, second.objective) else {
                    continue;
                };

                let Some(forward) = torus.direction_to(first.position, second.position) else {
                    continue;
                };
                let back = forward.invert();

                let first_closer = torus.unsafe_directions(first.position, first_objective.target()).contains(&forward);
                let second_closer = torus.unsafe_directions(second.position, second_objective.target()).contains(&back);

                if first_closer && second_closer {
                    self.evaluator.redirect(*a, second.position, proposals, safety);
                    self.evaluator.redirect(*b, first.position, proposals, safety);

                    exchanged.insert(*a);
                    exchanged.insert(*b);
                }
            }
        }

        exchanged.len() / 2
    }

    /// A ship idling on a base steps aside for the fullest returning ship next to it.
    fn base_exchange_pass(&self, proposals: &mut Proposals, safety: &mut SafetyGrid) -> usize {
        let world = self.world();
        let torus = world.torus();

        if world.turns_remaining() <= self.config.base_exchange_min_turns {
            return 0;
        }

        let idlers: Vec<ShipKey> = proposals
            .iter()
            .filter(|(key, destination)| {
                let ship = world.ship(**key);

                **destination == ship.position
                    && world.is_my_base(ship.position)
                    && self.evaluator.can_move(**key)
                    && !matches!(ship.objective, Some(Objective::SuicideAtBase { .. }))
            })
            .map(|(key, _)| *key)
            .collect();

        let mut exchanges = 0;

        for idler in idlers {
            let base = world.ship(idler).position;

            let returner = world
                .my_ships()
                .into_iter()
                .filter(|key| {
                    let ship = world.ship(*key);

                    torus.distance(ship.position, base) == 1
                        && matches!(ship.objective, Some(Objective::ReturnToBase { .. }))
                        && proposals.get(key).is_some_and(|destination| *destination != base)
                })
                .sorted_by_key(|key| (std::cmp::Reverse(world.ship(*key).cargo), *key))
                .next();

            let Some(returner) = returner else {
                continue;
            };

            let vacated = world.ship(returner).position;
            let vacated_claimed = proposals.iter().any(|(key, destination)| *key != returner && *destination == vacated);

            if vacated_claimed {
                continue;
            }

            self.evaluator.redirect(idler, vacated, proposals, safety);
            self.evaluator.redirect(returner, base, proposals, safety);

            exchanges += 1;
        }

        exchanges
    }

    /// Every proposal is at most one step away and no two of our ships share a destination outside the
    /// legitimate base arrivals.
    pub fn validate(&self, proposals: &Proposals) -> Result<(), BotError> {
        let world = self.world();
        let torus = world.torus();

        for (key, proposal) in proposals.iter() {
            let ship = world.ship(*key);
            let distance = torus.distance(ship.position, *proposal);

            if distance > 1 {
                return Err(BotError::ProposalTooFar {
                    ship: ship.id,
                    position: ship.position,
                    proposal: *proposal,
                    distance,
                });
            }
        }

        for (position, keys) in proposals.arrivals() {
            if keys.len() > 1 && !self.is_legitimate_base_arrival(position, &keys) {
                return Err(BotError::CollisionInOutput {
                    position,
                    ships: keys.iter().map(|key| world.ship(*key).id).collect(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::economy::*;
    use crate::testkit::*;

    struct Fixture {
        world: World,
        grids: TurnGrids,
        treasury: Treasury,
        config: StrategyConfig,
    }

    impl Fixture {
        fn new(world: World) -> Fixture {
            let config = StrategyConfig::default();
            let grids = TurnGrids::compute(&world, &config);

            Fixture {
                world,
                grids,
                treasury: Treasury::new(0),
                config,
            }
        }
    }

    fn propose(evaluator: &MoveEvaluator, safety: &mut SafetyGrid, moves: &[(ShipKey, Position)]) -> Proposals {
        let mut proposals = Proposals::new();

        for (key, destination) in moves {
            evaluator.redirect(*key, *destination, &mut proposals, safety);
        }

        proposals
    }

    #[test]
    fn mover_into_a_stationary_ship_is_changed() {
        let mut world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(2, 2), 100)
            .ship(0, 2, Position::new(2, 3), 200)
            .build();
        let keys = world.my_ships();

        world.ship_mut(keys[0]).objective = Some(Objective::Extract {
            target: Position::new(2, 2),
            score: 1.0,
        });
        world.ship_mut(keys[1]).objective = Some(Objective::Extract {
            target: Position::new(2, 0),
            score: 1.0,
        });

        let mut fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        let mut proposals = propose(&evaluator, safety, &[(keys[0], Position::new(2, 2)), (keys[1], Position::new(2, 2))]);
        let before = proposals.clone();

        let report = resolver.resolve(&mut proposals, safety).unwrap();

        assert!(report.iterations >= 1 && report.iterations <= fixture.config.movement.collision_iteration_cap);
        assert_eq!(proposals[&keys[0]], Position::new(2, 2));
        assert_ne!(proposals[&keys[1]], Position::new(2, 2));
        assert_eq!(keys.iter().filter(|key| proposals[*key] != before[*key]).count(), 1);
        assert!(resolver.collisions(&proposals).is_empty());
    }

    #[test]
    fn collisions_past_the_cap_are_fatal() {
        let world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(2, 2), 100)
            .ship(0, 2, Position::new(2, 3), 200)
            .build();
        let keys = world.my_ships();
        let mut fixture = Fixture::new(world);
        fixture.config.movement.collision_iteration_cap = 0;

        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        let mut proposals = propose(&evaluator, safety, &[(keys[0], Position::new(2, 2)), (keys[1], Position::new(2, 2))]);
        let error = resolver.resolve(&mut proposals, safety).unwrap_err();

        assert!(matches!(error, BotError::UnresolvedCollisions { remaining: 1, iterations: 0 }));
        assert!(error.is_fatal());
    }

    #[test]
    fn threatened_ship_escapes_instead_of_stopping() {
        let mut world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(5, 5), 0)
            .ship(0, 2, Position::new(5, 4), 0)
            .ship(1, 9, Position::new(6, 5), 0)
            .build();
        let keys = world.my_ships();

        world.ship_mut(keys[0]).objective = Some(Objective::Extract {
            target: Position::new(5, 0),
            score: 1.0,
        });

        let mut fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        assert_eq!(evaluator.stand_still_score(keys[0], safety), IMPOSSIBLE);

        let mut proposals = propose(&evaluator, safety, &[(keys[0], Position::new(5, 4)), (keys[1], Position::new(5, 4))]);
        let report = resolver.resolve(&mut proposals, safety).unwrap();

        assert_eq!(report.iterations, 1);
        assert_eq!(proposals[&keys[0]], Position::new(5, 6));
        assert_eq!(proposals[&keys[1]], Position::new(5, 4));
        assert_eq!(safety.tier(Position::new(5, 6)), SafetyTier::ReservedLow);
    }

    #[test]
    fn blocked_neighbours_trade_places() {
        let mut world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(5, 5), 0)
            .ship(0, 2, Position::new(6, 5), 0)
            .build();
        let keys = world.my_ships();

        world.ship_mut(keys[0]).objective = Some(Objective::Extract {
            target: Position::new(9, 5),
            score: 1.0,
        });
        world.ship_mut(keys[1]).objective = Some(Objective::Extract {
            target: Position::new(2, 5),
            score: 1.0,
        });

        let mut fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        let mut proposals = propose(&evaluator, safety, &[(keys[0], Position::new(5, 5)), (keys[1], Position::new(6, 5))]);
        let report = resolver.resolve(&mut proposals, safety).unwrap();

        assert_eq!(report.exchanges, 1);
        assert_eq!(proposals[&keys[0]], Position::new(6, 5));
        assert_eq!(proposals[&keys[1]], Position::new(5, 5));
    }

    #[test]
    fn neighbours_only_trade_when_both_gain() {
        let mut world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(5, 5), 0)
            .ship(0, 2, Position::new(6, 5), 0)
            .build();
        let keys = world.my_ships();

        world.ship_mut(keys[0]).objective = Some(Objective::Extract {
            target: Position::new(9, 5),
            score: 1.0,
        });
        world.ship_mut(keys[1]).objective = Some(Objective::Extract {
            target: Position::new(6, 9),
            score: 1.0,
        });

        let mut fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        let mut proposals = propose(&evaluator, safety, &[(keys[0], Position::new(5, 5)), (keys[1], Position::new(6, 5))]);
        let report = resolver.resolve(&mut proposals, safety).unwrap();

        assert_eq!(report.exchanges, 0);
        assert_eq!(proposals[&keys[0]], Position::new(5, 5));
    }

    #[test]
    fn swaps_are_not_collisions() {
        let world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(5, 5), 0)
            .ship(0, 2, Position::new(6, 5), 0)
            .build();
        let keys = world.my_ships();
        let mut fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        let mut proposals = propose(&evaluator, safety, &[(keys[0], Position::new(6, 5)), (keys[1], Position::new(5, 5))]);
        let report = resolver.resolve(&mut proposals, safety).unwrap();

        assert_eq!(report.iterations, 0);
        assert_eq!(proposals[&keys[0]], Position::new(6, 5));
    }

    #[test]
    fn endgame_ships_may_pile_onto_a_base() {
        let mut world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(4, 3), 300)
            .ship(0, 2, Position::new(4, 5), 300)
            .ship(0, 3, Position::new(3, 4), 300)
            .build();
        let keys = world.my_ships();
        let base = Position::new(4, 4);

        for key in &keys {
            world.ship_mut(*key).objective = Some(Objective::SuicideAtBase { base });
        }

        let mut fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        let mut proposals = propose(&evaluator, safety, &[(keys[0], base), (keys[1], base), (keys[2], base)]);

        resolver.resolve(&mut proposals, safety).unwrap();

        assert!(proposals.values().all(|destination| *destination == base));
    }

    #[test]
    fn far_proposals_are_fatal() {
        let world = WorldBuilder::new(16, 16).ship(0, 1, Position::new(5, 5), 0).build();
        let key = world.my_ships()[0];
        let fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);

        let mut proposals = Proposals::new();
        proposals.insert(key, Position::new(7, 5));

        let error = resolver.validate(&proposals).unwrap_err();

        assert!(matches!(error, BotError::ProposalTooFar { distance: 2, .. }));
        assert!(error.is_fatal());
    }

    #[test]
    fn idler_on_base_makes_way_for_returner() {
        let mut world = WorldBuilder::new(16, 16)
            .ship(0, 1, Position::new(4, 4), 0)
            .ship(0, 2, Position::new(5, 4), 950)
            .build();
        let keys = world.my_ships();

        world.ship_mut(keys[0]).objective = Some(Objective::Extract {
            target: Position::new(6, 4),
            score: 1.0,
        });
        world.ship_mut(keys[1]).objective = Some(Objective::ReturnToBase { base: Position::new(4, 4) });

        let mut fixture = Fixture::new(world);
        let evaluator = MoveEvaluator::new(&fixture.world, &fixture.grids.threats, &fixture.grids.inspiration, &fixture.treasury, &fixture.config);
        let resolver = CollisionResolver::new(&evaluator, &fixture.config.movement);
        let safety = &mut fixture.grids.safety;

        let mut proposals = propose(&evaluator, safety, &[(keys[0], Position::new(4, 4)), (keys[1], Position::new(5, 5))]);
        let report = resolver.resolve(&mut proposals, safety).unwrap();

        assert_eq!(report.base_exchanges, 1);
        assert_eq!(proposals[&keys[0]], Position::new(5, 4));
        assert_eq!(proposals[&keys[1]], Position::new(4, 4));
    }
}
