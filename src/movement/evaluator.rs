use super::*;
use crate::config::*;
use crate::economy::*;
use crate::geometry::*;
use crate::objective::*;
use crate::objectives::*;
use crate::pathing::*;
use crate::scoring::*;
use crate::world::*;
use itertools::Itertools;
use log::*;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;

/// Score of a move sequence, or a stand-still, that must not be taken.
pub const IMPOSSIBLE: f64 = f64::NEG_INFINITY;

/// Outcome of enumerating every move sequence of one length.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceSearch {
    pub evaluated: usize,
    pub best_score: f64,
    /// Distinct first steps of the sequences scoring `best_score`, in enumeration order.
    pub first_steps: Vec<Direction>,
}

impl SequenceSearch {
    fn choose(&self, rng: &mut SmallRng) -> Option<Direction> {
        if self.best_score == IMPOSSIBLE {
            None
        } else if self.first_steps.contains(&Direction::Still) {
            Some(Direction::Still)
        } else {
            self.first_steps.choose(rng).copied()
        }
    }
}

/// Turns each ship's objective into a proposed next cell.
pub struct MoveEvaluator<'a> {
    world: &'a World,
    pathfinder: PathFinder<'a>,
    threats: &'a ThreatMap,
    inspiration: &'a InspirationGrid,
    treasury: &'a Treasury,
    config: &'a StrategyConfig,
    reach: usize,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl<'a> MoveEvaluator<'a> {
    pub fn new(
        world: &'a World,
        threats: &'a ThreatMap,
        inspiration: &'a InspirationGrid,
        treasury: &'a Treasury,
        config: &'a StrategyConfig,
    ) -> MoveEvaluator<'a> {
        let pathfinder = PathFinder::new(&world.map, &world.constants, &config.pathing, world.turns_remaining());
        let reach = reach_for_fleet(world.me().ships.len(), &config.movement);

        MoveEvaluator {
            world,
            pathfinder,
            threats,
            inspiration,
            treasury,
            config,
            reach,
        }
    }

    pub fn world(&self) -> &World {
        self.world
    }

    pub fn reach(&self) -> usize {
        self.reach
    }

    /// Whether the ship has the fuel to leave its cell.
    pub fn can_move(&self, key: ShipKey) -> bool {
        let ship = self.world.ship(key);
        let fuel = self.world.constants.move_cost_when(self.world.map.halite(ship.position), self.is_inspired(ship.position));

        ship.cargo >= fuel
    }

    fn is_inspired(&self, pos: Position) -> bool {
        let constants = &self.world.constants;

        constants.inspiration_enabled && self.inspiration.is_inspired(pos, constants.inspiration_ship_count)
    }

    pub fn reservation_class(&self, key: ShipKey) -> ReservationClass {
        let committed = matches!(self.world.ship(key).objective, Some(objective) if objective.is(ObjectiveKindFlags::COMMITTED));

        if committed || !self.can_move(key) {
            ReservationClass::High
        } else {
            ReservationClass::Low
        }
    }

    /// Ships that cannot move go first since their cells are taken regardless, then by objective kind and
    /// descending score.
    pub fn planning_order(&self) -> Vec<ShipKey> {
        self.world
            .my_ships()
            .into_iter()
            .sorted_by(|a, b| {
                let (left, right) = (self.world.ship(*a), self.world.ship(*b));
                let kind = |ship: &Ship| ship.objective.map(|objective| objective.kind());
                let score = |ship: &Ship| ship.objective.map(|objective| objective.score()).unwrap_or(0.0);

                self.can_move(*a)
                    .cmp(&self.can_move(*b))
                    .then_with(|| kind(left).cmp(&kind(right)))
                    .then_with(|| score(right).partial_cmp(&score(left)).unwrap_or(Ordering::Equal))
                    .then_with(|| a.cmp(b))
            })
            .collect()
    }

    /// Proposes a move for every ship of ours, reserving each destination so later ships plan around it.
    pub fn plan(&self, safety: &mut SafetyGrid, rng: &mut SmallRng) -> Proposals {
        let mut proposals = Proposals::new();

        for key in self.planning_order() {
            let destination = self.propose(key, safety, rng);

            safety.reserve(destination, self.reservation_class(key));
            proposals.insert(key, destination);
        }

        proposals
    }

    pub fn propose(&self, key: ShipKey, safety: &SafetyGrid, rng: &mut SmallRng) -> Position {
        let ship = self.world.ship(key);

        if !self.can_move(key) {
            return ship.position;
        }

        match ship.objective {
            None => ship.position,
            Some(Objective::BuildDropoff { site }) => {
                if can_construct(self.world, key, self.treasury, &self.config.objectives) {
                    ship.position
                } else {
                    self.path_step(ship.position, site, PathCost::Travel, safety)
                }
            }
            Some(Objective::ReturnToBase { base }) => self.propose_return(ship, base, safety),
            Some(Objective::Extract { target, .. }) => self.propose_extract(ship, target, safety, rng),
            Some(objective) => self.path_step(ship.position, objective.target(), PathCost::for_objective(&objective), safety),
        }
    }

    pub fn path_step(&self, source: Position, target: Position, cost: PathCost, safety: &SafetyGrid) -> Position {
        self.pathfinder.step(safety, self.threats, source, target, cost)
    }

    /// Halite mined by staying one turn on `pos` while it holds `halite`, bonus included.
    fn extraction(&self, pos: Position, halite: u32) -> u32 {
        let constants = &self.world.constants;
        let inspired = self.is_inspired(pos);
        let extracted = constants.extracted_when(halite, inspired);

        if inspired {
            extracted + constants.inspiration_bonus(extracted)
        } else {
            extracted
        }
    }

    fn propose_return(&self, ship: &Ship, base: Position, safety: &SafetyGrid) -> Position {
        let max_cargo = self.world.constants.max_cargo;
        let gain = self.extraction(ship.position, self.world.map.halite(ship.position));

        let worth_staying = !self.world.is_my_base(ship.position)
            && gain >= self.config.movement.return_stay_min_gain
            && safety.is_clear(ship.position)
            && ship.cargo + gain <= max_cargo;

        if worth_staying {
            ship.position
        } else {
            self.path_step(ship.position, base, PathCost::ReturnToBase, safety)
        }
    }

    fn propose_extract(&self, ship: &Ship, target: Position, safety: &SafetyGrid, rng: &mut SmallRng) -> Position {
        let torus = self.world.torus();
        let distance = torus.distance(ship.position, target);

        if distance > self.reach as i32 {
            let wanted = self.world.constants.max_cargo.saturating_sub(ship.cargo);
            let local = Direction::ALL
                .iter()
                .map(|direction| {
                    let cell = torus.offset(ship.position, *direction);

                    self.extraction(cell, self.world.map.halite(cell))
                })
                .max()
                .unwrap_or(0);

            if local < wanted {
                return self.path_step(ship.position, target, PathCost::Travel, safety);
            }
        }

        match self.best_first_step(ship, target, safety, rng) {
            Some((direction, _)) => torus.offset(ship.position, direction),
            None => {
                warn!("Ship {} at {} found no legal move sequence towards {}, staying", ship.id, ship.position, target);

                ship.position
            }
        }
    }

    /// First step of the best sequence at the normal drift allowance, or failing that at the relaxed one. Returns
    /// the allowance that produced it.
    pub fn best_first_step(&self, ship: &Ship, target: Position, safety: &SafetyGrid, rng: &mut SmallRng) -> Option<(Direction, i32)> {
        [0, self.config.movement.drift_relax].into_iter().find_map(|allowance| {
            self.evaluate_sequences(ship, target, self.reach, allowance, safety)
                .choose(rng)
                .map(|direction| (direction, allowance))
        })
    }

    /// Scores all 5^reach sequences of moves and stays. Sequences come out Still-first in lexicographic order.
    pub fn evaluate_sequences(&self, ship: &Ship, target: Position, reach: usize, allowance: i32, safety: &SafetyGrid) -> SequenceSearch {
        let reach = reach.max(1);
        let limit = self.world.torus().distance(ship.position, target).max(reach as i32 + allowance);

        let mut search = SequenceSearch {
            evaluated: 0,
            best_score: IMPOSSIBLE,
            first_steps: Vec::new(),
        };

        for sequence in (0..reach).map(|_| Direction::ALL.iter().copied()).multi_cartesian_product() {
            let score = self.score_sequence(ship, target, &sequence, limit, safety);

            search.evaluated += 1;

            if score > search.best_score {
                search.best_score = score;
                search.first_steps.clear();
                search.first_steps.push(sequence[0]);
            } else if score == search.best_score && score > IMPOSSIBLE && !search.first_steps.contains(&sequence[0]) {
                search.first_steps.push(sequence[0]);
            }
        }

        search
    }

    /// Simulates `sequence` from the ship's cell. Stays mine and deplete the cell, moves burn fuel. The first step
    /// must avoid every unsafe tier, later steps only enemies, and no step may end further than `limit` from the
    /// target.
    pub fn score_sequence(&self, ship: &Ship, target: Position, sequence: &[Direction], limit: i32, safety: &SafetyGrid) -> f64 {
        let torus = self.world.torus();
        let constants = &self.world.constants;
        let start_distance = torus.distance(ship.position, target);

        let mut position = ship.position;
        let mut cargo = ship.cargo;
        let mut moves = 0;
        let mut mined: Vec<(Position, u32)> = Vec::new();

        for (step, direction) in sequence.iter().enumerate() {
            let halite = mined
                .iter()
                .rev()
                .find(|(pos, _)| *pos == position)
                .map(|(_, halite)| *halite)
                .unwrap_or_else(|| self.world.map.halite(position));

            if *direction == Direction::Still {
                if self.is_dangerous(position, step, safety) {
                    return IMPOSSIBLE;
                }

                cargo += self.extraction(position, halite).min(constants.max_cargo.saturating_sub(cargo));
                mined.push((position, halite - constants.extracted_when(halite, self.is_inspired(position)).min(halite)));
            } else {
                let fuel = constants.move_cost_when(halite, self.is_inspired(position));

                if cargo < fuel {
                    return IMPOSSIBLE;
                }

                cargo -= fuel;
                position = torus.offset(position, *direction);
                moves += 1;

                if self.is_dangerous(position, step, safety) || torus.distance(position, target) > limit {
                    return IMPOSSIBLE;
                }
            }
        }

        let drift = torus.distance(position, target) - start_distance;

        (cargo as f64 - ship.cargo as f64) / (1 + moves) as f64 - self.config.movement.drift_weight * drift as f64
    }

    fn is_dangerous(&self, pos: Position, step: usize, safety: &SafetyGrid) -> bool {
        if step == 0 {
            safety.is_unsafe(pos, SafetyTierFlags::UNSAFE)
        } else {
            !self.world.is_my_base(pos) && safety.hazard(pos).is_any(SafetyTierFlags::ENEMY)
        }
    }

    /// Value of holding position this turn. Impossible next to an enemy.
    pub fn stand_still_score(&self, key: ShipKey, safety: &SafetyGrid) -> f64 {
        let ship = self.world.ship(key);

        if !self.world.is_my_base(ship.position) && safety.hazard(ship.position).is_any(SafetyTierFlags::ENEMY) {
            return IMPOSSIBLE;
        }

        let gain = self.extraction(ship.position, self.world.map.halite(ship.position));

        gain.min(self.world.constants.max_cargo.saturating_sub(ship.cargo)) as f64
    }

    /// Safest reachable cell around the ship other than `forbidden`, closest to its objective among equals.
    pub fn best_alternative(&self, key: ShipKey, forbidden: &[Position], safety: &SafetyGrid) -> Position {
        let torus = self.world.torus();
        let ship = self.world.ship(key);
        let target = ship.objective.map(|objective| objective.target()).unwrap_or(ship.position);
        let mobile = self.can_move(key);

        Direction::ALL
            .iter()
            .filter(|direction| mobile || **direction == Direction::Still)
            .map(|direction| torus.offset(ship.position, *direction))
            .filter(|cell| !forbidden.contains(cell))
            .min_by_key(|cell| (safety.tier(*cell), torus.distance(*cell, target)))
            .unwrap_or(ship.position)
    }

    /// Plans the ship again after its proposal was taken from it: a fresh path step against the current
    /// reservations, or a stay when the path still wants the same cell.
    pub fn replan(&self, key: ShipKey, proposals: &mut Proposals, safety: &mut SafetyGrid) -> Position {
        let ship = self.world.ship(key);
        let class = self.reservation_class(key);
        let previous = proposals.get(&key).copied().unwrap_or(ship.position);

        safety.release(previous, class);

        let step = match ship.objective {
            Some(objective) if self.can_move(key) => {
                self.path_step(ship.position, objective.target(), PathCost::for_objective(&objective), safety)
            }
            _ => ship.position,
        };

        let destination = if step == previous { ship.position } else { step };

        self.redirect(key, destination, proposals, safety);

        destination
    }

    /// Moves a ship's proposal and its reservation to `destination`.
    pub fn redirect(&self, key: ShipKey, destination: Position, proposals: &mut Proposals, safety: &mut SafetyGrid) {
        let class = self.reservation_class(key);

        if let Some(previous) = proposals.insert(key, destination) {
            safety.release(previous, class);
        }

        safety.reserve(destination, class);
    }
}

/// Lookahead depth, shorter as the fleet grows so the whole turn stays under the time limit.
pub fn reach_for_fleet(ships: usize, config: &MovementConfig) -> usize {
    if ships <= config.reach_small_fleet {
        6
    } else if ships <= config.reach_medium_fleet {
        5
    } else {
        4
    }
}
