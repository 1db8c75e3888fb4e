use crate::config::*;
use crate::constants::*;
use crate::geometry::*;
use crate::objective::*;
use crate::scoring::*;
use crate::world::*;

/// Edge cost variant, chosen by what the travelling ship is trying to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PathCost {
    /// Plain fuel plus safety penalties.
    Travel,
    /// Also pays for enemy ships in the neighborhood of each cell.
    ReturnToBase,
    /// Ignores enemies close to the end of the game or close to the base.
    SuicideAtBase,
    /// Pays for cells where enemies outnumber us.
    Blockade,
}

impl PathCost {
    pub fn for_objective(objective: &Objective) -> PathCost {
        match objective.kind() {
            ObjectiveKind::ReturnToBase => PathCost::ReturnToBase,
            ObjectiveKind::SuicideAtBase => PathCost::SuicideAtBase,
            ObjectiveKind::BlockEnemyBase => PathCost::Blockade,
            ObjectiveKind::Extract | ObjectiveKind::BuildDropoff | ObjectiveKind::Attack => PathCost::Travel,
        }
    }
}

/// Cell costs for one search, from one source to one target.
pub struct CostMatrix<'a> {
    pub map: &'a GameMap,
    pub safety: &'a SafetyGrid,
    pub threats: &'a ThreatMap,
    pub config: &'a PathingConfig,
    pub constants: &'a GameConstants,
    pub source: Position,
    pub target: Position,
    pub cost: PathCost,
    pub turns_remaining: u32,
}

impl<'a> CostMatrix<'a> {
    /// Tiers that earn the safety penalty when stepped on.
    fn unsafe_flags(&self, to: Position) -> SafetyTierFlags {
        match self.cost {
            PathCost::SuicideAtBase if self.ignores_enemies(to) => SafetyTierFlags::RESERVED,
            _ => SafetyTierFlags::UNSAFE,
        }
    }

    fn ignores_enemies(&self, to: Position) -> bool {
        self.cost == PathCost::SuicideAtBase
            && (self.turns_remaining <= self.config.suicide_ignore_turns
                || self.map.torus.distance(to, self.target) <= self.config.suicide_ignore_radius)
    }

    /// Enemy ships next to the source are never expanded through, unless they are the destination.
    pub fn is_pruned(&self, to: Position) -> bool {
        to != self.target
            && !self.ignores_enemies(to)
            && self.map.torus.distance(self.source, to) <= self.config.prune_radius
            && self.safety.tier(to) == SafetyTier::EnemyOccupied
    }

    pub fn edge_cost(&self, from: Position, to: Position) -> u64 {
        let mut cost = self.constants.move_cost(self.map.halite(from)) as u64;

        if to == self.target {
            return cost;
        }

        if self.map.torus.distance(self.source, to) <= self.config.unsafe_radius && self.safety.is_unsafe(to, self.unsafe_flags(to)) {
            cost += self.config.unsafe_penalty;
        }

        match self.cost {
            PathCost::ReturnToBase => cost += self.config.presence_penalty * self.threats.enemy_presence(to) as u64,
            PathCost::Blockade => cost += self.config.presence_penalty * self.threats.contest(to) as u64,
            PathCost::Travel | PathCost::SuicideAtBase => {}
        }

        cost
    }

    pub fn heuristic(&self, from: Position) -> u64 {
        self.config.heuristic_weight * self.map.torus.distance(from, self.target) as u64
    }
}
