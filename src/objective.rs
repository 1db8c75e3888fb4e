use crate::geometry::*;
use crate::world::ShipId;
use bitflags::*;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// What a ship is trying to do this turn. Each variant carries only what its movement needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Objective {
    Extract { target: Position, score: f64 },
    ReturnToBase { base: Position },
    BuildDropoff { site: Position },
    SuicideAtBase { base: Position },
    BlockEnemyBase { cell: Position, score: f64 },
    Attack { victim: ShipId, cell: Position, score: f64 },
}

/// Objective kinds in the order ships are handed to the move evaluator.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectiveKind {
    BuildDropoff = 0,
    SuicideAtBase = 1,
    ReturnToBase = 2,
    BlockEnemyBase = 3,
    Attack = 4,
    Extract = 5,
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ObjectiveKindFlags: u8 {
        const UNSET = 0;

        const BUILD_DROPOFF = 1u8 << (ObjectiveKind::BuildDropoff as u8);
        const SUICIDE_AT_BASE = 1u8 << (ObjectiveKind::SuicideAtBase as u8);
        const RETURN_TO_BASE = 1u8 << (ObjectiveKind::ReturnToBase as u8);
        const BLOCK_ENEMY_BASE = 1u8 << (ObjectiveKind::BlockEnemyBase as u8);
        const ATTACK = 1u8 << (ObjectiveKind::Attack as u8);
        const EXTRACT = 1u8 << (ObjectiveKind::Extract as u8);

        // Objectives whose ship is heading for one of its own bases.
        const HOMEBOUND = Self::SUICIDE_AT_BASE.bits() | Self::RETURN_TO_BASE.bits();
        // Objectives that reserve their next cell at high priority.
        const COMMITTED = Self::BUILD_DROPOFF.bits() | Self::SUICIDE_AT_BASE.bits() | Self::RETURN_TO_BASE.bits();
        // Objectives that carry over to the next turn while their precondition holds.
        const PERSISTENT = Self::SUICIDE_AT_BASE.bits() | Self::RETURN_TO_BASE.bits() | Self::BLOCK_ENEMY_BASE.bits();
    }
}

impl<T> From<T> for ObjectiveKindFlags
where
    T: Borrow<ObjectiveKind>,
{
    fn from(kind: T) -> ObjectiveKindFlags {
        match kind.borrow() {
            ObjectiveKind::BuildDropoff => ObjectiveKindFlags::BUILD_DROPOFF,
            ObjectiveKind::SuicideAtBase => ObjectiveKindFlags::SUICIDE_AT_BASE,
            ObjectiveKind::ReturnToBase => ObjectiveKindFlags::RETURN_TO_BASE,
            ObjectiveKind::BlockEnemyBase => ObjectiveKindFlags::BLOCK_ENEMY_BASE,
            ObjectiveKind::Attack => ObjectiveKindFlags::ATTACK,
            ObjectiveKind::Extract => ObjectiveKindFlags::EXTRACT,
        }
    }
}

impl Objective {
    pub fn kind(&self) -> ObjectiveKind {
        match self {
            Objective::Extract { .. } => ObjectiveKind::Extract,
            Objective::ReturnToBase { .. } => ObjectiveKind::ReturnToBase,
            Objective::BuildDropoff { .. } => ObjectiveKind::BuildDropoff,
            Objective::SuicideAtBase { .. } => ObjectiveKind::SuicideAtBase,
            Objective::BlockEnemyBase { .. } => ObjectiveKind::BlockEnemyBase,
            Objective::Attack { .. } => ObjectiveKind::Attack,
        }
    }

    pub fn is(&self, flags: ObjectiveKindFlags) -> bool {
        flags.contains(self.kind().into())
    }

    pub fn target(&self) -> Position {
        match *self {
            Objective::Extract { target, .. } => target,
            Objective::ReturnToBase { base } => base,
            Objective::BuildDropoff { site } => site,
            Objective::SuicideAtBase { base } => base,
            Objective::BlockEnemyBase { cell, .. } => cell,
            Objective::Attack { cell, .. } => cell,
        }
    }

    /// Desirability used to order ships of the same kind. Homebound and construction objectives have no score.
    pub fn score(&self) -> f64 {
        match *self {
            Objective::Extract { score, .. } | Objective::BlockEnemyBase { score, .. } | Objective::Attack { score, .. } => score,
            Objective::ReturnToBase { .. } | Objective::BuildDropoff { .. } | Objective::SuicideAtBase { .. } => 0.0,
        }
    }
}
