use crate::geometry::*;
use crate::world::*;
use bitflags::*;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

/// How contested a cell is for next turn. Ordered by severity.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SafetyTier {
    #[default]
    Clear = 0,
    ReservedLow = 1,
    ReservedHigh = 2,
    EnemyAdjacent = 3,
    EnemyOccupied = 4,
}

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct SafetyTierFlags: u8 {
        const UNSET = 0;

        const CLEAR = 1u8 << (SafetyTier::Clear as u8);
        const RESERVED_LOW = 1u8 << (SafetyTier::ReservedLow as u8);
        const RESERVED_HIGH = 1u8 << (SafetyTier::ReservedHigh as u8);
        const ENEMY_ADJACENT = 1u8 << (SafetyTier::EnemyAdjacent as u8);
        const ENEMY_OCCUPIED = 1u8 << (SafetyTier::EnemyOccupied as u8);

        const RESERVED = Self::RESERVED_LOW.bits() | Self::RESERVED_HIGH.bits();
        const ENEMY = Self::ENEMY_ADJACENT.bits() | Self::ENEMY_OCCUPIED.bits();
        const UNSAFE = Self::RESERVED.bits() | Self::ENEMY.bits();
    }
}

impl<T> From<T> for SafetyTierFlags
where
    T: Borrow<SafetyTier>,
{
    fn from(tier: T) -> SafetyTierFlags {
        match tier.borrow() {
            SafetyTier::Clear => SafetyTierFlags::CLEAR,
            SafetyTier::ReservedLow => SafetyTierFlags::RESERVED_LOW,
            SafetyTier::ReservedHigh => SafetyTierFlags::RESERVED_HIGH,
            SafetyTier::EnemyAdjacent => SafetyTierFlags::ENEMY_ADJACENT,
            SafetyTier::EnemyOccupied => SafetyTierFlags::ENEMY_OCCUPIED,
        }
    }
}

impl SafetyTier {
    pub fn is_any(self, flags: SafetyTierFlags) -> bool {
        flags.contains(self.into())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReservationClass {
    Low,
    High,
}

/// Move-safety grid. Enemy proximity is fixed when the grid is built, friendly reservations accumulate as ships
/// are given moves, so each ship sees the reservations of every ship planned before it.
pub struct SafetyGrid {
    hazard: Grid<SafetyTier>,
    low: Grid<u8>,
    high: Grid<u8>,
    friendly_base: Grid<bool>,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl SafetyGrid {
    pub fn compute(world: &World) -> SafetyGrid {
        let torus = world.torus();
        let mut hazard = Grid::new(torus, SafetyTier::Clear);

        for (_, ship) in world.enemy_ships() {
            for neighbor in torus.neighbors(ship.position) {
                if hazard[neighbor] < SafetyTier::EnemyAdjacent {
                    hazard[neighbor] = SafetyTier::EnemyAdjacent;
                }
            }
        }

        for (_, ship) in world.enemy_ships() {
            hazard[ship.position] = SafetyTier::EnemyOccupied;
        }

        let friendly_base = Grid::from_fn(torus, |pos| world.is_my_base(pos));

        SafetyGrid {
            hazard,
            low: Grid::new(torus, 0),
            high: Grid::new(torus, 0),
            friendly_base,
        }
    }

    pub fn tier(&self, pos: Position) -> SafetyTier {
        if self.friendly_base[pos] {
            return SafetyTier::Clear;
        }

        let reserved = if self.high[pos] > 0 {
            SafetyTier::ReservedHigh
        } else if self.low[pos] > 0 {
            SafetyTier::ReservedLow
        } else {
            SafetyTier::Clear
        };

        reserved.max(self.hazard[pos])
    }

    /// Enemy proximity only, ignoring friendly reservations and bases.
    pub fn hazard(&self, pos: Position) -> SafetyTier {
        self.hazard[pos]
    }

    pub fn is_clear(&self, pos: Position) -> bool {
        self.tier(pos) == SafetyTier::Clear
    }

    pub fn is_unsafe(&self, pos: Position, flags: SafetyTierFlags) -> bool {
        self.tier(pos).is_any(flags)
    }

    pub fn reserve(&mut self, pos: Position, class: ReservationClass) {
        let counts = match class {
            ReservationClass::Low => &mut self.low,
            ReservationClass::High => &mut self.high,
        };

        counts[pos] = counts[pos].saturating_add(1);
    }

    pub fn release(&mut self, pos: Position, class: ReservationClass) {
        let counts = match class {
            ReservationClass::Low => &mut self.low,
            ReservationClass::High => &mut self.high,
        };

        counts[pos] = counts[pos].saturating_sub(1);
    }
}
