use crate::config::*;
use crate::constants::*;
use crate::geometry::*;
use crate::world::*;
use super::threatmap::*;
use lerp::*;

/// Smoothed extraction attractiveness per cell, in halite per cell of the smoothing window.
pub struct YieldGrid {
    values: Grid<f64>,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl YieldGrid {
    pub fn compute(world: &World, inspiration: &InspirationGrid, config: &ScoringConfig) -> YieldGrid {
        let torus = world.torus();
        let crumb = config.crumb_threshold.max(1) as f64;

        //
        // NOTE: Structures are excluded at the source so they also drag down the smoothed value of their neighbors.
        //
        let penalized = Grid::from_fn(torus, |pos| {
            let cell = world.map.cell(pos);

            if cell.structure.is_some() {
                return 0.0;
            }

            let halite = cell.halite as f64;

            if halite < crumb {
                halite * halite / crumb
            } else {
                halite
            }
        });

        let radius = config.smoothing_radius.max(0);
        let window = torus.within_radius(Position::default(), radius).len() as f64;
        let boost = inspiration_boost(&world.constants, config);

        let values = Grid::from_fn(torus, |pos| {
            if world.is_enemy_base(pos) {
                return 0.0;
            }

            let smoothed = torus.within_radius(pos, radius).into_iter().map(|cell| penalized[cell]).sum::<f64>() / window;

            match boost {
                Some(multiplier) => {
                    let inspired = inspiration.fraction(pos, world.constants.inspiration_ship_count);

                    smoothed * 1.0_f64.lerp_bounded(1.0 + multiplier, inspired)
                }
                None => smoothed,
            }
        });

        YieldGrid { values }
    }

    pub fn get(&self, pos: Position) -> f64 {
        self.values[pos]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, f64)> + '_ {
        self.values.iter().map(|(pos, value)| (pos, *value))
    }

    /// Spreads `amount` over the cells within `radius` of `center` and removes it, clamping at zero. Used after a
    /// claim so the next ship in the same pass looks elsewhere.
    pub fn decrement_around(&mut self, center: Position, radius: i32, amount: f64) {
        let torus = self.values.torus();
        let cells = torus.within_radius(center, radius);
        let share = amount / cells.len().max(1) as f64;

        for cell in cells {
            let value = &mut self.values[cell];
            *value = (*value - share).max(0.0);
        }
    }
}

fn inspiration_boost(constants: &GameConstants, config: &ScoringConfig) -> Option<f64> {
    if config.inspiration_boost && constants.inspiration_enabled {
        Some(constants.inspired_bonus_multiplier)
    } else {
        None
    }
}
