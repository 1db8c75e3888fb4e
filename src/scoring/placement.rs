use crate::config::*;
use crate::findnearest::*;
use crate::geometry::*;
use crate::world::*;

/// Attractiveness of each cell as a new dropoff site: the halite around it, for cells in the band of distances
/// from our bases where a dropoff shortens trips, and away from opponent bases.
pub struct PlacementGrid {
    values: Grid<f64>,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl PlacementGrid {
    pub fn compute(world: &World, config: &ScoringConfig) -> PlacementGrid {
        let torus = world.torus();
        let my_bases = world.my_bases();
        let enemy_bases: Vec<Position> = world.opponents().flat_map(|player| player.bases()).collect();

        let values = Grid::from_fn(torus, |pos| {
            if world.map.cell(pos).structure.is_some() {
                return 0.0;
            }

            let home = my_bases.iter().find_nearest_linear_distance(torus, pos).unwrap_or(i32::MAX);

            if home < config.placement_min_base_distance || home > config.placement_max_base_distance {
                return 0.0;
            }

            let enemy = enemy_bases.iter().find_nearest_linear_distance(torus, pos).unwrap_or(i32::MAX);

            if enemy < config.placement_enemy_base_distance {
                return 0.0;
            }

            torus
                .within_radius(pos, config.placement_radius)
                .into_iter()
                .map(|cell| world.map.halite(cell) as f64)
                .sum()
        });

        PlacementGrid { values }
    }

    pub fn get(&self, pos: Position) -> f64 {
        self.values[pos]
    }

    /// Highest scoring cell, first in row-major order on ties. `None` when no cell qualifies.
    pub fn best(&self) -> Option<(Position, f64)> {
        let mut best: Option<(Position, f64)> = None;

        for (pos, value) in self.values.iter() {
            if *value > 0.0 && best.map_or(true, |(_, best_value)| *value > best_value) {
                best = Some((pos, *value));
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;

    #[test]
    fn picks_rich_cell_in_band() {
        let world = WorldBuilder::new(32, 32)
            .halite(Position::new(8, 20), 900)
            .halite(Position::new(8, 6), 2000)
            .build();
        let config = ScoringConfig::default();
        let placement = PlacementGrid::compute(&world, &config);
        let (best, _) = placement.best().unwrap();

        assert_eq!(world.me().shipyard, Position::new(8, 8));
        assert_eq!(placement.get(Position::new(8, 6)), 0.0);
        assert!(world.torus().distance(best, Position::new(8, 20)) <= config.placement_radius);
    }

    #[test]
    fn empty_map_has_no_site() {
        let world = WorldBuilder::new(32, 32).build();
        let placement = PlacementGrid::compute(&world, &ScoringConfig::default());

        assert!(placement.best().is_none());
    }
}
