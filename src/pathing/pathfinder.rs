use super::costmatrix::*;
use crate::config::*;
use crate::constants::*;
use crate::geometry::*;
use crate::scoring::*;
use crate::world::*;
use log::*;
use pathfinding::prelude::astar;

/// Single-step A* navigation. Only the first step of a path is returned, the whole route is planned again next
/// turn against the new world.
pub struct PathFinder<'a> {
    map: &'a GameMap,
    constants: &'a GameConstants,
    config: &'a PathingConfig,
    turns_remaining: u32,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl<'a> PathFinder<'a> {
    pub fn new(map: &'a GameMap, constants: &'a GameConstants, config: &'a PathingConfig, turns_remaining: u32) -> PathFinder<'a> {
        PathFinder {
            map,
            constants,
            config,
            turns_remaining,
        }
    }

    pub fn torus(&self) -> Torus {
        self.map.torus
    }

    /// Next cell on a cheap, safe route from `source` to `target`. The target itself when it is at most one step
    /// away, and `source` when no route exists.
    pub fn step(&self, safety: &SafetyGrid, threats: &ThreatMap, source: Position, target: Position, cost: PathCost) -> Position {
        let torus = self.map.torus;
        let source = torus.normalize(source);
        let target = torus.normalize(target);

        if torus.distance(source, target) <= 1 {
            return target;
        }

        let matrix = CostMatrix {
            map: self.map,
            safety,
            threats,
            config: self.config,
            constants: self.constants,
            source,
            target,
            cost,
            turns_remaining: self.turns_remaining,
        };

        let result = astar(
            &source,
            |&pos| {
                torus
                    .neighbors(pos)
                    .into_iter()
                    .filter(|next| !matrix.is_pruned(*next))
                    .map(|next| (next, matrix.edge_cost(pos, next)))
                    .collect::<Vec<_>>()
            },
            |&pos| matrix.heuristic(pos),
            |&pos| pos == target,
        );

        match result {
            Some((path, _)) if path.len() > 1 => path[1],
            _ => {
                debug!("No path from {} to {}, staying", source, target);
                source
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::*;

    fn step(world: &World, grids: &TurnGrids, source: Position, target: Position, cost: PathCost) -> Position {
        let config = PathingConfig::default();
        let finder = PathFinder::new(&world.map, &world.constants, &config, world.turns_remaining());

        finder.step(&grids.safety, &grids.threats, source, target, cost)
    }

    #[test]
    fn trivial_requests_skip_search() {
        let world = WorldBuilder::new(16, 16).build();
        let grids = TurnGrids::compute(&world, &Default::default());
        let a = Position::new(3, 3);

        assert_eq!(step(&world, &grids, a, a, PathCost::Travel), a);
        assert_eq!(step(&world, &grids, a, Position::new(3, 2), PathCost::Travel), Position::new(3, 2));
    }

    #[test]
    fn prefers_cheap_cells() {
        let world = WorldBuilder::new(16, 16)
            .halite(Position::new(1, 0), 900)
            .halite(Position::new(0, 1), 0)
            .build();
        let grids = TurnGrids::compute(&world, &Default::default());

        //
        // NOTE: Leaving the expensive cell costs 90, so the route goes south first.
        //
        assert_eq!(step(&world, &grids, Position::new(0, 0), Position::new(2, 2), PathCost::Travel), Position::new(0, 1));
    }

    #[test]
    fn detours_around_enemies() {
        let world = WorldBuilder::new(16, 16).ship(1, 9, Position::new(2, 0), 0).build();
        let grids = TurnGrids::compute(&world, &Default::default());
        let next = step(&world, &grids, Position::new(0, 0), Position::new(4, 0), PathCost::Travel);

        assert_ne!(next, Position::new(1, 0));
        assert_eq!(world.torus().distance(next, Position::new(0, 0)), 1);
    }

    #[test]
    fn suicide_runs_ignore_enemies_late() {
        let world = WorldBuilder::new(16, 16)
            .ship(1, 9, Position::new(4, 2), 0)
            .max_turns(10)
            .turn(5)
            .build();
        let grids = TurnGrids::compute(&world, &Default::default());
        let base = world.me().shipyard;

        assert_eq!(base, Position::new(4, 4));
        assert_eq!(step(&world, &grids, Position::new(4, 1), base, PathCost::SuicideAtBase), Position::new(4, 2));
        assert_ne!(step(&world, &grids, Position::new(4, 1), base, PathCost::Travel), Position::new(4, 2));
    }
}
