use crate::geometry::*;
use pathfinding::prelude::dijkstra_all;

/// Steps from every cell to the closest of a set of bases, and which base that is.
pub struct BaseDistances {
    distance: Grid<i32>,
    nearest: Grid<Position>,
}

#[cfg_attr(feature = "profile", timing_annotate::timing)]
impl BaseDistances {
    /// Earlier bases win ties, so the shipyard is preferred over dropoffs at equal distance.
    pub fn compute(torus: Torus, bases: &[Position]) -> BaseDistances {
        let mut distance = Grid::new(torus, i32::MAX);
        let mut nearest = Grid::new(torus, bases.first().copied().unwrap_or_default());

        for base in bases.iter().map(|base| torus.normalize(*base)) {
            if distance[base] > 0 {
                distance[base] = 0;
                nearest[base] = base;
            }

            let reachable = dijkstra_all(&base, |&pos| torus.neighbors(pos).into_iter().map(|next| (next, 1i32)));

            for (pos, (_, steps)) in reachable {
                if steps < distance[pos] {
                    distance[pos] = steps;
                    nearest[pos] = base;
                }
            }
        }

        BaseDistances { distance, nearest }
    }

    pub fn distance(&self, pos: Position) -> i32 {
        self.distance[pos]
    }

    pub fn nearest_base(&self, pos: Position) -> Position {
        self.nearest[pos]
    }
}
